pub mod draft;
pub mod loaders;
pub mod quiz;

pub use draft::{QuizDraft, QuizMetadata, ResultThreshold, ThresholdAuthority, ThresholdId};
pub use loaders::{load_quiz_file, parse_quiz_document};
pub use quiz::{AnswerOption, Question, QuizRecord, ResultMessage};
