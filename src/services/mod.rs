//! 业务能力层
//!
//! 每个服务只做一件事，不关心调用顺序；流程由 workflow / orchestrator 组织。

pub mod catalog;
pub mod corpus_loader;
pub mod integrity;
pub mod threshold_sync;
pub mod validation;

pub use catalog::{group_by_category, CategoryGroup};
pub use corpus_loader::{CorpusLoad, CorpusLoader, LoadFailure, LoadOptions, LoadedQuiz};
pub use integrity::{fix_quiz_list, run_integrity_check, CategoryWarning, IntegrityReport};
pub use threshold_sync::{CountRecompute, GrowthProposal, GrowthResolution};
pub use validation::{validate_quiz, ValidationIssue, ValidationReport};
