pub mod json_loader;
pub mod legacy;

pub use json_loader::{load_quiz_file, parse_quiz_document, strip_bom};
pub use legacy::{convert_legacy, default_result_messages, is_legacy_shape};
