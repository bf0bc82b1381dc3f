//! 基础设施层
//!
//! 持有文件系统 / 网络这类外部资源，只暴露能力，不认识业务流程。

pub mod settle;
pub mod source;
pub mod store;

pub use settle::settle_all;
pub use source::{ConfiguredSource, CorpusSource, FsSource, HttpSource};
pub use store::{suggest_file_name, QuizStore};
