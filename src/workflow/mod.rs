//! 流程层
//!
//! 把一次编辑过程中的多个服务调用串起来。

pub mod edit_session;

pub use edit_session::{CountEditOutcome, EditSession, GrowthPolicy};
