//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层是整个系统的"指挥中心"：持有配置、数据源和数据目录，
//! 按命令行选择的模式调度下面各层。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (按 RunMode 分发)
//!     ↓
//! workflow::EditSession (一次编辑 / 导入)
//!     ↓
//! services (能力层：加载 / 阈值 / 校验 / 一致性 / 分组)
//!     ↓
//! infrastructure (基础设施：数据源、文件仓库、settle_all)
//! ```
//!
//! ## 设计原则
//!
//! 1. **向下依赖**：编排层 → workflow → services → infrastructure
//! 2. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod app;

pub use app::{App, RunMode};
