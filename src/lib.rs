//! # Quiz Corpus
//!
//! 测验数据的加载、编辑与维护工具
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有外部资源，只暴露能力
//! - `CorpusSource` - 索引和测验文件的读取（本地目录 / HTTP）
//! - `QuizStore` - 数据目录的读写
//! - `settle_all` - 并发执行、全部完成后按顺序返回
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `threshold_sync` - 得分率与正确数的双向换算
//! - `corpus_loader` - 索引 + 并发加载，单个文件失败不影响其他文件
//! - `validation` / `integrity` / `catalog` - 校验、一致性检查、分类分组
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次编辑"的完整过程
//! - `EditSession` - 草稿编辑、补题确认、保存
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 命令行模式分发，管理配置和资源
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ConfiguredSource, CorpusSource, FsSource, HttpSource, QuizStore};
pub use models::{QuizDraft, QuizRecord, ThresholdId};
pub use orchestrator::{App, RunMode};
pub use services::{CorpusLoad, CorpusLoader};
pub use workflow::{EditSession, GrowthPolicy};
