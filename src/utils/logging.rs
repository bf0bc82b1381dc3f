//! 日志工具模块
//!
//! 提供日志初始化、格式化输出和加载报告文件的辅助函数

use std::fs;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::services::corpus_loader::CorpusLoad;
use crate::services::integrity::IntegrityReport;

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时默认 `info`，`verbose` 为真时 `debug`。
/// 重复调用不会报错（测试里可能被多次调用）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn report_header(title: &str) -> String {
    format!(
        "{}\n{} - {}\n{}\n\n",
        "=".repeat(60),
        title,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    )
}

/// 把加载结果写入报告文件
///
/// # 参数
/// - `log_file_path`: 报告文件路径
/// - `load`: 加载结果
pub fn write_report_file(log_file_path: &str, load: &CorpusLoad) -> Result<()> {
    let mut content = report_header("测验加载报告");
    content.push_str(&format!(
        "成功: {}\n失败: {}\n\n",
        load.quizzes.len(),
        load.failures.len()
    ));
    for quiz in &load.quizzes {
        content.push_str(&format!(
            "✓ {} ({}, {} 题)\n",
            quiz.identifier,
            quiz.record.title,
            quiz.record.questions.len()
        ));
    }
    if !load.failures.is_empty() {
        content.push('\n');
        content.push_str(&load.failure_report());
        content.push('\n');
    }

    fs::write(log_file_path, content)
        .with_context(|| format!("无法写入报告文件: {}", log_file_path))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, source: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 测验数据工具");
    info!("📂 数据源: {}", source);
    match config.item_timeout() {
        Some(timeout) => info!("⏱️ 单文件超时: {:?}", timeout),
        None => info!("⏱️ 单文件超时: 不限"),
    }
    info!("{}", "=".repeat(60));
}

/// 记录加载统计
pub fn log_load_summary(load: &CorpusLoad, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 加载完成统计");
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}", load.quizzes.len());
    if load.failures.is_empty() {
        info!("❌ 失败: 0");
    } else {
        warn!("❌ 失败: {}", load.failures.len());
        for failure in &load.failures {
            warn!("   {}", failure);
        }
    }
    info!("{}", "=".repeat(60));
    info!("\n报告已保存至: {}", log_file_path);
}

/// 记录一致性检查结果
pub fn log_integrity_report(report: &IntegrityReport) {
    info!("\n{}", "─".repeat(60));
    for name in &report.missing {
        warn!("❓ 索引中有但文件不存在: {}", name);
    }
    for name in &report.orphans {
        warn!("📄 文件存在但未登记到索引: {}", name);
    }
    for warning in &report.category_warnings {
        warn!(
            "🏷️ {} 的分类 \"{}\" 不在分类列表中",
            warning.file, warning.category
        );
    }
    if report.is_consistent() && report.category_warnings.is_empty() {
        info!("✅ 没有发现问题");
    }
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadFailureReason;
    use crate::models::quiz::QuizRecord;
    use crate::services::corpus_loader::{LoadFailure, LoadedQuiz};

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("日本の歴史クイズ", 4), "日本の歴...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn test_write_report_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("report.txt");
        let load = CorpusLoad {
            quizzes: vec![LoadedQuiz {
                identifier: "a.json".to_string(),
                record: QuizRecord {
                    title: "A".to_string(),
                    ..QuizRecord::default()
                },
            }],
            failures: vec![LoadFailure {
                identifier: "b.json".to_string(),
                reason: LoadFailureReason::NotFound,
            }],
        };

        let path_str = path.to_string_lossy().to_string();
        write_report_file(&path_str, &load).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("测验加载报告"));
        assert!(content.contains("✓ a.json (A, 0 题)"));
        assert!(content.contains("[b.json]"));
        assert!(content.contains("not found"));
    }

    #[test]
    fn test_init_is_idempotent() {
        init(false);
        init(true);
    }
}
