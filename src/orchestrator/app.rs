//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：根据配置选择数据源、打开数据目录
//! 2. **命令分发**：按 `RunMode` 调用对应的服务或流程
//! 3. **结果输出**：日志、加载报告文件
//!
//! 本模块只做调度和统计，不做具体业务判断。

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::FileError;
use crate::infrastructure::{suggest_file_name, ConfiguredSource, QuizStore};
use crate::models::loaders::load_quiz_file;
use crate::services::catalog::group_by_category;
use crate::services::corpus_loader::{CorpusLoad, CorpusLoader};
use crate::services::integrity::{fix_quiz_list, run_integrity_check};
use crate::services::validation::validate_quiz;
use crate::utils::logging::{
    log_integrity_report, log_load_summary, log_startup, truncate_text, write_report_file,
};
use crate::workflow::EditSession;

/// 运行模式（命令行第一个参数）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunMode {
    /// 加载索引中的全部测验并输出报告
    #[default]
    Load,
    /// 检查索引、文件和分类是否一致
    Check,
    /// 用目录中的文件重写索引
    FixList,
    /// 导入一个（可能是旧格式的）文件并保存到数据目录
    Convert(PathBuf),
    /// 只校验一个文件，不保存
    Validate(PathBuf),
}

impl RunMode {
    pub const USAGE: &'static str =
        "用法: quiz_corpus [load | check | fix-list | convert <文件> | validate <文件>]";

    /// 解析命令行参数（不含程序名）
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let Some(command) = args.next() else {
            return Ok(RunMode::default());
        };

        let mode = match command.as_str() {
            "load" => RunMode::Load,
            "check" => RunMode::Check,
            "fix-list" => RunMode::FixList,
            "convert" | "validate" => {
                let Some(path) = args.next() else {
                    bail!("{} 需要指定文件\n{}", command, Self::USAGE);
                };
                if command == "convert" {
                    RunMode::Convert(PathBuf::from(path))
                } else {
                    RunMode::Validate(PathBuf::from(path))
                }
            }
            other => bail!("未知命令: {}\n{}", other, Self::USAGE),
        };

        if let Some(extra) = args.next() {
            bail!("多余的参数: {}\n{}", extra, Self::USAGE);
        }
        Ok(mode)
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    source: ConfiguredSource,
    store: QuizStore,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Self {
        let source = ConfiguredSource::from_config(&config);
        let store = QuizStore::from_config(&config);
        log_startup(&config, &source.describe());
        Self {
            config,
            source,
            store,
        }
    }

    /// 运行指定模式
    pub async fn run(&self, mode: RunMode) -> Result<()> {
        match mode {
            RunMode::Load => self.run_load().await.map(|_| ()),
            RunMode::Check => self.run_check().await,
            RunMode::FixList => self.run_fix_list().await,
            RunMode::Convert(path) => self.run_convert(path).await.map(|_| ()),
            RunMode::Validate(path) => self.run_validate(path).await,
        }
    }

    /// 加载全部测验；索引不可用时也会生成报告
    pub async fn run_load(&self) -> Result<CorpusLoad> {
        let loader = CorpusLoader::new(&self.config);
        let load = match loader.load(&self.source).await {
            Ok(load) => load,
            Err(e) => {
                error!("❌ {}", e);
                CorpusLoad::from_fatal(&e)
            }
        };

        for group in group_by_category(load.records()) {
            info!("📚 {}（{} 个）", group.category, group.quizzes.len());
            for quiz in &group.quizzes {
                info!(
                    "   - {} [{}]",
                    truncate_text(&quiz.title, 40),
                    quiz.difficulty_label()
                );
            }
        }

        write_report_file(&self.config.output_log_file, &load)?;
        log_load_summary(&load, &self.config.output_log_file);
        Ok(load)
    }

    async fn run_check(&self) -> Result<()> {
        let report = run_integrity_check(&self.store)
            .await
            .context("一致性检查失败")?;
        log_integrity_report(&report);
        if !report.is_consistent() {
            info!("💡 可以运行 `fix-list` 用目录中的文件重写索引");
        }
        Ok(())
    }

    async fn run_fix_list(&self) -> Result<()> {
        let files = fix_quiz_list(&self.store)
            .await
            .context("重写索引失败")?;
        info!("✅ 索引已更新，共 {} 个文件", files.len());
        Ok(())
    }

    /// 导入文件并保存，不覆盖已有文件；返回保存的文件名
    pub async fn run_convert(&self, path: PathBuf) -> Result<String> {
        let record = load_quiz_file(&path).await?;
        let target = suggest_file_name(&record.title);
        if self.store.exists(&target).await? {
            return Err(FileError::AlreadyExists {
                path: self.store.data_dir().join(&target).display().to_string(),
            })
            .context("不会覆盖已有文件");
        }

        let mut session = EditSession::load_record(&record, None);
        let saved = session
            .save(&self.store)
            .await
            .with_context(|| format!("保存失败: {}", path.display()))?;

        if !self.store.read_index().await.unwrap_or_default().contains(&saved) {
            warn!("⚠️ {} 尚未登记到索引，可运行 `fix-list`", saved);
        }
        info!("✅ 已导入: {} → {}", path.display(), saved);
        Ok(saved)
    }

    async fn run_validate(&self, path: PathBuf) -> Result<()> {
        let record = load_quiz_file(&path).await?;
        match validate_quiz(&record) {
            Ok(()) => {
                info!(
                    "✅ {} 校验通过（{} 题）",
                    path.display(),
                    record.questions.len()
                );
                Ok(())
            }
            Err(report) => {
                for issue in &report.issues {
                    warn!("   {}", issue);
                }
                Err(report).with_context(|| format!("校验未通过: {}", path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_run_mode_from_args() {
        assert_eq!(RunMode::from_args(args(&[])).unwrap(), RunMode::Load);
        assert_eq!(RunMode::from_args(args(&["check"])).unwrap(), RunMode::Check);
        assert_eq!(
            RunMode::from_args(args(&["fix-list"])).unwrap(),
            RunMode::FixList
        );
        assert_eq!(
            RunMode::from_args(args(&["convert", "in.json"])).unwrap(),
            RunMode::Convert(PathBuf::from("in.json"))
        );
        assert_eq!(
            RunMode::from_args(args(&["validate", "in.json"])).unwrap(),
            RunMode::Validate(PathBuf::from("in.json"))
        );
    }

    #[test]
    fn test_run_mode_rejects_bad_args() {
        assert!(RunMode::from_args(args(&["convert"])).is_err());
        assert!(RunMode::from_args(args(&["upload"])).is_err());
        assert!(RunMode::from_args(args(&["check", "extra"])).is_err());
    }

    fn app_in(dir: &std::path::Path) -> App {
        let config = Config {
            data_dir: dir.join("data").to_string_lossy().to_string(),
            output_log_file: dir.join("report.txt").to_string_lossy().to_string(),
            ..Config::default()
        };
        App::initialize(config)
    }

    #[tokio::test]
    async fn test_convert_then_load() {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir(dir.path().join("data")).unwrap();
        let input = dir.path().join("notebook.json");
        std::fs::write(
            &input,
            r#"{"quiz":[{"question":"Q","answerOptions":[{"text":"A","isCorrect":true}]}]}"#,
        )
        .unwrap();

        let app = app_in(dir.path());
        let saved = app.run_convert(input.clone()).await.unwrap();
        assert_eq!(saved, "notebook.json");
        assert!(app.run_convert(input).await.is_err());

        app.run(RunMode::FixList).await.unwrap();
        let load = app.run_load().await.unwrap();
        assert!(load.is_complete());
        assert_eq!(load.quizzes[0].record.title, "notebook");
        assert!(dir.path().join("report.txt").exists());
    }

    #[tokio::test]
    async fn test_load_without_index_still_reports() {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir(dir.path().join("data")).unwrap();

        let app = app_in(dir.path());
        let load = app.run_load().await.unwrap();
        assert!(load.quizzes.is_empty());
        assert_eq!(load.failures.len(), 1);
    }
}
