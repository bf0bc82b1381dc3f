//! 语料加载服务 - 业务能力层
//!
//! ## 流程
//!
//! 1. 读取索引（一次）。读不到、不是 JSON、不是数组 → 整体失败（`CorpusError`）
//! 2. 索引里的每个文件并发读取（`settle_all`），互不等待、互不取消
//! 3. 每个文件单独校验：必须是对象，且 `questions` 是数组
//! 4. 成功和失败都按索引顺序返回，失败带上文件名
//!
//! 单个文件的失败永远不会升级成整体失败。

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{CorpusError, FetchError, LoadFailureReason};
use crate::infrastructure::settle::settle_all;
use crate::infrastructure::source::CorpusSource;
use crate::models::loaders::strip_bom;
use crate::models::quiz::QuizRecord;

/// 加载选项
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// 索引文件名（用于错误信息）
    pub index_identifier: String,
    /// 单个文件的超时时间，`None` 表示不限
    pub item_timeout: Option<Duration>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            index_identifier: "quiz_list.json".to_string(),
            item_timeout: Some(Duration::from_secs(10)),
        }
    }
}

/// 加载成功的测验
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedQuiz {
    pub identifier: String,
    pub record: QuizRecord,
}

/// 加载失败的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub identifier: String,
    pub reason: LoadFailureReason,
}

impl Display for LoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.identifier, self.reason)
    }
}

/// 一次加载的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusLoad {
    pub quizzes: Vec<LoadedQuiz>,
    pub failures: Vec<LoadFailure>,
}

impl CorpusLoad {
    /// 把索引级错误折叠成"没有测验 + 一条失败"
    pub fn from_fatal(err: &CorpusError) -> Self {
        Self {
            quizzes: Vec::new(),
            failures: vec![LoadFailure {
                identifier: err.identifier().to_string(),
                reason: LoadFailureReason::IndexUnavailable(err.to_string()),
            }],
        }
    }

    /// 是否全部加载成功
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// 只取测验本身
    pub fn records(&self) -> impl Iterator<Item = &QuizRecord> {
        self.quizzes.iter().map(|q| &q.record)
    }

    /// 失败报告（每行一条）
    pub fn failure_report(&self) -> String {
        self.failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 索引中的一项：合法的文件名，或者非字符串条目所在的位置
enum IndexEntry {
    Identifier(String),
    Invalid(usize),
}

fn parse_index(raw: &str, identifier: &str) -> Result<Vec<IndexEntry>, CorpusError> {
    let value: Value =
        serde_json::from_str(strip_bom(raw)).map_err(|e| CorpusError::IndexMalformed {
            identifier: identifier.to_string(),
            message: e.to_string(),
        })?;

    let Value::Array(items) = value else {
        return Err(CorpusError::IndexNotArray {
            identifier: identifier.to_string(),
        });
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(position, item)| match item {
            Value::String(name) => IndexEntry::Identifier(name),
            _ => IndexEntry::Invalid(position),
        })
        .collect())
}

/// 校验单个文件的内容
///
/// 只要求是对象且 `questions` 是数组，其他字段缺失时取默认值。
pub fn validate_payload(raw: &str) -> Result<QuizRecord, LoadFailureReason> {
    let value: Value = serde_json::from_str(strip_bom(raw))
        .map_err(|e| LoadFailureReason::MalformedJson(e.to_string()))?;

    let Value::Object(map) = &value else {
        return Err(LoadFailureReason::SchemaInvalid {
            field: "(root)".to_string(),
            problem: "不是对象 (not an object)".to_string(),
        });
    };

    match map.get("questions") {
        Some(Value::Array(_)) => {}
        Some(_) => {
            return Err(LoadFailureReason::SchemaInvalid {
                field: "questions".to_string(),
                problem: "不是数组 (not an array)".to_string(),
            })
        }
        None => {
            return Err(LoadFailureReason::SchemaInvalid {
                field: "questions".to_string(),
                problem: "不存在 (missing)".to_string(),
            })
        }
    }

    // 其余字段都按默认值宽松读取，类型不对也不会让整个文件失败
    serde_json::from_value(value).map_err(|e| LoadFailureReason::SchemaInvalid {
        field: "(root)".to_string(),
        problem: e.to_string(),
    })
}

/// 超时时间换算成毫秒，超出 `u64` 时取上限
fn timeout_millis(limit: Duration) -> u64 {
    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
}

async fn resolve_item<F, Fut>(
    item_fetcher: &F,
    identifier: &str,
    item_timeout: Option<Duration>,
) -> Result<QuizRecord, LoadFailureReason>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<String, FetchError>>,
{
    let fetch = item_fetcher(identifier.to_string());
    let raw = match item_timeout {
        Some(limit) => tokio::time::timeout(limit, fetch)
            .await
            .map_err(|_| LoadFailureReason::TimedOut(timeout_millis(limit)))??,
        None => fetch.await?,
    };
    validate_payload(&raw)
}

/// 加载整个语料
///
/// `index_fetcher` 只调用一次；`item_fetcher` 对索引中的每个文件调用一次，全部并发。
pub async fn load_corpus<IF, IFut, F, Fut>(
    index_fetcher: IF,
    item_fetcher: F,
    options: &LoadOptions,
) -> Result<CorpusLoad, CorpusError>
where
    IF: FnOnce() -> IFut,
    IFut: Future<Output = Result<String, FetchError>>,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<String, FetchError>>,
{
    let index_identifier = options.index_identifier.as_str();
    info!("📥 正在读取索引: {}", index_identifier);

    let raw_index = index_fetcher()
        .await
        .map_err(|source| CorpusError::IndexUnavailable {
            identifier: index_identifier.to_string(),
            source,
        })?;
    let entries = parse_index(&raw_index, index_identifier)?;

    info!("📋 索引中共有 {} 个文件，开始并发加载", entries.len());

    let item_fetcher = &item_fetcher;
    let outcomes = settle_all(entries.iter().map(|entry| async move {
        match entry {
            IndexEntry::Identifier(identifier) => (
                identifier.clone(),
                resolve_item(item_fetcher, identifier, options.item_timeout).await,
            ),
            IndexEntry::Invalid(position) => (
                format!("#{}", position),
                Err(LoadFailureReason::InvalidIdentifier),
            ),
        }
    }))
    .await;

    let mut load = CorpusLoad::default();
    for (identifier, outcome) in outcomes {
        match outcome {
            Ok(record) => {
                debug!("✓ {} ({} 题)", identifier, record.questions.len());
                load.quizzes.push(LoadedQuiz { identifier, record });
            }
            Err(reason) => {
                warn!("❌ [{}] {}", identifier, reason);
                load.failures.push(LoadFailure { identifier, reason });
            }
        }
    }

    info!(
        "✓ 加载完成: 成功 {} / 失败 {}",
        load.quizzes.len(),
        load.failures.len()
    );

    Ok(load)
}

/// 基于 `CorpusSource` 的语料加载器
#[derive(Debug, Clone, Default)]
pub struct CorpusLoader {
    item_timeout: Option<Duration>,
}

impl CorpusLoader {
    pub fn new(config: &Config) -> Self {
        Self {
            item_timeout: config.item_timeout(),
        }
    }

    pub fn with_item_timeout(item_timeout: Option<Duration>) -> Self {
        Self { item_timeout }
    }

    pub async fn load<S: CorpusSource>(&self, source: &S) -> Result<CorpusLoad, CorpusError> {
        let options = LoadOptions {
            index_identifier: source.index_identifier().to_string(),
            item_timeout: self.item_timeout,
        };

        load_corpus(
            || source.fetch_index(),
            |identifier| async move { source.fetch_item(&identifier).await },
            &options,
        )
        .await
    }
}
