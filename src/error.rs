//! 错误类型定义
//!
//! 库内部统一返回带类型的错误，二进制入口再用 `anyhow` 包一层上下文。
//! 所有错误都带上能定位问题的信息（文件名、字段名），不出现"未知错误"。

use thiserror::Error;

use crate::services::validation::ValidationReport;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 语料（索引级）加载错误
    #[error("语料加载错误: {0}")]
    Corpus(#[from] CorpusError),
    /// 单个文件读取错误
    #[error("读取错误: {0}")]
    Fetch(#[from] FetchError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 保存前校验未通过
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationReport),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 数据源读取错误
///
/// 文件系统和 HTTP 两种数据源共用，读不到内容时只区分"不存在"和"其他失败"。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// 文件不存在
    #[error("文件不存在 (404 not found)")]
    NotFound,
    /// 标识符非法（包含路径穿越等）
    #[error("非法的文件名: {0}")]
    InvalidIdentifier(String),
    /// 读取或网络失败
    #[error("读取失败: {0}")]
    Io(String),
    /// HTTP 返回非成功状态码
    #[error("HTTP 请求失败 (status {status})")]
    Http { status: u16 },
}

/// 单个语料文件加载失败的原因
///
/// 只会被记录进 `LoadFailure`，不会让整批加载中断。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailureReason {
    /// 文件不存在
    #[error("文件不存在 (404 not found)")]
    NotFound,
    /// 读取或网络失败
    #[error("读取失败: {0}")]
    ReadFailed(String),
    /// JSON 解析失败
    #[error("JSON 解析失败 (malformed JSON): {0}")]
    MalformedJson(String),
    /// 结构不符合要求
    #[error("文件格式不正确 (\"{field}\" {problem})")]
    SchemaInvalid { field: String, problem: String },
    /// 超过单项超时时间
    #[error("加载超时 (timed out after {0} ms)")]
    TimedOut(u64),
    /// 索引中的条目不是字符串
    #[error("索引条目不是字符串 (invalid index entry)")]
    InvalidIdentifier,
    /// 索引本身不可用（仅用于把致命错误折叠成报告）
    #[error("{0}")]
    IndexUnavailable(String),
}

impl From<FetchError> for LoadFailureReason {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotFound => LoadFailureReason::NotFound,
            other => LoadFailureReason::ReadFailed(other.to_string()),
        }
    }
}

/// 索引级（致命）错误
///
/// 索引读不到或者不是数组时，整次加载没有可以部分成功的内容。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorpusError {
    /// 索引文件无法读取
    #[error("索引文件不可用 (index unavailable) [{identifier}]: {source}")]
    IndexUnavailable {
        identifier: String,
        source: FetchError,
    },
    /// 索引文件不是合法 JSON
    #[error("索引文件解析失败 (index unavailable) [{identifier}]: {message}")]
    IndexMalformed { identifier: String, message: String },
    /// 索引文件不是数组
    #[error("索引文件格式不正确 (index unavailable) [{identifier}]: 顶层不是数组")]
    IndexNotArray { identifier: String },
}

impl CorpusError {
    /// 出错的索引文件名
    pub fn identifier(&self) -> &str {
        match self {
            CorpusError::IndexUnavailable { identifier, .. }
            | CorpusError::IndexMalformed { identifier, .. }
            | CorpusError::IndexNotArray { identifier } => identifier,
        }
    }
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 删除文件失败
    #[error("删除文件失败 ({path}): {source}")]
    DeleteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 解析或序列化失败
    #[error("JSON 处理失败 ({path}): {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// 文件名非法
    #[error("非法的文件名: {name}")]
    InvalidFileName { name: String },
    /// 目标文件已存在
    #[error("文件已存在: {path}")]
    AlreadyExists { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
