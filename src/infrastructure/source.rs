//! 语料数据源 - 基础设施层
//!
//! 只暴露"按名字取回原始文本"的能力，不认识 QuizRecord，不做校验。

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use tokio::fs;
use tracing::debug;

use crate::config::Config;
use crate::error::FetchError;

/// 语料数据源
pub trait CorpusSource {
    /// 索引文件名（用于错误信息）
    fn index_identifier(&self) -> &str;

    /// 读取索引文件的原始文本
    fn fetch_index(&self) -> impl Future<Output = Result<String, FetchError>>;

    /// 读取单个测验文件的原始文本
    fn fetch_item(&self, identifier: &str) -> impl Future<Output = Result<String, FetchError>>;
}

/// 文件名是否安全（不允许路径穿越和子目录）
///
/// 不允许分隔符，所以只需排除 `.` 和 `..` 本身；`v1..2.json` 这样的名字是合法的。
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

/// 本地目录数据源
#[derive(Debug, Clone)]
pub struct FsSource {
    data_dir: PathBuf,
    index_file: String,
}

impl FsSource {
    pub fn new(data_dir: impl Into<PathBuf>, index_file: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            index_file: index_file.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    async fn read_text(&self, name: &str) -> Result<String, FetchError> {
        if !is_safe_file_name(name) {
            return Err(FetchError::InvalidIdentifier(name.to_string()));
        }

        let path = self.data_dir.join(name);
        debug!("读取文件: {}", path.display());

        match fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(FetchError::NotFound),
            Err(e) => Err(FetchError::Io(e.to_string())),
        }
    }
}

impl CorpusSource for FsSource {
    fn index_identifier(&self) -> &str {
        &self.index_file
    }

    async fn fetch_index(&self) -> Result<String, FetchError> {
        self.read_text(&self.index_file).await
    }

    async fn fetch_item(&self, identifier: &str) -> Result<String, FetchError> {
        self.read_text(identifier).await
    }
}

/// HTTP 数据源（静态站点上的 `data/` 目录）
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    index_file: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, index_file: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            index_file: index_file.into(),
        }
    }

    /// 拼接文件 URL
    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), name)
    }

    async fn get_text(&self, name: &str) -> Result<String, FetchError> {
        if !is_safe_file_name(name) {
            return Err(FetchError::InvalidIdentifier(name.to_string()));
        }

        let url = self.url_for(name);
        debug!("请求: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Io(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Io(e.to_string()))
    }
}

impl CorpusSource for HttpSource {
    fn index_identifier(&self) -> &str {
        &self.index_file
    }

    async fn fetch_index(&self) -> Result<String, FetchError> {
        self.get_text(&self.index_file).await
    }

    async fn fetch_item(&self, identifier: &str) -> Result<String, FetchError> {
        self.get_text(identifier).await
    }
}

/// 按配置选择的数据源：配置了 `base_url` 就走 HTTP，否则读本地目录
#[derive(Debug, Clone)]
pub enum ConfiguredSource {
    Fs(FsSource),
    Http(HttpSource),
}

impl ConfiguredSource {
    pub fn from_config(config: &Config) -> Self {
        match config.base_url.as_deref() {
            Some(url) if !url.trim().is_empty() => {
                ConfiguredSource::Http(HttpSource::new(url, config.index_file.clone()))
            }
            _ => ConfiguredSource::Fs(FsSource::new(
                config.data_dir.clone(),
                config.index_file.clone(),
            )),
        }
    }

    /// 日志用的描述
    pub fn describe(&self) -> String {
        match self {
            ConfiguredSource::Fs(source) => format!("本地目录 {}", source.data_dir().display()),
            ConfiguredSource::Http(source) => format!("HTTP {}", source.url_for("")),
        }
    }
}

impl CorpusSource for ConfiguredSource {
    fn index_identifier(&self) -> &str {
        match self {
            ConfiguredSource::Fs(source) => source.index_identifier(),
            ConfiguredSource::Http(source) => source.index_identifier(),
        }
    }

    async fn fetch_index(&self) -> Result<String, FetchError> {
        match self {
            ConfiguredSource::Fs(source) => source.fetch_index().await,
            ConfiguredSource::Http(source) => source.fetch_index().await,
        }
    }

    async fn fetch_item(&self, identifier: &str) -> Result<String, FetchError> {
        match self {
            ConfiguredSource::Fs(source) => source.fetch_item(identifier).await,
            ConfiguredSource::Http(source) => source.fetch_item(identifier).await,
        }
    }
}
