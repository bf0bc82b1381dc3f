//! 测验文件仓库 - 基础设施层
//!
//! 数据目录下的扁平 JSON 文件：索引（`quiz_list.json`）、分类列表
//! （`categories.json`）和各个测验文件。只负责读写，不做业务判断。

use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::FileError;
use crate::infrastructure::source::is_safe_file_name;
use crate::models::loaders::strip_bom;
use crate::models::quiz::QuizRecord;

fn invalid_file_name_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[\\/:*?"<>|\s]"#).expect("文件名过滤正则非法"))
}

/// 由标题生成保存用的文件名
///
/// 文件名中不允许的字符和空白都替换为 `_`，标题为空时用 `quiz`。
pub fn suggest_file_name(title: &str) -> String {
    let base = if title.is_empty() { "quiz" } else { title };
    format!("{}.json", invalid_file_name_chars().replace_all(base, "_"))
}

/// 测验文件仓库
#[derive(Debug, Clone)]
pub struct QuizStore {
    data_dir: PathBuf,
    index_file: String,
    categories_file: String,
}

impl QuizStore {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        index_file: impl Into<String>,
        categories_file: impl Into<String>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            index_file: index_file.into(),
            categories_file: categories_file.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.data_dir.clone(),
            config.index_file.clone(),
            config.categories_file.clone(),
        )
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn index_file(&self) -> &str {
        &self.index_file
    }

    pub fn categories_file(&self) -> &str {
        &self.categories_file
    }

    /// 是否是索引或分类列表这类系统文件
    pub fn is_system_file(&self, name: &str) -> bool {
        name == self.index_file || name == self.categories_file
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, FileError> {
        if !is_safe_file_name(name) {
            return Err(FileError::InvalidFileName {
                name: name.to_string(),
            });
        }
        Ok(self.data_dir.join(name))
    }

    /// 目录下所有 `.json` 文件名（按名字排序）
    pub async fn list_json_files(&self) -> Result<Vec<String>, FileError> {
        let dir = self.data_dir.display().to_string();
        let mut entries = fs::read_dir(&self.data_dir).await.map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                FileError::NotFound { path: dir.clone() }
            } else {
                FileError::ReadFailed {
                    path: dir.clone(),
                    source,
                }
            }
        })?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| FileError::ReadFailed {
                path: dir.clone(),
                source,
            })?
        {
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(".json") {
                    files.push(name.to_string());
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// 除系统文件之外的测验文件
    pub async fn list_quiz_files(&self) -> Result<Vec<String>, FileError> {
        Ok(self
            .list_json_files()
            .await?
            .into_iter()
            .filter(|name| !self.is_system_file(name))
            .collect())
    }

    /// 文件是否存在，无法确认时返回错误
    pub async fn exists(&self, name: &str) -> Result<bool, FileError> {
        let path = self.path_for(name)?;
        fs::try_exists(&path)
            .await
            .map_err(|source| FileError::ReadFailed {
                path: path.display().to_string(),
                source,
            })
    }

    /// 读取文本（去掉 BOM）
    pub async fn read_text(&self, name: &str) -> Result<String, FileError> {
        let path = self.path_for(name)?;
        let text = fs::read_to_string(&path).await.map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                FileError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                FileError::ReadFailed {
                    path: path.display().to_string(),
                    source,
                }
            }
        })?;
        Ok(strip_bom(&text).to_string())
    }

    pub async fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T, FileError> {
        let text = self.read_text(name).await?;
        serde_json::from_str(&text).map_err(|source| FileError::Json {
            path: name.to_string(),
            source,
        })
    }

    /// 以两空格缩进写入 JSON
    pub async fn write_json<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<(), FileError> {
        let path = self.path_for(name)?;
        let content = serde_json::to_string_pretty(value).map_err(|source| FileError::Json {
            path: name.to_string(),
            source,
        })?;

        fs::write(&path, content)
            .await
            .map_err(|source| FileError::WriteFailed {
                path: path.display().to_string(),
                source,
            })?;

        debug!("已写入: {}", path.display());
        Ok(())
    }

    pub async fn read_quiz(&self, name: &str) -> Result<QuizRecord, FileError> {
        self.read_json(name).await
    }

    pub async fn write_quiz(&self, name: &str, record: &QuizRecord) -> Result<(), FileError> {
        self.write_json(name, record).await?;
        info!("💾 已保存测验: {}", name);
        Ok(())
    }

    pub async fn delete(&self, name: &str) -> Result<(), FileError> {
        let path = self.path_for(name)?;
        fs::remove_file(&path)
            .await
            .map_err(|source| FileError::DeleteFailed {
                path: path.display().to_string(),
                source,
            })?;
        info!("🗑️ 已删除: {}", name);
        Ok(())
    }

    pub async fn read_index(&self) -> Result<Vec<String>, FileError> {
        self.read_json(&self.index_file).await
    }

    pub async fn write_index(&self, files: &[String]) -> Result<(), FileError> {
        self.write_json(&self.index_file, files).await
    }

    pub async fn read_categories(&self) -> Result<Vec<String>, FileError> {
        self.read_json(&self.categories_file).await
    }
}
