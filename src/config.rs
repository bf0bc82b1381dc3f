use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 默认的配置文件名（存在时才读取）
pub const DEFAULT_CONFIG_FILE: &str = "quiz_corpus.toml";

/// 程序配置
///
/// 优先级：环境变量 > 配置文件 > 默认值
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 测验数据目录
    pub data_dir: String,
    /// 配置后改为通过 HTTP 加载（例如 `http://localhost:8000/docs/data`）
    pub base_url: Option<String>,
    /// 索引文件名
    pub index_file: String,
    /// 分类列表文件名
    pub categories_file: String,
    /// 单个文件的加载超时（毫秒），0 表示不限
    pub item_timeout_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 加载报告输出文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: "docs/data".to_string(),
            base_url: None,
            index_file: "quiz_list.json".to_string(),
            categories_file: "categories.json".to_string(),
            item_timeout_ms: 10_000,
            verbose_logging: false,
            output_log_file: "load_report.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 读取 TOML 配置文件，未写的字段取默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    /// 配置文件 + 环境变量
    ///
    /// `QUIZ_CONFIG` 指定的文件必须存在；未指定时默认文件不存在就跳过。
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("QUIZ_CONFIG") {
            Ok(path) => Self::from_toml_file(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(DEFAULT_CONFIG_FILE)?
            }
            Err(_) => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            data_dir: lookup("QUIZ_DATA_DIR").unwrap_or(self.data_dir),
            base_url: lookup("QUIZ_BASE_URL").or(self.base_url),
            index_file: lookup("QUIZ_INDEX_FILE").unwrap_or(self.index_file),
            categories_file: lookup("QUIZ_CATEGORIES_FILE").unwrap_or(self.categories_file),
            item_timeout_ms: lookup("ITEM_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.item_timeout_ms),
            verbose_logging: lookup("VERBOSE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.verbose_logging),
            output_log_file: lookup("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        }
    }

    /// 单个文件的加载超时，`None` 表示不限
    pub fn item_timeout(&self) -> Option<Duration> {
        (self.item_timeout_ms > 0).then(|| Duration::from_millis(self.item_timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data_dir, "docs/data");
        assert_eq!(config.index_file, "quiz_list.json");
        assert_eq!(config.item_timeout(), Some(Duration::from_millis(10_000)));
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("QUIZ_DATA_DIR", "/srv/quiz"),
            ("QUIZ_BASE_URL", "http://localhost:8000/data"),
            ("ITEM_TIMEOUT_MS", "0"),
            ("VERBOSE_LOGGING", "true"),
            ("OUTPUT_LOG_FILE", "report.txt"),
        ]);
        let config = Config::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.data_dir, "/srv/quiz");
        assert_eq!(
            config.base_url.as_deref(),
            Some("http://localhost:8000/data")
        );
        assert_eq!(config.item_timeout(), None);
        assert!(config.verbose_logging);
        assert_eq!(config.output_log_file, "report.txt");
        assert_eq!(config.index_file, "quiz_list.json");
    }

    #[test]
    fn test_unparseable_numbers_keep_previous_value() {
        let config = Config::default().with_overrides(|k| {
            (k == "ITEM_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert_eq!(config.item_timeout_ms, 10_000);
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("quiz_corpus.toml");
        std::fs::write(
            &path,
            "data_dir = \"fixtures\"\nitem_timeout_ms = 250\n",
        )
        .unwrap();

        let config = Config::from_toml_file(&path).unwrap();
        assert_eq!(config.data_dir, "fixtures");
        assert_eq!(config.item_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.categories_file, "categories.json");
    }

    #[test]
    fn test_from_toml_file_errors() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let missing = Config::from_toml_file(dir.path().join("none.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::ReadFailed { .. }));

        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "item_timeout_ms = \"x\"").unwrap();
        let bad = Config::from_toml_file(&path).unwrap_err();
        assert!(matches!(bad, ConfigError::TomlParseFailed { .. }));
    }
}
