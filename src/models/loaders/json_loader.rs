use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tokio::fs;

use crate::models::loaders::legacy::{convert_legacy, is_legacy_shape};
use crate::models::quiz::QuizRecord;

/// 去掉开头的 UTF-8 BOM
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// 解析一份测验文档，旧格式会先转换为标准格式
pub fn parse_quiz_document(text: &str, file_name: &str) -> Result<QuizRecord> {
    let value: Value = serde_json::from_str(strip_bom(text))
        .with_context(|| format!("JSON 解析失败: {}", file_name))?;

    if is_legacy_shape(&value) {
        tracing::info!("🔄 检测到旧格式，正在转换: {}", file_name);
        return convert_legacy(value, file_name)
            .with_context(|| format!("旧格式转换失败: {}", file_name));
    }

    serde_json::from_value(value).with_context(|| format!("文件格式不正确: {}", file_name))
}

/// 从文件加载测验文档（用于导入）
pub async fn load_quiz_file(path: &Path) -> Result<QuizRecord> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取文件: {}", path.display()))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    parse_quiz_document(&content, &file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bom() {
        assert_eq!(strip_bom("\u{feff}{}"), "{}");
        assert_eq!(strip_bom("{}"), "{}");
    }

    #[test]
    fn test_parse_canonical_document() {
        let text = r#"{"title":"T","resultMessages":[{"score":80,"message":"m"}],"questions":[]}"#;
        let record = parse_quiz_document(text, "t.json").unwrap();
        assert_eq!(record.title, "T");
        assert_eq!(record.result_messages[0].score, 80);
    }

    #[test]
    fn test_parse_legacy_document() {
        let text = "\u{feff}{\"quiz\":[{\"question\":\"Q\",\"answerOptions\":[]}]}";
        let record = parse_quiz_document(text, "notebook.json").unwrap();
        assert_eq!(record.title, "notebook");
        assert_eq!(record.questions[0].statement, "Q");
    }

    #[test]
    fn test_parse_invalid_json_names_file() {
        let err = parse_quiz_document("{", "broken.json").unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[tokio::test]
    async fn test_load_quiz_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("import.json");
        std::fs::write(&path, r#"{"questions":[{"question":"Q"}]}"#).unwrap();

        let record = load_quiz_file(&path).await.unwrap();
        assert_eq!(record.title, "import");
        assert_eq!(record.questions.len(), 1);
    }
}
