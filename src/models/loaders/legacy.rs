//! 旧格式（NotebookLM 导出）转换
//!
//! 旧格式有两种：
//! - `{ "quiz": [...] }`
//! - `{ "questions": [...] }` 但没有 `resultMessages`
//!
//! 每个题目形如 `{ question, hint, answerOptions: [{ text, isCorrect, rationale }] }`。

use serde::Deserialize;
use serde_json::Value;

use crate::models::quiz::{AnswerOption, Question, QuizRecord, ResultMessage};

/// 转换时附带的默认结果消息
pub fn default_result_messages() -> Vec<ResultMessage> {
    vec![
        ResultMessage::new(100, "パーフェクト！"),
        ResultMessage::new(0, "再挑戦お待ちしています！"),
    ]
}

/// 是否是需要转换的旧格式
pub fn is_legacy_shape(value: &Value) -> bool {
    let Value::Object(map) = value else {
        return false;
    };

    let has_quiz_array = matches!(map.get("quiz"), Some(Value::Array(_)));
    let has_bare_questions =
        matches!(map.get("questions"), Some(Value::Array(_))) && !map.contains_key("resultMessages");

    has_quiz_array || has_bare_questions
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacyDocument {
    title: Option<String>,
    questions: Option<Vec<LegacyQuestion>>,
    quiz: Option<Vec<LegacyQuestion>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LegacyQuestion {
    question: Option<String>,
    hint: Option<String>,
    answer_options: Option<Vec<LegacyOption>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LegacyOption {
    text: Option<String>,
    is_correct: Option<bool>,
    rationale: Option<String>,
}

/// 文件名去掉最后一个扩展名
fn file_stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => &file_name[..pos],
        _ => file_name,
    }
}

/// 把旧格式转换为标准 `QuizRecord`
///
/// 标题优先使用文档中的 `title`，否则使用去掉扩展名的文件名。
pub fn convert_legacy(value: Value, file_name: &str) -> serde_json::Result<QuizRecord> {
    let doc: LegacyDocument = serde_json::from_value(value)?;

    let title = doc
        .title
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| file_stem(file_name).to_string());

    let source = doc.questions.or(doc.quiz).unwrap_or_default();

    let questions = source
        .into_iter()
        .map(|q| Question {
            statement: q.question.unwrap_or_default(),
            hint: q.hint.unwrap_or_default(),
            options: q
                .answer_options
                .unwrap_or_default()
                .into_iter()
                .map(|opt| AnswerOption {
                    text: opt.text.unwrap_or_default(),
                    is_correct: opt.is_correct.unwrap_or(false),
                    explanation: opt.rationale.unwrap_or_default(),
                })
                .collect(),
            ..Question::default()
        })
        .collect();

    Ok(QuizRecord {
        title,
        result_messages: default_result_messages(),
        questions,
        ..QuizRecord::default()
    })
}
