//! 测验文档的数据结构
//!
//! 字段顺序即保存时的 JSON 键顺序，不要随意调整。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::utils::numeric::parse_leading_int;

/// 题目类型（目前只有单选）
pub const QUESTION_TYPE_SINGLE_CHOICE: &str = "single-choice";
/// 没有分类时归入的分组
pub const UNCATEGORIZED: &str = "未分類";
/// 没有难度时显示的文字
pub const DIFFICULTY_UNSPECIFIED: &str = "指定なし";

/// 一份完整的测验文档
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRecord {
    #[serde(default, deserialize_with = "string_or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub category: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub difficulty: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub detailed_description: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub result_messages: Vec<ResultMessage>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub questions: Vec<Question>,
}

impl QuizRecord {
    /// 分组用的分类名，空分类归入 `未分類`
    pub fn category_label(&self) -> &str {
        if self.category.is_empty() {
            UNCATEGORIZED
        } else {
            &self.category
        }
    }

    /// 显示用的难度
    pub fn difficulty_label(&self) -> &str {
        if self.difficulty.is_empty() {
            DIFFICULTY_UNSPECIFIED
        } else {
            &self.difficulty
        }
    }

    /// 序列化为保存格式（两空格缩进）
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// 结果消息：得分率达到 `score` 时显示 `message`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultMessage {
    #[serde(default, deserialize_with = "deserialize_score")]
    pub score: i64,
    #[serde(default, deserialize_with = "string_or_default")]
    pub message: String,
}

impl ResultMessage {
    pub fn new(score: i64, message: impl Into<String>) -> Self {
        Self {
            score,
            message: message.into(),
        }
    }
}

/// 单个题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(
        rename = "type",
        default = "default_question_type",
        deserialize_with = "question_type_or_default"
    )]
    pub question_type: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub statement: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub hint: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub options: Vec<AnswerOption>,
}

impl Default for Question {
    fn default() -> Self {
        Self {
            question_type: default_question_type(),
            statement: String::new(),
            hint: String::new(),
            options: Vec::new(),
        }
    }
}

impl Question {
    /// 新建题目时的默认形态：两个空选项
    pub fn blank() -> Self {
        Self {
            options: vec![AnswerOption::default(), AnswerOption::default()],
            ..Self::default()
        }
    }

    /// 是否至少有一个正确选项
    pub fn has_correct_option(&self) -> bool {
        self.options.iter().any(|opt| opt.is_correct)
    }
}

/// 选项
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    #[serde(default, deserialize_with = "string_or_default")]
    pub text: String,
    #[serde(default, deserialize_with = "bool_or_default")]
    pub is_correct: bool,
    #[serde(default, deserialize_with = "string_or_default")]
    pub explanation: String,
}

fn default_question_type() -> String {
    QUESTION_TYPE_SINGLE_CHOICE.to_string()
}

// 字符串原样保留，数字和布尔值转成文本，其余（null、数组、对象）视为空字符串
fn string_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn question_type_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => s,
        _ => default_question_type(),
    })
}

// `"true"` / 非零数字也算正确，其余一律为 false
fn bool_or_default<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    })
}

// 不是数组时为空列表；数组中不是对象的元素换成默认值
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::Object(_) => serde_json::from_value(item).unwrap_or_default(),
            _ => T::default(),
        })
        .collect())
}

// 编辑器曾经把清空的分数写成 null，也可能是字符串或小数
fn deserialize_score<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct ScoreVisitor;

    impl<'de> Visitor<'de> for ScoreVisitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer, a numeric string or null")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(i64::try_from(value).unwrap_or(i64::MAX))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if value.is_finite() {
                Ok(value.trunc() as i64)
            } else {
                Ok(0)
            }
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(parse_leading_int(value).unwrap_or(0))
        }

        fn visit_bool<E>(self, _value: bool) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(0)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(0)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(0)
        }
    }

    deserializer.deserialize_any(ScoreVisitor)
}
