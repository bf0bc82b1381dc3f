//! 保存前校验 - 业务能力层
//!
//! 一次列出所有问题，而不是遇到第一个就返回。

use std::fmt::Display;

use thiserror::Error;

use crate::models::quiz::QuizRecord;

/// 单个问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// 出问题的字段路径，例如 `questions[2].options`
    pub field: String,
    pub message: String,
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// 校验报告
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("输入内容有 {} 处错误: {}", .issues.len(), summarize(.issues))]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationReport {
    /// 出问题的字段列表
    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.field.as_str()).collect()
    }
}

/// 校验测验文档
///
/// - 标题不能为空
/// - 每个题目至少有一个正确选项
/// - 结果消息的分数应在 0–100 之间
pub fn validate_quiz(record: &QuizRecord) -> Result<(), ValidationReport> {
    let mut issues = Vec::new();

    if record.title.trim().is_empty() {
        issues.push(ValidationIssue {
            field: "title".to_string(),
            message: "请输入标题".to_string(),
        });
    }

    for (index, question) in record.questions.iter().enumerate() {
        if !question.has_correct_option() {
            issues.push(ValidationIssue {
                field: format!("questions[{}].options", index),
                message: format!("问题 {} 没有设置正确选项", index + 1),
            });
        }
    }

    for (index, msg) in record.result_messages.iter().enumerate() {
        if !(0..=100).contains(&msg.score) {
            issues.push(ValidationIssue {
                field: format!("resultMessages[{}].score", index),
                message: format!("分数 {} 不在 0–100 之间", msg.score),
            });
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationReport { issues })
    }
}
