//! 编辑中的测验草稿
//!
//! 草稿是一个普通的值，只由一个编辑会话持有。
//! 阈值的一致性由 `services::threshold_sync` 和 `workflow::EditSession` 维护，
//! 草稿本身只负责存放数据和分配阈值 ID。

use std::fmt::Display;

use crate::models::quiz::{Question, QuizRecord, ResultMessage};
use crate::services::threshold_sync;

/// 阈值 ID（同一份草稿内唯一，按创建顺序递增）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThresholdId(pub u32);

impl Display for ThresholdId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 最后一次被编辑的是哪个字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdAuthority {
    /// 百分比为准，正确数由它推导
    #[default]
    Percentage,
    /// 正确数为准，百分比由它推导
    Count,
}

/// 一条结果消息的阈值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultThreshold {
    pub id: ThresholdId,
    /// 最低得分率，原样保存（超出 0–100 也保留，只在计算时截断）
    pub percentage: i64,
    /// 由百分比推导出的最少正确数
    pub required_count: usize,
    pub message: String,
    pub authority: ThresholdAuthority,
}

/// 测验的基本信息
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuizMetadata {
    pub title: String,
    pub category: String,
    pub difficulty: String,
    pub description: String,
    pub detailed_description: String,
}

/// 编辑中的测验
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuizDraft {
    pub meta: QuizMetadata,
    questions: Vec<Question>,
    thresholds: Vec<ResultThreshold>,
    next_threshold_id: u32,
}

impl QuizDraft {
    /// 创建空草稿
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已保存的文档构建草稿，正确数按当前题目数推导
    pub fn from_record(record: &QuizRecord) -> Self {
        let mut draft = Self {
            meta: QuizMetadata {
                title: record.title.clone(),
                category: record.category.clone(),
                difficulty: record.difficulty.clone(),
                description: record.description.clone(),
                detailed_description: record.detailed_description.clone(),
            },
            questions: record.questions.clone(),
            ..Self::default()
        };

        let total = draft.total_questions();
        for msg in &record.result_messages {
            let required_count = threshold_sync::recompute_from_percentage(msg.score, total);
            draft.push_threshold(msg.score, required_count, msg.message.clone());
        }

        draft
    }

    /// 生成保存用的文档
    pub fn to_record(&self) -> QuizRecord {
        QuizRecord {
            title: self.meta.title.clone(),
            category: self.meta.category.clone(),
            difficulty: self.meta.difficulty.clone(),
            description: self.meta.description.clone(),
            detailed_description: self.meta.detailed_description.clone(),
            result_messages: self
                .thresholds
                .iter()
                .map(|t| ResultMessage::new(t.percentage, t.message.clone()))
                .collect(),
            questions: self.questions.clone(),
        }
    }

    /// 当前题目总数
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_mut(&mut self, index: usize) -> Option<&mut Question> {
        self.questions.get_mut(index)
    }

    pub fn push_question(&mut self, question: Question) {
        self.questions.push(question);
    }

    pub fn remove_question(&mut self, index: usize) -> Option<Question> {
        (index < self.questions.len()).then(|| self.questions.remove(index))
    }

    pub fn thresholds(&self) -> &[ResultThreshold] {
        &self.thresholds
    }

    pub fn thresholds_mut(&mut self) -> &mut [ResultThreshold] {
        &mut self.thresholds
    }

    pub fn threshold(&self, id: ThresholdId) -> Option<&ResultThreshold> {
        self.thresholds.iter().find(|t| t.id == id)
    }

    pub fn threshold_mut(&mut self, id: ThresholdId) -> Option<&mut ResultThreshold> {
        self.thresholds.iter_mut().find(|t| t.id == id)
    }

    /// 追加阈值（调用方负责传入与当前题目数一致的正确数）
    pub fn push_threshold(
        &mut self,
        percentage: i64,
        required_count: usize,
        message: impl Into<String>,
    ) -> ThresholdId {
        let id = ThresholdId(self.next_threshold_id);
        self.next_threshold_id += 1;
        self.thresholds.push(ResultThreshold {
            id,
            percentage,
            required_count,
            message: message.into(),
            authority: ThresholdAuthority::Percentage,
        });
        id
    }

    pub fn remove_threshold(&mut self, id: ThresholdId) -> Option<ResultThreshold> {
        let position = self.thresholds.iter().position(|t| t.id == id)?;
        Some(self.thresholds.remove(position))
    }
}
