//! 编辑会话 - 流程层
//!
//! 持有一份 `QuizDraft`，把用户的编辑动作翻译成草稿修改和阈值重算：
//!
//! 1. 题目增删 → 所有阈值按百分比重算
//! 2. 改百分比 → 只重算这一个阈值的正确数
//! 3. 改正确数 → 超过题目数时通过 `GrowthPolicy` 询问是否补题
//! 4. 保存 → 先校验，再写入 `QuizStore`
//!
//! 会话不做任何 UI，确认对话框由 `GrowthPolicy` 的实现方提供。

use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::infrastructure::{suggest_file_name, QuizStore};
use crate::models::draft::{QuizDraft, QuizMetadata, ThresholdAuthority, ThresholdId};
use crate::models::loaders::default_result_messages;
use crate::models::quiz::{Question, QuizRecord};
use crate::services::threshold_sync::{
    self, CountRecompute, DuplicateGroups, GrowthProposal, GrowthResolution,
};
use crate::services::validation::validate_quiz;

/// 正确数超过题目数时的确认方
///
/// 返回 `true` 表示补题，`false` 表示把正确数截断到当前题目数。
pub trait GrowthPolicy {
    fn confirm_growth(&mut self, proposal: &GrowthProposal) -> bool;
}

impl<F> GrowthPolicy for F
where
    F: FnMut(&GrowthProposal) -> bool,
{
    fn confirm_growth(&mut self, proposal: &GrowthProposal) -> bool {
        self(proposal)
    }
}

/// 改正确数的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountEditOutcome {
    /// 没有超过题目数
    Settled {
        required_count: usize,
        percentage: i64,
    },
    /// 已补充 `added` 道空白题目
    Grown {
        added: usize,
        resolution: GrowthResolution,
    },
    /// 拒绝补题，正确数已截断
    Declined { resolution: GrowthResolution },
}

/// 编辑会话
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    draft: QuizDraft,
    dirty: bool,
    loaded_file_name: Option<String>,
}

impl EditSession {
    /// 新建测验：一道空白题目，两条默认结果消息（100% 和 0%）
    pub fn new_quiz() -> Self {
        let mut session = Self::default();
        session.reset();
        session
    }

    /// 打开已有的测验文档
    pub fn load_record(record: &QuizRecord, file_name: Option<String>) -> Self {
        let draft = QuizDraft::from_record(record);
        debug!(
            "载入草稿: {} 题, {} 条结果消息",
            draft.total_questions(),
            draft.thresholds().len()
        );
        Self {
            draft,
            dirty: false,
            loaded_file_name: file_name,
        }
    }

    /// 丢弃当前内容，回到新建状态
    pub fn reset(&mut self) {
        let mut draft = QuizDraft::new();
        draft.push_question(Question::blank());
        let total = draft.total_questions();
        for msg in default_result_messages() {
            let count = threshold_sync::recompute_from_percentage(msg.score, total);
            draft.push_threshold(msg.score, count, msg.message);
        }
        self.draft = draft;
        self.dirty = false;
        self.loaded_file_name = None;
    }

    pub fn draft(&self) -> &QuizDraft {
        &self.draft
    }

    /// 有未保存的修改
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn loaded_file_name(&self) -> Option<&str> {
        self.loaded_file_name.as_deref()
    }

    pub fn metadata_mut(&mut self) -> &mut QuizMetadata {
        self.dirty = true;
        &mut self.draft.meta
    }

    pub fn question_mut(&mut self, index: usize) -> Option<&mut Question> {
        self.dirty = true;
        self.draft.question_mut(index)
    }

    /// 追加一道空白题目
    pub fn add_question(&mut self) -> usize {
        self.draft.push_question(Question::blank());
        self.after_question_count_changed();
        self.draft.total_questions() - 1
    }

    pub fn remove_question(&mut self, index: usize) -> Option<Question> {
        let removed = self.draft.remove_question(index)?;
        self.after_question_count_changed();
        Some(removed)
    }

    fn after_question_count_changed(&mut self) {
        let total = self.draft.total_questions();
        threshold_sync::recompute_all(self.draft.thresholds_mut(), total);
        self.dirty = true;
    }

    /// 追加结果消息，百分比为准
    pub fn add_threshold(&mut self, percentage: i64, message: impl Into<String>) -> ThresholdId {
        let count =
            threshold_sync::recompute_from_percentage(percentage, self.draft.total_questions());
        self.dirty = true;
        self.draft.push_threshold(percentage, count, message)
    }

    pub fn remove_threshold(&mut self, id: ThresholdId) -> bool {
        let removed = self.draft.remove_threshold(id).is_some();
        self.dirty |= removed;
        removed
    }

    /// 修改百分比，返回新的正确数
    ///
    /// 非数字或负数按 0 处理。
    pub fn edit_percentage(&mut self, id: ThresholdId, input: &str) -> Option<usize> {
        let percentage = threshold_sync::parse_percentage(input);
        let total = self.draft.total_questions();
        let threshold = self.draft.threshold_mut(id)?;
        threshold.percentage = percentage;
        threshold.required_count = threshold_sync::recompute_from_percentage(percentage, total);
        threshold.authority = ThresholdAuthority::Percentage;
        let count = threshold.required_count;
        self.dirty = true;
        Some(count)
    }

    /// 修改正确数
    ///
    /// 超过题目数时询问 `policy`。同意则补充空白题目，
    /// 其余阈值按新题目数重算，被编辑的阈值保留用户输入的正确数。
    pub fn edit_count(
        &mut self,
        id: ThresholdId,
        input: &str,
        policy: &mut impl GrowthPolicy,
    ) -> Option<CountEditOutcome> {
        self.draft.threshold(id)?;
        let requested = threshold_sync::parse_count(input);
        let total = self.draft.total_questions();

        let outcome = match threshold_sync::recompute_from_count(requested, total) {
            CountRecompute::Settled {
                required_count,
                percentage,
            } => {
                self.apply_count(id, required_count, percentage);
                CountEditOutcome::Settled {
                    required_count,
                    percentage,
                }
            }
            CountRecompute::GrowthRequested(proposal) => {
                if policy.confirm_growth(&proposal) {
                    let added = proposal.growth_requested();
                    info!("➕ 正确数 {} 超过题目数，补充 {} 题", requested, added);
                    for _ in 0..added {
                        self.draft.push_question(Question::blank());
                    }
                    let resolution = proposal.settle_against(self.draft.total_questions());
                    self.recompute_others(id);
                    self.apply_count(id, resolution.required_count, resolution.percentage);
                    CountEditOutcome::Grown { added, resolution }
                } else {
                    let resolution = proposal.decline();
                    debug!("拒绝补题，正确数截断为 {}", resolution.required_count);
                    self.apply_count(id, resolution.required_count, resolution.percentage);
                    CountEditOutcome::Declined { resolution }
                }
            }
        };

        self.dirty = true;
        Some(outcome)
    }

    fn recompute_others(&mut self, edited: ThresholdId) {
        let total = self.draft.total_questions();
        for threshold in self.draft.thresholds_mut() {
            if threshold.id != edited {
                threshold.required_count =
                    threshold_sync::recompute_from_percentage(threshold.percentage, total);
                threshold.authority = ThresholdAuthority::Percentage;
            }
        }
    }

    fn apply_count(&mut self, id: ThresholdId, required_count: usize, percentage: i64) {
        if let Some(threshold) = self.draft.threshold_mut(id) {
            threshold.required_count = required_count;
            threshold.percentage = percentage;
            threshold.authority = ThresholdAuthority::Count;
        }
    }

    pub fn edit_message(&mut self, id: ThresholdId, message: impl Into<String>) -> bool {
        match self.draft.threshold_mut(id) {
            Some(threshold) => {
                threshold.message = message.into();
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// 正确数相同的阈值分组
    pub fn duplicates(&self) -> DuplicateGroups {
        threshold_sync::find_duplicates(self.draft.thresholds())
    }

    pub fn build_record(&self) -> QuizRecord {
        self.draft.to_record()
    }

    /// 校验并保存，返回写入的文件名
    ///
    /// 已打开的文件沿用原文件名，新建的测验由标题生成文件名。
    pub async fn save(&mut self, store: &QuizStore) -> AppResult<String> {
        let record = self.build_record();
        if let Err(report) = validate_quiz(&record) {
            warn!("⚠️ 保存前校验未通过: {}", report);
            return Err(report.into());
        }

        let duplicates = self.duplicates();
        if !duplicates.is_empty() {
            warn!("⚠️ 有 {} 组结果消息的正确数相同", duplicates.len());
        }

        let file_name = self
            .loaded_file_name
            .clone()
            .unwrap_or_else(|| suggest_file_name(&record.title));

        store.write_quiz(&file_name, &record).await?;

        self.loaded_file_name = Some(file_name.clone());
        self.dirty = false;
        Ok(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn accept_all(_: &GrowthProposal) -> bool {
        true
    }

    fn decline_all(_: &GrowthProposal) -> bool {
        false
    }

    fn session_with_questions(n: usize) -> EditSession {
        let mut session = EditSession::new_quiz();
        while session.draft().total_questions() < n {
            session.add_question();
        }
        session
    }

    #[test]
    fn test_new_quiz_defaults() {
        let session = EditSession::new_quiz();
        let draft = session.draft();
        assert_eq!(draft.total_questions(), 1);
        assert_eq!(draft.questions()[0].options.len(), 2);

        let summary: Vec<(i64, usize, &str)> = draft
            .thresholds()
            .iter()
            .map(|t| (t.percentage, t.required_count, t.message.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (100, 1, "パーフェクト！"),
                (0, 0, "再挑戦お待ちしています！")
            ]
        );
        assert!(!session.is_dirty());
        assert!(session.loaded_file_name().is_none());
    }

    #[test]
    fn test_question_count_changes_recompute_thresholds() {
        let mut session = session_with_questions(4);
        let id = session.add_threshold(50, "半分");
        assert_eq!(session.draft().threshold(id).unwrap().required_count, 2);

        session.add_question();
        assert_eq!(session.draft().threshold(id).unwrap().required_count, 3);

        session.remove_question(0);
        session.remove_question(0);
        assert_eq!(session.draft().total_questions(), 3);
        assert_eq!(session.draft().threshold(id).unwrap().required_count, 2);
        assert!(session.remove_question(10).is_none());
    }

    #[test]
    fn test_edit_percentage_coerces_bad_input() {
        let mut session = session_with_questions(10);
        let id = session.add_threshold(50, "m");

        assert_eq!(session.edit_percentage(id, "75"), Some(8));
        assert_eq!(session.edit_percentage(id, "abc"), Some(0));
        assert_eq!(session.draft().threshold(id).unwrap().percentage, 0);
        assert_eq!(session.edit_percentage(ThresholdId(999), "10"), None);
    }

    #[test]
    fn test_edit_count_within_total() {
        let mut session = session_with_questions(3);
        let id = session.add_threshold(0, "m");

        let outcome = session.edit_count(id, "2", &mut accept_all).unwrap();
        assert_eq!(
            outcome,
            CountEditOutcome::Settled {
                required_count: 2,
                percentage: 66
            }
        );
        let threshold = session.draft().threshold(id).unwrap();
        assert_eq!(threshold.authority, ThresholdAuthority::Count);
    }

    #[test]
    fn test_edit_count_accepting_growth() {
        let mut session = session_with_questions(3);
        let half = session.add_threshold(50, "半分");
        let id = session.add_threshold(0, "m");

        let mut asked = Vec::new();
        let mut policy = |p: &GrowthProposal| {
            asked.push(p.growth_requested());
            true
        };
        let outcome = session.edit_count(id, "5", &mut policy).unwrap();
        assert_eq!(asked, vec![2]);

        match outcome {
            CountEditOutcome::Grown { added, resolution } => {
                assert_eq!(added, 2);
                assert_eq!(resolution.total_questions, 5);
                assert_eq!(resolution.required_count, 5);
                assert_eq!(resolution.percentage, 100);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let draft = session.draft();
        assert_eq!(draft.total_questions(), 5);
        assert_eq!(draft.threshold(id).unwrap().required_count, 5);
        assert_eq!(draft.threshold(half).unwrap().required_count, 3);
    }

    #[test]
    fn test_edit_count_declining_growth() {
        let mut session = session_with_questions(3);
        let id = session.add_threshold(0, "m");

        let outcome = session.edit_count(id, "5", &mut decline_all).unwrap();
        assert_eq!(
            outcome,
            CountEditOutcome::Declined {
                resolution: GrowthResolution {
                    total_questions: 3,
                    required_count: 3,
                    percentage: 100
                }
            }
        );
        assert_eq!(session.draft().total_questions(), 3);
    }

    #[test]
    fn test_duplicates_detected() {
        let mut session = EditSession::new_quiz();
        let extra = session.add_threshold(99, "ほぼ満点");
        let groups = session.duplicates();
        assert_eq!(groups.len(), 1);
        let members = groups.get(&1).unwrap();
        assert!(members.contains(&extra));
        assert_eq!(members.len(), 2);
    }

    #[tokio::test]
    async fn test_save_validates_then_writes() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = QuizStore::new(dir.path(), "quiz_list.json", "categories.json");

        let mut session = EditSession::new_quiz();
        let err = session.save(&store).await.unwrap_err();
        match err {
            AppError::Validation(report) => {
                assert_eq!(report.fields(), vec!["title", "questions[0].options"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        session.metadata_mut().title = "日本 の 歴史".to_string();
        session.question_mut(0).unwrap().options[0].is_correct = true;
        let name = session.save(&store).await.unwrap();
        assert_eq!(name, "日本_の_歴史.json");
        assert!(!session.is_dirty());

        let saved = store.read_quiz(&name).await.unwrap();
        assert_eq!(saved, session.build_record());

        session.metadata_mut().title = "改題".to_string();
        let again = session.save(&store).await.unwrap();
        assert_eq!(again, name);
    }
}
