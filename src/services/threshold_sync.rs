//! 阈值同步引擎 - 业务能力层
//!
//! 负责结果消息的"最低得分率"和"最少正确数"之间的双向换算：
//!
//! - 改百分比：`正确数 = ceil(题目数 × 百分比 / 100)`
//! - 改正确数：`百分比 = floor(正确数 / 题目数 × 100)`
//! - 题目数变化：所有阈值按各自保存的百分比重新推导正确数
//! - 正确数相同的阈值视为重复，只报告不处理
//!
//! 正确数超过题目数时引擎不会自动截断，而是返回 `GrowthProposal`，
//! 由调用方决定是补题（`accept`）还是截断（`decline`）。
//! 百分比必须在题目数确定之后再算，两个步骤的顺序不能颠倒。
//!
//! 所有函数都是纯函数，不持有状态，不做 I/O。
//! 题目数为 0 时分母按 1 计算，但不会修改调用方保存的题目数。

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::models::draft::{ResultThreshold, ThresholdAuthority, ThresholdId};
use crate::utils::numeric::parse_leading_int;

/// 重复阈值分组：正确数 → 该正确数下的阈值 ID（只包含成员数大于 1 的分组）
pub type DuplicateGroups = BTreeMap<usize, BTreeSet<ThresholdId>>;

/// 解析百分比输入，非数字或负数视为 0
pub fn parse_percentage(input: &str) -> i64 {
    parse_leading_int(input).unwrap_or(0).max(0)
}

/// 解析正确数输入，非数字或负数视为 0
pub fn parse_count(input: &str) -> usize {
    let value = parse_leading_int(input).unwrap_or(0).max(0);
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// 由百分比推导最少正确数
///
/// 百分比只在计算时截断到 0–100，所以结果总在 `[0, max(题目数, 1)]` 之内。
pub fn recompute_from_percentage(percentage: i64, total_questions: usize) -> usize {
    let pct = percentage.clamp(0, 100) as u128;
    let total = total_questions.max(1) as u128;
    ((total * pct).div_ceil(100)) as usize
}

/// 由正确数和（最终的）题目数推导百分比
pub fn percentage_for(required_count: usize, total_questions: usize) -> i64 {
    let total = total_questions.max(1) as u128;
    let pct = (required_count as u128 * 100) / total;
    i64::try_from(pct).unwrap_or(i64::MAX)
}

/// 改正确数之后的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountRecompute {
    /// 正确数不超过题目数，直接得到百分比
    Settled {
        required_count: usize,
        percentage: i64,
    },
    /// 正确数超过题目数，需要调用方确认是否补题
    GrowthRequested(GrowthProposal),
}

impl CountRecompute {
    /// 需要补充的题目数（不需要时为 0）
    pub fn growth_requested(&self) -> usize {
        match self {
            CountRecompute::Settled { .. } => 0,
            CountRecompute::GrowthRequested(proposal) => proposal.growth_requested(),
        }
    }
}

/// 由正确数推导百分比（第一阶段）
///
/// 超过题目数时只返回补题建议，不计算百分比。
pub fn recompute_from_count(required_count: usize, total_questions: usize) -> CountRecompute {
    if required_count > total_questions {
        debug!(
            "正确数 {} 超过题目数 {}，需要补充 {} 题",
            required_count,
            total_questions,
            required_count - total_questions
        );
        return CountRecompute::GrowthRequested(GrowthProposal {
            required_count,
            current_total: total_questions,
        });
    }

    CountRecompute::Settled {
        required_count,
        percentage: percentage_for(required_count, total_questions),
    }
}

/// 补题建议（第二阶段的输入）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthProposal {
    required_count: usize,
    current_total: usize,
}

/// 补题建议处理后的最终结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthResolution {
    /// 处理后的题目总数
    pub total_questions: usize,
    pub required_count: usize,
    pub percentage: i64,
}

impl GrowthProposal {
    /// 用户输入的正确数
    pub fn required_count(&self) -> usize {
        self.required_count
    }

    /// 提出建议时的题目数
    pub fn current_total(&self) -> usize {
        self.current_total
    }

    /// 需要补充的题目数
    pub fn growth_requested(&self) -> usize {
        self.required_count - self.current_total
    }

    /// 接受：题目数补到正确数，再按新题目数计算百分比
    pub fn accept(self) -> GrowthResolution {
        self.settle_against(self.required_count)
    }

    /// 拒绝：正确数截断为当前题目数
    pub fn decline(self) -> GrowthResolution {
        self.settle_against(self.current_total)
    }

    /// 按调用方实际得到的题目数结算
    ///
    /// 题目数仍然不够时正确数截断到题目数。
    pub fn settle_against(self, final_total: usize) -> GrowthResolution {
        let required_count = self.required_count.min(final_total);
        GrowthResolution {
            total_questions: final_total,
            required_count,
            percentage: percentage_for(required_count, final_total),
        }
    }
}

/// 以百分比为准重新推导所有阈值的正确数
///
/// 题目数变化时调用；按原顺序处理，不会产生补题请求。
pub fn recompute_all(thresholds: &mut [ResultThreshold], total_questions: usize) {
    for threshold in thresholds.iter_mut() {
        threshold.required_count = recompute_from_percentage(threshold.percentage, total_questions);
        threshold.authority = ThresholdAuthority::Percentage;
    }
}

/// 查找正确数相同的阈值
///
/// 只看推导出的正确数，百分比是否相同无关紧要。
pub fn find_duplicates(thresholds: &[ResultThreshold]) -> DuplicateGroups {
    let mut groups: DuplicateGroups = BTreeMap::new();
    for threshold in thresholds {
        groups
            .entry(threshold.required_count)
            .or_default()
            .insert(threshold.id);
    }
    groups.retain(|_, members| members.len() > 1);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::draft::QuizDraft;

    fn thresholds_with(percentages: &[i64], total: usize) -> Vec<ResultThreshold> {
        let mut draft = QuizDraft::new();
        for pct in percentages {
            draft.push_threshold(*pct, recompute_from_percentage(*pct, total), "");
        }
        draft.thresholds().to_vec()
    }

    #[test]
    fn test_parse_inputs() {
        assert_eq!(parse_percentage("80"), 80);
        assert_eq!(parse_percentage("abc"), 0);
        assert_eq!(parse_percentage("-20"), 0);
        assert_eq!(parse_percentage("150"), 150);
        assert_eq!(parse_count("4"), 4);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("-1"), 0);
    }

    #[test]
    fn test_recompute_from_percentage_rounds_up() {
        assert_eq!(recompute_from_percentage(60, 3), 2);
        assert_eq!(recompute_from_percentage(50, 3), 2);
        assert_eq!(recompute_from_percentage(33, 3), 1);
        assert_eq!(recompute_from_percentage(0, 3), 0);
        assert_eq!(recompute_from_percentage(100, 3), 3);
        assert_eq!(recompute_from_percentage(95, 100), 95);
        assert_eq!(recompute_from_percentage(96, 100), 96);
    }

    #[test]
    fn test_zero_questions_uses_one_as_denominator() {
        assert_eq!(recompute_from_percentage(60, 0), 1);
        assert_eq!(recompute_from_percentage(0, 0), 0);
        assert_eq!(
            recompute_from_count(0, 0),
            CountRecompute::Settled {
                required_count: 0,
                percentage: 0
            }
        );
    }

    #[test]
    fn test_out_of_range_percentage_is_clamped_for_computation() {
        assert_eq!(recompute_from_percentage(150, 10), 10);
        assert_eq!(recompute_from_percentage(-30, 10), 0);
    }

    #[test]
    fn test_recompute_from_count_floors() {
        assert_eq!(
            recompute_from_count(1, 3),
            CountRecompute::Settled {
                required_count: 1,
                percentage: 33
            }
        );
        assert_eq!(
            recompute_from_count(29, 100),
            CountRecompute::Settled {
                required_count: 29,
                percentage: 29
            }
        );
    }

    #[test]
    fn test_growth_request_then_accept() {
        let result = recompute_from_count(5, 3);
        assert_eq!(result.growth_requested(), 2);

        let CountRecompute::GrowthRequested(proposal) = result else {
            panic!("应该请求补题");
        };
        let resolution = proposal.accept();
        assert_eq!(resolution.total_questions, 5);
        assert_eq!(resolution.required_count, 5);
        assert_eq!(resolution.percentage, 100);

        // 补题后重新计算同样得到 100%
        assert_eq!(
            recompute_from_count(5, 5),
            CountRecompute::Settled {
                required_count: 5,
                percentage: 100
            }
        );
    }

    #[test]
    fn test_growth_request_then_decline() {
        let CountRecompute::GrowthRequested(proposal) = recompute_from_count(5, 3) else {
            panic!("应该请求补题");
        };
        let resolution = proposal.decline();
        assert_eq!(resolution.total_questions, 3);
        assert_eq!(resolution.required_count, 3);
        assert_eq!(resolution.percentage, 100);
    }

    #[test]
    fn test_growth_settles_against_partial_growth() {
        let CountRecompute::GrowthRequested(proposal) = recompute_from_count(8, 2) else {
            panic!("应该请求补题");
        };
        let resolution = proposal.settle_against(4);
        assert_eq!(resolution.required_count, 4);
        assert_eq!(resolution.percentage, 100);
    }

    #[test]
    fn test_growth_from_empty_quiz() {
        let result = recompute_from_count(1, 0);
        assert_eq!(result.growth_requested(), 1);
    }

    #[test]
    fn test_recompute_all_keeps_order_and_resets_authority() {
        let mut thresholds = thresholds_with(&[100, 50, 0], 2);
        thresholds[1].authority = ThresholdAuthority::Count;
        recompute_all(&mut thresholds, 10);

        let counts: Vec<usize> = thresholds.iter().map(|t| t.required_count).collect();
        assert_eq!(counts, vec![10, 5, 0]);
        assert!(thresholds
            .iter()
            .all(|t| t.authority == ThresholdAuthority::Percentage));
    }

    #[test]
    fn test_find_duplicates_single_question() {
        let thresholds = thresholds_with(&[100, 99], 1);
        assert_eq!(thresholds[0].required_count, 1);
        assert_eq!(thresholds[1].required_count, 1);

        let groups = find_duplicates(&thresholds);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&1].len(), 2);
    }

    #[test]
    fn test_find_duplicates_ignores_percentage_equality() {
        // 1 题：60% 和 40% 都需要 1 题正确
        let thresholds = thresholds_with(&[60, 40, 0], 1);
        let groups = find_duplicates(&thresholds);
        assert_eq!(groups.len(), 1);
        let members: Vec<ThresholdId> = groups[&1].iter().copied().collect();
        assert_eq!(members, vec![thresholds[0].id, thresholds[1].id]);

        // 100 题：95% 和 96% 不重复
        let thresholds = thresholds_with(&[95, 96], 100);
        assert!(find_duplicates(&thresholds).is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_count_is_bounded(total in 1usize..500, pct in 0i64..=100) {
                let count = recompute_from_percentage(pct, total);
                prop_assert!(count <= total);
            }

            #[test]
            fn prop_count_is_monotonic(total in 1usize..500, a in 0i64..=100, b in 0i64..=100) {
                let (low, high) = if a <= b { (a, b) } else { (b, a) };
                prop_assert!(recompute_from_percentage(low, total) <= recompute_from_percentage(high, total));
            }

            // ceil 之后再 floor：百分比只会上调到该正确数的下界，正确数本身不变
            #[test]
            fn prop_round_trip_keeps_required_count(total in 1usize..500, pct in 0i64..=100) {
                let count = recompute_from_percentage(pct, total);
                match recompute_from_count(count, total) {
                    CountRecompute::Settled { percentage, required_count } => {
                        prop_assert_eq!(required_count, count);
                        prop_assert!(percentage >= pct);
                        prop_assert!(percentage <= 100);
                        prop_assert_eq!(recompute_from_percentage(percentage, total), count);
                    }
                    CountRecompute::GrowthRequested(_) => prop_assert!(false, "不应请求补题"),
                }
            }

            #[test]
            fn prop_zero_total_never_panics(pct in any::<i64>(), count in 0usize..1000) {
                let _ = recompute_from_percentage(pct, 0);
                let _ = recompute_from_count(count, 0);
            }
        }
    }
}
