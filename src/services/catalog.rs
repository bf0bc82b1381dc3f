//! 按分类分组展示测验

use crate::models::quiz::QuizRecord;

/// 一个分类及其下的测验
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub quizzes: Vec<&'a QuizRecord>,
}

/// 按分类分组，分类按首次出现的顺序排列
///
/// 没有分类的测验归入 `未分類`。
pub fn group_by_category<'a, I>(quizzes: I) -> Vec<CategoryGroup<'a>>
where
    I: IntoIterator<Item = &'a QuizRecord>,
{
    let mut groups: Vec<CategoryGroup<'a>> = Vec::new();
    for quiz in quizzes {
        let category = quiz.category_label();
        match groups.iter_mut().find(|g| g.category == category) {
            Some(group) => group.quizzes.push(quiz),
            None => groups.push(CategoryGroup {
                category,
                quizzes: vec![quiz],
            }),
        }
    }
    groups
}
