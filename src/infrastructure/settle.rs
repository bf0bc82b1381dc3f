//! 并发批处理原语 - 基础设施层
//!
//! "全部发出，全部收齐"：每个 future 带着自己的下标并发执行，
//! 谁先完成谁先写入自己的槽位，最后按原顺序还原。
//! 某一项失败（返回 `Err`）不会取消或拖慢其他项。

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};

/// 并发等待所有 future 完成，按输入顺序返回结果
///
/// 输出类型通常是 `Result`，失败由调用方逐项处理。
pub async fn settle_all<I, F, T>(futures: I) -> Vec<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = T>,
{
    let mut pending: FuturesUnordered<_> = futures
        .into_iter()
        .enumerate()
        .map(|(index, fut)| async move { (index, fut.await) })
        .collect();

    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None)
        .take(pending.len())
        .collect();

    while let Some((index, outcome)) = pending.next().await {
        slots[index] = Some(outcome);
    }

    slots.into_iter().flatten().collect()
}
