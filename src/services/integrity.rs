//! 数据一致性检查 - 业务能力层
//!
//! 对比索引文件、目录中的实际文件和分类列表，找出：
//! - 索引里有但目录里没有的文件
//! - 目录里有但索引没收录的测验文件
//! - 分类不在分类列表里的测验

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::error::FileError;
use crate::infrastructure::QuizStore;

/// 分类未登记的测验
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryWarning {
    pub file: String,
    pub category: String,
}

/// 检查结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    /// 索引中登记但不存在的文件
    pub missing: Vec<String>,
    /// 存在但未登记到索引的测验文件
    pub orphans: Vec<String>,
    pub category_warnings: Vec<CategoryWarning>,
}

impl IntegrityReport {
    /// 索引与目录完全对应（分类警告不影响）
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty() && self.orphans.is_empty()
    }
}

/// 对比索引与目录
///
/// `all_json_files` 是目录下全部 JSON 文件（含系统文件），
/// `quiz_files` 是去掉系统文件后的测验文件。
pub fn compare_manifest(
    manifest: &[String],
    all_json_files: &[String],
    quiz_files: &[String],
) -> (Vec<String>, Vec<String>) {
    let on_disk: BTreeSet<&str> = all_json_files.iter().map(String::as_str).collect();
    let listed: BTreeSet<&str> = manifest.iter().map(String::as_str).collect();

    let missing = manifest
        .iter()
        .filter(|name| !on_disk.contains(name.as_str()))
        .cloned()
        .collect();

    let orphans = quiz_files
        .iter()
        .filter(|name| !listed.contains(name.as_str()))
        .cloned()
        .collect();

    (missing, orphans)
}

/// 读取可选的列表文件，不存在或内容损坏时视为空
async fn read_optional_list(
    store: &QuizStore,
    name: &str,
    read: impl std::future::Future<Output = Result<Vec<String>, FileError>>,
) -> Result<Vec<String>, FileError> {
    match read.await {
        Ok(list) => Ok(list),
        Err(FileError::NotFound { .. }) => {
            warn!(
                "⚠️ {} 不存在，按空列表处理 ({})",
                name,
                store.data_dir().display()
            );
            Ok(Vec::new())
        }
        Err(e @ FileError::Json { .. }) => {
            warn!("⚠️ {} 无法解析，按空列表处理: {}", name, e);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// 执行一致性检查
pub async fn run_integrity_check(store: &QuizStore) -> Result<IntegrityReport, FileError> {
    info!("🔍 开始一致性检查: {}", store.data_dir().display());

    let all_json_files = store.list_json_files().await?;
    let quiz_files: Vec<String> = all_json_files
        .iter()
        .filter(|name| !store.is_system_file(name))
        .cloned()
        .collect();

    let manifest = read_optional_list(store, store.index_file(), store.read_index()).await?;
    let categories =
        read_optional_list(store, store.categories_file(), store.read_categories()).await?;

    let (missing, orphans) = compare_manifest(&manifest, &all_json_files, &quiz_files);

    let known: BTreeSet<&str> = categories.iter().map(String::as_str).collect();
    let mut category_warnings = Vec::new();
    for file in &quiz_files {
        let record = match store.read_quiz(file).await {
            Ok(record) => record,
            Err(e) => {
                debug!("跳过无法读取的文件 {}: {}", file, e);
                continue;
            }
        };
        if !record.category.is_empty() && !known.contains(record.category.as_str()) {
            category_warnings.push(CategoryWarning {
                file: file.clone(),
                category: record.category,
            });
        }
    }

    let report = IntegrityReport {
        missing,
        orphans,
        category_warnings,
    };

    if report.is_consistent() {
        info!("✅ 索引与目录一致");
    } else {
        warn!(
            "⚠️ 缺失 {} 个，未登记 {} 个",
            report.missing.len(),
            report.orphans.len()
        );
    }
    Ok(report)
}

/// 用目录中的测验文件重写索引，返回写入的列表
pub async fn fix_quiz_list(store: &QuizStore) -> Result<Vec<String>, FileError> {
    let files = store.list_quiz_files().await?;
    store.write_index(&files).await?;
    info!("📝 已重写 {}（{} 个文件）", store.index_file(), files.len());
    Ok(files)
}
