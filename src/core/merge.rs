//! # Result Merger Module / 结果合并模块
//!
//! Pure, order-preserving combination of per-leaf result documents into one
//! document. Merging concatenates children and never rewrites attributes;
//! summary statistics are recomputed by whoever consumes the merged tree.
//!
//! 将每个叶子的结果文档纯粹地、保序地合并为一个文档。
//! 合并连接子文档，绝不重写属性；摘要统计由合并树的消费者重新计算。

use crate::core::models::ResultDoc;

/// The element name of a merged fan-out result.
pub const TEST_RUN: &str = "test-run";

/// Merges an ordered sequence of result documents into one document named
/// `name`. The output's children are the concatenation, in input order, of
/// each input's own children, or of the input document itself when it has
/// no children and therefore represents a single leaf outcome.
///
/// 将有序的结果文档序列合并为一个名为 `name` 的文档。
/// 输出的子文档是每个输入自身子文档按输入顺序的连接；
/// 当输入没有子文档（因此表示单个叶子结果）时，则连接输入文档本身。
pub fn merge_results(name: &str, results: Vec<ResultDoc>) -> ResultDoc {
    let mut merged = ResultDoc::new(TEST_RUN).with_attribute("name", name);
    for result in results {
        if result.is_leaf() {
            merged.children.push(result);
        } else {
            merged.children.extend(result.children);
        }
    }
    merged
}
