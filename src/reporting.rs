//! # Reporting Module / 报告模块
//!
//! Presentation of merged result trees: live console output, a formatted
//! console summary, and JSON/HTML report files. Summary statistics are
//! recomputed here by walking the merged tree, because the merger itself
//! never aggregates attributes.
//!
//! 合并结果树的呈现：实时控制台输出、格式化的控制台摘要以及 JSON/HTML
//! 报告文件。摘要统计在此处通过遍历合并树重新计算，
//! 因为合并器本身从不聚合属性。

pub mod console;
pub mod html;
pub mod json;
