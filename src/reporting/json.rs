use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::models::ResultDoc;

/// Serializes a merged result tree to a pretty-printed JSON file.
/// 将合并的结果树序列化为格式化的 JSON 文件。
pub fn write_json_report(doc: &ResultDoc, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(doc).context("failed to serialize result tree")?;
    fs::write(output_path, json)
        .with_context(|| format!("failed to write JSON report to {}", output_path.display()))?;
    Ok(())
}
