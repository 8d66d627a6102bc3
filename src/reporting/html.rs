//! # HTML Reporting Module / HTML 报告模块
//!
//! Generation of a standalone HTML report from a merged result tree, with
//! summary statistics, a results table and collapsible output for failed
//! packages.
//!
//! 从合并结果树生成独立的 HTML 报告，包含摘要统计、结果表格
//! 以及失败包的可折叠输出。

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::models::ResultDoc;
use crate::infra::t;
use crate::reporting::console::summarize;

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = include_str!("assets/report.css");

/// Embedded JavaScript for HTML report interactivity / HTML 报告交互性的嵌入式 JavaScript
const HTML_SCRIPT: &str = include_str!("assets/report.js");

/// Generates an HTML report for a merged result tree.
///
/// # Errors / 错误
/// Returns an error when the report file cannot be written.
/// 当报告文件无法写入时返回错误。
pub fn generate_html_report(doc: &ResultDoc, output_path: &Path, locale: &str) -> Result<()> {
    let mut html = String::new();
    html.push_str(&format!(
        "<!DOCTYPE html><html><head><title>{}</title>",
        t!("html_report.title", locale = locale)
    ));
    html.push_str("<style>");
    html.push_str(HTML_STYLE);
    html.push_str("</style>");
    html.push_str("</head><body>");
    html.push_str(&format!(
        "<h1>{}</h1>",
        t!("html_report.main_header", locale = locale)
    ));
    if let Some(name) = doc.attribute("name") {
        html.push_str(&format!("<p class='suite-name'>{}</p>", escape_html(name)));
    }

    let summary = summarize(doc);
    html.push_str("<div class='summary-container'>");
    for (count, class, label_key) in [
        (summary.total, "", "html_report.summary.total"),
        (summary.passed, "passed-text", "html_report.summary.passed"),
        (summary.failed, "failed-text", "html_report.summary.failed"),
        (summary.skipped, "skipped-text", "html_report.summary.skipped"),
    ] {
        html.push_str(&format!(
            "<div class='summary-item'><span class='count {}'>{}</span><span class='label'>{}</span></div>",
            class,
            count,
            t!(label_key, locale = locale)
        ));
    }
    html.push_str("</div>");

    html.push_str("<table><thead><tr>");
    html.push_str(&format!(
        "<th>{}</th>",
        t!("html_report.table.header.name", locale = locale)
    ));
    html.push_str(&format!(
        "<th class='status-col'>{}</th>",
        t!("html_report.table.header.status", locale = locale)
    ));
    html.push_str(&format!(
        "<th class='duration-cell'>{}</th>",
        t!("html_report.table.header.duration", locale = locale)
    ));
    html.push_str("</tr></thead><tbody>");

    let outcomes: Vec<&ResultDoc> = doc
        .flatten()
        .into_iter()
        .filter(|node| node.attribute("result").is_some())
        .collect();

    for (i, node) in outcomes.iter().enumerate() {
        let name = node.attribute("name").unwrap_or("?");
        let status = node.attribute("result").unwrap_or("?");
        let status_class = format!("status-{status}");
        let duration = node
            .attribute("duration")
            .map(|d| format!("{d}s"))
            .unwrap_or_else(|| "N/A".to_string());

        let output_id = format!("output-{}", i);
        let failed = status == "Failed";
        let output_toggle = if failed {
            format!(
                "<div class='output-toggle' onclick=\"toggleOutput('{}')\">{}</div>",
                output_id,
                t!("html_report.toggle_output", locale = locale)
            )
        } else {
            String::new()
        };

        html.push_str("<tr>");
        html.push_str(&format!("<td>{}</td>", escape_html(name)));
        html.push_str(&format!(
            "<td class='status-col'><div class='status-cell {}'>{}</div>{}</td>",
            status_class, status, output_toggle
        ));
        html.push_str(&format!("<td class='duration-cell'>{}</td>", duration));
        html.push_str("</tr>");

        if failed {
            let output = node.attribute("output").unwrap_or("");
            html.push_str(&format!(
                "<tr id='{}' style='display:none;'><td colspan='3'><pre class='output-content'>{}</pre></td></tr>",
                output_id,
                escape_html(output)
            ));
        }
    }

    html.push_str("</tbody></table>");
    html.push_str("<script>");
    html.push_str(HTML_SCRIPT);
    html.push_str("</script></body></html>");

    fs::write(output_path, html)
        .with_context(|| format!("failed to write HTML report to {}", output_path.display()))?;
    Ok(())
}

/// Simple HTML escape function to replace special characters with their HTML entities
/// 简单的 HTML 转义函数，用 HTML 实体替换特殊字符
fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
