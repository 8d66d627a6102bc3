//! # Console Reporting Module / 控制台报告模块
//!
//! This module handles the display of suite results in the console: a live
//! listener that narrates package execution as events arrive, and a colored
//! summary of the merged result tree printed after the run.
//!
//! 此模块处理控制台中套件结果的显示：一个在事件到达时叙述包执行情况的
//! 实时监听器，以及运行后打印的合并结果树的彩色摘要。

use colored::*;

use crate::core::models::{ResultDoc, TestEvent, TestEventListener};
use crate::infra::t;

/// Narrates test events to the console as they arrive. Events from packages
/// running in parallel interleave; every line carries its package name so
/// the narration stays readable.
///
/// 在测试事件到达时向控制台叙述。并行运行的包的事件会交错；
/// 每行都带有其包名，以保持叙述可读。
pub struct ConsoleListener {
    locale: String,
}

impl ConsoleListener {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }
}

impl TestEventListener for ConsoleListener {
    fn on_test_event(&self, event: &TestEvent) {
        let locale = &self.locale;
        match event {
            TestEvent::RunStarted {
                name,
                package_count,
            } => {
                println!(
                    "{}",
                    t!("run.started", locale = locale, name = name, count = package_count).bold()
                );
            }
            TestEvent::TestStarted { name } => {
                println!("{}", t!("run.test_started", locale = locale, name = name).blue());
            }
            TestEvent::TestOutput { name, line } => {
                println!("  [{}] {}", name.dimmed(), line);
            }
            TestEvent::TestFinished { result } => {
                let name = result.attribute("name").unwrap_or("?");
                let duration = result.attribute("duration").unwrap_or("0");
                match result.attribute("result") {
                    Some("Passed") => println!(
                        "{}",
                        t!("run.test_passed", locale = locale, name = name, duration = duration)
                            .green()
                    ),
                    Some("Failed") => {
                        let reason = result.attribute("failure-reason").unwrap_or("unknown");
                        println!(
                            "{}",
                            t!(
                                "run.test_failed",
                                locale = locale,
                                name = name,
                                reason = reason,
                                duration = duration
                            )
                            .red()
                        );
                    }
                    Some("Skipped") => println!(
                        "{}",
                        t!("run.test_skipped", locale = locale, name = name).dimmed()
                    ),
                    _ => {}
                }
            }
            TestEvent::RunFinished { name } => {
                println!("{}", t!("run.finished", locale = locale, name = name).bold());
            }
        }
    }
}

/// Counts recomputed from a merged result tree.
/// 从合并结果树重新计算的计数。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Walks a merged result tree and tallies every node carrying a `result`
/// attribute. The merger never aggregates statistics, so this is where
/// totals come from.
pub fn summarize(doc: &ResultDoc) -> RunSummary {
    let mut summary = RunSummary::default();
    for node in doc.flatten() {
        match node.attribute("result") {
            Some("Passed") => {
                summary.total += 1;
                summary.passed += 1;
            }
            Some("Failed") => {
                summary.total += 1;
                summary.failed += 1;
            }
            Some("Skipped") => {
                summary.total += 1;
                summary.skipped += 1;
            }
            _ => {}
        }
    }
    summary
}

/// Prints a formatted summary of a merged result tree.
///
/// # Output Format / 输出格式
/// ```text
/// --- Suite Summary ---
///   - Passed   | unit-tests                               |     1.234s
///   - Failed   | integration-tests                        |     0.456s
/// Total: 2  Passed: 1  Failed: 1  Skipped: 0
/// ```
pub fn print_summary(doc: &ResultDoc, locale: &str) {
    println!("\n{}", t!("summary.banner", locale = locale).bold());

    for node in doc.flatten() {
        let Some(result) = node.attribute("result") else {
            continue;
        };
        let name = node.attribute("name").unwrap_or("?");
        let duration = node
            .attribute("duration")
            .map(|d| format!("{d}s"))
            .unwrap_or_else(|| "N/A".to_string());

        let status_colored = match result {
            "Passed" => result.green(),
            "Failed" => result.red(),
            _ => result.dimmed(),
        };

        println!("  - {:<10} | {:<40} | {:>10}", status_colored, name, duration);
    }

    let summary = summarize(doc);
    println!(
        "{}",
        t!(
            "summary.totals",
            locale = locale,
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped
        )
    );
}

/// Prints the captured output of every failed package, separated for
/// readability. Returns early when nothing failed.
pub fn print_failure_details(doc: &ResultDoc, locale: &str) {
    let failures: Vec<&ResultDoc> = doc
        .flatten()
        .into_iter()
        .filter(|node| node.attribute("result") == Some("Failed"))
        .collect();
    if failures.is_empty() {
        return;
    }

    println!("\n{}", t!("run.failure_banner", locale = locale).red().bold());
    println!("{}", "-".repeat(80));

    for (i, failure) in failures.iter().enumerate() {
        println!(
            "[{}/{}] {}",
            i + 1,
            failures.len(),
            failure.attribute("name").unwrap_or("?").cyan()
        );
        if let Some(output) = failure.attribute("output") {
            if !output.trim().is_empty() {
                println!("\n--- {} ---\n", t!("run.output_log", locale = locale).yellow());
                println!("{}", output.trim());
            }
        }
        println!("{}", "-".repeat(80));
    }
}
