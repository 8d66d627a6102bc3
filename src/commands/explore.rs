// src/commands/explore.rs

use anyhow::Result;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::aggregate::AggregatingRunner;
use crate::core::config::SuiteConfig;
use crate::core::models::{ResultDoc, TestFilter};
use crate::infra::t;
use crate::reporting::json::write_json_report;
use crate::runners::process::ProcessRunnerFactory;

/// Explores the suite without executing anything and prints the discovered
/// package tree.
pub async fn execute(config: PathBuf, filters: Vec<String>, json: Option<PathBuf>) -> Result<()> {
    let (suite, _config_path) = SuiteConfig::load(&config)?;
    let locale = suite.language.clone();
    rust_i18n::set_locale(&locale);

    let package = suite.into_package();
    let runner = AggregatingRunner::new(package, Arc::new(ProcessRunnerFactory::new()));

    let filter = TestFilter::from_patterns(filters);
    let doc = runner.explore(&filter).await?;

    println!("{}", t!("explore.banner", locale = locale).bold());
    print_tree(&doc, 0);

    if let Some(report_path) = &json {
        write_json_report(&doc, report_path)?;
        println!(
            "{}",
            t!(
                "report.json_written",
                locale = locale,
                path = report_path.display()
            )
        );
    }

    runner.dispose().await?;
    Ok(())
}

fn print_tree(doc: &ResultDoc, depth: usize) {
    let indent = "  ".repeat(depth);
    let name = doc.attribute("name").unwrap_or(doc.name.as_str());

    let line = match doc.attribute("runnable") {
        Some("true") => format!("{indent}- {}", name.green()),
        Some("false") => format!("{indent}- {}", name.dimmed()),
        _ => format!("{indent}- {}", name.bold()),
    };
    match doc.attribute("command") {
        Some(command) => println!("{line}  ({})", command.dimmed()),
        None => println!("{line}"),
    }

    for child in &doc.children {
        print_tree(child, depth + 1);
    }
}
