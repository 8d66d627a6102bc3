// src/commands/run.rs

use anyhow::{Context, Result};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;

use crate::core::aggregate::AggregatingRunner;
use crate::core::config::SuiteConfig;
use crate::core::models::TestFilter;
use crate::core::package::{keys, SettingValue};
use crate::infra::t;
use crate::reporting::console::{print_failure_details, print_summary, summarize, ConsoleListener};
use crate::reporting::html::generate_html_report;
use crate::reporting::json::write_json_report;
use crate::runners::process::ProcessRunnerFactory;

pub async fn execute(
    jobs: Option<usize>,
    config: PathBuf,
    filters: Vec<String>,
    dispose_runners: bool,
    json: Option<PathBuf>,
    html: Option<PathBuf>,
) -> Result<()> {
    let (mut suite, config_path) = SuiteConfig::load(&config)?;
    let locale = suite.language.clone();
    rust_i18n::set_locale(&locale);

    // Command-line overrides land in the suite settings before the package
    // tree is built, so they inherit down to every leaf like any setting.
    if let Some(jobs) = jobs {
        suite.settings.insert(
            keys::PARALLELISM.to_string(),
            SettingValue::Int(jobs as i64),
        );
    }
    if dispose_runners {
        suite
            .settings
            .insert(keys::DISPOSE_RUNNERS.to_string(), SettingValue::Bool(true));
    }

    let package = suite.into_package();
    println!(
        "{}",
        t!(
            "run.suite_loaded",
            locale = locale,
            name = package.name().yellow(),
            path = config_path.display()
        )
    );

    let leaf_count = package.leaf_packages().len();
    if leaf_count == 0 {
        println!("{}", t!("run.no_packages", locale = locale).green());
        return Ok(());
    }
    println!(
        "{}",
        t!("run.package_count", locale = locale, count = leaf_count).cyan()
    );

    let runner = Arc::new(AggregatingRunner::new(
        package,
        Arc::new(ProcessRunnerFactory::new()),
    ));
    println!(
        "{}",
        t!(
            "run.parallelism",
            locale = locale,
            jobs = runner.level_of_parallelism()
        )
        .cyan()
    );

    setup_signal_handler(Arc::clone(&runner), &locale);

    let listener = Arc::new(ConsoleListener::new(locale.clone()));
    let filter = TestFilter::from_patterns(filters);
    let result = runner.run_tests(listener, &filter).await?;

    print_summary(&result, &locale);
    let summary = summarize(&result);
    if summary.failed > 0 {
        print_failure_details(&result, &locale);
    }

    if let Some(report_path) = &json {
        write_json_report(&result, report_path)?;
        println!(
            "{}",
            t!(
                "report.json_written",
                locale = locale,
                path = report_path.display()
            )
        );
    }
    if let Some(report_path) = &html {
        generate_html_report(&result, report_path, &locale)?;
        println!(
            "{}",
            t!(
                "report.html_written",
                locale = locale,
                path = report_path.display()
            )
        );
    }

    // Disposal surfaces every deferred teardown failure as one composite
    // error, after the results have already been reported.
    runner
        .dispose()
        .await
        .context(t!("run.teardown_failed", locale = locale).to_string())?;

    if summary.failed > 0 {
        anyhow::bail!(t!("run.run_failed", locale = locale, count = summary.failed).to_string());
    }
    println!("\n{}", t!("run.all_passed", locale = locale).green().bold());
    Ok(())
}

fn setup_signal_handler(runner: Arc<AggregatingRunner>, locale: &str) {
    let locale = locale.to_string();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("run.stop_signal", locale = &locale).yellow());
            runner.stop_run(true);
        }
    });
}
