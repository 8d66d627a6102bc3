//! # Suite Initialization Module / 套件初始化模块
//!
//! Creates a starter `Packages.toml` through an interactive command-line
//! wizard, or non-interactively with a sample suite definition.
//!
//! 通过交互式命令行向导创建初始的 `Packages.toml`，
//! 或以非交互方式创建示例套件定义。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use std::fs;
use std::path::Path;

use crate::core::config::{PackageConfig, SuiteConfig};
use crate::core::package::Settings;
use crate::infra::t;

/// Runs the wizard that generates a `Packages.toml` file.
pub fn run_init_wizard(language: &str, non_interactive: bool) -> Result<()> {
    let config_path = Path::new("Packages.toml");
    let theme = ColorfulTheme::default();

    if !non_interactive {
        println!("\n{}", t!("init.welcome", locale = language).cyan().bold());
        println!("{}", t!("init.description", locale = language));
    }

    if config_path.exists() && !non_interactive {
        let confirmation = Confirm::with_theme(&theme)
            .with_prompt(t!(
                "init.overwrite_prompt",
                locale = language,
                path = config_path.display()
            ))
            .default(false)
            .interact()
            .context(t!("init.confirmation_failed", locale = language).to_string())?;
        if !confirmation {
            println!("{}", t!("init.aborted", locale = language));
            return Ok(());
        }
    }

    if non_interactive {
        return write_config(config_path, &generate_default_suite(language), language);
    }

    let name: String = Input::with_theme(&theme)
        .with_prompt(t!("init.suite_name_prompt", locale = language).to_string())
        .default("suite".to_string())
        .interact_text()?;

    let mut packages = Vec::new();
    loop {
        let package_name: String = Input::with_theme(&theme)
            .with_prompt(t!("init.package_name_prompt", locale = language).to_string())
            .default(format!("package-{}", packages.len() + 1))
            .interact_text()?;
        let command: String = Input::with_theme(&theme)
            .with_prompt(t!("init.command_prompt", locale = language).to_string())
            .interact_text()?;

        packages.push(PackageConfig {
            name: package_name,
            command: Some(command),
            settings: Settings::new(),
            packages: Vec::new(),
        });

        let add_another = Confirm::with_theme(&theme)
            .with_prompt(t!("init.add_another_prompt", locale = language).to_string())
            .default(false)
            .interact()
            .context(t!("init.confirmation_failed", locale = language).to_string())?;
        if !add_another {
            break;
        }
    }

    let suite = if packages.is_empty() {
        generate_default_suite(language)
    } else {
        SuiteConfig {
            name,
            language: language.to_string(),
            settings: Settings::new(),
            packages,
        }
    };

    write_config(config_path, &suite, language)
}

fn generate_default_suite(language: &str) -> SuiteConfig {
    SuiteConfig {
        name: "suite".to_string(),
        language: language.to_string(),
        settings: Settings::new(),
        packages: vec![
            PackageConfig {
                name: "unit-tests".to_string(),
                command: Some("cargo test --lib".to_string()),
                settings: Settings::new(),
                packages: Vec::new(),
            },
            PackageConfig {
                name: "integration-tests".to_string(),
                command: Some("cargo test --tests".to_string()),
                settings: Settings::new(),
                packages: Vec::new(),
            },
        ],
    }
}

fn write_config(path: &Path, suite: &SuiteConfig, language: &str) -> Result<()> {
    let toml_string = toml::to_string_pretty(suite)
        .context(t!("init.serialize_failed", locale = language).to_string())?;

    fs::write(path, toml_string)
        .with_context(|| t!("init.write_failed", locale = language, path = path.display()))?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init.success_created", locale = language, path = path.display()).bold()
    );
    println!("{}", t!("init.usage_hint", locale = language));

    Ok(())
}
