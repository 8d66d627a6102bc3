//! # Suite Runner Library / Suite Runner 库
//!
//! This library provides the core functionality for the Suite Runner tool,
//! an aggregating test-package runner that fans a package tree out across
//! per-package runners, with bounded parallelism and deterministic result
//! merging.
//!
//! 此库为 Suite Runner 工具提供核心功能，
//! 这是一个聚合测试包运行器，将包树扇出到每包运行器，
//! 具有有界并行度和确定性的结果合并。
//!
//! ## Modules / 模块
//!
//! - `core` - Package model, runner capability trait, aggregating orchestrator and result merger
//! - `runners` - Concrete runner implementations bundled with the engine
//! - `infra` - Infrastructure services like subprocess execution and i18n support
//! - `reporting` - Result presentation: console, JSON and HTML reports
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 包模型、运行器能力 trait、聚合编排器和结果合并器
//! - `runners` - 引擎内置的具体运行器实现
//! - `infra` - 基础设施服务，如子进程执行和国际化支持
//! - `reporting` - 结果呈现：控制台、JSON 和 HTML 报告
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod commands;
pub mod core;
pub mod infra;
pub mod reporting;
pub mod runners;

// Re-export commonly used items
pub use crate::core::aggregate::AggregatingRunner;
pub use crate::core::merge::merge_results;
pub use crate::core::models::{
    NullTestEventListener, ResultDoc, TeardownFailure, TestEvent, TestEventListener, TestFilter,
};
pub use crate::core::package::{Package, SettingValue, Settings};
pub use crate::core::pool::WorkerPool;
pub use crate::core::runner::{RunnerFactory, RunnerHandle, TestRunner};
pub use crate::core::task::{ExecutionTask, TaskOutput};

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// This function detects the user's system locale and sets the appropriate
/// language for the application's user interface. It attempts to match the full
/// locale (e.g., "zh-CN"), then just the language code (e.g., "en"), and
/// finally falls back to the default language ("en").
pub fn init() {
    // Detect system locale and set it for i18n.
    // Fallback to "en" if detection fails.
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    // Try to match the full locale first (e.g., "zh-CN")
    // Then try to match the language part only (e.g., "en" from "en-US")
    // Finally, fall back to "en"
    let lang = if available_locales.contains(&locale.as_str()) {
        &locale
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
