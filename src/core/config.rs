//! # Suite Configuration Module / 套件配置模块
//!
//! Parses the `Packages.toml` suite definition into the runtime package
//! tree. The file carries global settings, a language for runner output and
//! a nested list of packages; a `command` field on a package is shorthand
//! for the `command` setting.
//!
//! 将 `Packages.toml` 套件定义解析为运行时包树。
//! 该文件包含全局设置、运行器输出语言和嵌套的包列表；
//! 包上的 `command` 字段是 `command` 设置的简写。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::package::{keys, Package, SettingValue, Settings};

/// The whole suite definition, loaded from a TOML file.
/// 从 TOML 文件加载的整个套件定义。
#[derive(Debug, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Display name of the suite; becomes the root package name.
    /// 套件的显示名称；成为根包名称。
    #[serde(default = "default_suite_name")]
    pub name: String,

    /// The language for the runner's output messages (e.g. "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en"、"zh-CN"）。
    #[serde(default = "default_language")]
    pub language: String,

    /// Suite-wide settings, inherited by every package that does not
    /// override them.
    /// 套件范围的设置，由所有未覆盖它们的包继承。
    #[serde(default)]
    pub settings: Settings,

    /// The top-level packages of the suite.
    /// 套件的顶级包。
    #[serde(default)]
    pub packages: Vec<PackageConfig>,
}

/// One package node in the configuration file. May nest arbitrarily.
/// 配置文件中的一个包节点。可以任意嵌套。
#[derive(Debug, Serialize, Deserialize)]
pub struct PackageConfig {
    /// The unique name of the package, used in logs and reports.
    /// 包的唯一名称，用于日志和报告。
    pub name: String,

    /// Shorthand for the `command` setting on this package.
    /// 此包上 `command` 设置的简写。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Per-package settings, overriding inherited ones.
    /// 包级设置，覆盖继承的设置。
    #[serde(default, skip_serializing_if = "Settings::is_empty")]
    pub settings: Settings,

    /// Child packages. A package with children is a container and is never
    /// run itself.
    /// 子包。带有子包的包是容器，自身绝不运行。
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<PackageConfig>,
}

fn default_suite_name() -> String {
    "suite".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl SuiteConfig {
    /// Reads and parses a suite definition from disk.
    pub fn load(path: &Path) -> Result<(Self, PathBuf)> {
        let config_path = fs::canonicalize(path)
            .with_context(|| format!("failed to locate suite config at {}", path.display()))?;
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read suite config {}", config_path.display()))?;
        let config: SuiteConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse suite config {}", config_path.display()))?;
        Ok((config, config_path))
    }

    /// Converts the configuration into the immutable runtime package tree.
    /// Suite-level settings land on the root package and propagate downward.
    pub fn into_package(self) -> Package {
        let children = self
            .packages
            .into_iter()
            .map(PackageConfig::into_package)
            .collect();
        Package::new(self.name, self.settings, children)
    }
}

impl PackageConfig {
    fn into_package(self) -> Package {
        let mut settings = self.settings;
        if let Some(command) = self.command {
            settings
                .entry(keys::COMMAND.to_string())
                .or_insert(SettingValue::Str(command));
        }
        let children = self
            .packages
            .into_iter()
            .map(PackageConfig::into_package)
            .collect();
        Package::new(self.name, settings, children)
    }
}
