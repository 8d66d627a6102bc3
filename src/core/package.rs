//! # Test Package Module / 测试包模块
//!
//! A package is a node in a tree of work. Leaf packages (those without
//! children) are the individually runnable units; a package with children is
//! only ever a container whose reachable leaves form the fan-out unit.
//! Packages are immutable once execution begins.
//!
//! 包是工作树中的一个节点。叶子包（没有子包的包）是可独立运行的单元；
//! 带有子包的包只是一个容器，其可达的叶子构成扇出单元。
//! 执行开始后包是不可变的。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known setting keys read by the engine and the bundled runners.
/// 引擎和内置运行器读取的常用设置键。
pub mod keys {
    /// Degree of parallelism for the fan-out. `1` (the default) runs leaf
    /// packages sequentially; `0` means one worker per logical CPU.
    pub const PARALLELISM: &str = "parallelism";
    /// When `true`, each leaf runner is unloaded and disposed immediately
    /// after its own run completes, and the handle list is cleared after the
    /// whole fan-out finishes.
    pub const DISPOSE_RUNNERS: &str = "dispose-runners";
    /// The shell command a process-backed leaf package executes.
    pub const COMMAND: &str = "command";
    /// Working directory for the leaf package's command.
    pub const WORKING_DIR: &str = "working-dir";
    /// Timeout in seconds for one leaf package's run.
    pub const TIMEOUT_SECS: &str = "timeout-secs";
}

/// A single setting value: a scalar or a nested dictionary.
/// 单个设置值：标量或嵌套字典。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Dict(BTreeMap<String, SettingValue>),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Str(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Str(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Str(value)
    }
}

/// An ordered mapping of setting name to value.
/// 设置名称到值的有序映射。
pub type Settings = BTreeMap<String, SettingValue>;

/// A node in the package tree: a name, its settings and zero or more child
/// packages. Settings propagate from a parent to its descendants when the
/// tree is built; a child's own value wins over an inherited one.
///
/// 包树中的一个节点：名称、设置和零个或多个子包。
/// 构建树时设置从父级传播到后代；子包自己的值优先于继承的值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    name: String,
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    children: Vec<Package>,
}

impl Package {
    /// Builds a package node and pushes its settings down to every
    /// descendant that does not override them.
    pub fn new(name: impl Into<String>, settings: Settings, children: Vec<Package>) -> Self {
        let mut package = Self {
            name: name.into(),
            settings,
            children,
        };
        package.push_down_settings();
        package
    }

    /// Builds a leaf package with no children.
    pub fn leaf(name: impl Into<String>, settings: Settings) -> Self {
        Self::new(name, settings, Vec::new())
    }

    fn push_down_settings(&mut self) {
        let inherited = self.settings.clone();
        for child in &mut self.children {
            for (key, value) in &inherited {
                child
                    .settings
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
            child.push_down_settings();
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn children(&self) -> &[Package] {
        &self.children
    }

    /// `true` when this package has no children of its own.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Enumerates the runnable leaf sub-packages reachable from this node,
    /// in the tree's natural child order, depth-first. The node itself is a
    /// container and is never part of the fan-out; a package with no
    /// children therefore has no runnable sub-units.
    ///
    /// 以树的自然子顺序、深度优先的方式枚举从此节点可达的可运行叶子子包。
    /// 节点本身是容器，绝不参与扇出；因此没有子包的包没有可运行的子单元。
    pub fn leaf_packages(&self) -> Vec<&Package> {
        let mut leaves = Vec::new();
        for child in &self.children {
            child.collect_leaves(&mut leaves);
        }
        leaves
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Package>) {
        if self.is_leaf() {
            out.push(self);
        } else {
            for child in &self.children {
                child.collect_leaves(out);
            }
        }
    }

    pub fn get_setting(&self, key: &str) -> Option<&SettingValue> {
        self.settings.get(key)
    }

    /// Reads a boolean setting, falling back to `default` when the key is
    /// absent or holds a different type.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_setting(key)
            .and_then(SettingValue::as_bool)
            .unwrap_or(default)
    }

    /// Reads an integer setting, falling back to `default` when the key is
    /// absent or holds a different type.
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get_setting(key)
            .and_then(SettingValue::as_int)
            .unwrap_or(default)
    }

    /// Reads a string setting.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get_setting(key).and_then(SettingValue::as_str)
    }
}
