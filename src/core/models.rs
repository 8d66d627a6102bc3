//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures shared across the suite runner:
//! result documents, test filters, live test events and the composite
//! teardown failure raised at disposal time.
//!
//! 此模块定义了套件运行器共享的核心数据结构：
//! 结果文档、测试过滤器、实时测试事件以及在销毁时抛出的组合清理失败。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A read-only hierarchical result document with named attributes and nested
/// child documents. Documents are merged by concatenating children under a
/// new root, never by rewriting attributes.
///
/// 一个只读的分层结果文档，带有命名属性和嵌套的子文档。
/// 文档通过在新根下连接子文档来合并，绝不通过重写属性来合并。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDoc {
    /// The element name of this node (e.g. "test-run", "test-suite").
    /// 此节点的元素名称（例如 "test-run"、"test-suite"）。
    pub name: String,
    /// Named attributes of this node. A `BTreeMap` keeps the attribute
    /// order deterministic for serialization and comparison.
    /// 此节点的命名属性。`BTreeMap` 保持属性顺序确定，便于序列化和比较。
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Nested child documents, in document order.
    /// 嵌套的子文档，按文档顺序排列。
    #[serde(default)]
    pub children: Vec<ResultDoc>,
}

impl ResultDoc {
    /// Creates an empty document with the given element name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Adds or replaces an attribute, returning the document for chaining.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Appends a child document.
    pub fn push_child(&mut self, child: ResultDoc) {
        self.children.push(child);
    }

    /// Looks up an attribute value by name.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// `true` when this document has no children and therefore represents a
    /// single leaf outcome rather than a container.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns this node and all of its descendants in depth-first order.
    /// 以深度优先顺序返回此节点及其所有后代。
    pub fn flatten(&self) -> Vec<&ResultDoc> {
        let mut nodes = Vec::new();
        self.collect_nodes(&mut nodes);
        nodes
    }

    fn collect_nodes<'a>(&'a self, out: &mut Vec<&'a ResultDoc>) {
        out.push(self);
        for child in &self.children {
            child.collect_nodes(out);
        }
    }
}

/// Selects tests by name. An empty filter matches everything; a non-empty
/// filter matches any name containing at least one of its patterns.
///
/// 按名称选择测试。空过滤器匹配所有内容；
/// 非空过滤器匹配包含其至少一个模式的任何名称。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFilter {
    #[serde(default)]
    patterns: Vec<String>,
}

impl TestFilter {
    /// The filter that matches every test.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a filter from a list of name fragments.
    pub fn from_patterns(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// `true` when the given name is selected by this filter.
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| name.contains(p.as_str()))
    }
}

/// A live event emitted by a runner while tests execute. When leaf packages
/// run in parallel, events from different packages interleave in an
/// unspecified order; listeners must tolerate that.
///
/// 运行器在测试执行期间发出的实时事件。当叶子包并行运行时，
/// 来自不同包的事件以未指定的顺序交错；监听器必须容忍这一点。
#[derive(Debug, Clone)]
pub enum TestEvent {
    /// A fan-out run over one or more packages has started.
    RunStarted { name: String, package_count: usize },
    /// One leaf package has started executing.
    TestStarted { name: String },
    /// A captured line of output from a leaf package.
    TestOutput { name: String, line: String },
    /// One leaf package has finished; carries its result document.
    TestFinished { result: ResultDoc },
    /// The whole fan-out run has finished.
    RunFinished { name: String },
}

/// Receives live test events. Implementations are shared across worker
/// tasks and must be `Send + Sync`.
pub trait TestEventListener: Send + Sync {
    fn on_test_event(&self, event: &TestEvent);
}

/// A listener that discards every event.
/// 丢弃所有事件的监听器。
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTestEventListener;

impl TestEventListener for NullTestEventListener {
    fn on_test_event(&self, _event: &TestEvent) {}
}

/// The composite failure raised when an aggregating runner is disposed after
/// one or more teardown steps failed. Every underlying cause is preserved so
/// callers get one signal but can inspect each failure.
///
/// 当聚合运行器在一个或多个清理步骤失败后被销毁时抛出的组合失败。
/// 每个底层原因都被保留，因此调用者得到一个信号但可以检查每个失败。
#[derive(Debug)]
pub struct TeardownFailure {
    errors: Vec<anyhow::Error>,
}

impl TeardownFailure {
    pub fn new(errors: Vec<anyhow::Error>) -> Self {
        Self { errors }
    }

    /// The individual teardown errors, in the order they were recorded.
    pub fn errors(&self) -> &[anyhow::Error] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for TeardownFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} runner teardown step(s) failed during unload or disposal",
            self.errors.len()
        )?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n  [{}] {:#}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for TeardownFailure {}
