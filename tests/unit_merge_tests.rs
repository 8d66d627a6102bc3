//! # Result Model and Merger Unit Tests / 结果模型与合并器单元测试
//!
//! Unit tests for result documents, the pure merger, test filters and the
//! composite teardown failure.

use anyhow::anyhow;
use suite_runner::core::merge::merge_results;
use suite_runner::core::models::{ResultDoc, TeardownFailure, TestFilter};

fn leaf(name: &str) -> ResultDoc {
    ResultDoc::new("test-suite").with_attribute("name", name)
}

#[test]
fn merging_leaf_documents_appends_the_documents_themselves() {
    let merged = merge_results("suite", vec![leaf("a"), leaf("b"), leaf("c")]);

    assert_eq!(merged.name, "test-run");
    assert_eq!(merged.attribute("name"), Some("suite"));
    let names: Vec<_> = merged
        .children
        .iter()
        .map(|child| child.attribute("name").unwrap())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn merging_containers_concatenates_their_children_in_input_order() {
    let mut first = ResultDoc::new("test-run");
    first.push_child(leaf("a1"));
    first.push_child(leaf("a2"));
    let mut second = ResultDoc::new("test-run");
    second.push_child(leaf("b1"));

    let merged = merge_results("suite", vec![first, second, leaf("solo")]);

    let names: Vec<_> = merged
        .children
        .iter()
        .map(|child| child.attribute("name").unwrap())
        .collect();
    assert_eq!(names, vec!["a1", "a2", "b1", "solo"]);
}

#[test]
fn merging_preserves_child_attributes_untouched() {
    let doc = leaf("a")
        .with_attribute("result", "Failed")
        .with_attribute("duration", "1.250");
    let merged = merge_results("suite", vec![doc]);

    let child = &merged.children[0];
    assert_eq!(child.attribute("result"), Some("Failed"));
    assert_eq!(child.attribute("duration"), Some("1.250"));
    // The merged root carries no summary attributes of its own.
    assert_eq!(merged.attribute("result"), None);
}

#[test]
fn merging_nothing_yields_an_empty_root() {
    let merged = merge_results("suite", Vec::new());
    assert!(merged.children.is_empty());
}

#[test]
fn flatten_walks_depth_first() {
    let mut root = ResultDoc::new("test-run");
    let mut group = leaf("group");
    group.push_child(leaf("inner"));
    root.push_child(group);
    root.push_child(leaf("outer"));

    let names: Vec<_> = root
        .flatten()
        .iter()
        .map(|node| node.attribute("name").unwrap_or("root"))
        .collect();
    assert_eq!(names, vec!["root", "group", "inner", "outer"]);
}

#[test]
fn empty_filter_matches_everything() {
    let filter = TestFilter::empty();
    assert!(filter.is_empty());
    assert!(filter.matches("anything"));
}

#[test]
fn filter_patterns_match_by_substring() {
    let filter = TestFilter::from_patterns(vec!["unit".to_string(), "api".to_string()]);
    assert!(filter.matches("unit-tests"));
    assert!(filter.matches("api"));
    assert!(!filter.matches("integration"));
}

#[test]
fn teardown_failure_enumerates_every_cause() {
    let failure = TeardownFailure::new(vec![anyhow!("first cause"), anyhow!("second cause")]);
    assert_eq!(failure.len(), 2);

    let message = failure.to_string();
    assert!(message.contains("2 runner teardown step(s) failed"));
    assert!(message.contains("first cause"));
    assert!(message.contains("second cause"));
}
