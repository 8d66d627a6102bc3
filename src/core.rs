//! # Core Module / 核心模块
//!
//! This module contains the test-execution engine of Suite Runner:
//! the package model, the runner capability trait, the aggregating
//! orchestrator with its worker pool, and the result merger.
//!
//! 此模块包含 Suite Runner 的测试执行引擎：
//! 包模型、运行器能力 trait、带工作池的聚合编排器以及结果合并器。

pub mod aggregate;
pub mod config;
pub mod merge;
pub mod models;
pub mod package;
pub mod pool;
pub mod runner;
pub mod task;

// Re-exports
pub use aggregate::AggregatingRunner;
pub use merge::merge_results;
pub use models::{ResultDoc, TestEvent, TestEventListener, TestFilter};
pub use package::Package;
pub use runner::{RunnerFactory, RunnerHandle, TestRunner};
