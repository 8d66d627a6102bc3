//! # Runner Capability Module / 运行器能力模块
//!
//! The `TestRunner` trait is the capability set every runner exposes:
//! explore, load, unload, count, run, stop and dispose. Concrete per-leaf
//! implementations are supplied through a `RunnerFactory`; the aggregating
//! runner implements the same trait, so an aggregate composes recursively
//! wherever a single runner is expected.
//!
//! `TestRunner` trait 是每个运行器暴露的能力集合：
//! 探索、加载、卸载、计数、运行、停止和销毁。具体的叶子实现通过
//! `RunnerFactory` 提供；聚合运行器实现同一个 trait，
//! 因此聚合体可以在任何需要单个运行器的地方递归组合。

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::core::models::{ResultDoc, TestEventListener, TestFilter};
use crate::core::package::Package;

/// A shared handle to one runner, bound 1:1 to its package for the whole
/// load → run → unload → dispose lifecycle.
pub type RunnerHandle = Arc<dyn TestRunner>;

/// The capability set of a test runner. All operations except `stop_run`
/// may fail; only `unload` and `dispose` failures are deferred by the
/// aggregating runner, while every other error propagates to the caller.
#[async_trait]
pub trait TestRunner: Send + Sync {
    /// Explores the package and returns information about the tests found,
    /// without executing anything.
    async fn explore(&self, filter: &TestFilter) -> Result<ResultDoc>;

    /// Loads the package for possible execution.
    async fn load(&self) -> Result<ResultDoc>;

    /// Unloads a previously loaded package.
    async fn unload(&self) -> Result<()>;

    /// Counts the test cases that would run under the given filter.
    async fn count_test_cases(&self, filter: &TestFilter) -> Result<usize>;

    /// Runs the tests in the package, delivering live events to `listener`.
    async fn run(
        &self,
        listener: Arc<dyn TestEventListener>,
        filter: &TestFilter,
    ) -> Result<ResultDoc>;

    /// Requests cancellation of an ongoing run. Fire-and-forget: with no run
    /// in progress the call is a no-op. `force` interrupts in-flight work;
    /// otherwise the runner lets the current work complete cooperatively.
    /// Callers broadcasting a stop ignore individual failures.
    fn stop_run(&self, force: bool) -> Result<()>;

    /// Releases every resource held by the runner. The runner must not be
    /// used afterwards.
    async fn dispose(&self) -> Result<()>;
}

/// Creates one runner per leaf package. The aggregating runner owns the
/// handles a factory produces; nothing else holds references to them.
pub trait RunnerFactory: Send + Sync {
    fn make_runner(&self, package: &Package) -> Result<RunnerHandle>;
}
