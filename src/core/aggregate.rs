//! # Aggregating Runner Module / 聚合运行器模块
//!
//! The orchestrator at the heart of the engine. It splits its package into
//! leaf sub-packages, owns one runner handle per leaf, fans every operation
//! out across them (sequentially or through a bounded worker pool) and
//! merges the partial results into one document in handle-creation order.
//! Teardown failures accumulate in an instance-scoped list and surface as a
//! single composite failure only when the aggregate itself is disposed, so
//! no runner's cleanup can mask another's results.
//!
//! 引擎核心的编排器。它将其包拆分为叶子子包，为每个叶子持有一个运行器句柄，
//! 将每个操作扇出到所有句柄（顺序执行或通过有界工作池），
//! 并按句柄创建顺序将部分结果合并为一个文档。
//! 清理失败累积在实例范围的列表中，仅在聚合体自身被销毁时
//! 作为单个组合失败浮出，因此任何运行器的清理都不会掩盖其他运行器的结果。

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::{RwLock, RwLockReadGuard};

use crate::core::merge::merge_results;
use crate::core::models::{ResultDoc, TeardownFailure, TestEvent, TestEventListener, TestFilter};
use crate::core::package::{keys, Package};
use crate::core::pool::WorkerPool;
use crate::core::runner::{RunnerFactory, RunnerHandle, TestRunner};
use crate::core::task::{ExecutionTask, TaskOutput};

/// Runs the leaf sub-packages of one package through per-leaf runners and
/// combines their results. Implements [`TestRunner`] itself, so an
/// aggregate is substitutable anywhere a single runner is expected and
/// composes recursively without special cases.
pub struct AggregatingRunner {
    package: Package,
    factory: Arc<dyn RunnerFactory>,
    parallelism: usize,
    /// `None` until the handles are first materialized; `Some(empty)` after
    /// the list has been cleared, which is what keeps a disposed aggregate
    /// from lazily rebuilding its runners.
    runners: RwLock<Option<Vec<RunnerHandle>>>,
    teardown_errors: Mutex<Vec<anyhow::Error>>,
}

impl AggregatingRunner {
    /// Creates an aggregate over `package`. The degree of parallelism comes
    /// from the package's `parallelism` setting: 1 (the default) runs leaf
    /// packages sequentially, `0` means one worker per logical CPU.
    pub fn new(package: Package, factory: Arc<dyn RunnerFactory>) -> Self {
        let parallelism = match package.get_int(keys::PARALLELISM, 1) {
            0 => num_cpus::get(),
            n if n < 1 => 1,
            n => n as usize,
        };
        Self {
            package,
            factory,
            parallelism,
            runners: RwLock::new(None),
            teardown_errors: Mutex::new(Vec::new()),
        }
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    /// The configured degree of parallelism for `run_tests`.
    pub fn level_of_parallelism(&self) -> usize {
        self.parallelism
    }

    /// Returns the cached runner handles, materializing them on first
    /// access: one runner per leaf sub-package, created in the tree's
    /// depth-first child order. The returned guard holds the list read-locked
    /// for the duration of a fan-out, which is what makes disposal wait for
    /// in-flight operations.
    async fn runners(&self) -> Result<RwLockReadGuard<'_, Vec<RunnerHandle>>> {
        loop {
            {
                let guard = self.runners.read().await;
                if guard.is_some() {
                    return Ok(RwLockReadGuard::map(guard, |runners| {
                        runners.as_ref().expect("runner list checked above")
                    }));
                }
            }

            let mut guard = self.runners.write().await;
            if guard.is_none() {
                let leaves = self.package.leaf_packages();
                let mut handles = Vec::with_capacity(leaves.len());
                for leaf in leaves {
                    handles.push(self.factory.make_runner(leaf)?);
                }
                *guard = Some(handles);
            }
        }
    }

    /// Explores every leaf package under the given filter and merges the
    /// returned documents. Exploration is pure and read-only, so the calls
    /// run concurrently; the merged output's child order still equals the
    /// handles' creation order.
    pub async fn explore(&self, filter: &TestFilter) -> Result<ResultDoc> {
        let runners = self.runners().await?;
        let results =
            futures::future::try_join_all(runners.iter().map(|runner| runner.explore(filter)))
                .await?;
        Ok(merge_results(self.package.name(), results))
    }

    /// Loads every leaf package, in handle order, and merges the results.
    pub async fn load(&self) -> Result<ResultDoc> {
        let runners = self.runners().await?;
        let mut results = Vec::with_capacity(runners.len());
        for runner in runners.iter() {
            results.push(runner.load().await?);
        }
        Ok(merge_results(self.package.name(), results))
    }

    /// Unloads every leaf package, in handle order. An error from one
    /// handle's unload is recorded and iteration continues, so unloading one
    /// package can never prevent unloading the rest. The accumulated errors
    /// surface when the aggregate is disposed.
    pub async fn unload_package(&self) {
        let runners = match self.runners().await {
            Ok(runners) => runners,
            Err(error) => {
                self.record_teardown_error(error);
                return;
            }
        };
        for runner in runners.iter() {
            if let Err(error) = runner.unload().await {
                self.record_teardown_error(error);
            }
        }
    }

    /// Sums the per-leaf test case counts under the given filter.
    pub async fn count_test_cases(&self, filter: &TestFilter) -> Result<usize> {
        let runners = self.runners().await?;
        let mut count = 0;
        for runner in runners.iter() {
            count += runner.count_test_cases(filter).await?;
        }
        Ok(count)
    }

    /// Runs the tests in every leaf package and merges the partial results
    /// in handle-creation order, regardless of completion order.
    ///
    /// With parallelism ≤ 1 the handles run one after another and a run
    /// failure propagates immediately; with parallelism P > 1 all execution
    /// tasks are submitted to a worker pool of P workers and the call blocks
    /// until every task has finished (a hard barrier), after which the first
    /// run failure in handle order propagates. When the `dispose-runners`
    /// setting is enabled each task unloads and disposes its own handle
    /// right after its run, and the handle list is cleared afterwards, so
    /// subsequent operations see an empty list.
    pub async fn run_tests(
        &self,
        listener: Arc<dyn TestEventListener>,
        filter: &TestFilter,
    ) -> Result<ResultDoc> {
        let dispose_runners = self.package.get_bool(keys::DISPOSE_RUNNERS, false);

        let outputs = {
            let runners = self.runners().await?;
            listener.on_test_event(&TestEvent::RunStarted {
                name: self.package.name().to_string(),
                package_count: runners.len(),
            });
            if self.parallelism <= 1 {
                self.run_tests_sequentially(&runners, &listener, filter, dispose_runners)
                    .await
            } else {
                self.run_tests_in_parallel(&runners, &listener, filter, dispose_runners)
                    .await
            }
        };

        if dispose_runners {
            let mut guard = self.runners.write().await;
            *guard = Some(Vec::new());
        }

        let mut results = Vec::new();
        let mut first_error = None;
        for output in outputs {
            if let Some(error) = output.teardown_error {
                self.record_teardown_error(error);
            }
            match output.result {
                Ok(Some(doc)) => results.push(doc),
                Ok(None) => {}
                Err(error) => {
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
            }
        }
        if let Some(error) = first_error {
            return Err(error);
        }

        listener.on_test_event(&TestEvent::RunFinished {
            name: self.package.name().to_string(),
        });

        Ok(merge_results(self.package.name(), results))
    }

    async fn run_tests_sequentially(
        &self,
        runners: &[RunnerHandle],
        listener: &Arc<dyn TestEventListener>,
        filter: &TestFilter,
        dispose_runners: bool,
    ) -> Vec<TaskOutput> {
        let mut outputs = Vec::with_capacity(runners.len());
        for runner in runners {
            let task = ExecutionTask::new(
                Arc::clone(runner),
                Arc::clone(listener),
                filter.clone(),
                dispose_runners,
            );
            let output = task.execute().await;
            let failed = output.result.is_err();
            outputs.push(output);
            if failed {
                break;
            }
        }
        outputs
    }

    async fn run_tests_in_parallel(
        &self,
        runners: &[RunnerHandle],
        listener: &Arc<dyn TestEventListener>,
        filter: &TestFilter,
        dispose_runners: bool,
    ) -> Vec<TaskOutput> {
        let mut pool = WorkerPool::new(self.parallelism);
        for runner in runners {
            pool.enqueue(ExecutionTask::new(
                Arc::clone(runner),
                Arc::clone(listener),
                filter.clone(),
                dispose_runners,
            ));
        }
        pool.start();
        pool.wait_all().await
    }

    /// Broadcasts a stop request to every handle, in order, best-effort: a
    /// handle whose stop fails does not prevent the others from receiving
    /// the signal. Never blocks: with no handles materialized, or while the
    /// list is being torn down, the call is a silent no-op. Callers must
    /// still wait for the in-flight `run_tests` to return to know execution
    /// has actually ceased.
    pub fn stop_run(&self, force: bool) {
        if let Ok(guard) = self.runners.try_read() {
            if let Some(runners) = guard.as_ref() {
                for runner in runners {
                    let _ = runner.stop_run(force);
                }
            }
        }
    }

    /// Disposes every handle, in order, then clears the handle list.
    /// Disposal waits for any in-flight fan-out to finish before tearing
    /// handles down. Errors from individual handles are recorded rather than
    /// rethrown immediately, so every handle gets a chance to release its
    /// resources; if the accumulated teardown list is non-empty afterwards
    /// it is drained and raised as one [`TeardownFailure`] wrapping every
    /// cause. Operations invoked after disposal see an empty handle list and
    /// degenerate to no-ops returning empty or zero results.
    pub async fn dispose(&self) -> Result<()> {
        let mut guard = self.runners.write().await;
        if let Some(runners) = guard.take() {
            for runner in runners {
                if let Err(error) = runner.dispose().await {
                    self.record_teardown_error(error);
                }
            }
        }
        *guard = Some(Vec::new());
        drop(guard);

        let errors = {
            let mut list = self
                .teardown_errors
                .lock()
                .expect("teardown error list lock poisoned");
            std::mem::take(&mut *list)
        };
        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow::Error::new(TeardownFailure::new(errors)))
        }
    }

    fn record_teardown_error(&self, error: anyhow::Error) {
        self.teardown_errors
            .lock()
            .expect("teardown error list lock poisoned")
            .push(error);
    }
}

#[async_trait]
impl TestRunner for AggregatingRunner {
    async fn explore(&self, filter: &TestFilter) -> Result<ResultDoc> {
        AggregatingRunner::explore(self, filter).await
    }

    async fn load(&self) -> Result<ResultDoc> {
        AggregatingRunner::load(self).await
    }

    async fn unload(&self) -> Result<()> {
        self.unload_package().await;
        Ok(())
    }

    async fn count_test_cases(&self, filter: &TestFilter) -> Result<usize> {
        AggregatingRunner::count_test_cases(self, filter).await
    }

    async fn run(
        &self,
        listener: Arc<dyn TestEventListener>,
        filter: &TestFilter,
    ) -> Result<ResultDoc> {
        self.run_tests(listener, filter).await
    }

    fn stop_run(&self, force: bool) -> Result<()> {
        AggregatingRunner::stop_run(self, force);
        Ok(())
    }

    async fn dispose(&self) -> Result<()> {
        AggregatingRunner::dispose(self).await
    }
}
