//! # Execution Task Module / 执行任务模块
//!
//! An execution task wraps exactly one runner invocation as a unit of work
//! the scheduler operates on. It captures both the run result and any
//! teardown error, and never panics out of `execute`: a failed run is a
//! legitimate signal the caller must see, while a teardown-only failure
//! must not mask a valid result.
//!
//! 执行任务将恰好一次运行器调用包装为调度器操作的工作单元。
//! 它同时捕获运行结果和任何清理错误，并且绝不会从 `execute` 中 panic：
//! 失败的运行是调用者必须看到的合法信号，而仅清理的失败不得掩盖有效结果。

use anyhow::Result;
use std::sync::Arc;

use crate::core::models::{ResultDoc, TestEventListener, TestFilter};
use crate::core::runner::{RunnerHandle, TestRunner};

/// One {runner, listener, filter, dispose-after flag} unit of work.
pub struct ExecutionTask {
    runner: RunnerHandle,
    listener: Arc<dyn TestEventListener>,
    filter: TestFilter,
    dispose_runner: bool,
}

/// What a task produced: the captured run result (`Ok(None)` only when the
/// runner produced nothing) and the captured teardown error, if any.
pub struct TaskOutput {
    pub result: Result<Option<ResultDoc>>,
    pub teardown_error: Option<anyhow::Error>,
}

impl ExecutionTask {
    pub fn new(
        runner: RunnerHandle,
        listener: Arc<dyn TestEventListener>,
        filter: TestFilter,
        dispose_runner: bool,
    ) -> Self {
        Self {
            runner,
            listener,
            filter,
            dispose_runner,
        }
    }

    /// Runs the task to completion. When the dispose-after flag is set the
    /// runner is unloaded and disposed regardless of whether the run
    /// succeeded; an error from that cleanup is stored on the output rather
    /// than replacing the run result.
    pub async fn execute(self) -> TaskOutput {
        let ExecutionTask {
            runner,
            listener,
            filter,
            dispose_runner,
        } = self;

        let result = runner.run(listener, &filter).await.map(Some);

        let teardown_error = if dispose_runner {
            Self::teardown(runner.as_ref()).await.err()
        } else {
            None
        };

        TaskOutput {
            result,
            teardown_error,
        }
    }

    async fn teardown(runner: &dyn TestRunner) -> Result<()> {
        runner.unload().await?;
        runner.dispose().await
    }
}
