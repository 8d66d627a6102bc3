//! # Worker Pool Module / 工作池模块
//!
//! A bounded-concurrency executor for execution tasks with the contract
//! `enqueue(task)*; start(); wait_all()`. Workers greedily pull the next
//! unexecuted task from a shared queue, so at most `workers` tasks execute
//! at any instant; `wait_all` is a hard barrier that returns outputs in
//! submission order regardless of completion order.
//!
//! 执行任务的有界并发执行器，契约为 `enqueue(task)*; start(); wait_all()`。
//! 工作者从共享队列中贪婪地拉取下一个未执行的任务，因此任一时刻最多有
//! `workers` 个任务在执行；`wait_all` 是硬屏障，无论完成顺序如何，
//! 都按提交顺序返回输出。

use anyhow::anyhow;
use futures::FutureExt;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use crate::core::task::{ExecutionTask, TaskOutput};

type SharedQueue = Arc<Mutex<VecDeque<(usize, ExecutionTask)>>>;
type OutputSlots = Arc<Mutex<Vec<Option<TaskOutput>>>>;

/// A fixed-size pool of workers over an ordered queue of submitted tasks.
pub struct WorkerPool {
    workers: usize,
    queue: Vec<ExecutionTask>,
    running: Option<RunningState>,
}

struct RunningState {
    handles: Vec<JoinHandle<()>>,
    outputs: OutputSlots,
}

impl WorkerPool {
    /// Creates a pool that executes at most `workers` tasks concurrently.
    /// A worker count of zero is treated as one.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            queue: Vec::new(),
            running: None,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Submits a task. Tasks enqueued after `start` are not picked up.
    pub fn enqueue(&mut self, task: ExecutionTask) {
        self.queue.push(task);
    }

    /// Number of tasks submitted and not yet handed to the workers.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Dispatches the queued tasks across the workers. Each worker loops,
    /// pulling the next task until the queue is drained. A task that panics
    /// is recorded as that task's failed output; the worker keeps pulling,
    /// so one task can never crash the others.
    pub fn start(&mut self) {
        if self.running.is_some() {
            return;
        }

        let tasks = std::mem::take(&mut self.queue);
        let total = tasks.len();
        let queue: SharedQueue = Arc::new(Mutex::new(tasks.into_iter().enumerate().collect()));
        let outputs: OutputSlots = Arc::new(Mutex::new((0..total).map(|_| None).collect()));

        let worker_count = self.workers.min(total);
        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let queue = Arc::clone(&queue);
            let outputs = Arc::clone(&outputs);
            handles.push(tokio::spawn(async move {
                loop {
                    let next = queue.lock().expect("worker queue lock poisoned").pop_front();
                    let Some((index, task)) = next else {
                        break;
                    };

                    let output = match AssertUnwindSafe(task.execute()).catch_unwind().await {
                        Ok(output) => output,
                        Err(panic) => TaskOutput {
                            result: Err(anyhow!(
                                "task {index} panicked in worker {worker_id}: {}",
                                panic_message(panic.as_ref())
                            )),
                            teardown_error: None,
                        },
                    };

                    outputs.lock().expect("output slots lock poisoned")[index] = Some(output);
                }
            }));
        }

        self.running = Some(RunningState { handles, outputs });
    }

    /// Blocks until every submitted task has finished executing, then
    /// returns the outputs in submission order. This is a hard barrier: the
    /// pool never reports completion while any worker is still active. A
    /// worker that dies outside the per-task panic capture leaves its
    /// remaining slot recorded as abandoned; surfacing that is the caller's
    /// business, not the pool's.
    pub async fn wait_all(mut self) -> Vec<TaskOutput> {
        let Some(state) = self.running.take() else {
            return Vec::new();
        };

        for handle in state.handles {
            let _ = handle.await;
        }

        let mut slots = state.outputs.lock().expect("output slots lock poisoned");
        std::mem::take(&mut *slots)
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| TaskOutput {
                    result: Err(anyhow!("task was abandoned by its worker")),
                    teardown_error: None,
                })
            })
            .collect()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
