//! # Process Runner Module / 进程运行器模块
//!
//! A leaf runner that executes one configured shell command per package as
//! an asynchronous subprocess: the `command` setting is expanded and split,
//! the child's combined output is captured, and the outcome is reported as
//! a result document with timing attributes. A forced stop kills the
//! in-flight child; a non-forced stop lets it run to completion, since one
//! process is the smallest unit of cooperative completion.
//!
//! 每个包执行一个配置的 shell 命令作为异步子进程的叶子运行器：
//! `command` 设置被展开和拆分，子进程的合并输出被捕获，
//! 结果作为带有计时属性的结果文档报告。强制停止会杀死进行中的子进程；
//! 非强制停止让它运行完成，因为一个进程是协作完成的最小单元。

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::core::models::{ResultDoc, TestEvent, TestEventListener, TestFilter};
use crate::core::package::{keys, Package};
use crate::core::runner::{RunnerFactory, RunnerHandle, TestRunner};
use crate::infra::command::{run_and_capture, CommandOutcome};

/// The element name of a single process-backed suite result.
const TEST_SUITE: &str = "test-suite";

#[derive(Debug, Clone)]
struct PreparedCommand {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

/// Runs one leaf package by executing its configured command.
pub struct ProcessRunner {
    package: Package,
    prepared: Mutex<Option<PreparedCommand>>,
    stop_token: Mutex<CancellationToken>,
    disposed: AtomicBool,
}

impl ProcessRunner {
    pub fn new(package: Package) -> Self {
        Self {
            package,
            prepared: Mutex::new(None),
            stop_token: Mutex::new(CancellationToken::new()),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    fn ensure_not_disposed(&self) -> Result<()> {
        if self.disposed.load(Ordering::SeqCst) {
            bail!(
                "runner for package '{}' has already been disposed",
                self.package.name()
            );
        }
        Ok(())
    }

    /// Expands and splits the package's `command` setting.
    fn prepare(&self) -> Result<PreparedCommand> {
        let raw = self.package.get_str(keys::COMMAND).ok_or_else(|| {
            anyhow!(
                "package '{}' has no '{}' setting",
                self.package.name(),
                keys::COMMAND
            )
        })?;

        let expanded = shellexpand::full(raw)
            .with_context(|| format!("failed to expand command: {raw}"))?
            .to_string();

        let parts = shlex::split(&expanded)
            .ok_or_else(|| anyhow!("failed to parse command: {}", expanded))?;
        if parts.is_empty() {
            bail!("empty command after parsing: {}", expanded);
        }

        let working_dir = self.package.get_str(keys::WORKING_DIR).map(PathBuf::from);

        Ok(PreparedCommand {
            program: parts[0].clone(),
            args: parts[1..].to_vec(),
            working_dir,
        })
    }

    /// Returns the prepared command, loading it on demand so a run without
    /// an explicit `load` still works.
    fn prepared_command(&self) -> Result<PreparedCommand> {
        let mut prepared = self.prepared.lock().expect("prepared command lock poisoned");
        if let Some(command) = prepared.as_ref() {
            return Ok(command.clone());
        }
        let command = self.prepare()?;
        *prepared = Some(command.clone());
        Ok(command)
    }

    /// The cancellation token for the next run. A token spent by an earlier
    /// forced stop is replaced, so the runner stays usable afterwards.
    fn run_token(&self) -> CancellationToken {
        let mut token = self.stop_token.lock().expect("stop token lock poisoned");
        if token.is_cancelled() {
            *token = CancellationToken::new();
        }
        token.clone()
    }

    fn timeout(&self) -> Option<Duration> {
        match self.package.get_int(keys::TIMEOUT_SECS, 0) {
            secs if secs > 0 => Some(Duration::from_secs(secs as u64)),
            _ => None,
        }
    }

    fn base_doc(&self) -> ResultDoc {
        ResultDoc::new(TEST_SUITE).with_attribute("name", self.package.name())
    }

    fn skipped_doc(&self) -> ResultDoc {
        self.base_doc().with_attribute("result", "Skipped")
    }
}

#[async_trait]
impl TestRunner for ProcessRunner {
    async fn explore(&self, filter: &TestFilter) -> Result<ResultDoc> {
        self.ensure_not_disposed()?;
        let mut doc = self
            .base_doc()
            .with_attribute("runnable", filter.matches(self.package.name()).to_string());
        if let Some(command) = self.package.get_str(keys::COMMAND) {
            doc = doc.with_attribute("command", command);
        }
        Ok(doc)
    }

    async fn load(&self) -> Result<ResultDoc> {
        self.ensure_not_disposed()?;
        let command = self.prepare()?;
        let doc = self
            .base_doc()
            .with_attribute("state", "Loaded")
            .with_attribute("command", command.program.clone());
        *self.prepared.lock().expect("prepared command lock poisoned") = Some(command);
        Ok(doc)
    }

    async fn unload(&self) -> Result<()> {
        self.ensure_not_disposed()?;
        self.prepared
            .lock()
            .expect("prepared command lock poisoned")
            .take();
        Ok(())
    }

    async fn count_test_cases(&self, filter: &TestFilter) -> Result<usize> {
        self.ensure_not_disposed()?;
        Ok(filter.matches(self.package.name()) as usize)
    }

    async fn run(
        &self,
        listener: Arc<dyn TestEventListener>,
        filter: &TestFilter,
    ) -> Result<ResultDoc> {
        self.ensure_not_disposed()?;

        let name = self.package.name().to_string();
        if !filter.matches(&name) {
            return Ok(self.skipped_doc());
        }

        let prepared = self.prepared_command()?;
        let token = self.run_token();
        let timeout = self.timeout();

        listener.on_test_event(&TestEvent::TestStarted { name: name.clone() });

        let mut cmd = tokio::process::Command::new(&prepared.program);
        cmd.args(&prepared.args).kill_on_drop(true);
        if let Some(dir) = &prepared.working_dir {
            cmd.current_dir(dir);
        }

        let start_time = Utc::now();
        let started = Instant::now();
        let outcome = run_and_capture(cmd, &token, timeout).await.with_context(|| {
            format!(
                "failed to execute command '{}' for package '{}'",
                prepared.program, name
            )
        })?;
        let duration = started.elapsed();

        let mut doc = self
            .base_doc()
            .with_attribute("start-time", start_time.to_rfc3339())
            .with_attribute("end-time", Utc::now().to_rfc3339())
            .with_attribute("duration", format!("{:.3}", duration.as_secs_f64()));

        let output = match outcome {
            CommandOutcome::Completed { status, output } => {
                if status.success() {
                    doc = doc.with_attribute("result", "Passed");
                } else {
                    doc = doc
                        .with_attribute("result", "Failed")
                        .with_attribute("failure-reason", "exit-code");
                }
                if let Some(code) = status.code() {
                    doc = doc.with_attribute("exit-code", code.to_string());
                }
                output
            }
            CommandOutcome::Stopped { output } => {
                doc = doc
                    .with_attribute("result", "Failed")
                    .with_attribute("failure-reason", "stopped");
                output
            }
            CommandOutcome::TimedOut { output } => {
                doc = doc
                    .with_attribute("result", "Failed")
                    .with_attribute("failure-reason", "timed-out");
                output
            }
        };

        for line in output.lines() {
            listener.on_test_event(&TestEvent::TestOutput {
                name: name.clone(),
                line: line.to_string(),
            });
        }
        doc = doc.with_attribute("output", output);

        listener.on_test_event(&TestEvent::TestFinished {
            result: doc.clone(),
        });

        Ok(doc)
    }

    fn stop_run(&self, force: bool) -> Result<()> {
        // A leaf runs one process, so cooperative completion means letting
        // the in-flight child finish; only a forced stop interrupts it.
        if force {
            self.stop_token
                .lock()
                .expect("stop token lock poisoned")
                .cancel();
        }
        Ok(())
    }

    async fn dispose(&self) -> Result<()> {
        self.stop_token
            .lock()
            .expect("stop token lock poisoned")
            .cancel();
        self.prepared
            .lock()
            .expect("prepared command lock poisoned")
            .take();
        self.disposed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Creates one [`ProcessRunner`] per leaf package. Fails fast at
/// materialization time when a leaf has no `command` setting.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunnerFactory;

impl ProcessRunnerFactory {
    pub fn new() -> Self {
        Self
    }
}

impl RunnerFactory for ProcessRunnerFactory {
    fn make_runner(&self, package: &Package) -> Result<RunnerHandle> {
        if package.get_str(keys::COMMAND).is_none() {
            bail!(
                "leaf package '{}' has no '{}' setting",
                package.name(),
                keys::COMMAND
            );
        }
        Ok(Arc::new(ProcessRunner::new(package.clone())))
    }
}
