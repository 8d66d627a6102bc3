// Shared test helpers: a scripted fake runner and factory used to observe
// how the aggregating runner fans operations out across its handles.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use suite_runner::core::models::{ResultDoc, TestEvent, TestEventListener, TestFilter};
use suite_runner::core::package::{Package, SettingValue, Settings};
use suite_runner::core::runner::{RunnerFactory, RunnerHandle, TestRunner};

/// Per-runner call counters, shared with the test body through the factory.
#[derive(Default)]
pub struct CallLog {
    pub explore: AtomicUsize,
    pub load: AtomicUsize,
    pub unload: AtomicUsize,
    pub count: AtomicUsize,
    pub run: AtomicUsize,
    pub stop: AtomicUsize,
    pub dispose: AtomicUsize,
    pub stop_forced: AtomicBool,
}

/// Tracks how many fake runs execute concurrently, and the highest value
/// that gauge ever reached.
#[derive(Default)]
pub struct ConcurrencyGauge {
    pub current: AtomicUsize,
    pub max: AtomicUsize,
}

/// Scripted behavior for one fake runner.
#[derive(Clone, Default)]
pub struct FakeSpec {
    pub run_delay_ms: u64,
    pub test_count: usize,
    pub fail_run: bool,
    pub panic_run: bool,
    pub fail_unload: bool,
    pub fail_dispose: bool,
    pub fail_stop: bool,
    pub gauge: Option<Arc<ConcurrencyGauge>>,
}

pub struct FakeRunner {
    name: String,
    spec: FakeSpec,
    pub calls: Arc<CallLog>,
}

impl FakeRunner {
    pub fn new(name: impl Into<String>, spec: FakeSpec) -> Self {
        Self {
            name: name.into(),
            spec,
            calls: Arc::new(CallLog::default()),
        }
    }

    pub fn into_handle(self) -> RunnerHandle {
        Arc::new(self)
    }
}

/// A bare suite node result for one fake package.
pub fn leaf_doc(name: &str) -> ResultDoc {
    ResultDoc::new("test-suite").with_attribute("name", name)
}

#[async_trait]
impl TestRunner for FakeRunner {
    async fn explore(&self, _filter: &TestFilter) -> Result<ResultDoc> {
        self.calls.explore.fetch_add(1, Ordering::SeqCst);
        Ok(leaf_doc(&self.name))
    }

    async fn load(&self) -> Result<ResultDoc> {
        self.calls.load.fetch_add(1, Ordering::SeqCst);
        Ok(leaf_doc(&self.name).with_attribute("state", "Loaded"))
    }

    async fn unload(&self) -> Result<()> {
        self.calls.unload.fetch_add(1, Ordering::SeqCst);
        if self.spec.fail_unload {
            return Err(anyhow!("unload failed for '{}'", self.name));
        }
        Ok(())
    }

    async fn count_test_cases(&self, _filter: &TestFilter) -> Result<usize> {
        self.calls.count.fetch_add(1, Ordering::SeqCst);
        Ok(self.spec.test_count)
    }

    async fn run(
        &self,
        listener: Arc<dyn TestEventListener>,
        _filter: &TestFilter,
    ) -> Result<ResultDoc> {
        self.calls.run.fetch_add(1, Ordering::SeqCst);
        listener.on_test_event(&TestEvent::TestStarted {
            name: self.name.clone(),
        });

        if let Some(gauge) = &self.spec.gauge {
            let now = gauge.current.fetch_add(1, Ordering::SeqCst) + 1;
            gauge.max.fetch_max(now, Ordering::SeqCst);
        }
        if self.spec.run_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.spec.run_delay_ms)).await;
        }
        if let Some(gauge) = &self.spec.gauge {
            gauge.current.fetch_sub(1, Ordering::SeqCst);
        }

        if self.spec.panic_run {
            panic!("run panicked for '{}'", self.name);
        }
        if self.spec.fail_run {
            return Err(anyhow!("run failed for '{}'", self.name));
        }

        let doc = leaf_doc(&self.name).with_attribute("result", "Passed");
        listener.on_test_event(&TestEvent::TestFinished {
            result: doc.clone(),
        });
        Ok(doc)
    }

    fn stop_run(&self, force: bool) -> Result<()> {
        self.calls.stop.fetch_add(1, Ordering::SeqCst);
        if force {
            self.calls.stop_forced.store(true, Ordering::SeqCst);
        }
        if self.spec.fail_stop {
            return Err(anyhow!("stop failed for '{}'", self.name));
        }
        Ok(())
    }

    async fn dispose(&self) -> Result<()> {
        self.calls.dispose.fetch_add(1, Ordering::SeqCst);
        if self.spec.fail_dispose {
            return Err(anyhow!("dispose failed for '{}'", self.name));
        }
        Ok(())
    }
}

/// Creates fake runners per leaf package and keeps hold of their call logs
/// so tests can assert what the aggregate did to each handle.
#[derive(Default)]
pub struct FakeFactory {
    specs: Mutex<BTreeMap<String, FakeSpec>>,
    logs: Mutex<Vec<(String, Arc<CallLog>)>>,
    made: AtomicUsize,
}

impl FakeFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_spec(&self, name: &str, spec: FakeSpec) {
        self.specs
            .lock()
            .unwrap()
            .insert(name.to_string(), spec);
    }

    /// How many runners this factory has created.
    pub fn runner_count(&self) -> usize {
        self.made.load(Ordering::SeqCst)
    }

    /// The call log of the runner created for `name`.
    pub fn log_for(&self, name: &str) -> Arc<CallLog> {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .find(|(runner, _)| runner == name)
            .map(|(_, log)| Arc::clone(log))
            .unwrap_or_else(|| panic!("no runner was created for '{name}'"))
    }
}

impl RunnerFactory for FakeFactory {
    fn make_runner(&self, package: &Package) -> Result<RunnerHandle> {
        let spec = self
            .specs
            .lock()
            .unwrap()
            .get(package.name())
            .cloned()
            .unwrap_or_default();
        let runner = FakeRunner::new(package.name(), spec);
        self.logs
            .lock()
            .unwrap()
            .push((package.name().to_string(), Arc::clone(&runner.calls)));
        self.made.fetch_add(1, Ordering::SeqCst);
        Ok(runner.into_handle())
    }
}

/// Records every event kind it sees, tagged with the package name.
#[derive(Default)]
pub struct RecordingListener {
    pub events: Mutex<Vec<String>>,
}

impl TestEventListener for RecordingListener {
    fn on_test_event(&self, event: &TestEvent) {
        let entry = match event {
            TestEvent::RunStarted { name, .. } => format!("run-started:{name}"),
            TestEvent::TestStarted { name } => format!("test-started:{name}"),
            TestEvent::TestOutput { name, .. } => format!("test-output:{name}"),
            TestEvent::TestFinished { result } => {
                format!("test-finished:{}", result.attribute("name").unwrap_or("?"))
            }
            TestEvent::RunFinished { name } => format!("run-finished:{name}"),
        };
        self.events.lock().unwrap().push(entry);
    }
}

/// A suite package whose children are leaves with the given names.
pub fn package_with_leaves(names: &[&str]) -> Package {
    package_with_leaves_and_settings(names, Settings::new())
}

/// Same as [`package_with_leaves`], with suite-level settings.
pub fn package_with_leaves_and_settings(names: &[&str], settings: Settings) -> Package {
    let children = names
        .iter()
        .map(|name| Package::leaf(*name, Settings::new()))
        .collect();
    Package::new("suite", settings, children)
}

/// Builds a settings map from literal pairs.
pub fn settings_of(pairs: &[(&str, SettingValue)]) -> Settings {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

/// The names of the merged document's children, in order.
pub fn child_names(doc: &ResultDoc) -> Vec<String> {
    doc.children
        .iter()
        .map(|child| child.attribute("name").unwrap_or("?").to_string())
        .collect()
}
