//! Shared fixtures for trace tests.

use std::path::Path;
use std::sync::Arc;

use spewer_foundation::ObserverSlot;
use spewer_language::Vm;
use spewer_trace::{SharedBuffer, SpewGuard, TraceHook, TraceOutput, TracerConfig};
use tempfile::TempDir;

/// A VM with its own slot, scripts on disk, and a buffer for records.
pub struct Harness {
    pub vm: Vm,
    pub slot: Arc<ObserverSlot>,
    pub buffer: SharedBuffer,
    dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let slot = Arc::new(ObserverSlot::new());
        Self {
            vm: Vm::with_slot(Arc::clone(&slot)),
            slot,
            buffer: SharedBuffer::new(),
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Writes `<name>.spw` and loads it as module `name`.
    pub fn file(mut self, name: &str, source: &str) -> Self {
        let path = self.dir.path().join(format!("{name}.spw"));
        std::fs::write(&path, source).unwrap();
        self.vm.load_file(&path).unwrap();
        self
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// A hook writing into this harness's buffer.
    pub fn hook(&self, config: TracerConfig) -> Arc<TraceHook> {
        Arc::new(TraceHook::with_output(
            config,
            TraceOutput::Buffer(self.buffer.clone()),
        ))
    }

    /// Installs a tracer for as long as the guard lives.
    pub fn trace(&self, config: TracerConfig) -> SpewGuard {
        SpewGuard::new(Arc::clone(&self.slot), self.hook(config))
    }

    pub fn lines(&self) -> Vec<String> {
        self.buffer.lines()
    }

    /// Lines that start a record.
    pub fn headers(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| !line.starts_with('\t'))
            .collect()
    }
}

/// Module name of a header line.
pub fn module_of(header: &str) -> &str {
    header.split(':').next().unwrap_or_default()
}

pub fn functions_only() -> TracerConfig {
    TracerConfig::builder()
        .with_functions_only(true)
        .build()
        .unwrap()
}
