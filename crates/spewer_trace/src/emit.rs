//! Record output.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::record::TraceRecord;

// =============================================================================
// Trace Output
// =============================================================================

/// Where trace records are written.
#[derive(Clone, Debug, Default)]
pub enum TraceOutput {
    /// Standard error.
    #[default]
    Stderr,
    /// Standard output.
    Stdout,
    /// An in-memory buffer.
    Buffer(SharedBuffer),
}

/// A cloneable in-memory sink. Clones share the same bytes.
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Everything written so far, split into lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(String::from).collect()
    }

    /// Discards the contents.
    pub fn clear(&self) {
        self.bytes.lock().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// Emitter
// =============================================================================

/// Writes records to a [`TraceOutput`].
#[derive(Clone, Debug, Default)]
pub struct Emitter {
    output: TraceOutput,
}

impl Emitter {
    /// Creates an emitter for `output`.
    #[must_use]
    pub fn new(output: TraceOutput) -> Self {
        Self { output }
    }

    /// The destination.
    #[must_use]
    pub fn output(&self) -> &TraceOutput {
        &self.output
    }

    /// Writes one record. The header and detail lines are written under one
    /// lock so they stay adjacent. Write failures are ignored.
    pub fn emit(&self, record: &TraceRecord) {
        let text = record.to_string();
        let _ = match &self.output {
            TraceOutput::Stderr => io::stderr().lock().write_all(text.as_bytes()),
            TraceOutput::Stdout => io::stdout().lock().write_all(text.as_bytes()),
            TraceOutput::Buffer(buffer) => buffer.bytes.lock().write_all(text.as_bytes()),
        };
    }
}
