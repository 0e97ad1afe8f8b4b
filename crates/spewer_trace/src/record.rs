//! Trace records.

use std::fmt;

/// One emitted unit of trace output: a header line and an optional detail
/// line.
///
/// Headers have the shape `module:line: text`. Detail lines start with a tab.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    /// The `module:line: text` line.
    pub header: String,
    /// Rendered arguments or bindings, without the leading tab.
    pub detail: Option<String>,
}

impl TraceRecord {
    /// Creates a record with a header built from its parts.
    #[must_use]
    pub fn new(module: &str, line: u32, text: &str) -> Self {
        Self {
            header: format!("{module}:{line}: {text}"),
            detail: None,
        }
    }

    /// Attaches a detail line, dropping it when empty.
    #[must_use]
    pub fn with_detail(mut self, detail: String) -> Self {
        self.detail = (!detail.is_empty()).then_some(detail);
        self
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        if let Some(detail) = &self.detail {
            writeln!(f, "\t{detail}")?;
        }
        Ok(())
    }
}
