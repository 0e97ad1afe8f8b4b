//! What a runtime exposes about one live activation.
//!
//! The tracer never talks to an interpreter directly. It sees a [`Frame`]:
//! where the code came from, which line is executing, and two read-only
//! [`Scope`]s of bindings. Any runtime with comparable introspection can
//! implement these traits.

use std::path::Path;

use thiserror::Error;

use crate::inspect::Inspect;

/// File identity of the code behind a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Origin<'a> {
    /// Module-qualified name of the code's module.
    pub module: &'a str,
    /// Path the module was loaded from (possibly a compiled artifact).
    pub path: &'a Path,
}

/// Source lines re-derived by the runtime for a code object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLines {
    /// Line number of `lines[0]` (1-indexed).
    pub first_line: u32,
    /// The lines, without trailing newlines.
    pub lines: Vec<String>,
}

impl SourceLines {
    /// Returns the text of an absolute line number, if covered.
    #[must_use]
    pub fn line(&self, line: u32) -> Option<&str> {
        let index = line.checked_sub(self.first_line)?;
        self.lines
            .get(usize::try_from(index).ok()?)
            .map(String::as_str)
    }
}

/// Why a runtime could not reconstruct source for a frame.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The runtime has no source text for this code.
    #[error("no source available for code `{code}`")]
    NotFound {
        /// Name of the code object.
        code: String,
    },
}

/// A read-only mapping of names to values.
pub trait Scope {
    /// Looks up a binding by name.
    fn get(&self, name: &str) -> Option<&dyn Inspect>;

    /// All bindings, in binding order.
    fn entries(&self) -> Vec<(&str, &dyn Inspect)>;

    /// Returns true if `name` is bound.
    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// One in-progress activation, as seen by an observer.
pub trait Frame {
    /// File identity, present only when the code was loaded from a file.
    fn origin(&self) -> Option<Origin<'_>>;

    /// Current line number (1-indexed).
    fn line(&self) -> u32;

    /// Offset of the last instruction executed in this activation.
    fn instruction(&self) -> usize;

    /// Name of the code object (function name, or `<module>`).
    fn code_name(&self) -> &str;

    /// Bindings local to this activation.
    fn locals(&self) -> &dyn Scope;

    /// Bindings global to the code's module.
    fn globals(&self) -> &dyn Scope;

    /// Asks the runtime to re-derive source lines for this frame's code.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] when the runtime kept no source.
    fn reconstruct_source(&self) -> Result<SourceLines, SourceError>;
}
