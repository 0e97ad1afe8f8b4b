//! Activations and the [`Frame`] view an observer sees of them.

use std::sync::Arc;

use spewer_foundation::{Frame, Observer, Origin, Scope, SourceError, SourceLines};

use super::Module;
use crate::bindings::Bindings;

/// One in-progress call, kept on the Rust stack while it runs.
pub(crate) struct Activation {
    /// Index of the owning module.
    pub module: usize,
    /// Function name, or `<module>` for top-level code.
    pub code_name: Arc<str>,
    /// Function locals. `None` for top-level code, whose locals are the
    /// module globals.
    pub locals: Option<Bindings>,
    /// Line of the statement being executed.
    pub line: u32,
    /// Count of statements executed so far.
    pub instruction: usize,
    /// Observer attached to this activation by its enter event.
    pub observer: Option<Arc<dyn Observer>>,
    /// First and last source lines of the code.
    pub span: (u32, u32),
}

impl Activation {
    pub fn new(module: usize, code_name: Arc<str>, locals: Option<Bindings>, span: (u32, u32)) -> Self {
        Self {
            module,
            code_name,
            locals,
            line: span.0,
            instruction: 0,
            observer: None,
            span,
        }
    }
}

/// Borrowed view of an activation, handed to observers.
pub(crate) struct FrameView<'a> {
    pub act: &'a Activation,
    pub module: &'a Module,
}

impl Frame for FrameView<'_> {
    fn origin(&self) -> Option<Origin<'_>> {
        self.module.path.as_deref().map(|path| Origin {
            module: &self.module.name,
            path,
        })
    }

    fn line(&self) -> u32 {
        self.act.line
    }

    fn instruction(&self) -> usize {
        self.act.instruction
    }

    fn code_name(&self) -> &str {
        &self.act.code_name
    }

    fn locals(&self) -> &dyn Scope {
        match &self.act.locals {
            Some(locals) => locals,
            None => &self.module.globals,
        }
    }

    fn globals(&self) -> &dyn Scope {
        &self.module.globals
    }

    fn reconstruct_source(&self) -> Result<SourceLines, SourceError> {
        let not_found = || SourceError::NotFound {
            code: self.act.code_name.to_string(),
        };
        let source = self.module.source.as_ref().ok_or_else(not_found)?;
        let (first, last) = self.act.span;
        let start = usize::try_from(first.saturating_sub(1)).map_err(|_| not_found())?;
        let end = usize::try_from(last)
            .map_err(|_| not_found())?
            .min(source.len());
        let lines = source.get(start..end).ok_or_else(not_found)?;
        Ok(SourceLines {
            first_line: first,
            lines: lines.to_vec(),
        })
    }
}
