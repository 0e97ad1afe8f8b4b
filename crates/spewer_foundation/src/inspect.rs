//! Safe, depth-bounded display of runtime values.
//!
//! Values render themselves into a [`ReprContext`]. Nested values go through
//! [`ReprContext::nested`], which refuses to descend past a fixed depth. A
//! display routine that recurses into itself therefore ends in
//! [`ReprError::DepthExceeded`] instead of overflowing the stack.

use std::fmt;

use thiserror::Error;

/// Default nesting limit for [`ReprContext`].
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Why a value could not be represented.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReprError {
    /// Nested representation went deeper than the context allows.
    #[error("representation nested deeper than {limit} levels")]
    DepthExceeded {
        /// The configured depth limit.
        limit: usize,
    },

    /// The value's display routine reported a failure.
    #[error("representation failed: {0}")]
    Failed(String),
}

/// A value that can attempt to display itself.
///
/// This is the only capability the tracer needs from a runtime's values.
/// Implementations may fail; callers are expected to recover.
pub trait Inspect {
    /// Name of the value's runtime type, used in placeholders.
    fn type_name(&self) -> &str;

    /// Writes a representation of `self` into `ctx`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented, including when a
    /// nested value exceeds the context's depth limit.
    fn inspect(&self, ctx: &mut ReprContext) -> Result<(), ReprError>;
}

/// Output buffer and recursion budget for one representation.
#[derive(Debug)]
pub struct ReprContext {
    out: String,
    depth: usize,
    max_depth: usize,
}

impl Default for ReprContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ReprContext {
    /// Creates a context with [`DEFAULT_MAX_DEPTH`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Creates a context with an explicit nesting limit.
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            max_depth,
        }
    }

    /// Appends literal text.
    pub fn push_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// Appends formatted text; lets implementations use `write!(ctx, ...)`.
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) {
        // Writing into a String cannot fail.
        let _ = fmt::Write::write_fmt(&mut self.out, args);
    }

    /// Represents a nested value one level deeper.
    ///
    /// # Errors
    ///
    /// Returns [`ReprError::DepthExceeded`] when the limit is reached, or
    /// whatever the nested value's `inspect` returns.
    pub fn nested(&mut self, value: &dyn Inspect) -> Result<(), ReprError> {
        if self.depth >= self.max_depth {
            return Err(ReprError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = value.inspect(self);
        self.depth -= 1;
        result
    }

    /// Current nesting depth.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Consumes the context and returns the text.
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }
}

/// Represents a value with a fresh default context.
///
/// # Errors
///
/// Propagates any [`ReprError`] from the value.
pub fn repr(value: &dyn Inspect) -> Result<String, ReprError> {
    let mut ctx = ReprContext::new();
    ctx.nested(value)?;
    Ok(ctx.finish())
}
