//! Safe value rendering.
//!
//! Values come from the traced program, so their display code is untrusted:
//! it may fail, panic, or recurse forever. [`ValueFormatter`] contains all
//! three and falls back to a `<TypeName object>` placeholder.

use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};

use spewer_foundation::{DEFAULT_MAX_DEPTH, Frame, Inspect, ReprContext};

/// Default cap on the characters of one rendered value.
pub const DEFAULT_MAX_LEN: usize = 256;

/// Renders values as `name=repr` without ever failing.
#[derive(Clone, Debug)]
pub struct ValueFormatter {
    max_depth: usize,
    max_len: usize,
}

impl Default for ValueFormatter {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl ValueFormatter {
    /// Creates a formatter with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nesting limit for compound values.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the output length cap, in characters.
    #[must_use]
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Renders `value`, or `None` if its display failed or panicked.
    #[must_use]
    pub fn repr(&self, value: &dyn Inspect) -> Option<String> {
        let attempt = catch_unwind(AssertUnwindSafe(|| {
            let mut ctx = ReprContext::with_max_depth(self.max_depth);
            value.inspect(&mut ctx).map(|()| ctx.finish())
        }));
        match attempt {
            Ok(Ok(text)) => Some(self.truncate(text)),
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "value is not representable");
                None
            }
            Err(_) => {
                tracing::debug!("value display panicked");
                None
            }
        }
    }

    /// Renders `value`, falling back to `<TypeName object>`.
    #[must_use]
    pub fn repr_or_placeholder(&self, value: &dyn Inspect) -> String {
        self.repr(value).unwrap_or_else(|| placeholder(value))
    }

    /// Renders `name=repr`.
    #[must_use]
    pub fn render(&self, name: &str, value: &dyn Inspect) -> String {
        format!("{name}={}", self.repr_or_placeholder(value))
    }

    /// Renders `Kind(repr)` for an exception.
    #[must_use]
    pub fn render_exception(&self, kind: &str, value: &dyn Inspect) -> String {
        format!("{kind}({})", self.repr_or_placeholder(value))
    }

    /// Renders `name=repr` for a name bound in the frame's locals, else its
    /// globals. `None` if the name is unbound.
    #[must_use]
    pub fn render_lookup(&self, name: &str, frame: &dyn Frame) -> Option<String> {
        lookup(frame, name).map(|value| self.render(name, value))
    }

    /// Renders every bound token, once per name, separated by spaces.
    #[must_use]
    pub fn render_tokens(&self, tokens: &[&str], frame: &dyn Frame) -> String {
        let mut seen = HashSet::new();
        tokens
            .iter()
            .filter(|token| seen.insert(**token))
            .filter_map(|token| self.render_lookup(token, frame))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Renders a frame's locals in binding order, separated by `, `. Names
    /// starting with `__` are skipped.
    #[must_use]
    pub fn render_args(&self, frame: &dyn Frame) -> String {
        frame
            .locals()
            .entries()
            .into_iter()
            .filter(|(name, _)| !name.starts_with("__"))
            .map(|(name, value)| self.render(name, value))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn truncate(&self, text: String) -> String {
        match text.char_indices().nth(self.max_len) {
            Some((cut, _)) => format!("{}...", &text[..cut]),
            None => text,
        }
    }
}

/// Looks a name up in locals, then globals.
fn lookup<'f>(frame: &'f dyn Frame, name: &str) -> Option<&'f dyn Inspect> {
    frame
        .locals()
        .get(name)
        .or_else(|| frame.globals().get(name))
}

fn placeholder(value: &dyn Inspect) -> String {
    catch_unwind(AssertUnwindSafe(|| format!("<{} object>", value.type_name())))
        .unwrap_or_else(|_| "<object>".to_string())
}
