//! The event filter and dispatcher.
//!
//! [`TraceHook`] is the observer a runtime calls for every event. It decides
//! whether the event is reported under the current configuration, builds the
//! [`TraceRecord`] and hands it to the emitter.
//!
//! Routing, first match wins:
//!
//! | mode           | event                          | record            |
//! |----------------|--------------------------------|-------------------|
//! | functions-only | enter                          | function-enter    |
//! | functions-only | exit, if returns traced        | function-exit     |
//! | functions-only | raise, if exceptions traced    | function-raise    |
//! | functions-only | native-enter, if natives traced| native-enter      |
//! | lines          | step                           | line-step         |
//! | lines          | exit, if returns traced        | line-exit         |
//! | lines          | raise, if exceptions traced    | line-raise        |
//!
//! Everything else is ignored. The hook never lets a failure escape into the
//! traced program: the handler runs under `catch_unwind`, and a nested
//! dispatch on the same thread (a value's display code running traced code)
//! is suppressed.

use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use spewer_foundation::{ExecutionEvent, Frame, Inspect, Observer};

use crate::config::TracerConfig;
use crate::emit::{Emitter, TraceOutput};
use crate::record::TraceRecord;
use crate::render::ValueFormatter;
use crate::scan::tokens;
use crate::source::SourceResolver;

thread_local! {
    static DISPATCHING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside [`TraceHook::observe`] until dropped.
struct DispatchGuard;

impl DispatchGuard {
    fn enter() -> Option<Self> {
        DISPATCHING.with(|flag| (!flag.replace(true)).then_some(Self))
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|flag| flag.set(false));
    }
}

/// What kind of record an event produces, with the payload it needs.
enum Route<'e> {
    FunctionEnter,
    FunctionExit { value: &'e dyn Inspect },
    FunctionRaise { kind: &'e str, value: &'e dyn Inspect },
    NativeEnter { callee: &'e str },
    LineStep,
    LineExit { value: &'e dyn Inspect },
    LineRaise { kind: &'e str, value: &'e dyn Inspect },
}

/// Turns execution events into trace records.
#[derive(Debug)]
pub struct TraceHook {
    config: Arc<TracerConfig>,
    resolver: SourceResolver,
    formatter: ValueFormatter,
    emitter: Emitter,
}

impl TraceHook {
    /// Creates a hook that writes to standard error.
    #[must_use]
    pub fn new(config: TracerConfig) -> Self {
        Self::with_output(config, TraceOutput::default())
    }

    /// Creates a hook that writes to `output`.
    #[must_use]
    pub fn with_output(config: TracerConfig, output: TraceOutput) -> Self {
        Self::with_shared_config(Arc::new(config), output)
    }

    /// Creates a hook sharing an existing configuration.
    #[must_use]
    pub fn with_shared_config(config: Arc<TracerConfig>, output: TraceOutput) -> Self {
        Self {
            resolver: SourceResolver::new(&config),
            formatter: ValueFormatter::new(),
            emitter: Emitter::new(output),
            config,
        }
    }

    /// Replaces the value formatter.
    #[must_use]
    pub fn with_formatter(mut self, formatter: ValueFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// The source resolver, including its line cache.
    #[must_use]
    pub fn resolver(&self) -> &SourceResolver {
        &self.resolver
    }

    /// The emitter.
    #[must_use]
    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Builds the record for one event, or `None` if the event is not
    /// reported.
    #[must_use]
    pub fn handle(&self, frame: &dyn Frame, event: &ExecutionEvent<'_>) -> Option<TraceRecord> {
        let route = self.route(event)?;
        let module = SourceResolver::module_name(frame);
        if !self.config.traces_module(module) {
            return None;
        }
        let line = frame.line();
        let show = self.config.show_values();

        let record = match route {
            Route::FunctionEnter => {
                let record = TraceRecord::new(module, line, &format!("{}()", frame.code_name()));
                if show {
                    let args = self.formatter.render_args(frame);
                    if args.is_empty() {
                        record
                    } else {
                        record.with_detail(format!("args: {args}"))
                    }
                } else {
                    record
                }
            }
            Route::FunctionExit { value } => {
                let text = format!("{}() -> {}", frame.code_name(), self.returned(value));
                TraceRecord::new(module, line, &text)
            }
            Route::FunctionRaise { kind, value } => {
                let text = format!("{}() -> {}", frame.code_name(), self.raised(kind, value));
                TraceRecord::new(module, line, &text)
            }
            Route::NativeEnter { callee } => TraceRecord::new(module, line, &format!("{callee}()")),
            Route::LineStep => {
                let text = self.resolver.source_line(frame);
                let record = TraceRecord::new(module, line, &text);
                if show {
                    record.with_detail(self.formatter.render_tokens(&tokens(&text), frame))
                } else {
                    record
                }
            }
            Route::LineExit { value } => {
                let text = self.resolver.source_line(frame);
                TraceRecord::new(module, line, &format!("{text} -> {}", self.returned(value)))
            }
            Route::LineRaise { kind, value } => {
                let text = self.resolver.source_line(frame);
                TraceRecord::new(module, line, &format!("{text} -> {}", self.raised(kind, value)))
            }
        };
        Some(record)
    }

    fn route<'e>(&self, event: &ExecutionEvent<'e>) -> Option<Route<'e>> {
        use ExecutionEvent as E;

        let config = &self.config;
        match (config.functions_only(), *event) {
            (true, E::Enter) => Some(Route::FunctionEnter),
            (true, E::Exit { value }) if config.trace_returns() => {
                Some(Route::FunctionExit { value })
            }
            (true, E::Raise { kind, value }) if config.trace_exceptions() => {
                Some(Route::FunctionRaise { kind, value })
            }
            (true, E::NativeEnter { callee }) if config.trace_natives() => {
                Some(Route::NativeEnter {
                    callee: callee.name,
                })
            }
            (false, E::Step) => Some(Route::LineStep),
            (false, E::Exit { value }) if config.trace_returns() => Some(Route::LineExit { value }),
            (false, E::Raise { kind, value }) if config.trace_exceptions() => {
                Some(Route::LineRaise { kind, value })
            }
            (
                true,
                E::Step
                | E::Exit { .. }
                | E::Raise { .. }
                | E::NativeEnter { .. }
                | E::NativeExit { .. }
                | E::NativeRaise { .. },
            )
            | (
                false,
                E::Enter
                | E::Exit { .. }
                | E::Raise { .. }
                | E::NativeEnter { .. }
                | E::NativeExit { .. }
                | E::NativeRaise { .. },
            ) => None,
        }
    }

    fn returned(&self, value: &dyn Inspect) -> String {
        if self.config.show_values() {
            self.formatter.repr_or_placeholder(value)
        } else {
            "<return>".to_string()
        }
    }

    fn raised(&self, kind: &str, value: &dyn Inspect) -> String {
        if self.config.show_values() {
            self.formatter.render_exception(kind, value)
        } else {
            "<exception>".to_string()
        }
    }
}

impl Observer for TraceHook {
    fn observe(
        self: Arc<Self>,
        frame: &dyn Frame,
        event: &ExecutionEvent<'_>,
    ) -> Option<Arc<dyn Observer>> {
        let Some(_guard) = DispatchGuard::enter() else {
            tracing::trace!(?event, "nested dispatch suppressed");
            return Some(self);
        };
        match catch_unwind(AssertUnwindSafe(|| self.handle(frame, event))) {
            Ok(Some(record)) => self.emitter.emit(&record),
            Ok(None) => {}
            Err(_) => tracing::debug!(?event, "trace handler panicked; record dropped"),
        }
        Some(self)
    }
}

// =============================================================================
// Tests
// =============================================================================
