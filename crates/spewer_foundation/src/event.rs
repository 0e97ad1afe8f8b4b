//! Execution events reported by a runtime.

use std::fmt;

use crate::inspect::Inspect;

/// The closed set of event kinds a runtime can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// About to execute the next source statement.
    Step,
    /// A script function is being entered.
    Enter,
    /// A script function is returning normally.
    Exit,
    /// An exception is propagating through a frame.
    Raise,
    /// A native function is being called.
    NativeEnter,
    /// A native function returned.
    NativeExit,
    /// A native function failed.
    NativeRaise,
}

impl EventKind {
    /// All event kinds, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Step,
        Self::Enter,
        Self::Exit,
        Self::Raise,
        Self::NativeEnter,
        Self::NativeExit,
        Self::NativeRaise,
    ];

    /// Returns a short name for this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Step => "step",
            Self::Enter => "enter",
            Self::Exit => "exit",
            Self::Raise => "raise",
            Self::NativeEnter => "native-enter",
            Self::NativeExit => "native-exit",
            Self::NativeRaise => "native-raise",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies the native function behind a native event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Callee<'a> {
    /// Registered name of the function.
    pub name: &'a str,
}

/// One event, with its argument.
///
/// Produced by the runtime per observed statement or call, consumed once by
/// the observer, never stored.
#[derive(Clone, Copy)]
pub enum ExecutionEvent<'a> {
    /// About to execute the statement on the frame's current line.
    Step,
    /// The frame's function was just entered; its arguments are locals.
    Enter,
    /// The frame's function is returning `value`.
    Exit {
        /// The return value.
        value: &'a dyn Inspect,
    },
    /// An exception is propagating through the frame.
    Raise {
        /// Exception kind name.
        kind: &'a str,
        /// Exception payload.
        value: &'a dyn Inspect,
    },
    /// The frame is calling a native function.
    NativeEnter {
        /// The native being called.
        callee: Callee<'a>,
    },
    /// A native function called from the frame returned.
    NativeExit {
        /// The native that returned.
        callee: Callee<'a>,
    },
    /// A native function called from the frame failed.
    NativeRaise {
        /// The native that failed.
        callee: Callee<'a>,
        /// Exception kind name.
        kind: &'a str,
        /// Exception payload.
        value: &'a dyn Inspect,
    },
}

impl ExecutionEvent<'_> {
    /// Returns the kind tag of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Step => EventKind::Step,
            Self::Enter => EventKind::Enter,
            Self::Exit { .. } => EventKind::Exit,
            Self::Raise { .. } => EventKind::Raise,
            Self::NativeEnter { .. } => EventKind::NativeEnter,
            Self::NativeExit { .. } => EventKind::NativeExit,
            Self::NativeRaise { .. } => EventKind::NativeRaise,
        }
    }
}

impl fmt::Debug for ExecutionEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raise { kind, .. } | Self::NativeRaise { kind, .. } => {
                write!(f, "{}({kind})", self.kind())
            }
            Self::NativeEnter { callee } | Self::NativeExit { callee } => {
                write!(f, "{}({})", self.kind(), callee.name)
            }
            _ => write!(f, "{}", self.kind()),
        }
    }
}
