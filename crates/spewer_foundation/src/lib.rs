//! Core types and the host capability surface for spewer.
//!
//! This crate provides:
//! - [`Value`] - The dynamic value type of the script engine
//! - [`Error`] - Engine errors, including script exceptions
//! - [`Inspect`] - Safe, depth-bounded value display
//! - [`Frame`] and [`Scope`] - What a runtime exposes about a live activation
//! - [`ExecutionEvent`] - The fixed-shape message delivered per event
//! - [`Observer`] and [`ObserverSlot`] - Event registration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod event;
pub mod frame;
pub mod inspect;
pub mod observer;
pub mod value;

pub use error::{Error, ErrorKind, Result};
pub use event::{Callee, EventKind, ExecutionEvent};
pub use frame::{Frame, Origin, Scope, SourceError, SourceLines};
pub use inspect::{DEFAULT_MAX_DEPTH, Inspect, ReprContext, ReprError, repr};
pub use observer::{Observer, ObserverSlot};
pub use value::{FnRef, List, Value};
