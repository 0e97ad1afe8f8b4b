//! Execution tracing for spewer.
//!
//! A [`TraceHook`] is an [`Observer`](spewer_foundation::Observer) that turns
//! each execution event into a human-readable record and writes it out.
//!
//! This crate provides:
//! - [`TracerConfig`] - Validated, immutable tracer settings
//! - [`TraceHook`] - The event filter and dispatcher
//! - [`SourceResolver`] and [`LineCache`] - Source text for a frame's line
//! - [`ValueFormatter`] - Safe `name=repr` rendering
//! - [`Emitter`] and [`TraceOutput`] - Where records go
//! - [`spew`], [`unspew`] and [`SpewGuard`] - Installing and removing a tracer
//!
//! # Example
//!
//! ```text
//! $ spewer run demo.spw
//! demo:5: total = add(5, b=3)
//!     add=<fn add>
//! demo:2:     x = a + b
//!     a=5 b=3
//! demo:3:     return x
//!     x=8
//! demo:3:     return x -> 8
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod emit;
pub mod error;
pub mod hook;
pub mod lifecycle;
pub mod record;
pub mod render;
pub mod scan;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{OptionValue, TracerConfig, TracerConfigBuilder};
pub use emit::{Emitter, SharedBuffer, TraceOutput};
pub use error::ConfigError;
pub use hook::TraceHook;
pub use lifecycle::{SpewGuard, install_into, remove_from, spew, unspew, with_spew};
pub use record::TraceRecord;
pub use render::ValueFormatter;
pub use scan::tokens;
pub use source::{DEFAULT_CACHE_FILES, LineCache, SourceResolver, UNKNOWN_MODULE};
