//! spewer - an execution tracer for a small scripting language
//!
//! This crate re-exports every layer of spewer in one place.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: spewer_runtime     - `spewer run` CLI
//! Layer 2: spewer_trace       - Trace hook, config, source lookup, rendering
//! Layer 1: spewer_language    - Lexer, parser, event-raising interpreter
//! Layer 0: spewer_foundation  - Value, Frame, ExecutionEvent, ObserverSlot
//! ```
//!
//! The tracer depends only on layer 0, so any runtime that implements
//! `Frame` and consults an `ObserverSlot` can be traced.

pub use spewer_foundation as foundation;
pub use spewer_language as language;
pub use spewer_runtime as runtime;
pub use spewer_trace as trace;
