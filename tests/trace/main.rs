//! Integration tests for Layer 2: Trace
//!
//! Runs real scripts through the interpreter with a tracer installed and
//! checks the records it writes.

mod filter;
mod scenarios;
mod support;
