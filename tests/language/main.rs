//! Integration tests for Layer 1: Language
//!
//! Tests for the lexer, parser, and event-raising interpreter.

mod events;
mod lexer;
mod parser;
mod vm;
