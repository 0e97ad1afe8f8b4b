//! The spewer scripting language.
//!
//! A small line-oriented language whose interpreter reports every statement,
//! call, return and exception to the observer installed in its
//! [`ObserverSlot`](spewer_foundation::ObserverSlot).
//!
//! # Pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Parser → ModuleAst → Vm (events → Observer)
//! ```
//!
//! # Example
//!
//! ```text
//! fn add(a, b)
//!     x = a + b
//!     return x
//! end
//!
//! total = add(5, b=3)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod bindings;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod vm;

pub use ast::{BinaryOp, Expr, FunctionDef, ModuleAst, Stmt, StmtKind, UnaryOp};
pub use bindings::Bindings;
pub use lexer::Lexer;
pub use parser::parse_module;
pub use token::{Token, TokenKind};
pub use vm::{SourceRetention, Vm};
