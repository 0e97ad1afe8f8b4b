//! Error types for the script engine.
//!
//! Script-level exceptions are ordinary errors of kind [`ErrorKind::Raised`],
//! so they travel through `?` like any other failure and reach the embedding
//! program unchanged.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::value::Value;

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for engine operations.
#[derive(Debug)]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Where the error was first raised, if known.
    pub location: Option<Location>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            location: None,
        }
    }

    /// Attaches a location unless one is already present.
    #[must_use]
    pub fn at(mut self, module: &str, line: u32) -> Self {
        if self.location.is_none() {
            self.location = Some(Location {
                module: module.to_string(),
                line,
            });
        }
        self
    }

    /// Creates a script exception.
    #[must_use]
    pub fn raised(kind: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(ErrorKind::Raised {
            kind: kind.into(),
            value: value.into(),
        })
    }

    /// Creates a `NameError` exception.
    #[must_use]
    pub fn name_error(name: &str) -> Self {
        Self::raised("NameError", format!("name '{name}' is not defined"))
    }

    /// Creates a `TypeError` exception.
    #[must_use]
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::raised("TypeError", message.into())
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(ErrorKind::Parse {
            message: message.into(),
            line,
            column,
        })
    }

    /// Returns the exception kind and value if this is a script exception.
    #[must_use]
    pub fn exception(&self) -> Option<(&str, &Value)> {
        match &self.kind {
            ErrorKind::Raised { kind, value } => Some((kind, value)),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(location) = &self.location {
            write!(f, " ({location})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A script exception, raised explicitly or by a failing operation.
    #[error("{kind}: {value}")]
    Raised {
        /// Exception kind name, such as `ValueError`.
        kind: String,
        /// The exception payload.
        value: Value,
    },

    /// Syntax error in script source.
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
    },

    /// A source file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No module with this name is loaded.
    #[error("unknown module: {0}")]
    UnknownModule(String),

    /// A module with this name is already loaded.
    #[error("module already loaded: {0}")]
    DuplicateModule(String),
}

/// Source position attached to an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// Module name.
    pub module: String,
    /// Line number (1-indexed).
    pub line: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}:{}", self.module, self.line)
    }
}
