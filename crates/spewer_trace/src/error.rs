//! Configuration errors.
//!
//! Everything else the tracer does is infallible from the caller's point of
//! view: source and rendering failures are recovered locally.

use thiserror::Error;

/// A tracer configuration was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An option was given a value of the wrong shape.
    #[error("option `{option}` expects {expected}, found {found}")]
    WrongShape {
        /// The option name.
        option: String,
        /// The shape the option accepts.
        expected: &'static str,
        /// The shape that was supplied.
        found: &'static str,
    },

    /// The option name is not recognized.
    #[error("unknown option `{0}`")]
    UnknownOption(String),

    /// A module filter entry is empty or contains whitespace.
    #[error("invalid module name {0:?}")]
    InvalidModuleName(String),

    /// An environment variable holds something that is not a boolean.
    #[error("{var} must be a boolean (1/0, true/false, yes/no, on/off), found {value:?}")]
    InvalidBool {
        /// The variable name.
        var: String,
        /// The rejected text.
        value: String,
    },
}
