//! Core value type for script data.

use std::fmt;
use std::sync::Arc;

use crate::inspect::{DEFAULT_MAX_DEPTH, Inspect, ReprContext, ReprError};

/// Persistent list used by [`Value::List`].
pub type List = im::Vector<Value>;

/// Core value type for all script data.
///
/// Values are cheaply cloneable. Lists use structural sharing; host objects
/// are reference counted.
#[derive(Clone)]
pub enum Value {
    /// The nil value (represents absence).
    Nil,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value.
    String(Arc<str>),
    /// Persistent list.
    List(List),
    /// Function reference.
    Fn(FnRef),
    /// Opaque object supplied by the embedding program.
    Object(Arc<dyn Inspect>),
}

/// Function reference.
///
/// Script functions are identified by their index in the engine's function
/// table; natives by their registered name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FnRef {
    /// Function defined in script source.
    Script {
        /// Function name for display.
        name: Arc<str>,
        /// Index into the engine's function table.
        index: u32,
    },
    /// Function implemented in Rust.
    Native {
        /// Registered name.
        name: &'static str,
    },
}

impl FnRef {
    /// Returns the function's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Script { name, .. } => name,
            Self::Native { name } => name,
        }
    }
}

impl Value {
    /// Returns the runtime type name of this value.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "str",
            Self::List(_) => "list",
            Self::Fn(_) => "fn",
            Self::Object(obj) => obj.type_name(),
        }
    }

    /// Returns true if this value is nil.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns true if this value is truthy.
    ///
    /// `nil`, `false`, `0`, `0.0`, the empty string and the empty list are
    /// falsy; everything else is truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Nil => false,
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(n) => *n != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Fn(_) | Self::Object(_) => true,
        }
    }

    /// Attempts to extract an integer value.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a number as f64 (converts int to float).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a string slice.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Creates a list value from an iterator of values.
    pub fn list(items: impl IntoIterator<Item = Self>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Wraps a host object.
    pub fn object(obj: impl Inspect + 'static) -> Self {
        Self::Object(Arc::new(obj))
    }
}

impl Inspect for Value {
    fn type_name(&self) -> &str {
        Value::type_name(self)
    }

    fn inspect(&self, ctx: &mut ReprContext) -> Result<(), ReprError> {
        match self {
            Self::Nil => ctx.push_str("nil"),
            Self::Bool(b) => write!(ctx, "{b}"),
            Self::Int(n) => write!(ctx, "{n}"),
            Self::Float(n) => write!(ctx, "{n:?}"),
            Self::String(s) => write!(ctx, "{s:?}"),
            Self::List(items) => {
                ctx.push_str("[");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        ctx.push_str(", ");
                    }
                    ctx.nested(item)?;
                }
                ctx.push_str("]");
            }
            Self::Fn(FnRef::Script { name, .. }) => write!(ctx, "<fn {name}>"),
            Self::Fn(FnRef::Native { name }) => write!(ctx, "<native fn {name}>"),
            Self::Object(obj) => return ctx.nested(obj.as_ref()),
        }
        Ok(())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            #[allow(clippy::cast_precision_loss)]
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => (*a as f64) == *b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Fn(a), Self::Fn(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ctx = ReprContext::with_max_depth(DEFAULT_MAX_DEPTH);
        match ctx.nested(self) {
            Ok(()) => f.write_str(&ctx.finish()),
            Err(_) => write!(f, "<{} object>", self.type_name()),
        }
    }
}

/// Display differs from the representation only for strings, which are
/// shown without quotes.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

// Convenience From implementations

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}
