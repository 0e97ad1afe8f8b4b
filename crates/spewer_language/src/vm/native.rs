//! Native function implementations for the VM.
//!
//! This module contains the builtin functions and the arithmetic/comparison
//! helpers used by the interpreter.

#![allow(clippy::unnecessary_wraps)]

use std::cmp::Ordering;

use spewer_foundation::{Error, Result, Value};

/// Signature shared by all natives. The second argument is the VM's output
/// buffer.
pub(crate) type NativeFn = fn(&[Value], &mut Vec<String>) -> Result<Value>;

/// Builtins visible from every module, by name.
const NATIVES: &[(&str, NativeFn)] = &[
    ("len", native_len),
    ("max", native_max),
    ("min", native_min),
    ("str", native_str),
    ("print", native_print),
    ("type", native_type),
];

/// Looks up a builtin by name.
pub(crate) fn lookup(name: &str) -> Option<(&'static str, NativeFn)> {
    NATIVES
        .iter()
        .find(|(registered, _)| *registered == name)
        .copied()
}

// =============================================================================
// Arithmetic and Comparison Helpers
// =============================================================================

fn overflow() -> Error {
    Error::raised("OverflowError", "integer overflow")
}

fn unsupported(op: &str, a: &Value, b: &Value) -> Error {
    Error::type_error(format!(
        "unsupported operand types for {op}: '{}' and '{}'",
        a.type_name(),
        b.type_name()
    ))
}

/// Adds two values. Strings and lists concatenate.
pub(crate) fn add_values(a: &Value, b: &Value) -> Result<Value> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.checked_add(*y).map(Value::Int).ok_or_else(overflow),
        (Value::String(x), Value::String(y)) => Ok(Value::from(format!("{x}{y}"))),
        (Value::List(x), Value::List(y)) => {
            let mut joined = x.clone();
            joined.append(y.clone());
            Ok(Value::List(joined))
        }
        _ => float_op(a, b, "+", |x, y| x + y),
    }
}

/// Subtracts two values.
pub(crate) fn sub_values(a: &Value, b: &Value) -> Result<Value> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.checked_sub(*y).map(Value::Int).ok_or_else(overflow),
        _ => float_op(a, b, "-", |x, y| x - y),
    }
}

/// Multiplies two values.
pub(crate) fn mul_values(a: &Value, b: &Value) -> Result<Value> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.checked_mul(*y).map(Value::Int).ok_or_else(overflow),
        _ => float_op(a, b, "*", |x, y| x * y),
    }
}

/// Divides two values. Integer division floors.
pub(crate) fn div_values(a: &Value, b: &Value) -> Result<Value> {
    if is_zero(b) {
        return Err(Error::raised("ZeroDivisionError", "division by zero"));
    }
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x
            .checked_div_euclid(*y)
            .map(Value::Int)
            .ok_or_else(overflow),
        _ => float_op(a, b, "/", |x, y| x / y),
    }
}

/// Remainder of two values.
pub(crate) fn rem_values(a: &Value, b: &Value) -> Result<Value> {
    if is_zero(b) {
        return Err(Error::raised("ZeroDivisionError", "modulo by zero"));
    }
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x
            .checked_rem_euclid(*y)
            .map(Value::Int)
            .ok_or_else(overflow),
        _ => float_op(a, b, "%", f64::rem_euclid),
    }
}

fn float_op(a: &Value, b: &Value, op: &str, f: impl Fn(f64, f64) -> f64) -> Result<Value> {
    match (a, b) {
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => Ok(Value::Float(f(x, y))),
                _ => Err(unsupported(op, a, b)),
            }
        }
        _ => Err(unsupported(op, a, b)),
    }
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Int(n) => *n == 0,
        Value::Float(n) => *n == 0.0,
        _ => false,
    }
}

/// Negates a number.
pub(crate) fn neg_value(value: &Value) -> Result<Value> {
    match value {
        Value::Int(n) => n.checked_neg().map(Value::Int).ok_or_else(overflow),
        Value::Float(n) => Ok(Value::Float(-n)),
        other => Err(Error::type_error(format!(
            "bad operand type for unary -: '{}'",
            other.type_name()
        ))),
    }
}

/// Orders two numbers or two strings.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Result<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x
                .partial_cmp(&y)
                .ok_or_else(|| Error::type_error("cannot order NaN")),
            _ => Err(Error::type_error(format!(
                "cannot compare '{}' and '{}'",
                a.type_name(),
                b.type_name()
            ))),
        },
    }
}

/// Indexes a list or string. Negative indices count from the end.
pub(crate) fn index_value(target: &Value, index: &Value) -> Result<Value> {
    let Some(i) = index.as_int() else {
        return Err(Error::type_error(format!(
            "indices must be integers, not '{}'",
            index.type_name()
        )));
    };
    let out_of_range = || Error::raised("IndexError", format!("index {i} out of range"));
    let resolve = |len: usize| -> Option<usize> {
        let len = i64::try_from(len).ok()?;
        let i = if i < 0 { i + len } else { i };
        if (0..len).contains(&i) {
            usize::try_from(i).ok()
        } else {
            None
        }
    };
    match target {
        Value::List(items) => resolve(items.len())
            .and_then(|i| items.get(i).cloned())
            .ok_or_else(out_of_range),
        Value::String(s) => {
            let count = s.chars().count();
            resolve(count)
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::from(c.to_string()))
                .ok_or_else(out_of_range)
        }
        other => Err(Error::type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

// =============================================================================
// Builtins
// =============================================================================

fn arity(name: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::type_error(format!(
            "{name}() takes {expected} argument(s) but {} were given",
            args.len()
        )))
    }
}

fn native_len(args: &[Value], _output: &mut Vec<String>) -> Result<Value> {
    arity("len", args, 1)?;
    let len = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::List(items) => items.len(),
        other => {
            return Err(Error::type_error(format!(
                "object of type '{}' has no len()",
                other.type_name()
            )));
        }
    };
    i64::try_from(len)
        .map(Value::Int)
        .map_err(|_| Error::raised("OverflowError", "length too large"))
}

/// Shared body of `max` and `min`: one list argument, or two or more values.
fn extreme(name: &str, args: &[Value], keep: Ordering) -> Result<Value> {
    let candidates: Vec<Value> = match args {
        [Value::List(items)] => items.iter().cloned().collect(),
        [_] => {
            return Err(Error::type_error(format!(
                "{name}() expects a list or at least two arguments"
            )));
        }
        _ => args.to_vec(),
    };
    let mut iter = candidates.into_iter();
    let Some(mut best) = iter.next() else {
        return Err(Error::raised(
            "ValueError",
            format!("{name}() arg is an empty sequence"),
        ));
    };
    for candidate in iter {
        if compare_values(&candidate, &best)? == keep {
            best = candidate;
        }
    }
    Ok(best)
}

fn native_max(args: &[Value], _output: &mut Vec<String>) -> Result<Value> {
    extreme("max", args, Ordering::Greater)
}

fn native_min(args: &[Value], _output: &mut Vec<String>) -> Result<Value> {
    extreme("min", args, Ordering::Less)
}

fn native_str(args: &[Value], _output: &mut Vec<String>) -> Result<Value> {
    arity("str", args, 1)?;
    Ok(Value::from(args[0].to_string()))
}

fn native_print(args: &[Value], output: &mut Vec<String>) -> Result<Value> {
    let line = args
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    output.push(line);
    Ok(Value::Nil)
}

fn native_type(args: &[Value], _output: &mut Vec<String>) -> Result<Value> {
    arity("type", args, 1)?;
    Ok(Value::from(args[0].type_name()))
}
