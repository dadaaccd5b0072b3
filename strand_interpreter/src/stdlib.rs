//! Builtin helpers and the in-place list mutators.
//!
//! Everything here operates directly on the shared `ExecutionContext`;
//! argument resolution and reporting stay in the interpreter.

use crate::ast::{ExecutionContext, RuntimeError, Value};

/// The fixed builtin table checked by the evaluator before it falls back
/// to the arithmetic grammar.
pub const BUILTIN_NAMES: &[&str] = &[
    "type",
    "len",
    "splitby",
    "split",
    "splitlines",
    "read",
    "in",
    "index",
    "all",
    "isanumber",
];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// `in`/`index` needle resolution: quoted literal first, then digit
/// literal, then variable lookup, then the raw token as text. Note the
/// order differs from branch operands, which try the variable first.
pub fn resolve_literal_first(ctx: &ExecutionContext, token: &str) -> Value {
    let token = token.trim();
    if let Some(text) = strand_parser::strip_quotes(token) {
        return Value::Text(text.to_string());
    }
    if strand_parser::is_digits(token) {
        if let Ok(n) = token.parse() {
            return Value::Int(n);
        }
    }
    if let Some(value) = ctx.get(token) {
        return value.clone();
    }
    Value::Text(token.to_string())
}

// --- Query builtins ---

pub fn len_of(ctx: &ExecutionContext, name: &str) -> Result<Value, RuntimeError> {
    match ctx.get(name) {
        Some(Value::List(items)) => Ok(Value::Int(items.len() as i64)),
        Some(Value::Text(s)) => Ok(Value::Int(s.chars().count() as i64)),
        Some(other) => Err(RuntimeError::Type(format!(
            "'len' expects a list or text variable, found {}",
            other.type_name()
        ))),
        None => Err(RuntimeError::Reference(name.to_string())),
    }
}

pub fn split_by(sep: &str, text: &str) -> Value {
    Value::List(
        text.split(sep)
            .map(|part| Value::Text(part.to_string()))
            .collect(),
    )
}

pub fn split_whitespace(text: &str) -> Value {
    Value::List(
        text.split_whitespace()
            .map(|part| Value::Text(part.to_string()))
            .collect(),
    )
}

pub fn split_lines(ctx: &ExecutionContext, name: &str) -> Result<Value, RuntimeError> {
    match ctx.get(name) {
        Some(Value::Text(s)) => Ok(Value::List(
            s.lines().map(|line| Value::Text(line.to_string())).collect(),
        )),
        // A list is already line-shaped.
        Some(Value::List(items)) => Ok(Value::List(items.clone())),
        Some(other) => Err(RuntimeError::Type(format!(
            "'splitlines' expects a list or text variable, found {}",
            other.type_name()
        ))),
        None => Err(RuntimeError::Reference(name.to_string())),
    }
}

pub fn list_contains(
    ctx: &ExecutionContext,
    name: &str,
    needle: &Value,
) -> Result<bool, RuntimeError> {
    match ctx.get(name) {
        Some(Value::List(items)) => Ok(items.contains(needle)),
        Some(other) => Err(RuntimeError::Type(format!(
            "'in' expects a list variable, found {}",
            other.type_name()
        ))),
        None => Err(RuntimeError::Reference(name.to_string())),
    }
}

pub fn index_of(
    ctx: &ExecutionContext,
    name: &str,
    needle: &Value,
) -> Result<Option<usize>, RuntimeError> {
    match ctx.get(name) {
        Some(Value::List(items)) => Ok(items.iter().position(|item| item == needle)),
        Some(other) => Err(RuntimeError::Type(format!(
            "'index' expects a list variable, found {}",
            other.type_name()
        ))),
        None => Err(RuntimeError::Reference(name.to_string())),
    }
}

pub fn all_of(ctx: &ExecutionContext, name: &str) -> Result<Value, RuntimeError> {
    match ctx.get(name) {
        Some(Value::List(items)) => Ok(Value::Int(items.iter().all(Value::is_truthy) as i64)),
        // Every character of a text counts as truthy.
        Some(Value::Text(_)) => Ok(Value::Int(1)),
        Some(other) => Err(RuntimeError::Type(format!(
            "'all' expects a list or text variable, found {}",
            other.type_name()
        ))),
        None => Err(RuntimeError::Reference(name.to_string())),
    }
}

// --- List mutators ---

fn expect_list_mut<'a>(
    ctx: &'a mut ExecutionContext,
    name: &str,
) -> Result<&'a mut Vec<Value>, RuntimeError> {
    match ctx.variables.get_mut(name) {
        Some(Value::List(items)) => Ok(items),
        Some(other) => Err(RuntimeError::Type(format!(
            "Variable '{}' is not a list (found {})",
            name,
            other.type_name()
        ))),
        None => Err(RuntimeError::Reference(name.to_string())),
    }
}

fn checked_index(index: i64, len: usize) -> Result<usize, RuntimeError> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or(RuntimeError::IndexOutOfRange { index, len })
}

/// Appends every element of `from` to `to`. Both must be lists.
pub fn copy_list(
    ctx: &mut ExecutionContext,
    from: &str,
    to: &str,
) -> Result<(), RuntimeError> {
    let source = match ctx.get(from) {
        Some(Value::List(items)) => items.clone(),
        Some(other) => {
            return Err(RuntimeError::Type(format!(
                "Variable '{}' is not a list (found {})",
                from,
                other.type_name()
            )))
        }
        None => return Err(RuntimeError::Reference(from.to_string())),
    };
    let target = expect_list_mut(ctx, to)?;
    target.extend(source);
    Ok(())
}

pub fn append(ctx: &mut ExecutionContext, name: &str, value: Value) -> Result<(), RuntimeError> {
    let items = expect_list_mut(ctx, name)?;
    items.push(value);
    Ok(())
}

/// Removes the element at `index`. An out-of-range index is reported
/// without mutating the list.
pub fn pop(ctx: &mut ExecutionContext, name: &str, index: i64) -> Result<(), RuntimeError> {
    let items = expect_list_mut(ctx, name)?;
    let i = checked_index(index, items.len())?;
    items.remove(i);
    Ok(())
}

/// Removes the element at `from` and re-inserts it at `to`.
pub fn move_element(
    ctx: &mut ExecutionContext,
    name: &str,
    from: i64,
    to: i64,
) -> Result<(), RuntimeError> {
    let items = expect_list_mut(ctx, name)?;
    let from = checked_index(from, items.len())?;
    // After the removal the insertion point may equal the new length.
    let to = usize::try_from(to)
        .ok()
        .filter(|i| *i < items.len())
        .ok_or(RuntimeError::IndexOutOfRange { index: to, len: items.len() })?;
    let element = items.remove(from);
    items.insert(to, element);
    Ok(())
}

pub fn swap_elements(
    ctx: &mut ExecutionContext,
    name: &str,
    left: i64,
    right: i64,
) -> Result<(), RuntimeError> {
    let items = expect_list_mut(ctx, name)?;
    let left = checked_index(left, items.len())?;
    let right = checked_index(right, items.len())?;
    items.swap(left, right);
    Ok(())
}
