//! String constructor and String.prototype
//!
//! Indices count characters.

use crate::error::VmError;
use crate::interpreter::Context;
use crate::value::{AsString, Value, to_integer};

use super::{arg, box_instance, unboxed};

pub(super) fn init_string_prototype(ctx: &mut Context) {
    let proto = ctx.protos.string.clone();
    ctx.define_native(&proto, "toString", string_to_string);
    ctx.define_native(&proto, "valueOf", string_to_string);
    ctx.define_native(&proto, "charAt", string_char_at);
    ctx.define_native(&proto, "charCodeAt", string_char_code_at);
    ctx.define_native(&proto, "indexOf", string_index_of);
    ctx.define_native(&proto, "substr", string_substr);
    ctx.define_native(&proto, "substring", string_substring);
    ctx.define_native(&proto, "toUpperCase", string_to_upper_case);
    ctx.define_native(&proto, "toLowerCase", string_to_lower_case);
}

/// The string value of `this`
fn this_string(ctx: &mut Context, this: &Value) -> Result<AsString, VmError> {
    match unboxed(this) {
        Value::String(s) => Ok(s),
        other => ctx.to_string(&other),
    }
}

/// Integer argument, `default` when missing
fn int_arg(ctx: &mut Context, args: &[Value], index: usize, default: i32) -> Result<i32, VmError> {
    match args.get(index) {
        None | Some(Value::Undefined) => Ok(default),
        Some(value) => Ok(to_integer(ctx.to_number(value)?)),
    }
}

fn string_value(ctx: &mut Context, s: &str) -> Value {
    Value::String(ctx.intern(s))
}

pub(super) fn string_constructor(
    ctx: &mut Context,
    _this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let s = match args.first() {
        Some(value) => ctx.to_string(value)?,
        None => ctx.names.empty.clone(),
    };
    Ok(Value::String(s))
}

/// `new String(value)` boxes the converted string
pub(super) fn string_construct(
    ctx: &mut Context,
    this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let s = string_constructor(ctx, this, args)?;
    box_instance(this, s);
    Ok(Value::Undefined)
}

pub(super) fn string_to_string(
    ctx: &mut Context,
    this: &Value,
    _args: &[Value],
) -> Result<Value, VmError> {
    this_string(ctx, this).map(Value::String)
}

pub(super) fn string_char_at(
    ctx: &mut Context,
    this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let s = this_string(ctx, this)?;
    let index = int_arg(ctx, args, 0, 0)?;
    let c = usize::try_from(index)
        .ok()
        .and_then(|i| s.as_str().chars().nth(i))
        .map(String::from)
        .unwrap_or_default();
    Ok(string_value(ctx, &c))
}

/// NaN when the index is out of range
pub(super) fn string_char_code_at(
    ctx: &mut Context,
    this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let s = this_string(ctx, this)?;
    let index = int_arg(ctx, args, 0, 0)?;
    let code = usize::try_from(index)
        .ok()
        .and_then(|i| s.as_str().chars().nth(i))
        .map_or(f64::NAN, |c| c as u32 as f64);
    Ok(Value::Number(code))
}

pub(super) fn string_index_of(
    ctx: &mut Context,
    this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let s = this_string(ctx, this)?;
    let needle = ctx.to_string(&arg(args, 0))?;
    let start = int_arg(ctx, args, 1, 0)?.max(0) as usize;
    let chars: Vec<char> = s.as_str().chars().collect();
    let needle: Vec<char> = needle.as_str().chars().collect();
    if start > chars.len() {
        return Ok(Value::Number(-1.0));
    }
    let found = (start..=chars.len().saturating_sub(needle.len()))
        .find(|&i| chars.get(i..i + needle.len()) == Some(needle.as_slice()));
    Ok(Value::Number(found.map_or(-1.0, |i| i as f64)))
}

/// `substr(start, length)`; a negative start counts from the end
pub(super) fn string_substr(
    ctx: &mut Context,
    this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let s = this_string(ctx, this)?;
    let len = s.char_count() as i32;
    let mut start = int_arg(ctx, args, 0, 0)?;
    if start < 0 {
        start = (len + start).max(0);
    }
    let count = int_arg(ctx, args, 1, len)?.max(0);
    let result: String = s
        .as_str()
        .chars()
        .skip(start as usize)
        .take(count as usize)
        .collect();
    Ok(string_value(ctx, &result))
}

/// `substring(from, to)`; arguments are clamped and swapped when reversed
pub(super) fn string_substring(
    ctx: &mut Context,
    this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let s = this_string(ctx, this)?;
    let len = s.char_count() as i32;
    let from = int_arg(ctx, args, 0, 0)?.clamp(0, len);
    let to = int_arg(ctx, args, 1, len)?.clamp(0, len);
    let (from, to) = if from > to { (to, from) } else { (from, to) };
    let result: String = s
        .as_str()
        .chars()
        .skip(from as usize)
        .take((to - from) as usize)
        .collect();
    Ok(string_value(ctx, &result))
}

pub(super) fn string_to_upper_case(
    ctx: &mut Context,
    this: &Value,
    _args: &[Value],
) -> Result<Value, VmError> {
    let s = this_string(ctx, this)?;
    Ok(string_value(ctx, &s.as_str().to_uppercase()))
}

pub(super) fn string_to_lower_case(
    ctx: &mut Context,
    this: &Value,
    _args: &[Value],
) -> Result<Value, VmError> {
    let s = this_string(ctx, this)?;
    Ok(string_value(ctx, &s.as_str().to_lowercase()))
}
