//! String actions
//!
//! Lengths and offsets count characters. The multibyte variants behave the
//! same since strings are stored decoded.

use crate::error::VmError;
use crate::interpreter::Context;
use crate::opcode;
use crate::value::Value;

use super::arithmetic::concat;

pub(crate) fn string_equals(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let a = ctx.pop_string()?;
    let b = ctx.pop_string()?;
    ctx.push_bool(a == b)
}

/// StringLess and StringGreater compare by code point
pub(crate) fn string_compare(ctx: &mut Context, action: u8, _data: &[u8]) -> Result<(), VmError> {
    let a = ctx.pop_string()?;
    let b = ctx.pop_string()?;
    let result = if action == opcode::STRING_LESS {
        b.as_str() < a.as_str()
    } else {
        b.as_str() > a.as_str()
    };
    ctx.push_bool(result)
}

pub(crate) fn string_length(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let s = ctx.pop_string()?;
    ctx.push(Value::Number(s.char_count() as f64))
}

pub(crate) fn string_add(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let a = ctx.pop_string()?;
    let b = ctx.pop_string()?;
    let joined = concat(ctx, &b, &a);
    ctx.push(Value::String(joined))
}

/// Substring from a 1-based index. A negative count takes the rest.
pub(crate) fn string_extract(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let count = ctx.pop_integer()?;
    let index = ctx.pop_integer()?;
    let s = ctx.pop_string()?;
    let skip = (index.max(1) - 1) as usize;
    let chars = s.as_str().chars().skip(skip);
    let extracted: String = if count < 0 {
        chars.collect()
    } else {
        chars.take(count as usize).collect()
    };
    let extracted = ctx.intern(&extracted);
    ctx.push(Value::String(extracted))
}

pub(crate) fn char_to_ascii(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let s = ctx.pop_string()?;
    let code = s.as_str().chars().next().map(|c| c as u32).unwrap_or(0);
    ctx.push(Value::Number(code as f64))
}

/// AsciiToChar truncates to a byte before version 6; MBAsciiToChar takes
/// any code point
pub(crate) fn ascii_to_char(ctx: &mut Context, action: u8, _data: &[u8]) -> Result<(), VmError> {
    let code = ctx.pop_integer()? as u32;
    let code = if action == opcode::ASCII_TO_CHAR && ctx.frame_version()? < 6 {
        code & 0xFF
    } else {
        code
    };
    let s = match char::from_u32(code) {
        Some('\0') | None => String::new(),
        Some(c) => c.to_string(),
    };
    let s = ctx.intern(&s);
    ctx.push(Value::String(s))
}
