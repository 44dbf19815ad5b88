//! Arithmetic, logic and comparison actions

use crate::error::VmError;
use crate::interpreter::Context;
use crate::opcode;
use crate::value::{AsString, CheapClone, Value, to_integer};

/// Add, Subtract and Multiply of version 4: both operands as numbers
pub(crate) fn binary(ctx: &mut Context, action: u8, _data: &[u8]) -> Result<(), VmError> {
    let a = ctx.pop_number()?;
    let b = ctx.pop_number()?;
    let result = match action {
        opcode::ADD => b + a,
        opcode::SUBTRACT => b - a,
        _ => b * a,
    };
    ctx.push(Value::Number(result))
}

/// Version 4 division: dividing by zero yields the `#ERROR#` string
pub(crate) fn divide_v4(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let divisor = ctx.pop_number()?;
    let dividend = ctx.pop_number()?;
    if divisor == 0.0 {
        let error = ctx.names.error.cheap_clone();
        return ctx.push(Value::String(error));
    }
    ctx.push(Value::Number(dividend / divisor))
}

/// Versions 5 and 6: a NaN divisor counts as zero
pub(crate) fn divide_v5(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let divisor = nan_as_zero(ctx.pop_number()?);
    let dividend = ctx.pop_number()?;
    ctx.push(Value::Number(dividend / divisor))
}

pub(crate) fn divide_v7(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let divisor = ctx.pop_number()?;
    let dividend = ctx.pop_number()?;
    ctx.push(Value::Number(dividend / divisor))
}

pub(crate) fn modulo_v5(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let divisor = nan_as_zero(ctx.pop_number()?);
    let dividend = ctx.pop_number()?;
    ctx.push(Value::Number(dividend % divisor))
}

pub(crate) fn modulo_v7(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let divisor = ctx.pop_number()?;
    let dividend = ctx.pop_number()?;
    ctx.push(Value::Number(dividend % divisor))
}

fn nan_as_zero(n: f64) -> f64 {
    if n.is_nan() { 0.0 } else { n }
}

/// Add2: string concatenation if either primitive is a string
pub(crate) fn add2(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let a = ctx.pop()?;
    let b = ctx.pop()?;
    let a = ctx.to_primitive(&a)?;
    let b = ctx.to_primitive(&b)?;
    if a.is_string() || b.is_string() {
        let left = ctx.to_string(&b)?;
        let right = ctx.to_string(&a)?;
        let joined = concat(ctx, &left, &right);
        return ctx.push(Value::String(joined));
    }
    let x = ctx.to_number(&b)?;
    let y = ctx.to_number(&a)?;
    ctx.push(Value::Number(x + y))
}

pub(crate) fn concat(ctx: &mut Context, left: &AsString, right: &AsString) -> AsString {
    let mut joined = String::with_capacity(left.len() + right.len());
    joined.push_str(left.as_str());
    joined.push_str(right.as_str());
    ctx.intern(&joined)
}

pub(crate) fn increment(ctx: &mut Context, action: u8, _data: &[u8]) -> Result<(), VmError> {
    let n = ctx.pop_number()?;
    let delta = if action == opcode::INCREMENT { 1.0 } else { -1.0 };
    ctx.push(Value::Number(n + delta))
}

/// BitAnd, BitOr, BitXor and the shifts on 32-bit integers
pub(crate) fn bitwise(ctx: &mut Context, action: u8, _data: &[u8]) -> Result<(), VmError> {
    let a = ctx.pop_integer()?;
    let b = ctx.pop_integer()?;
    let shift = (a & 0x1F) as u32;
    let result = match action {
        opcode::BIT_AND => (b & a) as f64,
        opcode::BIT_OR => (b | a) as f64,
        opcode::BIT_XOR => (b ^ a) as f64,
        opcode::BIT_LSHIFT => b.wrapping_shl(shift) as f64,
        opcode::BIT_RSHIFT => b.wrapping_shr(shift) as f64,
        _ => (b as u32).wrapping_shr(shift) as f64,
    };
    ctx.push(Value::Number(result))
}

pub(crate) fn to_integer_action(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let n = ctx.pop_number()?;
    ctx.push(Value::Number(to_integer(n) as f64))
}

pub(crate) fn to_number(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let n = ctx.pop_number()?;
    ctx.push(Value::Number(n))
}

pub(crate) fn to_string(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let s = ctx.pop_string()?;
    ctx.push(Value::String(s))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Logic
// ═══════════════════════════════════════════════════════════════════════════════

/// Truth value of a logic operand in the executing version
fn pop_truth(ctx: &mut Context) -> Result<bool, VmError> {
    let value = ctx.pop()?;
    if ctx.frame_version()? < 5 {
        let n = ctx.to_number(&value)?;
        Ok(n != 0.0 && !n.is_nan())
    } else {
        Ok(ctx.to_boolean(&value))
    }
}

pub(crate) fn not(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let truth = pop_truth(ctx)?;
    ctx.push_bool(!truth)
}

/// And and Or of version 4; both operands are always evaluated
pub(crate) fn logical(ctx: &mut Context, action: u8, _data: &[u8]) -> Result<(), VmError> {
    let a = pop_truth(ctx)?;
    let b = pop_truth(ctx)?;
    let result = if action == opcode::AND { a && b } else { a || b };
    ctx.push_bool(result)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Comparison
// ═══════════════════════════════════════════════════════════════════════════════

/// Numeric Equals of version 4
pub(crate) fn equals(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let a = ctx.pop_number()?;
    let b = ctx.pop_number()?;
    ctx.push_bool(a == b)
}

/// Numeric Less of version 4
pub(crate) fn less(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let a = ctx.pop_number()?;
    let b = ctx.pop_number()?;
    ctx.push_bool(b < a)
}

pub(crate) fn equals2(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let a = ctx.pop()?;
    let b = ctx.pop()?;
    let equal = ctx.equals2(&b, &a)?;
    ctx.push_bool(equal)
}

pub(crate) fn strict_equals(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let a = ctx.pop()?;
    let b = ctx.pop()?;
    ctx.push_bool(b.strict_equals(&a))
}

/// Less2 pushes Undefined when the comparison involves NaN
pub(crate) fn less2(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let a = ctx.pop()?;
    let b = ctx.pop()?;
    match ctx.less_than(&b, &a)? {
        Some(result) => ctx.push_bool(result),
        None => ctx.push(Value::Undefined),
    }
}

pub(crate) fn greater(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let a = ctx.pop()?;
    let b = ctx.pop()?;
    match ctx.less_than(&a, &b)? {
        Some(result) => ctx.push_bool(result),
        None => ctx.push(Value::Undefined),
    }
}
