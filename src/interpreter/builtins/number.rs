//! Number and Boolean constructors and prototypes

use crate::error::VmError;
use crate::interpreter::Context;
use crate::value::{CheapClone, Value, format_number, to_integer};

use super::{arg, box_instance, unboxed};

pub(super) fn init_number_prototype(ctx: &mut Context) {
    let proto = ctx.protos.number.clone();
    ctx.define_native(&proto, "toString", number_to_string);
    ctx.define_native(&proto, "valueOf", primitive_value_of);
}

pub(super) fn init_boolean_prototype(ctx: &mut Context) {
    let proto = ctx.protos.boolean.clone();
    ctx.define_native(&proto, "toString", boolean_to_string);
    ctx.define_native(&proto, "valueOf", primitive_value_of);
}

// ═══════════════════════════════════════════════════════════════════════════════
// Number
// ═══════════════════════════════════════════════════════════════════════════════

pub(super) fn number_constructor(
    ctx: &mut Context,
    _this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let n = match args.first() {
        Some(value) => ctx.to_number(value)?,
        None => 0.0,
    };
    Ok(Value::Number(n))
}

pub(super) fn number_construct(
    ctx: &mut Context,
    this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let n = number_constructor(ctx, this, args)?;
    box_instance(this, n);
    Ok(Value::Undefined)
}

/// Digits for radixes 2 to 36; integers only, like the player
fn to_radix(n: f64, radix: u32) -> String {
    if !n.is_finite() || radix == 10 {
        return format_number(n);
    }
    let negative = n < 0.0;
    let mut value = (to_integer(n) as i64).unsigned_abs();
    let mut digits = Vec::new();
    loop {
        let digit = (value % radix as u64) as u32;
        digits.push(char::from_digit(digit, radix).unwrap_or('0'));
        value /= radix as u64;
        if value == 0 {
            break;
        }
    }
    if negative {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

/// `toString(radix)`
pub(super) fn number_to_string(
    ctx: &mut Context,
    this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let n = match unboxed(this) {
        Value::Number(n) => n,
        other => ctx.to_number(&other)?,
    };
    let radix = match arg(args, 0) {
        Value::Undefined => 10,
        value => to_integer(ctx.to_number(&value)?),
    };
    let radix = if (2..=36).contains(&radix) { radix as u32 } else { 10 };
    Ok(Value::String(ctx.intern(&to_radix(n, radix))))
}

/// valueOf of Number and Boolean: the boxed primitive
pub(super) fn primitive_value_of(
    _ctx: &mut Context,
    this: &Value,
    _args: &[Value],
) -> Result<Value, VmError> {
    Ok(unboxed(this))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Boolean
// ═══════════════════════════════════════════════════════════════════════════════

pub(super) fn boolean_constructor(
    ctx: &mut Context,
    _this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let b = args.first().is_some_and(|value| ctx.to_boolean(value));
    Ok(Value::Boolean(b))
}

pub(super) fn boolean_construct(
    ctx: &mut Context,
    this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let b = boolean_constructor(ctx, this, args)?;
    box_instance(this, b);
    Ok(Value::Undefined)
}

pub(super) fn boolean_to_string(
    ctx: &mut Context,
    this: &Value,
    _args: &[Value],
) -> Result<Value, VmError> {
    let b = match unboxed(this) {
        Value::Boolean(b) => b,
        other => ctx.to_boolean(&other),
    };
    let s = if b { &ctx.names.true_ } else { &ctx.names.false_ };
    Ok(Value::String(s.cheap_clone()))
}
