//! Global functions

use crate::error::VmError;
use crate::interpreter::Context;
use crate::object::VariableFlags;
use crate::value::Value;

use super::arg;

pub(super) fn init_global(ctx: &mut Context) {
    let global = ctx.global();
    ctx.define_native(&global, "ASSetPropFlags", global_as_set_prop_flags);
    ctx.define_native(&global, "isNaN", global_is_nan);
    ctx.define_native(&global, "isFinite", global_is_finite);
}

/// `ASSetPropFlags(obj, names, set, clear)`.
///
/// `names` is a comma separated string, an array of names, or Null for
/// every own property.
pub(super) fn global_as_set_prop_flags(
    ctx: &mut Context,
    _this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let Value::Object(obj) = arg(args, 0) else {
        return Ok(Value::Undefined);
    };
    let set = VariableFlags::from_bits(to_flag_bits(ctx, &arg(args, 2))?);
    let clear = VariableFlags::from_bits(to_flag_bits(ctx, &arg(args, 3))?);

    let names = match arg(args, 1) {
        Value::Null | Value::Undefined => obj.borrow().properties.keys().cloned().collect(),
        Value::Object(list) if !list.borrow().is_callable() => {
            let len = ctx.array_length(&list);
            let mut names = Vec::with_capacity(len);
            for index in 0..len {
                let key = ctx.intern(&index.to_string());
                let value = ctx.get_member(&list, &key).unwrap_or_default();
                names.push(ctx.to_string(&value)?);
            }
            names
        }
        other => {
            let joined = ctx.to_string(&other)?;
            let mut names = Vec::new();
            for name in joined.as_str().split(',') {
                names.push(ctx.intern(name));
            }
            names
        }
    };
    for name in &names {
        ctx.set_member_flags(&obj, name, set, clear);
    }
    tracing::trace!(count = names.len(), set = set.bits(), clear = clear.bits(), "ASSetPropFlags");
    Ok(Value::Undefined)
}

fn to_flag_bits(ctx: &mut Context, value: &Value) -> Result<u16, VmError> {
    if value.is_undefined_or_null() {
        return Ok(0);
    }
    Ok(ctx.to_number(value)? as i64 as u16)
}

pub(super) fn global_is_nan(
    ctx: &mut Context,
    _this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let n = ctx.to_number(&arg(args, 0))?;
    Ok(Value::Boolean(n.is_nan()))
}

pub(super) fn global_is_finite(
    ctx: &mut Context,
    _this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let n = ctx.to_number(&arg(args, 0))?;
    Ok(Value::Boolean(n.is_finite()))
}
