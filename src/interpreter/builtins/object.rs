//! Object constructor and Object.prototype

use crate::error::VmError;
use crate::interpreter::Context;
use crate::object::VariableFlags;
use crate::value::Value;

use super::arg;

/// Fill Object.prototype
pub(super) fn init_object_prototype(ctx: &mut Context) {
    let proto = ctx.protos.object.clone();
    ctx.define_native(&proto, "toString", object_to_string);
    ctx.define_native(&proto, "valueOf", object_value_of);
    ctx.define_native_with(
        &proto,
        "hasOwnProperty",
        object_has_own_property,
        VariableFlags::HIDDEN | VariableFlags::VERSION_6_UP,
    );
}

/// `Object(value)`: objects pass through, primitives are boxed and
/// Undefined or Null yield a new empty object
pub(super) fn object_constructor(
    ctx: &mut Context,
    this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let value = arg(args, 0);
    if let Some(obj) = ctx.to_object(&value) {
        return Ok(Value::Object(obj));
    }
    Ok(match this {
        Value::Object(_) => this.clone(),
        _ => Value::Object(ctx.create_object()),
    })
}

pub(super) fn object_to_string(
    ctx: &mut Context,
    _this: &Value,
    _args: &[Value],
) -> Result<Value, VmError> {
    Ok(Value::String(ctx.intern("[object Object]")))
}

pub(super) fn object_value_of(
    _ctx: &mut Context,
    this: &Value,
    _args: &[Value],
) -> Result<Value, VmError> {
    Ok(this.clone())
}

pub(super) fn object_has_own_property(
    ctx: &mut Context,
    this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let Value::Object(obj) = this else {
        return Ok(Value::Boolean(false));
    };
    let name = ctx.to_string(&arg(args, 0))?;
    let case_sensitive = ctx.case_sensitive();
    let found = obj.borrow().has_own(&name, case_sensitive);
    Ok(Value::Boolean(found))
}
