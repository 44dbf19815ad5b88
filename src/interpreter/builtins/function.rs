//! Function constructor and Function.prototype

use crate::error::VmError;
use crate::interpreter::Context;
use crate::object::VariableFlags;
use crate::value::Value;

use super::arg;

pub(super) fn init_function_prototype(ctx: &mut Context) {
    let proto = ctx.protos.function.clone();
    let flags = VariableFlags::HIDDEN | VariableFlags::VERSION_6_UP;
    ctx.define_native_with(&proto, "call", function_call, flags);
    ctx.define_native_with(&proto, "apply", function_apply, flags);
}

/// Scripts cannot be compiled at runtime; `Function()` yields Undefined
pub(super) fn function_constructor(
    _ctx: &mut Context,
    _this: &Value,
    _args: &[Value],
) -> Result<Value, VmError> {
    Ok(Value::Undefined)
}

/// `f.call(thisArg, ...args)`
pub(super) fn function_call(
    ctx: &mut Context,
    this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let this_arg = arg(args, 0);
    let rest = args.get(1..).unwrap_or_default();
    ctx.call_function(this, &this_arg, rest)
}

/// `f.apply(thisArg, array)`; a missing or non-object array passes no
/// arguments
pub(super) fn function_apply(
    ctx: &mut Context,
    this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let this_arg = arg(args, 0);
    let call_args = match arg(args, 1) {
        Value::Object(array) => {
            let len = ctx.array_length(&array);
            let mut values = Vec::with_capacity(len);
            for index in 0..len {
                let key = ctx.intern(&index.to_string());
                values.push(ctx.get_member(&array, &key).unwrap_or_default());
            }
            values
        }
        _ => Vec::new(),
    };
    ctx.call_function(this, &this_arg, &call_args)
}
