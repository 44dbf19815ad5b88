//! Array constructor and Array.prototype

use crate::error::VmError;
use crate::interpreter::Context;
use crate::object::{ObjectKind, VariableFlags};
use crate::value::{CheapClone, ObjRef, Value};

use super::arg;

pub(super) fn init_array_prototype(ctx: &mut Context) {
    let proto = ctx.protos.array.clone();
    ctx.define_native(&proto, "push", array_push);
    ctx.define_native(&proto, "pop", array_pop);
    ctx.define_native(&proto, "join", array_join);
    ctx.define_native(&proto, "toString", array_to_string);
}

/// Elements for `Array(...)`: a single number is a length
fn constructor_elements(args: &[Value]) -> Vec<Value> {
    match args {
        [Value::Number(n)] if *n >= 0.0 && n.fract() == 0.0 => {
            vec![Value::Undefined; *n as usize]
        }
        _ => args.to_vec(),
    }
}

pub(super) fn array_constructor(
    ctx: &mut Context,
    _this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let elements = constructor_elements(args);
    Ok(Value::Object(ctx.create_array(elements)))
}

/// `new Array(...)` turns the instance itself into an array
pub(super) fn array_construct(
    ctx: &mut Context,
    this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let Value::Object(obj) = this else {
        return array_constructor(ctx, this, args);
    };
    obj.borrow_mut().kind = ObjectKind::Array;
    let elements = constructor_elements(args);
    let len = elements.len();
    for (index, value) in elements.into_iter().enumerate() {
        if !value.is_undefined() {
            let key = ctx.intern(&index.to_string());
            obj.borrow_mut().define(key, value, VariableFlags::NONE);
        }
    }
    obj.borrow_mut().define(
        ctx.names.length.cheap_clone(),
        Value::Number(len as f64),
        VariableFlags::HIDDEN | VariableFlags::PERMANENT,
    );
    Ok(Value::Undefined)
}

fn this_array(this: &Value) -> Option<&ObjRef> {
    this.as_object()
}

/// Append the arguments; returns the new length
pub(super) fn array_push(
    ctx: &mut Context,
    this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let Some(array) = this_array(this) else {
        return Ok(Value::Undefined);
    };
    let mut len = ctx.array_length(array);
    for value in args {
        let key = ctx.intern(&len.to_string());
        ctx.set_member(array, &key, value.clone());
        len += 1;
    }
    let length = ctx.names.length.cheap_clone();
    ctx.set_member(array, &length, Value::Number(len as f64));
    Ok(Value::Number(len as f64))
}

/// Remove and return the last element
pub(super) fn array_pop(
    ctx: &mut Context,
    this: &Value,
    _args: &[Value],
) -> Result<Value, VmError> {
    let Some(array) = this_array(this) else {
        return Ok(Value::Undefined);
    };
    let len = ctx.array_length(array);
    if len == 0 {
        return Ok(Value::Undefined);
    }
    let key = ctx.intern(&(len - 1).to_string());
    let last = ctx.get_member(array, &key).unwrap_or_default();
    let length = ctx.names.length.cheap_clone();
    ctx.set_member(array, &length, Value::Number((len - 1) as f64));
    Ok(last)
}

/// Elements converted to strings and joined with `separator`. Undefined
/// elements become empty strings.
fn join(ctx: &mut Context, array: &ObjRef, separator: &str) -> Result<Value, VmError> {
    let len = ctx.array_length(array);
    let mut out = String::new();
    for index in 0..len {
        if index > 0 {
            out.push_str(separator);
        }
        let key = ctx.intern(&index.to_string());
        match ctx.get_member(array, &key) {
            None | Some(Value::Undefined) => {}
            Some(value) => out.push_str(ctx.to_string(&value)?.as_str()),
        }
    }
    Ok(Value::String(ctx.intern(&out)))
}

pub(super) fn array_join(
    ctx: &mut Context,
    this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    let Some(array) = this_array(this) else {
        return Ok(Value::Undefined);
    };
    let separator = match arg(args, 0) {
        Value::Undefined => ",".to_string(),
        value => ctx.to_string(&value)?.as_str().to_string(),
    };
    join(ctx, array, &separator)
}

pub(super) fn array_to_string(
    ctx: &mut Context,
    this: &Value,
    _args: &[Value],
) -> Result<Value, VmError> {
    match this_array(this) {
        Some(array) => join(ctx, array, ","),
        None => Ok(Value::Undefined),
    }
}
