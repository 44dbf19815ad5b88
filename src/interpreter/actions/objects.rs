//! Variables, members and object construction

use crate::error::VmError;
use crate::interpreter::Context;
use crate::interpreter::property::{MAX_PROTOTYPE_DEPTH, PathStyle};
use crate::object::{AsObject, VariableFlags};
use crate::value::{AsString, CheapClone, ObjRef, Value};

// ═══════════════════════════════════════════════════════════════════════════════
// Variables
// ═══════════════════════════════════════════════════════════════════════════════

pub(crate) fn get_variable(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let name = ctx.pop_string()?;
    let value = ctx.get_variable(&name)?;
    ctx.push(value)
}

pub(crate) fn set_variable(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let value = ctx.pop()?;
    let name = ctx.pop_string()?;
    ctx.set_variable(&name, value)
}

pub(crate) fn define_local(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let value = ctx.pop()?;
    let name = ctx.pop_string()?;
    ctx.define_local(&name, value)
}

/// Declare a local without a value; an existing local keeps its value
pub(crate) fn define_local2(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let name = ctx.pop_string()?;
    let var_object = ctx.frame()?.var_object();
    let exists = var_object.borrow().has_own(&name, ctx.case_sensitive());
    if !exists {
        ctx.define_local(&name, Value::Undefined)?;
    }
    Ok(())
}

/// Delete a member of an object
pub(crate) fn delete(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let name = ctx.pop_string()?;
    let value = ctx.pop()?;
    let deleted = match value.as_object() {
        Some(obj) => ctx.delete_member(obj, &name),
        None => false,
    };
    ctx.push_bool(deleted)
}

/// Delete a variable found through the scope chain
pub(crate) fn delete2(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let name = ctx.pop_string()?;
    let deleted = ctx.delete_variable(&name)?;
    ctx.push_bool(deleted)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Members
// ═══════════════════════════════════════════════════════════════════════════════

pub(crate) fn get_member(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let name = ctx.pop()?;
    let value = ctx.pop()?;
    let name = ctx.to_string(&name)?;
    let result = match ctx.to_object(&value) {
        Some(obj) => ctx.get_member(&obj, &name).unwrap_or_default(),
        None => {
            tracing::debug!(name = name.as_str(), "member of undefined");
            Value::Undefined
        }
    };
    ctx.push(result)
}

pub(crate) fn set_member(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let value = ctx.pop()?;
    let name = ctx.pop()?;
    let target = ctx.pop()?;
    let name = ctx.to_string(&name)?;
    match target.as_object() {
        Some(obj) => ctx.set_member(obj, &name, value),
        None => tracing::debug!(name = name.as_str(), target = ?target, "member of a primitive"),
    }
    Ok(())
}

/// The first value popped becomes element 0
pub(crate) fn init_array(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let elements = ctx.pop_arguments()?;
    let array = ctx.create_array(elements);
    ctx.push(Value::Object(array))
}

/// Pairs are popped value first, then name. A count larger than the
/// stack takes the pairs that are there.
pub(crate) fn init_object(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let count = ctx.pop_integer()?.max(0) as usize;
    let available = ctx.stack_mut()?.len() / 2;
    if count > available {
        tracing::warn!(count, available, "too few properties on the stack");
    }
    let count = count.min(available);
    let obj = ctx.create_object();
    for _ in 0..count {
        let value = ctx.pop()?;
        let name = ctx.pop_string()?;
        ctx.set_member(&obj, &name, value);
    }
    ctx.push(Value::Object(obj))
}

pub(crate) fn type_of(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let value = ctx.pop()?;
    let name = ctx.intern(value.type_of());
    ctx.push(Value::String(name))
}

/// Dotted path of a movie, Undefined for anything else
pub(crate) fn target_path(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let value = ctx.pop()?;
    let path = match value.as_object() {
        Some(obj) if obj.borrow().is_movie() => {
            let path = ctx.movie_path(obj, PathStyle::Dots);
            Value::String(ctx.intern(&path))
        }
        _ => Value::Undefined,
    };
    ctx.push(path)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Enumeration
// ═══════════════════════════════════════════════════════════════════════════════

/// Push Null followed by every enumerable name of `value`
fn push_names(ctx: &mut Context, value: &Value) -> Result<(), VmError> {
    let names = match value.as_object() {
        Some(obj) => ctx.enumerate_names(obj),
        None => Vec::new(),
    };
    let stack = ctx.stack_mut()?;
    stack.ensure_left(names.len() + 1);
    stack.push(Value::Null);
    for name in names {
        stack.push(Value::String(name));
    }
    Ok(())
}

/// Enumerate the variable named on the stack
pub(crate) fn enumerate(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let name = ctx.pop_string()?;
    let value = ctx.get_variable(&name)?;
    push_names(ctx, &value)
}

/// Enumerate the object on the stack
pub(crate) fn enumerate2(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let value = ctx.pop()?;
    push_names(ctx, &value)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Classes
// ═══════════════════════════════════════════════════════════════════════════════

/// Whether `constructor.prototype` is on the prototype chain of `value`
pub(crate) fn is_instance(ctx: &Context, value: &Value, constructor: &Value) -> bool {
    let (Some(obj), Some(ctor)) = (value.as_object(), constructor.as_object()) else {
        return false;
    };
    let Some(Value::Object(prototype)) = ctx.get_member(ctor, &ctx.names.prototype) else {
        return false;
    };
    let mut current = obj.borrow().prototype();
    for _ in 0..MAX_PROTOTYPE_DEPTH {
        match current {
            Some(p) if p == prototype => return true,
            Some(p) => current = p.borrow().prototype(),
            None => return false,
        }
    }
    false
}

pub(crate) fn instance_of(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let constructor = ctx.pop()?;
    let value = ctx.pop()?;
    let result = is_instance(ctx, &value, &constructor);
    ctx.push_bool(result)
}

/// Cast: the object if it is an instance of the class, Null otherwise
pub(crate) fn cast(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let value = ctx.pop()?;
    let constructor = ctx.pop()?;
    if is_instance(ctx, &value, &constructor) {
        ctx.push(value)
    } else {
        ctx.push(Value::Null)
    }
}

/// Extends: `subclass.prototype` becomes a new object inheriting from
/// `superclass.prototype`, remembering the superclass constructor for
/// `super()`.
pub(crate) fn extends(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let superclass = ctx.pop()?;
    let subclass = ctx.pop()?;
    let (Some(sub), Some(sup)) = (subclass.as_object(), superclass.as_object()) else {
        tracing::warn!(?subclass, ?superclass, "Extends needs two functions");
        return Ok(());
    };
    let prototype_name = ctx.names.prototype.cheap_clone();
    let super_prototype = ctx
        .get_member(sup, &prototype_name)
        .and_then(|p| p.as_object().cloned());
    let prototype = ctx.alloc(AsObject::with_prototype(super_prototype.as_ref()));
    prototype.borrow_mut().define(
        ctx.names.constructor_hidden.cheap_clone(),
        superclass.clone(),
        VariableFlags::HIDDEN,
    );
    ctx.set_member(sub, &prototype_name, Value::Object(prototype));
    Ok(())
}

/// NewObject: construct the function named on the stack
pub(crate) fn new_object(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let name = ctx.pop_string()?;
    let args = ctx.pop_arguments()?;
    let constructor = ctx.get_variable(&name)?;
    let slot = ctx.push_result_slot()?;
    ctx.construct(&constructor, args, slot)
}

/// NewMethod: construct a member of an object, or the object itself when
/// the name is empty
pub(crate) fn new_method(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let name = ctx.pop()?;
    let target = ctx.pop()?;
    let args = ctx.pop_arguments()?;
    let constructor = match method_name(ctx, &name)? {
        None => target,
        Some(name) => member_of(ctx, &target, &name),
    };
    let slot = ctx.push_result_slot()?;
    ctx.construct(&constructor, args, slot)
}

/// Method name operand of CallMethod/NewMethod; `None` when undefined or
/// empty
pub(crate) fn method_name(ctx: &mut Context, name: &Value) -> Result<Option<AsString>, VmError> {
    if name.is_undefined() {
        return Ok(None);
    }
    let name = ctx.to_string(name)?;
    Ok(if name.is_empty() { None } else { Some(name) })
}

pub(crate) fn member_of(ctx: &mut Context, target: &Value, name: &AsString) -> Value {
    let obj: Option<ObjRef> = ctx.to_object(target);
    obj.and_then(|obj| ctx.get_member(&obj, name))
        .unwrap_or_default()
}
