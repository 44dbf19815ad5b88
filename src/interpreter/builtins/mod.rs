//! Builtin objects
//!
//! Prototypes are created with the context; `install` fills them with their
//! native methods and puts the constructors on the global object.

mod array;
mod function;
mod global;
mod number;
mod object;
mod string;

use crate::interpreter::Context;
use crate::object::{Function, NativeFn, NativeFunction, ObjectKind, VariableFlags};
use crate::value::{CheapClone, ObjRef, Value};

/// Populate the builtin prototypes and the global object
pub(crate) fn install(ctx: &mut Context) {
    object::init_object_prototype(ctx);
    function::init_function_prototype(ctx);
    array::init_array_prototype(ctx);
    string::init_string_prototype(ctx);
    number::init_number_prototype(ctx);
    number::init_boolean_prototype(ctx);

    let protos = [
        ("Object", object::object_constructor as NativeFn, None, ctx.protos.object.cheap_clone()),
        ("Function", function::function_constructor as NativeFn, None, ctx.protos.function.cheap_clone()),
        (
            "Array",
            array::array_constructor as NativeFn,
            Some(array::array_construct as NativeFn),
            ctx.protos.array.cheap_clone(),
        ),
        (
            "String",
            string::string_constructor as NativeFn,
            Some(string::string_construct as NativeFn),
            ctx.protos.string.cheap_clone(),
        ),
        (
            "Number",
            number::number_constructor as NativeFn,
            Some(number::number_construct as NativeFn),
            ctx.protos.number.cheap_clone(),
        ),
        (
            "Boolean",
            number::boolean_constructor as NativeFn,
            Some(number::boolean_construct as NativeFn),
            ctx.protos.boolean.cheap_clone(),
        ),
    ];
    for (name, func, construct, prototype) in protos {
        install_constructor(ctx, name, func, construct, &prototype);
    }

    global::init_global(ctx);
}

/// Create a constructor around an existing prototype and define it on the
/// global object
fn install_constructor(
    ctx: &mut Context,
    name: &str,
    func: NativeFn,
    construct: Option<NativeFn>,
    prototype: &ObjRef,
) -> ObjRef {
    let name = ctx.intern(name);
    let ctor = ctx.create_function(Function::Native(NativeFunction {
        name: name.cheap_clone(),
        func,
        construct,
    }));
    ctor.borrow_mut().define(
        ctx.names.prototype.cheap_clone(),
        Value::Object(prototype.cheap_clone()),
        VariableFlags::HIDDEN | VariableFlags::PERMANENT,
    );
    prototype.borrow_mut().define(
        ctx.names.constructor.cheap_clone(),
        Value::Object(ctor.cheap_clone()),
        VariableFlags::HIDDEN,
    );
    ctx.global.borrow_mut().define(
        name,
        Value::Object(ctor.cheap_clone()),
        VariableFlags::HIDDEN,
    );
    ctor
}

/// Argument `index`, Undefined when missing
fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or_default()
}

/// The primitive inside a boxed `this`, or `this` itself
fn unboxed(this: &Value) -> Value {
    if let Value::Object(obj) = this {
        if let ObjectKind::Boxed(inner) = &obj.borrow().kind {
            return inner.clone();
        }
    }
    this.clone()
}

/// Turn a freshly constructed instance into a boxed primitive
fn box_instance(this: &Value, value: Value) {
    if let Value::Object(obj) = this {
        obj.borrow_mut().kind = ObjectKind::Boxed(value);
    }
}
