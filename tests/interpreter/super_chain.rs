//! Extends, super() and super.method() through the super proxy

use super::traces;
use asvm::{ActionBuilder, opcode};

/// `class.prototype.method = function () { body }`
fn define_method(
    b: &mut ActionBuilder,
    class: &str,
    method: &str,
    body: impl FnOnce(&mut ActionBuilder),
) {
    b.push_str(class)
        .emit(opcode::GET_VARIABLE)
        .push_str("prototype")
        .emit(opcode::GET_MEMBER)
        .push_str(method);
    b.define_function("", &[], body);
    b.emit(opcode::SET_MEMBER);
}

fn extends(b: &mut ActionBuilder, subclass: &str, superclass: &str) {
    b.push_str(subclass)
        .emit(opcode::GET_VARIABLE)
        .push_str(superclass)
        .emit(opcode::GET_VARIABLE)
        .emit(opcode::EXTENDS);
}

/// `super()` with the result discarded
fn call_super_constructor(f: &mut ActionBuilder) {
    f.push_number(0.0)
        .push_str("super")
        .emit(opcode::GET_VARIABLE)
        .push_undefined()
        .emit(opcode::CALL_METHOD)
        .emit(opcode::POP);
}

/// `super.method()`, leaving the result on the stack
fn call_super_method(f: &mut ActionBuilder, method: &str) {
    f.push_number(0.0)
        .push_str("super")
        .emit(opcode::GET_VARIABLE)
        .push_str(method)
        .emit(opcode::CALL_METHOD);
}

/// `name.method()`, leaving the result on the stack
fn call_method(b: &mut ActionBuilder, name: &str, method: &str) {
    b.push_number(0.0)
        .push_str(name)
        .emit(opcode::GET_VARIABLE)
        .push_str(method)
        .emit(opcode::CALL_METHOD);
}

/// `var name = new class()`
fn new_instance(b: &mut ActionBuilder, name: &str, class: &str) {
    b.push_str(name)
        .push_number(0.0)
        .push_str(class)
        .emit(opcode::NEW_OBJECT)
        .emit(opcode::SET_VARIABLE);
}

/// A.who() returns "A"; B extends A and prefixes "B"
fn two_classes(b: &mut ActionBuilder) {
    b.define_function("A", &[], |f| {
        f.push_str("A ctor").emit(opcode::TRACE);
    });
    b.define_function("B", &[], |f| {
        call_super_constructor(f);
        f.push_str("B ctor").emit(opcode::TRACE);
    });
    extends(b, "B", "A");
    define_method(b, "A", "who", |f| {
        f.push_str("A").emit(opcode::RETURN);
    });
    define_method(b, "B", "who", |f| {
        f.push_str("B");
        call_super_method(f, "who");
        f.emit(opcode::ADD2).emit(opcode::RETURN);
    });
}

#[test]
fn test_super_constructor_and_method() {
    let out = traces(7, |b| {
        two_classes(b);
        new_instance(b, "obj", "B");
        call_method(b, "obj", "who");
        b.emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["A ctor", "B ctor", "BA"]);
}

#[test]
fn test_super_in_version_6() {
    let out = traces(6, |b| {
        two_classes(b);
        new_instance(b, "obj", "B");
        call_method(b, "obj", "who");
        b.emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["A ctor", "B ctor", "BA"]);
}

#[test]
fn test_three_level_chain() {
    let out = traces(7, |b| {
        two_classes(b);
        b.define_function("C", &[], |f| {
            call_super_constructor(f);
        });
        extends(b, "C", "B");
        define_method(b, "C", "who", |f| {
            f.push_str("C");
            call_super_method(f, "who");
            f.emit(opcode::ADD2).emit(opcode::RETURN);
        });
        new_instance(b, "obj", "C");
        call_method(b, "obj", "who");
        b.emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["A ctor", "B ctor", "CBA"]);
}

#[test]
fn test_super_skips_classes_without_the_method() {
    // C extends B extends A, only A and C define who()
    let out = traces(7, |b| {
        b.define_function("A", &[], |_| {});
        b.define_function("B", &[], |_| {});
        b.define_function("C", &[], |_| {});
        extends(b, "B", "A");
        extends(b, "C", "B");
        define_method(b, "A", "who", |f| {
            f.push_str("A").emit(opcode::RETURN);
        });
        define_method(b, "C", "who", |f| {
            f.push_str("C");
            call_super_method(f, "who");
            f.emit(opcode::ADD2).emit(opcode::RETURN);
        });
        new_instance(b, "obj", "C");
        call_method(b, "obj", "who");
        b.emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["CA"]);
}

#[test]
fn test_instance_of_and_cast() {
    let out = traces(7, |b| {
        two_classes(b);
        b.define_function("Other", &[], |_| {});
        new_instance(b, "obj", "B");
        b.push_str("obj")
            .emit(opcode::GET_VARIABLE)
            .push_str("A")
            .emit(opcode::GET_VARIABLE)
            .emit(opcode::INSTANCE_OF)
            .emit(opcode::TRACE);
        b.push_str("obj")
            .emit(opcode::GET_VARIABLE)
            .push_str("Other")
            .emit(opcode::GET_VARIABLE)
            .emit(opcode::INSTANCE_OF)
            .emit(opcode::TRACE);
        b.push_str("Other")
            .emit(opcode::GET_VARIABLE)
            .push_str("obj")
            .emit(opcode::GET_VARIABLE)
            .emit(opcode::CAST)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["A ctor", "B ctor", "true", "false", "null"]);
}

#[test]
fn test_writes_through_super_are_ignored() {
    let out = traces(7, |b| {
        two_classes(b);
        define_method(b, "B", "poke", |f| {
            f.push_str("super")
                .emit(opcode::GET_VARIABLE)
                .push_str("field")
                .push_number(1.0)
                .emit(opcode::SET_MEMBER);
            f.push_str("this")
                .emit(opcode::GET_VARIABLE)
                .push_str("field")
                .emit(opcode::GET_MEMBER)
                .emit(opcode::TRACE);
        });
        new_instance(b, "obj", "B");
        call_method(b, "obj", "poke");
        b.emit(opcode::POP);
    });
    assert_eq!(out, vec!["A ctor", "B ctor", "undefined"]);
}

#[test]
fn test_inherited_method_without_override() {
    let out = traces(7, |b| {
        two_classes(b);
        define_method(b, "A", "base", |f| {
            f.push_str("from A").emit(opcode::RETURN);
        });
        new_instance(b, "obj", "B");
        call_method(b, "obj", "base");
        b.emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["A ctor", "B ctor", "from A"]);
}
