//! ConstantPool declarations and pool references

use super::{as_str, eval, traces};
use asvm::{PushValue, opcode};

#[test]
fn test_push_constant() {
    let result = eval(7, |b| {
        b.constant_pool(&["a", "b", "c"])
            .push_constant(1)
            .emit(opcode::RETURN);
    });
    assert_eq!(as_str(&result).as_deref(), Some("b"));
}

#[test]
fn test_missing_entry_pushes_undefined() {
    let out = traces(7, |b| {
        b.constant_pool(&["only"])
            .push_constant(5)
            .emit(opcode::TRACE)
            .push_constant(0)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["undefined", "only"]);
}

#[test]
fn test_reference_without_pool() {
    let out = traces(7, |b| {
        b.push_constant(0).emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["undefined"]);
}

#[test]
fn test_later_pool_replaces_earlier() {
    let out = traces(7, |b| {
        b.constant_pool(&["first"])
            .push_constant(0)
            .emit(opcode::TRACE)
            .constant_pool(&["second"])
            .push_constant(0)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["first", "second"]);
}

#[test]
fn test_wide_constant_index() {
    let entries: Vec<String> = (0..300).map(|i| format!("s{}", i)).collect();
    let refs: Vec<&str> = entries.iter().map(String::as_str).collect();
    let result = eval(7, |b| {
        b.constant_pool(&refs)
            .push(&[PushValue::Constant(299)])
            .emit(opcode::RETURN);
    });
    assert_eq!(as_str(&result).as_deref(), Some("s299"));
}

#[test]
fn test_functions_see_the_defining_pool() {
    let out = traces(7, |b| {
        b.constant_pool(&["greet", "hello"])
            .define_function("greet", &[], |f| {
                f.push_constant(1).emit(opcode::TRACE);
            })
            .push_number(0.0)
            .push_constant(0)
            .emit(opcode::CALL_FUNCTION)
            .emit(opcode::POP);
    });
    assert_eq!(out, vec!["hello"]);
}
