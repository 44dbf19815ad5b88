//! Push records, registers and stack manipulation

use super::{as_str, eval, traces};
use asvm::{PushValue, Value, opcode};

#[test]
fn test_push_literal_types() {
    let out = traces(7, |b| {
        b.push(&[
            PushValue::from("text"),
            PushValue::Float(1.5),
            PushValue::Null,
            PushValue::Undefined,
            PushValue::Boolean(true),
            PushValue::Double(-0.25),
            PushValue::Integer(42),
        ]);
        for _ in 0..7 {
            b.emit(opcode::TRACE);
        }
    });
    assert_eq!(
        out,
        vec!["42", "-0.25", "true", "undefined", "null", "1.5", "text"]
    );
}

#[test]
fn test_integer_push_is_signed() {
    let result = eval(7, |b| {
        b.push(&[PushValue::Integer(u32::MAX)]).emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(-1.0));
}

#[test]
fn test_store_and_push_register() {
    let result = eval(7, |b| {
        b.push_number(9.0)
            .store_register(2)
            .emit(opcode::POP)
            .push_register(2)
            .emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(9.0));
}

#[test]
fn test_store_register_keeps_top() {
    let result = eval(7, |b| {
        b.push_number(4.0).store_register(1).emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(4.0));
}

#[test]
fn test_missing_register_pushes_undefined() {
    let out = traces(7, |b| {
        b.push_register(200).emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["undefined"]);
}

#[test]
fn test_push_duplicate_and_swap() {
    let out = traces(7, |b| {
        b.push_str("a")
            .push_str("b")
            .emit(opcode::STACK_SWAP)
            .emit(opcode::TRACE)
            .emit(opcode::PUSH_DUPLICATE)
            .emit(opcode::TRACE)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["a", "b", "b"]);
}

#[test]
fn test_underflow_pads_with_undefined() {
    // Version 6 converts Undefined to 0
    let result = eval(6, |b| {
        b.emit(opcode::ADD2).emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(0.0));

    let result = eval(7, |b| {
        b.emit(opcode::ADD2).emit(opcode::RETURN);
    });
    assert!(matches!(result, Value::Number(n) if n.is_nan()));
}

#[test]
fn test_latin1_strings_below_version_6() {
    let result = eval(5, |b| {
        b.push_str("caf\u{e9}").emit(opcode::RETURN);
    });
    assert_eq!(as_str(&result).as_deref(), Some("caf\u{e9}"));
}
