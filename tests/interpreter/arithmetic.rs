//! Arithmetic, comparison, logic and string actions across versions

use super::{as_str, eval, traces};
use asvm::{Value, opcode};

fn binary(version: u8, a: f64, b: f64, action: u8) -> Value {
    eval(version, |code| {
        code.push_number(a)
            .push_number(b)
            .emit(action)
            .emit(opcode::RETURN);
    })
}

#[test]
fn test_basic_operators() {
    assert_eq!(binary(7, 7.0, 2.0, opcode::ADD2), Value::Number(9.0));
    assert_eq!(binary(7, 7.0, 2.0, opcode::SUBTRACT), Value::Number(5.0));
    assert_eq!(binary(7, 7.0, 2.0, opcode::MULTIPLY), Value::Number(14.0));
    assert_eq!(binary(7, 7.0, 2.0, opcode::DIVIDE), Value::Number(3.5));
    assert_eq!(binary(7, 7.0, 2.0, opcode::MODULO), Value::Number(1.0));
}

#[test]
fn test_divide_by_zero_by_version() {
    assert_eq!(
        binary(7, 1.0, 0.0, opcode::DIVIDE),
        Value::Number(f64::INFINITY)
    );
    // Version 4 has no Return; observe through Trace
    let out = traces(4, |b| {
        b.push_number(1.0)
            .push_number(0.0)
            .emit(opcode::DIVIDE)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["#ERROR#"]);
}

#[test]
fn test_nan_divisor_counts_as_zero_in_version_5() {
    let result = eval(5, |b| {
        b.push_number(1.0)
            .push_str("abc")
            .emit(opcode::DIVIDE)
            .emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(f64::INFINITY));

    let result = eval(7, |b| {
        b.push_number(1.0)
            .push_str("abc")
            .emit(opcode::DIVIDE)
            .emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(f64::NAN));
}

#[test]
fn test_add2_concatenates_strings() {
    let result = eval(7, |b| {
        b.push_number(1.0)
            .push_str("a")
            .emit(opcode::ADD2)
            .emit(opcode::RETURN);
    });
    assert_eq!(as_str(&result).as_deref(), Some("1a"));
}

#[test]
fn test_version_4_add_is_numeric() {
    let out = traces(4, |b| {
        b.push_str("2")
            .push_str("3")
            .emit(opcode::ADD)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["5"]);
}

#[test]
fn test_version_4_comparisons_push_numbers() {
    let out = traces(4, |b| {
        b.push_number(2.0)
            .push_number(2.0)
            .emit(opcode::EQUALS)
            .emit(opcode::TRACE)
            .push_number(3.0)
            .push_number(2.0)
            .emit(opcode::LESS)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["1", "0"]);
}

#[test]
fn test_less2_with_nan_is_undefined() {
    let out = traces(7, |b| {
        b.push_str("x")
            .push_number(1.0)
            .emit(opcode::LESS2)
            .emit(opcode::TRACE)
            .push_number(1.0)
            .push_number(2.0)
            .emit(opcode::LESS2)
            .emit(opcode::TRACE)
            .push_number(1.0)
            .push_number(2.0)
            .emit(opcode::GREATER)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["undefined", "true", "false"]);
}

#[test]
fn test_equals2_and_strict_equals() {
    let out = traces(7, |b| {
        b.push_str("1")
            .push_number(1.0)
            .emit(opcode::EQUALS2)
            .emit(opcode::TRACE)
            .push_str("1")
            .push_number(1.0)
            .emit(opcode::STRICT_EQUALS)
            .emit(opcode::TRACE)
            .push_null()
            .push_undefined()
            .emit(opcode::EQUALS2)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["true", "false", "true"]);
}

#[test]
fn test_bitwise_operators() {
    assert_eq!(binary(7, 12.0, 10.0, opcode::BIT_AND), Value::Number(8.0));
    assert_eq!(binary(7, 12.0, 10.0, opcode::BIT_OR), Value::Number(14.0));
    assert_eq!(binary(7, 12.0, 10.0, opcode::BIT_XOR), Value::Number(6.0));
    assert_eq!(binary(7, 1.0, 4.0, opcode::BIT_LSHIFT), Value::Number(16.0));
    assert_eq!(binary(7, -16.0, 2.0, opcode::BIT_RSHIFT), Value::Number(-4.0));
    assert_eq!(binary(7, -1.0, 28.0, opcode::BIT_URSHIFT), Value::Number(15.0));
    // Shift counts use their low five bits
    assert_eq!(binary(7, 1.0, 33.0, opcode::BIT_LSHIFT), Value::Number(2.0));
}

#[test]
fn test_increment_and_to_integer() {
    let result = eval(7, |b| {
        b.push_number(-2.7)
            .emit(opcode::TO_INTEGER)
            .emit(opcode::INCREMENT)
            .emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(-1.0));
}

#[test]
fn test_logic_by_version() {
    let out = traces(4, |b| {
        b.push_number(1.0)
            .push_number(0.0)
            .emit(opcode::OR)
            .emit(opcode::TRACE)
            .push_number(5.0)
            .emit(opcode::NOT)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["1", "0"]);

    let out = traces(7, |b| {
        b.push_str("")
            .emit(opcode::NOT)
            .emit(opcode::TRACE)
            .push_str("0")
            .emit(opcode::NOT)
            .emit(opcode::TRACE);
    });
    // Non-empty strings are true from version 7
    assert_eq!(out, vec!["true", "false"]);

    let out = traces(6, |b| {
        b.push_str("0").emit(opcode::NOT).emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["true"]);
}

#[test]
fn test_to_string_of_undefined_by_version() {
    let result = eval(6, |b| {
        b.push_undefined()
            .emit(opcode::TO_STRING)
            .emit(opcode::RETURN);
    });
    assert_eq!(as_str(&result).as_deref(), Some(""));

    let result = eval(7, |b| {
        b.push_undefined()
            .emit(opcode::TO_STRING)
            .emit(opcode::RETURN);
    });
    assert_eq!(as_str(&result).as_deref(), Some("undefined"));
}

#[test]
fn test_number_parsing_by_version() {
    let result = eval(6, |b| {
        b.push_str("0x1F").emit(opcode::TO_NUMBER).emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(31.0));

    let result = eval(5, |b| {
        b.push_str("0x1F").emit(opcode::TO_NUMBER).emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(f64::NAN));
}

#[test]
fn test_string_actions() {
    let out = traces(4, |b| {
        b.push_str("hello")
            .push_number(2.0)
            .push_number(3.0)
            .emit(opcode::STRING_EXTRACT)
            .emit(opcode::TRACE)
            .push_str("h\u{e9}llo")
            .emit(opcode::STRING_LENGTH)
            .emit(opcode::TRACE)
            .push_str("ab")
            .push_str("cd")
            .emit(opcode::STRING_ADD)
            .emit(opcode::TRACE)
            .push_str("abc")
            .push_str("abd")
            .emit(opcode::STRING_LESS)
            .emit(opcode::TRACE)
            .push_str("A")
            .emit(opcode::CHAR_TO_ASCII)
            .emit(opcode::TRACE)
            .push_number(66.0)
            .emit(opcode::ASCII_TO_CHAR)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["ell", "5", "abcd", "1", "65", "B"]);
}

#[test]
fn test_string_extract_negative_count_takes_rest() {
    let result = eval(7, |b| {
        b.push_str("abcdef")
            .push_number(3.0)
            .push_number(-1.0)
            .emit(opcode::STRING_EXTRACT)
            .emit(opcode::RETURN);
    });
    assert_eq!(as_str(&result).as_deref(), Some("cdef"));
}

#[test]
fn test_type_of() {
    let out = traces(7, |b| {
        b.push_number(1.0)
            .emit(opcode::TYPE_OF)
            .emit(opcode::TRACE)
            .push_str("s")
            .emit(opcode::TYPE_OF)
            .emit(opcode::TRACE)
            .push_undefined()
            .emit(opcode::TYPE_OF)
            .emit(opcode::TRACE)
            .push_number(0.0)
            .emit(opcode::INIT_OBJECT)
            .emit(opcode::TYPE_OF)
            .emit(opcode::TRACE)
            .push_str("_root")
            .emit(opcode::GET_VARIABLE)
            .emit(opcode::TYPE_OF)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["number", "string", "undefined", "object", "movieclip"]);
}

#[test]
fn test_number_formatting_in_traces() {
    let out = traces(7, |b| {
        b.push_number(0.1)
            .push_number(0.2)
            .emit(opcode::ADD2)
            .emit(opcode::TRACE)
            .push_number(1e21)
            .emit(opcode::TRACE)
            .push_number(-0.0)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["0.3", "1e+21", "0"]);
}

#[test]
fn test_random_and_time_come_from_host() {
    // The recording host reports 0 for both
    let out = traces(7, |b| {
        b.push_number(10.0)
            .emit(opcode::RANDOM_NUMBER)
            .emit(opcode::TRACE)
            .emit(opcode::GET_TIME)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["0", "0"]);
}
