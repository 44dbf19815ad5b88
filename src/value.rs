//! ActionScript value representation
//!
//! The core Value type, interned strings and the pure (context free) parts of
//! the coercion rules. Conversions that may call back into script code
//! (`valueOf`, `toString`) live on the interpreter context.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::gc::{Gc, Traceable};
use crate::object::AsObject;

/// Trait for types that have cheap (O(1), reference-counted) clones.
///
/// This trait makes it explicit when a clone is cheap (just incrementing a reference count)
/// vs when it might be expensive (copying data).
pub trait CheapClone: Clone {
    /// Create a cheap (reference-counted) clone of this value.
    fn cheap_clone(&self) -> Self {
        self.clone()
    }
}

impl<T: ?Sized> CheapClone for Rc<T> {}

impl<T: Traceable> CheapClone for Gc<T> {}

/// Handle to a GC-managed object
pub type ObjRef = Gc<AsObject>;

/// An ActionScript value
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(AsString),
    Object(ObjRef),
}

// Value only holds Rc-backed handles or plain data
impl CheapClone for Value {}

impl Value {
    /// Check if this value is null or undefined
    pub fn is_undefined_or_null(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn as_object(&self) -> Option<&ObjRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&AsString> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Check if this value is callable
    pub fn is_callable(&self) -> bool {
        match self {
            Value::Object(obj) => obj.borrow().is_callable(),
            _ => false,
        }
    }

    /// The result of the `typeof` operator
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(obj) => {
                let obj = obj.borrow();
                if obj.is_movie() {
                    "movieclip"
                } else if obj.is_callable() {
                    "function"
                } else {
                    "object"
                }
            }
        }
    }

    /// Convert to boolean.
    ///
    /// Below version 7 strings convert through their numeric value.
    pub fn to_boolean(&self, version: u8) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => {
                if version < 7 {
                    let n = parse_number(s.as_str(), version);
                    n != 0.0 && !n.is_nan()
                } else {
                    !s.is_empty()
                }
            }
            Value::Object(_) => true,
        }
    }

    /// Numeric value of a primitive. Objects yield NaN; callers that need
    /// `valueOf` go through the context.
    pub fn primitive_to_number(&self, version: u8) -> f64 {
        match self {
            Value::Undefined | Value::Null => {
                if version < 7 {
                    0.0
                } else {
                    f64::NAN
                }
            }
            Value::Boolean(true) => 1.0,
            Value::Boolean(false) => 0.0,
            Value::Number(n) => *n,
            Value::String(s) => parse_number(s.as_str(), version),
            Value::Object(_) => f64::NAN,
        }
    }

    /// Strict equality (StrictEquals)
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Gc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "\"{}\"", s.as_str()),
            Value::Object(obj) => match obj.try_borrow() {
                Some(o) => write!(f, "[{} #{}]", o.kind_name(), obj.id()),
                None => write!(f, "[object #{}]", obj.id()),
            },
        }
    }
}

/// Structural equality: NaN equals NaN so values can be compared in tests
/// and lookups. Script-level equality uses the Equals2/StrictEquals rules.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => self.strict_equals(other),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<AsString> for Value {
    fn from(s: AsString) -> Self {
        Value::String(s)
    }
}

impl From<ObjRef> for Value {
    fn from(obj: ObjRef) -> Self {
        Value::Object(obj)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// AsString
// ═══════════════════════════════════════════════════════════════════════════════

/// Reference-counted string.
///
/// Strings created by a context are interned, so equality almost always
/// resolves on the pointer comparison.
#[derive(Clone)]
pub struct AsString(Rc<str>);

impl CheapClone for AsString {}

impl AsString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Length in characters, the unit string actions count in
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// Whether both handles point at the same interned storage
    pub fn ptr_eq(a: &AsString, b: &AsString) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl PartialEq for AsString {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for AsString {}

impl Hash for AsString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl AsRef<str> for AsString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for AsString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for AsString {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for AsString {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl From<&str> for AsString {
    fn from(s: &str) -> Self {
        AsString(s.into())
    }
}

impl From<String> for AsString {
    fn from(s: String) -> Self {
        AsString(s.into())
    }
}

impl fmt::Debug for AsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

impl fmt::Display for AsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Number conversions
// ═══════════════════════════════════════════════════════════════════════════════

/// Format a number the way the Flash player prints it.
///
/// 15 significant digits, trailing zeros removed, exponent notation when the
/// decimal exponent is below -5 or at least 15.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let mut out = String::new();
    if n < 0.0 {
        out.push('-');
    }

    // "d.dddddddddddddde<exp>" with exactly 15 significant digits
    let sci = format!("{:.14e}", n.abs());
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let digits = digits.trim_end_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };

    if !(-5..15).contains(&exp) {
        let mut chars = digits.chars();
        if let Some(first) = chars.next() {
            out.push(first);
        }
        let rest: String = chars.collect();
        if !rest.is_empty() {
            out.push('.');
            out.push_str(&rest);
        }
        out.push('e');
        out.push(if exp < 0 { '-' } else { '+' });
        out.push_str(&exp.abs().to_string());
    } else if exp < 0 {
        out.push_str("0.");
        for _ in 0..(-exp - 1) {
            out.push('0');
        }
        out.push_str(digits);
    } else {
        let int_len = exp as usize + 1;
        for (i, c) in digits.chars().enumerate() {
            if i == int_len {
                out.push('.');
            }
            out.push(c);
        }
        for _ in digits.len()..int_len {
            out.push('0');
        }
    }
    out
}

/// Parse a string as a number.
///
/// Empty strings are NaN. From version 6 on `0x` hex and leading-zero octal
/// integers are recognised.
pub fn parse_number(s: &str, version: u8) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }

    if version > 5 {
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let sign = if negative { -1.0 } else { 1.0 };

        if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
            return match u64::from_str_radix(hex, 16) {
                Ok(v) => sign * v as f64,
                Err(_) => f64::NAN,
            };
        }
        if body.len() > 1
            && body.starts_with('0')
            && body.chars().all(|c| ('0'..='7').contains(&c))
        {
            return match u64::from_str_radix(body, 8) {
                Ok(v) => sign * v as f64,
                Err(_) => f64::NAN,
            };
        }
    }

    // Rust accepts "inf" and "nan" spellings, ActionScript does not
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Convert to a 32-bit integer: non-finite values become 0, everything else
/// is truncated and wrapped.
pub fn to_integer(n: f64) -> i32 {
    if !n.is_finite() {
        return 0;
    }
    let wrapped = n.trunc() % 4_294_967_296.0;
    (wrapped as i64) as u32 as i32
}
