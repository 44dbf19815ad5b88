//! Conversions that may call back into script
//!
//! `valueOf` and `toString` are looked up on the object and invoked
//! synchronously, so every conversion here can fail with the errors a
//! nested call can raise.

use crate::error::VmError;
use crate::object::{AsObject, ObjectKind};
use crate::value::{AsString, CheapClone, ObjRef, Value, format_number};

use super::Context;
use super::property::PathStyle;

impl Context {
    /// Call the zero-argument method `name` of `obj` if it is callable
    fn call_conversion(&mut self, obj: &ObjRef, name: &AsString) -> Result<Option<Value>, VmError> {
        let method = self.get_member(obj, name).unwrap_or_default();
        if !method.is_callable() {
            return Ok(None);
        }
        let this = Value::Object(obj.cheap_clone());
        self.call_function(&method, &this, &[]).map(Some)
    }

    /// Reduce an object to a primitive through `valueOf`.
    ///
    /// Movies become their path. Objects whose `valueOf` yields another
    /// object are returned unchanged.
    pub fn to_primitive(&mut self, value: &Value) -> Result<Value, VmError> {
        let Value::Object(obj) = value else {
            return Ok(value.clone());
        };
        if let ObjectKind::Boxed(inner) = &obj.borrow().kind {
            return Ok(inner.clone());
        }
        if obj.borrow().is_movie() {
            let path = self.movie_path(obj, PathStyle::Dots);
            return Ok(Value::String(self.intern(&path)));
        }
        let value_of = self.names.value_of.cheap_clone();
        match self.call_conversion(obj, &value_of)? {
            Some(result) if !result.is_object() => Ok(result),
            _ => Ok(value.clone()),
        }
    }

    /// Numeric value using the context version's rules
    pub fn to_number(&mut self, value: &Value) -> Result<f64, VmError> {
        let version = self.version();
        match value {
            Value::Object(obj) => {
                {
                    let o = obj.borrow();
                    match &o.kind {
                        ObjectKind::Movie(_) | ObjectKind::Function(_) => return Ok(f64::NAN),
                        ObjectKind::Boxed(inner) => return Ok(inner.primitive_to_number(version)),
                        _ => {}
                    }
                }
                let value_of = self.names.value_of.cheap_clone();
                Ok(match self.call_conversion(obj, &value_of)? {
                    Some(result) if !result.is_object() => result.primitive_to_number(version),
                    _ => f64::NAN,
                })
            }
            _ => Ok(value.primitive_to_number(version)),
        }
    }

    /// String value using the context version's rules
    pub fn to_string(&mut self, value: &Value) -> Result<AsString, VmError> {
        Ok(match value {
            Value::Undefined => {
                if self.version() < 7 {
                    self.names.empty.cheap_clone()
                } else {
                    self.names.undefined.cheap_clone()
                }
            }
            Value::Null => self.names.null.cheap_clone(),
            Value::Boolean(true) => self.names.true_.cheap_clone(),
            Value::Boolean(false) => self.names.false_.cheap_clone(),
            Value::Number(n) => self.intern(&format_number(*n)),
            Value::String(s) => s.cheap_clone(),
            Value::Object(obj) => return self.object_to_string(obj),
        })
    }

    fn object_to_string(&mut self, obj: &ObjRef) -> Result<AsString, VmError> {
        let (is_movie, is_function) = {
            let o = obj.borrow();
            (o.is_movie(), o.is_callable())
        };
        if is_movie {
            let path = self.movie_path(obj, PathStyle::Dots);
            return Ok(self.intern(&path));
        }
        if is_function {
            return Ok(self.names.type_function.cheap_clone());
        }
        let to_string = self.names.to_string.cheap_clone();
        if let Some(Value::String(s)) = self.call_conversion(obj, &to_string)? {
            return Ok(s);
        }
        let boxed = match &obj.borrow().kind {
            ObjectKind::Boxed(inner) => Some(inner.clone()),
            _ => None,
        };
        match boxed {
            Some(inner) => self.to_string(&inner),
            None => Ok(self.names.type_object.cheap_clone()),
        }
    }

    /// Boolean value using the context version's rules
    pub fn to_boolean(&self, value: &Value) -> bool {
        value.to_boolean(self.version())
    }

    /// Wrap a primitive into an object. Undefined and Null have no object
    /// form.
    pub fn to_object(&mut self, value: &Value) -> Option<ObjRef> {
        let proto = match value {
            Value::Undefined | Value::Null => return None,
            Value::Object(obj) => return Some(obj.cheap_clone()),
            Value::Boolean(_) => self.protos.boolean.cheap_clone(),
            Value::Number(_) => self.protos.number.cheap_clone(),
            Value::String(_) => self.protos.string.cheap_clone(),
        };
        Some(self.alloc(AsObject::with_kind(
            Some(&proto),
            ObjectKind::Boxed(value.clone()),
        )))
    }

    // ═══════════════════════════════════════════════════════════════
    // Comparison
    // ═══════════════════════════════════════════════════════════════

    /// Abstract equality (Equals2)
    pub(crate) fn equals2(&mut self, a: &Value, b: &Value) -> Result<bool, VmError> {
        match (a, b) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => Ok(true),
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => Ok(false),
            (Value::Object(x), Value::Object(y)) => Ok(x == y),
            (Value::String(x), Value::String(y)) => Ok(x == y),
            (Value::Boolean(x), Value::Boolean(y)) => Ok(x == y),
            (Value::Number(x), Value::Number(y)) => Ok(x == y),
            (Value::Object(_), _) | (_, Value::Object(_)) => {
                let pa = self.to_primitive(a)?;
                let pb = self.to_primitive(b)?;
                if pa.is_object() || pb.is_object() {
                    // valueOf gave no primitive, only identity could match
                    return Ok(false);
                }
                self.equals2(&pa, &pb)
            }
            _ => {
                let version = self.version();
                Ok(a.primitive_to_number(version) == b.primitive_to_number(version))
            }
        }
    }

    /// `a < b` (Less2). `None` when either side is NaN.
    pub(crate) fn less_than(&mut self, a: &Value, b: &Value) -> Result<Option<bool>, VmError> {
        let pa = self.to_primitive(a)?;
        let pb = self.to_primitive(b)?;
        if let (Value::String(x), Value::String(y)) = (&pa, &pb) {
            return Ok(Some(x.as_str() < y.as_str()));
        }
        let x = self.to_number(&pa)?;
        let y = self.to_number(&pb)?;
        if x.is_nan() || y.is_nan() {
            return Ok(None);
        }
        Ok(Some(x < y))
    }
}
