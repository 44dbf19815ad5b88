//! Per-frame operand stack
//!
//! Every accessor is checked and returns `VmError::StackUnderflow` instead
//! of reading past the bottom.

use crate::error::VmError;
use crate::value::Value;

/// Growable LIFO of values owned by one frame
#[derive(Debug, Default)]
pub struct OperandStack {
    values: Vec<Value>,
}

impl OperandStack {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    pub fn pop(&mut self) -> Result<Value, VmError> {
        self.values.pop().ok_or(VmError::underflow(1, 0))
    }

    /// Pop `n` values; the result is in pop order (top first)
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<Value>, VmError> {
        self.ensure_size(n)?;
        let split = self.values.len() - n;
        let mut popped = self.values.split_off(split);
        popped.reverse();
        Ok(popped)
    }

    /// The `n`th value from the top, 1-indexed
    pub fn peek(&self, n: usize) -> Result<&Value, VmError> {
        let available = self.values.len();
        if n == 0 || n > available {
            return Err(VmError::underflow(n, available));
        }
        self.values
            .get(available - n)
            .ok_or(VmError::underflow(n, available))
    }

    /// Guarantee room for `n` more pushes without reallocating
    pub fn ensure_left(&mut self, n: usize) {
        self.values.reserve(n);
    }

    /// Fail unless at least `n` values are present
    pub fn ensure_size(&self, n: usize) -> Result<(), VmError> {
        if self.values.len() < n {
            return Err(VmError::underflow(n, self.values.len()));
        }
        Ok(())
    }

    /// Pad the bottom with Undefined until `n` values are present
    pub fn fill_to(&mut self, n: usize) {
        let missing = n.saturating_sub(self.values.len());
        if missing > 0 {
            self.values
                .splice(0..0, std::iter::repeat_n(Value::Undefined, missing));
        }
    }

    /// Overwrite the value at an absolute slot (0 is the bottom)
    pub fn set(&mut self, slot: usize, value: Value) -> Result<(), VmError> {
        let available = self.values.len();
        match self.values.get_mut(slot) {
            Some(v) => {
                *v = value;
                Ok(())
            }
            None => Err(VmError::underflow(slot + 1, available)),
        }
    }

    /// Exchange the two topmost values
    pub fn swap(&mut self) -> Result<(), VmError> {
        let len = self.values.len();
        if len < 2 {
            return Err(VmError::underflow(2, len));
        }
        self.values.swap(len - 1, len - 2);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }
}
