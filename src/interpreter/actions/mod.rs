//! Action handlers
//!
//! Every handler has the signature `fn(&mut Context, action, operands)`.
//! The dispatch loop has already advanced the program counter past the
//! action and padded the stack to the action's minimum depth.

pub(crate) mod arithmetic;
pub(crate) mod control;
pub(crate) mod movie;
pub(crate) mod objects;
pub(crate) mod stack;
pub(crate) mod strings;

use crate::error::VmError;
use crate::frame::ReturnTarget;
use crate::stack::OperandStack;
use crate::value::{AsString, ObjRef, Value, to_integer};

use super::Context;

/// Signature shared by all handlers
pub type ActionHandler = fn(&mut Context, u8, &[u8]) -> Result<(), VmError>;

impl Context {
    pub(crate) fn stack_mut(&mut self) -> Result<&mut OperandStack, VmError> {
        Ok(&mut self.frame_mut()?.stack)
    }

    pub(crate) fn pop(&mut self) -> Result<Value, VmError> {
        self.stack_mut()?.pop()
    }

    pub(crate) fn push(&mut self, value: Value) -> Result<(), VmError> {
        self.stack_mut()?.push(value);
        Ok(())
    }

    /// Version of the executing script
    pub(crate) fn frame_version(&self) -> Result<u8, VmError> {
        Ok(self.frame()?.version())
    }

    /// Push a comparison result. Version 4 scripts see 1 and 0.
    pub(crate) fn push_bool(&mut self, value: bool) -> Result<(), VmError> {
        if self.frame_version()? < 5 {
            self.push(Value::Number(if value { 1.0 } else { 0.0 }))
        } else {
            self.push(Value::Boolean(value))
        }
    }

    pub(crate) fn pop_number(&mut self) -> Result<f64, VmError> {
        let value = self.pop()?;
        self.to_number(&value)
    }

    pub(crate) fn pop_integer(&mut self) -> Result<i32, VmError> {
        Ok(to_integer(self.pop_number()?))
    }

    pub(crate) fn pop_string(&mut self) -> Result<AsString, VmError> {
        let value = self.pop()?;
        self.to_string(&value)
    }

    /// Pop an argument count followed by that many arguments. A count
    /// larger than the stack takes what is there.
    pub(crate) fn pop_arguments(&mut self) -> Result<Vec<Value>, VmError> {
        let count = self.pop_integer()?.max(0) as usize;
        let stack = self.stack_mut()?;
        let available = stack.len();
        if count > available {
            tracing::warn!(count, available, "too few arguments on the stack");
        }
        stack.pop_n(count.min(available))
    }

    /// Reserve the stack slot a call result will be delivered to
    pub(crate) fn push_result_slot(&mut self) -> Result<ReturnTarget, VmError> {
        let stack = self.stack_mut()?;
        stack.push(Value::Undefined);
        Ok(ReturnTarget::Caller(stack.len() - 1))
    }

    /// Resolve a target given as a value: movies pass through, strings are
    /// paths relative to the frame's target
    pub(crate) fn value_to_target(&mut self, value: &Value) -> Result<Option<ObjRef>, VmError> {
        match value {
            Value::Object(obj) => Ok(Some(obj.clone())),
            Value::String(path) => {
                let target = self.frame()?.target.clone();
                let path = path.as_str().to_string();
                self.eval_path(&target, &path)
            }
            _ => Ok(None),
        }
    }
}
