//! Push, pop, registers and constant pools

use std::rc::Rc;

use crate::constant_pool::ConstantPool;
use crate::error::VmError;
use crate::interpreter::Context;
use crate::opcode::push as kind;
use crate::reader::ActionReader;
use crate::value::Value;

/// Constant pool entry, Undefined when missing
fn constant(ctx: &Context, index: usize) -> Result<Value, VmError> {
    let frame = ctx.frame()?;
    let entry = match &frame.constant_pool {
        Some(pool) => pool.get(index),
        None => Err(VmError::NoConstantPool { index }),
    };
    Ok(match entry {
        Ok(s) => Value::String(s),
        Err(err) => {
            tracing::warn!(%err, "pushing undefined");
            Value::Undefined
        }
    })
}

pub(crate) fn push(ctx: &mut Context, _action: u8, data: &[u8]) -> Result<(), VmError> {
    let version = ctx.frame_version()?;
    let mut reader = ActionReader::new(data);
    while !reader.is_empty() {
        let value = match reader.read_u8()? {
            kind::STRING => {
                let s = reader.read_cstring(version)?;
                Value::String(ctx.intern(&s))
            }
            kind::FLOAT => Value::Number(reader.read_f32()? as f64),
            kind::NULL => Value::Null,
            kind::UNDEFINED => Value::Undefined,
            kind::REGISTER => {
                let index = reader.read_u8()? as usize;
                ctx.frame()?.register(index).unwrap_or_else(|err| {
                    tracing::warn!(%err, "pushing undefined");
                    Value::Undefined
                })
            }
            kind::BOOLEAN => Value::Boolean(reader.read_u8()? != 0),
            kind::DOUBLE => Value::Number(reader.read_swapped_f64()?),
            kind::INTEGER => Value::Number(reader.read_u32()? as i32 as f64),
            kind::CONSTANT8 => constant(ctx, reader.read_u8()? as usize)?,
            kind::CONSTANT16 => constant(ctx, reader.read_u16()? as usize)?,
            other => {
                return Err(VmError::malformed(format!("unknown push type {}", other)));
            }
        };
        ctx.push(value)?;
    }
    Ok(())
}

pub(crate) fn pop(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    ctx.pop().map(drop)
}

pub(crate) fn push_duplicate(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let stack = ctx.stack_mut()?;
    let top = stack.peek(1)?.clone();
    stack.push(top);
    Ok(())
}

pub(crate) fn stack_swap(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    ctx.stack_mut()?.swap()
}

/// Copy the top of the stack into a register without popping it
pub(crate) fn store_register(ctx: &mut Context, _action: u8, data: &[u8]) -> Result<(), VmError> {
    let index = ActionReader::new(data).read_u8()? as usize;
    let frame = ctx.frame_mut()?;
    let value = frame.stack.peek(1)?.clone();
    frame.set_register(index, value)
}

pub(crate) fn constant_pool(ctx: &mut Context, _action: u8, data: &[u8]) -> Result<(), VmError> {
    let version = ctx.frame_version()?;
    let pool = ConstantPool::parse(data, version, &mut ctx.strings)?;
    tracing::debug!(entries = pool.len(), "constant pool attached");
    ctx.frame_mut()?.constant_pool = Some(Rc::new(pool));
    Ok(())
}
