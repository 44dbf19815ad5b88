//! Branches, calls, function definitions and with-blocks

use std::rc::Rc;

use crate::error::VmError;
use crate::frame::WithBlock;
use crate::interpreter::Context;
use crate::interpreter::call::Invocation;
use crate::object::{Function, ScriptFunction};
use crate::opcode;
use crate::reader::ActionReader;
use crate::value::{CheapClone, Value};

use super::movie::{frame_index, frame_number};
use super::objects::{member_of, method_name};

/// Move the program counter by a signed offset from the next action
fn branch(ctx: &mut Context, data: &[u8]) -> Result<(), VmError> {
    let offset = ActionReader::new(data).read_i16()? as isize;
    let frame = ctx.frame_mut()?;
    let target = frame.pc as isize + offset;
    let (start, end) = (frame.script.start() as isize, frame.script.end() as isize);
    if target < start || target > end {
        return Err(VmError::malformed(format!(
            "branch to {} leaves the script [{}, {}]",
            target, start, end
        )));
    }
    frame.pc = target as usize;
    Ok(())
}

pub(crate) fn jump(ctx: &mut Context, _action: u8, data: &[u8]) -> Result<(), VmError> {
    branch(ctx, data)
}

/// Version 4 If: branch on a non-zero number
pub(crate) fn if_v4(ctx: &mut Context, _action: u8, data: &[u8]) -> Result<(), VmError> {
    let n = ctx.pop_number()?;
    if n != 0.0 && !n.is_nan() {
        branch(ctx, data)?;
    }
    Ok(())
}

/// If of version 5 and later: branch on the boolean value
pub(crate) fn if_v5(ctx: &mut Context, _action: u8, data: &[u8]) -> Result<(), VmError> {
    let value = ctx.pop()?;
    if ctx.to_boolean(&value) {
        branch(ctx, data)?;
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Calls
// ═══════════════════════════════════════════════════════════════════════════════

pub(crate) fn call_function(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let name = ctx.pop_string()?;
    let args = ctx.pop_arguments()?;
    let function = ctx.get_variable(&name)?;
    let slot = ctx.push_result_slot()?;
    ctx.invoke(Invocation {
        function,
        this: None,
        args,
        return_target: slot,
        construct: false,
        super_ref: None,
    })
}

/// CallMethod.
///
/// An empty name calls the object itself. Methods reached through a
/// super proxy run on the proxy's instance with a chained super.
pub(crate) fn call_method(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let name = ctx.pop()?;
    let target = ctx.pop()?;
    let args = ctx.pop_arguments()?;
    let name = method_name(ctx, &name)?;
    let slot = ctx.push_result_slot()?;

    let Some(name) = name else {
        return ctx.invoke(Invocation {
            function: target,
            this: None,
            args,
            return_target: slot,
            construct: false,
            super_ref: None,
        });
    };

    let super_data = target
        .as_object()
        .and_then(|obj| obj.borrow().as_super().cloned());
    let (function, this, super_ref) = match (super_data, target.as_object()) {
        (Some(data), Some(super_obj)) => {
            let function = ctx.get_member(super_obj, &name).unwrap_or_default();
            let chained = ctx.chain_super(super_obj, &name);
            (function, Some(data.thisp), chained)
        }
        _ => {
            let function = member_of(ctx, &target, &name);
            (function, ctx.to_object(&target), None)
        }
    };
    if !function.is_callable() {
        tracing::warn!(method = name.as_str(), "method is not a function");
    }
    ctx.invoke(Invocation {
        function,
        this,
        args,
        return_target: slot,
        construct: false,
        super_ref,
    })
}

pub(crate) fn return_action(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let value = ctx.pop()?;
    ctx.return_from_frame(value)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Function definitions
// ═══════════════════════════════════════════════════════════════════════════════

/// DefineFunction and DefineFunction2.
///
/// The body follows the action and is skipped. A named function is stored
/// on the variable object; an anonymous one is pushed and takes its display
/// name from the string below it on the stack.
pub(crate) fn define_function(ctx: &mut Context, action: u8, data: &[u8]) -> Result<(), VmError> {
    let frame = ctx.frame()?;
    let parent = frame.script.cheap_clone();
    let constant_pool = frame.constant_pool.clone();
    let body_start = frame.pc;
    let mut script = if action == opcode::DEFINE_FUNCTION2 {
        parent.parse_define_function2(data, body_start, constant_pool, &mut ctx.strings)?
    } else {
        parent.parse_define_function(data, body_start, constant_pool, &mut ctx.strings)?
    };

    ctx.frame_mut()?.pc = script.end();
    let declared = script.name.clone();
    if declared.is_none() {
        let display = match ctx.frame()?.stack.peek(1) {
            Ok(Value::String(s)) => s.cheap_clone(),
            _ => ctx.names.unnamed_function.cheap_clone(),
        };
        script.name = Some(display);
    }
    let frame = ctx.frame()?;
    let scope_chain = frame.capture_scope();
    let target = frame.target.cheap_clone();
    let var_object = frame.var_object();

    tracing::debug!(
        name = script.name.as_ref().map(|n| n.as_str()).unwrap_or_default(),
        size = script.end() - script.start(),
        "function defined"
    );
    let function = ctx.create_function(Function::Script(ScriptFunction {
        script: Rc::new(script),
        scope_chain,
        target,
    }));
    match declared {
        Some(name) => {
            ctx.set_member(&var_object, &name, Value::Object(function));
            Ok(())
        }
        None => ctx.push(Value::Object(function)),
    }
}

/// With: scope the popped object over the following block. Anything but
/// an object skips the block.
pub(crate) fn with(ctx: &mut Context, _action: u8, data: &[u8]) -> Result<(), VmError> {
    let size = ActionReader::new(data).read_u16()? as usize;
    let value = ctx.pop()?;
    let frame = ctx.frame_mut()?;
    let end = frame.pc + size;
    if end > frame.script.end() {
        return Err(VmError::malformed("with block overruns its script"));
    }
    match value {
        Value::Object(object) => frame.blocks.push(WithBlock { end, object }),
        other => {
            tracing::warn!(value = ?other, "with on a non-object skips its block");
            frame.pc = end;
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Frame loading
// ═══════════════════════════════════════════════════════════════════════════════

/// Whether `frame` of the current target has loaded; non-movies count as
/// loaded
fn frame_loaded(ctx: &Context, frame: usize) -> Result<bool, VmError> {
    let target = ctx.frame()?.target.cheap_clone();
    let loaded = target
        .borrow()
        .as_movie()
        .is_none_or(|movie| frame < movie.timeline.frames_loaded());
    Ok(loaded)
}

/// WaitForFrame: skip the next N actions unless the frame has loaded
pub(crate) fn wait_for_frame(ctx: &mut Context, _action: u8, data: &[u8]) -> Result<(), VmError> {
    let mut reader = ActionReader::new(data);
    let frame = reader.read_u16()? as usize;
    let skip = reader.read_u8()? as usize;
    if !frame_loaded(ctx, frame)? {
        ctx.skip_actions(skip)?;
    }
    Ok(())
}

/// WaitForFrame2: the frame comes from the stack
pub(crate) fn wait_for_frame2(ctx: &mut Context, _action: u8, data: &[u8]) -> Result<(), VmError> {
    let skip = ActionReader::new(data).read_u8()? as usize;
    let value = ctx.pop()?;
    let target = ctx.frame()?.target.cheap_clone();
    let loaded = match frame_index(ctx, &target, &value)? {
        Some(frame) => frame_loaded(ctx, frame_number(frame))?,
        None => true,
    };
    if !loaded {
        ctx.skip_actions(skip)?;
    }
    Ok(())
}
