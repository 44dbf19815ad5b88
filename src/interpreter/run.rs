//! The dispatch loop
//!
//! `run` executes frames until the frame stack shrinks back to a base
//! depth. Each `step` decodes one action of the topmost frame, advances the
//! program counter past it and runs the handler selected by the frame's
//! script version. Faults are logged and execution resumes at the next
//! action; only [`VmError::RecursionLimit`] unwinds.

use crate::error::VmError;
use crate::frame::FrameState;
use crate::opcode;
use crate::value::{CheapClone, Value};

use super::Context;
use super::table::{ACTIONS, version_bucket};

/// Outcome of one step
enum Step {
    Continue,
    /// The topmost frame ran off its end or hit End
    Finished,
}

impl Context {
    /// Execute until only `base` frames remain.
    ///
    /// On a fatal error every frame above `base` is discarded.
    pub(crate) fn run(&mut self, base: usize) -> Result<(), VmError> {
        while self.frames.len() > base {
            match self.step() {
                Ok(Step::Continue) => {}
                Ok(Step::Finished) => self.return_from_frame(Value::Undefined)?,
                Err(err) => {
                    tracing::error!(%err, depth = self.frames.len(), "aborting execution");
                    self.frames.truncate(base);
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    fn step(&mut self) -> Result<Step, VmError> {
        let frame = self.frame_mut()?;
        frame.state = FrameState::Running;
        frame.pop_finished_blocks();

        let script = frame.script.cheap_clone();
        let pc = frame.pc;
        let end = script.end();
        let action = match script.byte_at(pc) {
            Some(action) if pc < end && action != opcode::END => action,
            _ => return Ok(Step::Finished),
        };

        let (data, next) = if opcode::has_operands(action) {
            let length = script
                .slice(pc + 1, pc + 3)
                .and_then(|b| <[u8; 2]>::try_from(b).ok())
                .map(|b| u16::from_le_bytes(b) as usize);
            let Some(length) = length else {
                tracing::error!(pc, action, "truncated action header");
                return Ok(Step::Finished);
            };
            let next = pc + 3 + length;
            match script.slice(pc + 3, next) {
                Some(data) => (data, next),
                None => {
                    tracing::error!(pc, action, length, "action overruns its script");
                    return Ok(Step::Finished);
                }
            }
        } else {
            (&[][..], pc + 1)
        };
        frame.pc = next;

        let version = script.version;
        let spec = match ACTIONS.get(action as usize) {
            Some(spec) => spec,
            None => return Ok(Step::Continue),
        };
        let handler = spec
            .handlers
            .get(version_bucket(version))
            .copied()
            .flatten();
        let Some(handler) = handler else {
            tracing::warn!(
                code = %format!("0x{:02X}", action),
                name = spec.name,
                version,
                "unsupported action skipped"
            );
            return Ok(Step::Continue);
        };

        if spec.min_stack > 0 {
            let needed = spec.min_stack as usize;
            if let Err(err) = frame.stack.ensure_size(needed) {
                tracing::warn!(%err, action = spec.name, "padding the stack");
                frame.stack.fill_to(needed);
            }
        }
        if spec.stack_delta > 0 {
            frame.stack.ensure_left(spec.stack_delta as usize);
        }

        tracing::trace!(pc, action = spec.name, "step");
        if let Err(err) = handler(self, action, data) {
            if err.is_fatal() {
                return Err(err);
            }
            tracing::warn!(%err, pc, action = spec.name, "action failed");
        }
        Ok(Step::Continue)
    }

    /// Pop the topmost frame and deliver its result.
    ///
    /// Constructor frames yield their instance instead of `value`.
    pub(crate) fn return_from_frame(&mut self, value: Value) -> Result<(), VmError> {
        let Some(mut frame) = self.frames.pop() else {
            return Err(VmError::NoFrame);
        };
        frame.state = FrameState::Returned;
        let value = match (&frame.thisp, frame.construct) {
            (Some(thisp), true) => Value::Object(thisp.cheap_clone()),
            _ => value,
        };
        tracing::trace!(depth = self.frames.len(), "leave frame");
        if let Err(err) = self.deliver(frame.return_target, value) {
            tracing::warn!(%err, "return value dropped");
        }
        Ok(())
    }

    /// Advance past `count` actions without executing them
    pub(crate) fn skip_actions(&mut self, count: usize) -> Result<(), VmError> {
        let frame = self.frame_mut()?;
        let script = frame.script.cheap_clone();
        for _ in 0..count {
            let Some(action) = script.byte_at(frame.pc) else {
                break;
            };
            if opcode::has_operands(action) {
                let length = script
                    .slice(frame.pc + 1, frame.pc + 3)
                    .and_then(|b| <[u8; 2]>::try_from(b).ok())
                    .map(|b| u16::from_le_bytes(b) as usize)
                    .ok_or_else(|| VmError::malformed("truncated action while skipping"))?;
                frame.pc += 3 + length;
            } else {
                frame.pc += 1;
            }
        }
        Ok(())
    }
}
