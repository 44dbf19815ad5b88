//! Activation records
//!
//! A frame owns its registers, operand stack and with-blocks and points at
//! the script it executes. Frames are strictly nested: a callee frame is
//! pushed on top of its caller and popped before the caller resumes.

use std::rc::Rc;

use crate::constant_pool::ConstantPool;
use crate::error::VmError;
use crate::script::Script;
use crate::stack::OperandStack;
use crate::value::{CheapClone, ObjRef, Value};

/// Where a frame's return value goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnTarget {
    /// Absolute slot in the caller's operand stack, reserved before the call
    Caller(usize),
    /// Handed back to the host through the context
    Host,
    Discard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Created,
    Running,
    Returned,
}

/// An object scoped over a range of actions by the With action
#[derive(Debug, Clone)]
pub struct WithBlock {
    /// First program counter past the block
    pub end: usize,
    pub object: ObjRef,
}

/// One function or script invocation
pub struct Frame {
    pub script: Rc<Script>,
    /// Absolute offset of the next action in the script buffer
    pub pc: usize,
    pub registers: Vec<Value>,
    pub stack: OperandStack,
    /// Active with-blocks, innermost last
    pub blocks: Vec<WithBlock>,
    /// Scope objects searched after the with-blocks, innermost first
    pub scope_chain: Vec<ObjRef>,
    /// Locals and named arguments of a function frame
    pub activation: Option<ObjRef>,
    /// Receiver of DefineLocal and of writes to unresolved names; the
    /// target when unset
    pub var_object: Option<ObjRef>,
    /// Object addressed by unqualified movie operations
    pub target: ObjRef,
    /// Target at frame creation, restored by an empty SetTarget
    pub original_target: ObjRef,
    pub thisp: Option<ObjRef>,
    pub super_ref: Option<ObjRef>,
    /// Function object being executed
    pub function: Option<ObjRef>,
    pub constant_pool: Option<Rc<ConstantPool>>,
    pub return_target: ReturnTarget,
    /// Set for frames created by `new`: the frame yields `thisp`
    pub construct: bool,
    pub state: FrameState,
}

impl Frame {
    /// A frame executing `script` from its first action against `target`
    pub fn new(script: Rc<Script>, target: ObjRef, return_target: ReturnTarget) -> Self {
        let registers = vec![Value::Undefined; script.n_registers];
        let pc = script.start();
        let constant_pool = script.constant_pool.clone();
        Self {
            script,
            pc,
            registers,
            stack: OperandStack::new(),
            blocks: Vec::new(),
            scope_chain: Vec::new(),
            activation: None,
            var_object: None,
            original_target: target.cheap_clone(),
            target,
            thisp: None,
            super_ref: None,
            function: None,
            constant_pool,
            return_target,
            construct: false,
            state: FrameState::Created,
        }
    }

    /// SWF version of the executing script
    pub fn version(&self) -> u8 {
        self.script.version
    }

    pub fn register(&self, index: usize) -> Result<Value, VmError> {
        self.registers
            .get(index)
            .cloned()
            .ok_or(VmError::RegisterIndex {
                index,
                count: self.registers.len(),
            })
    }

    pub fn set_register(&mut self, index: usize, value: Value) -> Result<(), VmError> {
        let count = self.registers.len();
        match self.registers.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(VmError::RegisterIndex { index, count }),
        }
    }

    pub fn var_object(&self) -> ObjRef {
        self.var_object
            .as_ref()
            .unwrap_or(&self.target)
            .cheap_clone()
    }

    /// `this`: the receiver of a method call, otherwise the target
    pub fn this_value(&self) -> ObjRef {
        self.thisp
            .as_ref()
            .unwrap_or(&self.target)
            .cheap_clone()
    }

    /// Drop with-blocks the program counter has left
    pub fn pop_finished_blocks(&mut self) {
        while self.blocks.last().is_some_and(|block| self.pc >= block.end) {
            self.blocks.pop();
        }
    }

    /// Objects searched for a name before the target, innermost first
    pub fn scope_objects(&self) -> Vec<ObjRef> {
        let mut objects: Vec<ObjRef> = self
            .blocks
            .iter()
            .rev()
            .map(|block| block.object.cheap_clone())
            .collect();
        objects.extend(self.scope_chain.iter().cloned());
        objects
    }

    /// Scope chain captured by functions defined in this frame
    pub fn capture_scope(&self) -> Vec<ObjRef> {
        let mut objects = self.scope_objects();
        if !objects.contains(&self.target) {
            objects.push(self.target.cheap_clone());
        }
        objects
    }

    /// Every object this frame keeps alive
    pub fn collect_roots(&self, roots: &mut Vec<ObjRef>) {
        let values = self.registers.iter().chain(self.stack.iter());
        roots.extend(values.filter_map(|v| v.as_object().cloned()));
        roots.extend(self.blocks.iter().map(|b| b.object.cheap_clone()));
        roots.extend(self.scope_chain.iter().cloned());
        roots.push(self.target.cheap_clone());
        roots.push(self.original_target.cheap_clone());
        for obj in [
            &self.activation,
            &self.var_object,
            &self.thisp,
            &self.super_ref,
            &self.function,
        ]
        .into_iter()
        .flatten()
        {
            roots.push(obj.cheap_clone());
        }
    }
}
