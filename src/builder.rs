//! ActionBuilder - helper for assembling action bytecode
//!
//! Emits correctly framed actions and push records and patches branch
//! offsets, so tests and embedders can write scripts without hand-encoding
//! bytes.

use crate::opcode::{self, push};
use crate::reader::encode_string;
use crate::script::FunctionFlags;

/// A single Push record
#[derive(Debug, Clone, PartialEq)]
pub enum PushValue {
    String(String),
    Float(f32),
    Null,
    Undefined,
    Register(u8),
    Boolean(bool),
    Double(f64),
    Integer(u32),
    /// Pool index; encoded as type 8 when it fits a byte, else type 9
    Constant(u16),
}

impl From<&str> for PushValue {
    fn from(s: &str) -> Self {
        PushValue::String(s.to_string())
    }
}

impl From<f64> for PushValue {
    fn from(n: f64) -> Self {
        PushValue::Double(n)
    }
}

impl From<bool> for PushValue {
    fn from(b: bool) -> Self {
        PushValue::Boolean(b)
    }
}

/// Placeholder for a branch whose offset is patched later
#[derive(Debug, Clone, Copy)]
pub struct JumpPlaceholder {
    /// Offset of the i16 operand in the code
    operand: usize,
}

/// Builder for action bytecode
pub struct ActionBuilder {
    code: Vec<u8>,
    version: u8,
}

impl ActionBuilder {
    /// Create a builder encoding strings for the given SWF version
    pub fn new(version: u8) -> Self {
        Self {
            code: Vec::new(),
            version,
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Offset the next action will be emitted at
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    /// Emit an action without operands
    pub fn emit(&mut self, action: u8) -> &mut Self {
        self.code.push(action);
        if opcode::has_operands(action) {
            self.code.extend_from_slice(&0u16.to_le_bytes());
        }
        self
    }

    /// Emit a long-form action with its operand bytes
    pub fn emit_with(&mut self, action: u8, operands: &[u8]) -> &mut Self {
        let len = u16::try_from(operands.len()).unwrap_or_else(|_| {
            tracing::warn!(len = operands.len(), "operands truncated to u16 length");
            u16::MAX
        });
        self.code.push(action);
        self.code.extend_from_slice(&len.to_le_bytes());
        self.code
            .extend(operands.iter().take(len as usize).copied());
        self
    }

    /// Emit raw bytes, for malformed-input tests
    pub fn emit_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.code.extend_from_slice(bytes);
        self
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Push
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn push(&mut self, values: &[PushValue]) -> &mut Self {
        let mut data = Vec::new();
        for value in values {
            match value {
                PushValue::String(s) => {
                    data.push(push::STRING);
                    data.extend(encode_string(s, self.version));
                    data.push(0);
                }
                PushValue::Float(f) => {
                    data.push(push::FLOAT);
                    data.extend_from_slice(&f.to_le_bytes());
                }
                PushValue::Null => data.push(push::NULL),
                PushValue::Undefined => data.push(push::UNDEFINED),
                PushValue::Register(r) => {
                    data.push(push::REGISTER);
                    data.push(*r);
                }
                PushValue::Boolean(b) => {
                    data.push(push::BOOLEAN);
                    data.push(u8::from(*b));
                }
                PushValue::Double(d) => {
                    data.push(push::DOUBLE);
                    let bytes = d.to_le_bytes();
                    // high word first
                    data.extend(bytes.iter().skip(4));
                    data.extend(bytes.iter().take(4));
                }
                PushValue::Integer(i) => {
                    data.push(push::INTEGER);
                    data.extend_from_slice(&i.to_le_bytes());
                }
                PushValue::Constant(index) => match u8::try_from(*index) {
                    Ok(small) => {
                        data.push(push::CONSTANT8);
                        data.push(small);
                    }
                    Err(_) => {
                        data.push(push::CONSTANT16);
                        data.extend_from_slice(&index.to_le_bytes());
                    }
                },
            }
        }
        self.emit_with(opcode::PUSH, &data)
    }

    pub fn push_str(&mut self, s: &str) -> &mut Self {
        self.push(&[PushValue::from(s)])
    }

    pub fn push_number(&mut self, n: f64) -> &mut Self {
        self.push(&[PushValue::Double(n)])
    }

    pub fn push_bool(&mut self, b: bool) -> &mut Self {
        self.push(&[PushValue::Boolean(b)])
    }

    pub fn push_undefined(&mut self) -> &mut Self {
        self.push(&[PushValue::Undefined])
    }

    pub fn push_null(&mut self) -> &mut Self {
        self.push(&[PushValue::Null])
    }

    pub fn push_register(&mut self, register: u8) -> &mut Self {
        self.push(&[PushValue::Register(register)])
    }

    pub fn push_constant(&mut self, index: u16) -> &mut Self {
        self.push(&[PushValue::Constant(index)])
    }

    pub fn constant_pool(&mut self, strings: &[&str]) -> &mut Self {
        let mut data = Vec::new();
        let count = u16::try_from(strings.len()).unwrap_or(u16::MAX);
        data.extend_from_slice(&count.to_le_bytes());
        for s in strings.iter().take(count as usize) {
            data.extend(encode_string(s, self.version));
            data.push(0);
        }
        self.emit_with(opcode::CONSTANT_POOL, &data)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Branches
    // ═══════════════════════════════════════════════════════════════════════════

    fn emit_branch(&mut self, action: u8, offset: i16) -> JumpPlaceholder {
        self.emit_with(action, &offset.to_le_bytes());
        JumpPlaceholder {
            operand: self.code.len() - 2,
        }
    }

    /// Emit a Jump to be patched later
    pub fn emit_jump(&mut self) -> JumpPlaceholder {
        self.emit_branch(opcode::JUMP, 0)
    }

    /// Emit an If to be patched later
    pub fn emit_if(&mut self) -> JumpPlaceholder {
        self.emit_branch(opcode::IF, 0)
    }

    /// Emit a Jump to an already known offset
    pub fn emit_jump_to(&mut self, target: usize) -> &mut Self {
        let placeholder = self.emit_jump();
        self.patch_jump_to(placeholder, target);
        self
    }

    /// Emit an If to an already known offset
    pub fn emit_if_to(&mut self, target: usize) -> &mut Self {
        let placeholder = self.emit_if();
        self.patch_jump_to(placeholder, target);
        self
    }

    /// Patch a branch to land at the current offset
    pub fn patch_jump(&mut self, placeholder: JumpPlaceholder) {
        let target = self.current_offset();
        self.patch_jump_to(placeholder, target);
    }

    /// Patch a branch to land at `target`. Offsets are relative to the end
    /// of the branch action.
    pub fn patch_jump_to(&mut self, placeholder: JumpPlaceholder, target: usize) {
        let next = placeholder.operand + 2;
        let offset = target as i64 - next as i64;
        let offset = i16::try_from(offset).unwrap_or_else(|_| {
            tracing::warn!(offset, "branch offset does not fit in i16");
            0
        });
        for (i, b) in offset.to_le_bytes().iter().enumerate() {
            if let Some(slot) = self.code.get_mut(placeholder.operand + i) {
                *slot = *b;
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Functions and blocks
    // ═══════════════════════════════════════════════════════════════════════════

    fn nested(&self, body: impl FnOnce(&mut ActionBuilder)) -> Vec<u8> {
        let mut inner = ActionBuilder::new(self.version);
        body(&mut inner);
        inner.code
    }

    fn cstring(&self, data: &mut Vec<u8>, s: &str) {
        data.extend(encode_string(s, self.version));
        data.push(0);
    }

    /// DefineFunction with the body emitted by `body`
    pub fn define_function(
        &mut self,
        name: &str,
        args: &[&str],
        body: impl FnOnce(&mut ActionBuilder),
    ) -> &mut Self {
        let code = self.nested(body);
        let mut data = Vec::new();
        self.cstring(&mut data, name);
        data.extend_from_slice(&(args.len() as u16).to_le_bytes());
        for arg in args {
            self.cstring(&mut data, arg);
        }
        data.extend_from_slice(&(code.len() as u16).to_le_bytes());
        self.emit_with(opcode::DEFINE_FUNCTION, &data);
        self.code.extend(code);
        self
    }

    /// DefineFunction2; `args` pairs a preload register (0 for none) with
    /// the argument name
    pub fn define_function2(
        &mut self,
        name: &str,
        n_registers: u8,
        flags: FunctionFlags,
        args: &[(u8, &str)],
        body: impl FnOnce(&mut ActionBuilder),
    ) -> &mut Self {
        let code = self.nested(body);
        let mut data = Vec::new();
        self.cstring(&mut data, name);
        data.extend_from_slice(&(args.len() as u16).to_le_bytes());
        data.push(n_registers);
        data.extend_from_slice(&flags.bits().to_le_bytes());
        for (register, arg) in args {
            data.push(*register);
            self.cstring(&mut data, arg);
        }
        data.extend_from_slice(&(code.len() as u16).to_le_bytes());
        self.emit_with(opcode::DEFINE_FUNCTION2, &data);
        self.code.extend(code);
        self
    }

    /// With block over the actions emitted by `body`; the scope object must
    /// already be on the stack
    pub fn with_block(&mut self, body: impl FnOnce(&mut ActionBuilder)) -> &mut Self {
        let code = self.nested(body);
        self.emit_with(opcode::WITH, &(code.len() as u16).to_le_bytes());
        self.code.extend(code);
        self
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Other long-form actions
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn store_register(&mut self, register: u8) -> &mut Self {
        self.emit_with(opcode::STORE_REGISTER, &[register])
    }

    pub fn goto_frame(&mut self, frame: u16) -> &mut Self {
        self.emit_with(opcode::GOTO_FRAME, &frame.to_le_bytes())
    }

    pub fn goto_label(&mut self, label: &str) -> &mut Self {
        let mut data = Vec::new();
        self.cstring(&mut data, label);
        self.emit_with(opcode::GOTO_LABEL, &data)
    }

    pub fn goto_frame2(&mut self, play: bool, bias: Option<u16>) -> &mut Self {
        let mut flags = u8::from(play);
        let mut data = Vec::new();
        if let Some(bias) = bias {
            flags |= 0x02;
            data.push(flags);
            data.extend_from_slice(&bias.to_le_bytes());
        } else {
            data.push(flags);
        }
        self.emit_with(opcode::GOTO_FRAME2, &data)
    }

    pub fn get_url(&mut self, url: &str, target: &str) -> &mut Self {
        let mut data = Vec::new();
        self.cstring(&mut data, url);
        self.cstring(&mut data, target);
        self.emit_with(opcode::GET_URL, &data)
    }

    pub fn get_url2(&mut self, flags: u8) -> &mut Self {
        self.emit_with(opcode::GET_URL2, &[flags])
    }

    pub fn set_target(&mut self, target: &str) -> &mut Self {
        let mut data = Vec::new();
        self.cstring(&mut data, target);
        self.emit_with(opcode::SET_TARGET, &data)
    }

    pub fn wait_for_frame(&mut self, frame: u16, skip: u8) -> &mut Self {
        let mut data = frame.to_le_bytes().to_vec();
        data.push(skip);
        self.emit_with(opcode::WAIT_FOR_FRAME, &data)
    }

    pub fn wait_for_frame2(&mut self, skip: u8) -> &mut Self {
        self.emit_with(opcode::WAIT_FOR_FRAME2, &[skip])
    }

    /// Finish with a trailing End action and return the bytes
    pub fn finish(mut self) -> Vec<u8> {
        self.code.push(opcode::END);
        self.code
    }

    /// Return the bytes without a trailing End action
    pub fn into_bytes(self) -> Vec<u8> {
        self.code
    }
}
