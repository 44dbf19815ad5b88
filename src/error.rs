//! Error types for the ActionScript virtual machine

use thiserror::Error;

/// Errors raised while decoding or executing actions.
///
/// Almost every variant is recovered inside the interpreter loop: the fault
/// is logged and execution resumes at the next instruction. Only
/// [`VmError::RecursionLimit`] reaches the host.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VmError {
    #[error("stack underflow: needed {needed} values, {available} available")]
    StackUnderflow { needed: usize, available: usize },

    #[error("constant pool index {index} out of range (pool has {size} entries)")]
    ConstantPoolIndex { index: usize, size: usize },

    #[error("constant pool index {index} used without a constant pool")]
    NoConstantPool { index: usize },

    #[error("register {index} out of range ({count} registers allocated)")]
    RegisterIndex { index: usize, count: usize },

    #[error("malformed action: {message}")]
    Malformed { message: String },

    #[error("action 0x{action:02X} is not supported in version {version}")]
    Unsupported { action: u8, version: u8 },

    #[error("{0} is not a function")]
    NotCallable(String),

    #[error("{0} levels of recursion were exceeded")]
    RecursionLimit(usize),

    #[error("no frame is executing")]
    NoFrame,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl VmError {
    pub fn malformed(message: impl Into<String>) -> Self {
        VmError::Malformed {
            message: message.into(),
        }
    }

    pub fn underflow(needed: usize, available: usize) -> Self {
        VmError::StackUnderflow { needed, available }
    }

    pub fn not_callable(name: impl Into<String>) -> Self {
        VmError::NotCallable(name.into())
    }

    /// Whether the error must abort the whole execution instead of
    /// being recovered at the next instruction.
    pub fn is_fatal(&self) -> bool {
        matches!(self, VmError::RecursionLimit(_))
    }
}
