//! Compiled scripts
//!
//! A [`Script`] is an immutable view onto a shared bytecode buffer: the
//! top-level actions of a frame, or the body carved out by DefineFunction /
//! DefineFunction2. Program counters are absolute offsets into the buffer so a
//! function body and its defining script address the same bytes.

use std::rc::Rc;

use crate::constant_pool::ConstantPool;
use crate::error::VmError;
use crate::reader::ActionReader;
use crate::string_dict::StringDict;
use crate::value::AsString;

/// Registers allocated for top-level scripts and DefineFunction bodies
pub const DEFAULT_REGISTERS: usize = 4;

/// DefineFunction2 flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunctionFlags(u16);

impl FunctionFlags {
    pub const NONE: FunctionFlags = FunctionFlags(0);
    pub const PRELOAD_THIS: FunctionFlags = FunctionFlags(0x0001);
    pub const SUPPRESS_THIS: FunctionFlags = FunctionFlags(0x0002);
    pub const PRELOAD_ARGUMENTS: FunctionFlags = FunctionFlags(0x0004);
    pub const SUPPRESS_ARGUMENTS: FunctionFlags = FunctionFlags(0x0008);
    pub const PRELOAD_SUPER: FunctionFlags = FunctionFlags(0x0010);
    pub const SUPPRESS_SUPER: FunctionFlags = FunctionFlags(0x0020);
    pub const PRELOAD_ROOT: FunctionFlags = FunctionFlags(0x0040);
    pub const PRELOAD_PARENT: FunctionFlags = FunctionFlags(0x0080);
    pub const PRELOAD_GLOBAL: FunctionFlags = FunctionFlags(0x0100);

    pub const fn from_bits(bits: u16) -> Self {
        FunctionFlags(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: FunctionFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for FunctionFlags {
    type Output = FunctionFlags;

    fn bitor(self, rhs: Self) -> Self {
        FunctionFlags(self.0 | rhs.0)
    }
}

/// A declared argument. `preload` is the register receiving the argument,
/// 0 meaning it is stored by name in the activation object.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptArgument {
    pub name: AsString,
    pub preload: u8,
}

/// An immutable compiled unit shared by every invocation
#[derive(Debug, Clone)]
pub struct Script {
    /// Declared name, or the display name inferred for anonymous functions
    pub name: Option<AsString>,
    buffer: Rc<[u8]>,
    start: usize,
    end: usize,
    /// SWF version the bytecode was compiled for
    pub version: u8,
    pub n_registers: usize,
    pub arguments: Vec<ScriptArgument>,
    pub flags: FunctionFlags,
    /// Whether this body came from DefineFunction2
    pub function2: bool,
    /// Pool inherited from the defining frame
    pub constant_pool: Option<Rc<ConstantPool>>,
}

impl Script {
    /// A top-level script over the whole buffer
    pub fn new(name: Option<AsString>, bytes: impl Into<Rc<[u8]>>, version: u8) -> Self {
        let buffer: Rc<[u8]> = bytes.into();
        let end = buffer.len();
        Self {
            name,
            buffer,
            start: 0,
            end,
            version,
            n_registers: DEFAULT_REGISTERS,
            arguments: Vec::new(),
            flags: FunctionFlags::NONE,
            function2: false,
            constant_pool: None,
        }
    }

    pub fn buffer(&self) -> &Rc<[u8]> {
        &self.buffer
    }

    /// First program counter of the script
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last byte of the script
    pub fn end(&self) -> usize {
        self.end
    }

    /// The bytecode of this script
    pub fn code(&self) -> &[u8] {
        self.buffer.get(self.start..self.end).unwrap_or_default()
    }

    /// Opcode at an absolute program counter, if inside the script
    pub fn byte_at(&self, pc: usize) -> Option<u8> {
        if pc < self.start || pc >= self.end {
            return None;
        }
        self.buffer.get(pc).copied()
    }

    /// Bytes in `[from, to)`, if inside the script
    pub fn slice(&self, from: usize, to: usize) -> Option<&[u8]> {
        if from < self.start || to > self.end || from > to {
            return None;
        }
        self.buffer.get(from..to)
    }

    /// Parse a DefineFunction action whose body starts at `body_start`.
    ///
    /// Layout: name, u16 argument count, argument names, u16 body size.
    pub fn parse_define_function(
        &self,
        data: &[u8],
        body_start: usize,
        constant_pool: Option<Rc<ConstantPool>>,
        dict: &mut StringDict,
    ) -> Result<Script, VmError> {
        let version = self.version;
        let mut reader = ActionReader::new(data);
        let name = reader.read_cstring(version)?;
        let n_args = reader.read_u16()?;
        let mut arguments = Vec::with_capacity(n_args as usize);
        for i in 0..n_args {
            let arg = reader.read_cstring(version)?;
            if arg.is_empty() {
                return Err(VmError::malformed(format!(
                    "empty name for argument {} of function \"{}\"",
                    i, name
                )));
            }
            arguments.push(ScriptArgument {
                name: dict.get_or_insert(&arg),
                preload: 0,
            });
        }
        let size = reader.read_u16()? as usize;
        let end = self.body_end(body_start, size)?;

        Ok(Script {
            name: declared_name(&name, dict),
            buffer: Rc::clone(&self.buffer),
            start: body_start,
            end,
            version,
            n_registers: DEFAULT_REGISTERS,
            arguments,
            flags: FunctionFlags::NONE,
            function2: false,
            constant_pool,
        })
    }

    /// Parse a DefineFunction2 action whose body starts at `body_start`.
    ///
    /// Layout: name, u16 argument count, u8 register count, u16 flags,
    /// per argument a u8 preload register and a name, u16 body size.
    pub fn parse_define_function2(
        &self,
        data: &[u8],
        body_start: usize,
        constant_pool: Option<Rc<ConstantPool>>,
        dict: &mut StringDict,
    ) -> Result<Script, VmError> {
        let version = self.version;
        let mut reader = ActionReader::new(data);
        let name = reader.read_cstring(version)?;
        let n_args = reader.read_u16()?;
        let n_registers = reader.read_u8()? as usize;
        let flags = FunctionFlags::from_bits(reader.read_u16()?);
        let mut arguments = Vec::with_capacity(n_args as usize);
        for i in 0..n_args {
            let preload = reader.read_u8()?;
            let arg = reader.read_cstring(version)?;
            if arg.is_empty() {
                return Err(VmError::malformed(format!(
                    "empty name for argument {} of function \"{}\"",
                    i, name
                )));
            }
            if preload as usize >= n_registers && preload != 0 {
                tracing::warn!(
                    register = preload,
                    n_registers,
                    "argument preload register out of range"
                );
            }
            arguments.push(ScriptArgument {
                name: dict.get_or_insert(&arg),
                preload,
            });
        }
        let size = reader.read_u16()? as usize;
        let end = self.body_end(body_start, size)?;

        Ok(Script {
            name: declared_name(&name, dict),
            buffer: Rc::clone(&self.buffer),
            start: body_start,
            end,
            version,
            n_registers,
            arguments,
            flags,
            function2: true,
            constant_pool,
        })
    }

    fn body_end(&self, body_start: usize, size: usize) -> Result<usize, VmError> {
        let end = body_start.saturating_add(size);
        if end > self.end {
            return Err(VmError::malformed(format!(
                "function body of {} bytes overruns its script by {} bytes",
                size,
                end - self.end
            )));
        }
        Ok(end)
    }
}

fn declared_name(name: &str, dict: &mut StringDict) -> Option<AsString> {
    if name.is_empty() {
        None
    } else {
        Some(dict.get_or_insert(name))
    }
}
