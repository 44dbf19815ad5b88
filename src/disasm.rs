//! Action disassembly for tracing and debugging.
//!
//! Operand printers are referenced from the action table. Strings are shown
//! lossily as UTF-8 since the printers do not know the script version.

use std::fmt::Write;

use crate::interpreter::ACTIONS;
use crate::opcode::{self, push as kind};
use crate::reader::ActionReader;
use crate::script::Script;

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

pub(crate) fn print_u8(data: &[u8]) -> Option<String> {
    ActionReader::new(data).read_u8().ok().map(|v| v.to_string())
}

pub(crate) fn print_u16(data: &[u8]) -> Option<String> {
    ActionReader::new(data).read_u16().ok().map(|v| v.to_string())
}

pub(crate) fn print_i16(data: &[u8]) -> Option<String> {
    ActionReader::new(data).read_i16().ok().map(|v| format!("{:+}", v))
}

pub(crate) fn print_string(data: &[u8]) -> Option<String> {
    let s = ActionReader::new(data).read_cstring_bytes().ok()?;
    Some(format!("{:?}", lossy(s)))
}

pub(crate) fn print_get_url(data: &[u8]) -> Option<String> {
    let mut reader = ActionReader::new(data);
    let url = lossy(reader.read_cstring_bytes().ok()?);
    let window = lossy(reader.read_cstring_bytes().ok()?);
    Some(format!("{:?} {:?}", url, window))
}

pub(crate) fn print_wait_for_frame(data: &[u8]) -> Option<String> {
    let mut reader = ActionReader::new(data);
    let frame = reader.read_u16().ok()?;
    let skip = reader.read_u8().ok()?;
    Some(format!("{} skip {}", frame, skip))
}

pub(crate) fn print_goto_frame2(data: &[u8]) -> Option<String> {
    let mut reader = ActionReader::new(data);
    let flags = reader.read_u8().ok()?;
    let mut out = if flags & 1 != 0 { "play".to_string() } else { "stop".to_string() };
    if flags & 2 != 0 {
        let bias = reader.read_u16().ok()?;
        let _ = write!(out, " bias {}", bias);
    }
    Some(out)
}

pub(crate) fn print_constant_pool(data: &[u8]) -> Option<String> {
    let mut reader = ActionReader::new(data);
    let count = reader.read_u16().ok()?;
    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        entries.push(format!("{:?}", lossy(reader.read_cstring_bytes().ok()?)));
    }
    Some(format!("[{}]", entries.join(", ")))
}

pub(crate) fn print_push(data: &[u8]) -> Option<String> {
    let mut reader = ActionReader::new(data);
    let mut values = Vec::new();
    while !reader.is_empty() {
        let value = match reader.read_u8().ok()? {
            kind::STRING => format!("{:?}", lossy(reader.read_cstring_bytes().ok()?)),
            kind::FLOAT => format!("{}f", reader.read_f32().ok()?),
            kind::NULL => "null".to_string(),
            kind::UNDEFINED => "undefined".to_string(),
            kind::REGISTER => format!("r{}", reader.read_u8().ok()?),
            kind::BOOLEAN => (reader.read_u8().ok()? != 0).to_string(),
            kind::DOUBLE => reader.read_swapped_f64().ok()?.to_string(),
            kind::INTEGER => (reader.read_u32().ok()? as i32).to_string(),
            kind::CONSTANT8 => format!("c{}", reader.read_u8().ok()?),
            kind::CONSTANT16 => format!("c{}", reader.read_u16().ok()?),
            _ => return None,
        };
        values.push(value);
    }
    Some(values.join(" "))
}

pub(crate) fn print_define_function(data: &[u8]) -> Option<String> {
    let mut reader = ActionReader::new(data);
    let name = lossy(reader.read_cstring_bytes().ok()?);
    let count = reader.read_u16().ok()?;
    let mut args = Vec::with_capacity(count as usize);
    for _ in 0..count {
        args.push(lossy(reader.read_cstring_bytes().ok()?));
    }
    let size = reader.read_u16().ok()?;
    Some(format!("{}({}) size {}", name, args.join(", "), size))
}

pub(crate) fn print_define_function2(data: &[u8]) -> Option<String> {
    let mut reader = ActionReader::new(data);
    let name = lossy(reader.read_cstring_bytes().ok()?);
    let count = reader.read_u16().ok()?;
    let registers = reader.read_u8().ok()?;
    let flags = reader.read_u16().ok()?;
    let mut args = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let register = reader.read_u8().ok()?;
        let arg = lossy(reader.read_cstring_bytes().ok()?);
        args.push(if register == 0 { arg } else { format!("r{}:{}", register, arg) });
    }
    let size = reader.read_u16().ok()?;
    Some(format!(
        "{}({}) registers {} flags 0x{:04X} size {}",
        name,
        args.join(", "),
        registers,
        flags,
        size
    ))
}

/// One line for the action at `pc`, and the pc of the next action
pub fn disassemble_action(script: &Script, pc: usize) -> Option<(String, usize)> {
    let code = script.byte_at(pc)?;
    let spec = ACTIONS.get(code as usize)?;
    let name = if spec.name.is_empty() {
        format!("Unknown(0x{:02X})", code)
    } else {
        spec.name.to_string()
    };
    if !opcode::has_operands(code) {
        return Some((format!("{}: {}", pc, name), pc + 1));
    }
    let header = script.slice(pc + 1, pc + 3)?;
    let length = ActionReader::new(header).read_u16().ok()? as usize;
    let next = pc + 3 + length;
    let data = script.slice(pc + 3, next)?;
    let operands = spec.print.and_then(|print| print(data));
    let line = match operands {
        Some(operands) if !operands.is_empty() => format!("{}: {} {}", pc, name, operands),
        _ => format!("{}: {}", pc, name),
    };
    Some((line, next))
}

/// Every action of a script, one per line. Stops at End or at the first
/// action that does not fit.
pub fn disassemble(script: &Script) -> String {
    let mut out = String::new();
    let mut pc = script.start();
    while pc < script.end() {
        let Some((line, next)) = disassemble_action(script, pc) else {
            let _ = writeln!(out, "{}: <truncated>", pc);
            break;
        };
        out.push_str(&line);
        out.push('\n');
        if script.byte_at(pc) == Some(opcode::END) {
            break;
        }
        pc = next;
    }
    out
}
