//! Little-endian operand decoding for action payloads

use crate::error::VmError;

/// Cursor over the operand bytes of one action
pub struct ActionReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ActionReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], VmError> {
        let end = self.pos.checked_add(n).filter(|end| *end <= self.data.len());
        let Some(end) = end else {
            return Err(VmError::malformed(format!(
                "needed {} more bytes at offset {}, {} left",
                n,
                self.pos,
                self.remaining()
            )));
        };
        let bytes = self.data.get(self.pos..end).unwrap_or_default();
        self.pos = end;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], VmError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, VmError> {
        Ok(u8::from_le_bytes(self.take_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16, VmError> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, VmError> {
        Ok(i16::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, VmError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, VmError> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    /// Doubles in action records store the high 32-bit word first
    pub fn read_swapped_f64(&mut self) -> Result<f64, VmError> {
        let bytes: [u8; 8] = self.take_array()?;
        let mut swapped = [0u8; 8];
        for (i, b) in bytes.iter().enumerate() {
            if let Some(slot) = swapped.get_mut((i + 4) % 8) {
                *slot = *b;
            }
        }
        Ok(f64::from_le_bytes(swapped))
    }

    /// Raw bytes of a nul-terminated string, terminator consumed
    pub fn read_cstring_bytes(&mut self) -> Result<&'a [u8], VmError> {
        let rest = self.data.get(self.pos..).unwrap_or_default();
        let Some(len) = rest.iter().position(|b| *b == 0) else {
            return Err(VmError::malformed(format!(
                "string at offset {} is not nul-terminated",
                self.pos
            )));
        };
        let bytes = self.take(len)?;
        self.pos += 1;
        Ok(bytes)
    }

    /// A nul-terminated string decoded for the given SWF version
    pub fn read_cstring(&mut self, version: u8) -> Result<String, VmError> {
        let bytes = self.read_cstring_bytes()?;
        decode_string(bytes, version)
    }
}

/// Decode string bytes: UTF-8 from version 6 on, Latin-1 before
pub fn decode_string(bytes: &[u8], version: u8) -> Result<String, VmError> {
    if version >= 6 {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| VmError::malformed(format!("invalid UTF-8 in string: {e}")))
    } else {
        Ok(bytes.iter().map(|b| char::from(*b)).collect())
    }
}

/// Encode a string for a SWF of the given version, the inverse of
/// [`decode_string`]. Characters outside Latin-1 become `?` below version 6.
pub fn encode_string(s: &str, version: u8) -> Vec<u8> {
    if version >= 6 {
        s.as_bytes().to_vec()
    } else {
        s.chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect()
    }
}
