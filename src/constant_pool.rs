//! Constant pools declared by the ConstantPool action

use crate::error::VmError;
use crate::reader::ActionReader;
use crate::string_dict::StringDict;
use crate::value::{AsString, CheapClone};

/// Ordered table of interned strings referenced by Push type 8/9 records.
///
/// Frames and scripts share a pool through `Rc<ConstantPool>`; replacing a
/// frame's pool drops its reference to the old one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantPool {
    strings: Vec<AsString>,
}

impl ConstantPool {
    pub fn new(strings: Vec<AsString>) -> Self {
        Self { strings }
    }

    /// Parse the operand bytes of a ConstantPool action: a u16 count
    /// followed by that many nul-terminated strings.
    pub fn parse(data: &[u8], version: u8, dict: &mut StringDict) -> Result<Self, VmError> {
        let mut reader = ActionReader::new(data);
        let count = reader.read_u16()? as usize;
        let mut strings = Vec::with_capacity(count);
        for _ in 0..count {
            let s = reader.read_cstring(version)?;
            strings.push(dict.get_or_insert(&s));
        }
        if !reader.is_empty() {
            tracing::debug!(
                trailing = reader.remaining(),
                "constant pool has trailing bytes"
            );
        }
        Ok(Self { strings })
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Look up an entry, failing for indices past the end
    pub fn get(&self, index: usize) -> Result<AsString, VmError> {
        self.strings
            .get(index)
            .map(CheapClone::cheap_clone)
            .ok_or(VmError::ConstantPoolIndex {
                index,
                size: self.strings.len(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &AsString> {
        self.strings.iter()
    }
}
