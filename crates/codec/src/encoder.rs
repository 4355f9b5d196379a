//! `ValueEncoder` — value tree to byte stream.

use tether_buffers::Writer;

use crate::constants::{opcode, MAX_STRING_BYTES};
use crate::dedup::{DedupMode, StringTable};
use crate::error::EncodeError;
use crate::location::{location_for, StringLocation, StringRole};
use crate::value::{ErrorValue, RegExpValue, Value, ValueKind};

/// Encodes [`Value`] trees into the bridge's binary stream.
///
/// The walk is depth-first pre-order; every record is a one-byte opcode plus
/// payload, so the stream is self-describing. The dedup table is reset at
/// the start of every [`ValueEncoder::encode`] call: a reused encoder and a
/// fresh one produce byte-identical output for the same tree.
pub struct ValueEncoder {
    pub writer: Writer,
    table: StringTable,
}

impl Default for ValueEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueEncoder {
    /// Encoder with the default [`DedupMode::Grouped`] bucket grouping.
    pub fn new() -> Self {
        Self::with_mode(DedupMode::default())
    }

    /// Encoder with an explicit bucket grouping. The decoding peer must use
    /// the same mode.
    pub fn with_mode(mode: DedupMode) -> Self {
        Self {
            writer: Writer::new(),
            table: StringTable::new(mode),
        }
    }

    pub fn mode(&self) -> DedupMode {
        self.table.mode()
    }

    /// Encodes one value tree into a byte buffer owned by the caller.
    pub fn encode(&mut self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        self.table.clear();
        self.writer.reset();
        self.write_any(value, location_for(None, StringRole::Item))?;
        Ok(self.writer.flush())
    }

    fn write_any(&mut self, value: &Value, loc: StringLocation) -> Result<(), EncodeError> {
        match value {
            Value::Undefined => self.writer.u8(opcode::UNDEFINED),
            Value::Null => self.writer.u8(opcode::NULL),
            Value::Bool(b) => self.writer.u8(if *b { opcode::TRUE } else { opcode::FALSE }),
            Value::Integer(i) => self.write_integer(*i),
            Value::Number(f) => self.writer.u8f64(opcode::DOUBLE, *f),
            Value::Str(s) => self.write_str(s, loc)?,
            Value::DenseArray(items) => self.write_dense_array(items)?,
            Value::SparseArray(pairs) => self.write_sparse_array(pairs)?,
            Value::Map(pairs) => self.write_map(pairs)?,
            Value::Set(items) => self.write_set(items)?,
            Value::Object(pairs) => self.write_object(pairs)?,
            Value::RegExp(re) => self.write_regexp(re)?,
            Value::Error(err) => self.write_error(err)?,
            // The one kind classify() refuses; it has no wire opcode.
            Value::HostObject(_) => {
                return Err(EncodeError::UnsupportedValueKind(value.kind_name()))
            }
        }
        Ok(())
    }

    fn write_integer(&mut self, int: i64) {
        self.writer.u8(opcode::INT);
        let zigzag = ((int << 1) ^ (int >> 63)) as u64;
        self.write_varint_u64(zigzag);
    }

    /// Emits a literal on first sight of (content, bucket), a back-reference
    /// afterwards.
    fn write_str(&mut self, s: &str, loc: StringLocation) -> Result<(), EncodeError> {
        if s.len() > MAX_STRING_BYTES {
            return Err(EncodeError::StringTooLong { len: s.len() });
        }
        match self.table.probe_insert(loc, s) {
            Some(id) => {
                self.writer.u8(opcode::STR_REF);
                self.write_varint_u32(id);
            }
            None => {
                self.writer.u8(opcode::STR);
                self.write_varint_u32(s.len() as u32);
                self.writer.utf8(s);
            }
        }
        Ok(())
    }

    fn write_dense_array(&mut self, items: &[Value]) -> Result<(), EncodeError> {
        self.writer.u8(opcode::DENSE_ARRAY);
        self.write_varint_u32(items.len() as u32);
        let loc = location_for(Some(ValueKind::DenseArray), StringRole::Item);
        for item in items {
            self.write_any(item, loc)?;
        }
        Ok(())
    }

    fn write_sparse_array(&mut self, pairs: &[(u32, Value)]) -> Result<(), EncodeError> {
        self.writer.u8(opcode::SPARSE_ARRAY);
        self.write_varint_u32(pairs.len() as u32);
        let loc = location_for(Some(ValueKind::SparseArray), StringRole::Item);
        for (index, item) in pairs {
            self.write_varint_u32(*index);
            self.write_any(item, loc)?;
        }
        Ok(())
    }

    fn write_map(&mut self, pairs: &[(Value, Value)]) -> Result<(), EncodeError> {
        self.writer.u8(opcode::MAP);
        self.write_varint_u32(pairs.len() as u32);
        let key_loc = location_for(Some(ValueKind::Map), StringRole::Key);
        let val_loc = location_for(Some(ValueKind::Map), StringRole::Value);
        for (key, value) in pairs {
            self.write_any(key, key_loc)?;
            self.write_any(value, val_loc)?;
        }
        Ok(())
    }

    fn write_set(&mut self, items: &[Value]) -> Result<(), EncodeError> {
        self.writer.u8(opcode::SET);
        self.write_varint_u32(items.len() as u32);
        let loc = location_for(Some(ValueKind::Set), StringRole::Item);
        for item in items {
            self.write_any(item, loc)?;
        }
        Ok(())
    }

    fn write_object(&mut self, pairs: &[(String, Value)]) -> Result<(), EncodeError> {
        self.writer.u8(opcode::OBJECT);
        self.write_varint_u32(pairs.len() as u32);
        let key_loc = location_for(Some(ValueKind::Object), StringRole::Key);
        let val_loc = location_for(Some(ValueKind::Object), StringRole::Value);
        for (key, value) in pairs {
            self.write_str(key, key_loc)?;
            self.write_any(value, val_loc)?;
        }
        Ok(())
    }

    fn write_regexp(&mut self, re: &RegExpValue) -> Result<(), EncodeError> {
        self.writer.u8(opcode::REGEXP);
        self.writer.u8(re.flags);
        let loc = location_for(Some(ValueKind::RegExp), StringRole::Pattern);
        self.write_str(&re.pattern, loc)
    }

    fn write_error(&mut self, err: &ErrorValue) -> Result<(), EncodeError> {
        self.writer.u8(opcode::ERROR);
        self.writer.u8(err.kind.tag());
        self.write_str(
            &err.message,
            location_for(Some(ValueKind::Error), StringRole::Message),
        )?;
        match &err.stack {
            Some(stack) => {
                self.writer.u8(1);
                self.write_str(
                    stack,
                    location_for(Some(ValueKind::Error), StringRole::Stack),
                )?;
            }
            None => self.writer.u8(0),
        }
        Ok(())
    }

    // ---------------------------------------------------------------- varint

    fn write_varint_u32(&mut self, n: u32) {
        self.write_varint_u64(n as u64);
    }

    fn write_varint_u64(&mut self, mut n: u64) {
        loop {
            let low7 = (n & 0x7f) as u8;
            n >>= 7;
            if n == 0 {
                self.writer.u8(low7);
                return;
            }
            self.writer.u8(low7 | 0x80);
        }
    }
}
