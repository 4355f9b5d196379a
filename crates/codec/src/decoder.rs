//! `ValueDecoder` — byte stream back to a value tree.

use tether_buffers::Reader;

use crate::constants::{opcode, MAX_VARINT32_BYTES, MAX_VARINT64_BYTES};
use crate::dedup::{DedupMode, StringPool};
use crate::error::DecodeError;
use crate::location::{location_for, StringLocation, StringRole};
use crate::value::{ErrorKind, ErrorValue, RegExpValue, Value, ValueKind};

/// Decodes the bridge's binary stream back into [`Value`] trees.
///
/// The decoder mirrors the encoder's walk: it derives every string's
/// [`StringLocation`] from structural position via [`location_for`] (the
/// stream carries no location data, only back-reference IDs) and grows its
/// own string pool in the same order the encoder assigned IDs. Malformed or
/// truncated input is rejected with a terminal [`DecodeError`]; no read ever
/// crosses the end of the input slice.
pub struct ValueDecoder {
    pool: StringPool,
}

impl Default for ValueDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueDecoder {
    /// Decoder with the default [`DedupMode::Grouped`] bucket grouping.
    pub fn new() -> Self {
        Self::with_mode(DedupMode::default())
    }

    /// Decoder with an explicit bucket grouping. Must match the encoder that
    /// produced the stream.
    pub fn with_mode(mode: DedupMode) -> Self {
        Self {
            pool: StringPool::new(mode),
        }
    }

    pub fn mode(&self) -> DedupMode {
        self.pool.mode()
    }

    /// Decodes one value tree from the front of `input`.
    pub fn decode(&mut self, input: &[u8]) -> Result<Value, DecodeError> {
        self.decode_with_consumed(input).map(|(value, _)| value)
    }

    /// Like [`ValueDecoder::decode`], also reporting how many bytes the
    /// record spanned so framing glue can validate exact-size transport.
    pub fn decode_with_consumed(&mut self, input: &[u8]) -> Result<(Value, usize), DecodeError> {
        self.pool.clear();
        let mut rd = Reader::new(input);
        let value = self.read_any(&mut rd, location_for(None, StringRole::Item))?;
        Ok((value, rd.consumed()))
    }

    fn read_any(&mut self, rd: &mut Reader, loc: StringLocation) -> Result<Value, DecodeError> {
        let op = rd.u8()?;
        match op {
            opcode::UNDEFINED => Ok(Value::Undefined),
            opcode::NULL => Ok(Value::Null),
            opcode::FALSE => Ok(Value::Bool(false)),
            opcode::TRUE => Ok(Value::Bool(true)),
            opcode::INT => {
                let zigzag = Self::read_varint_u64(rd)?;
                Ok(Value::Integer(
                    ((zigzag >> 1) as i64) ^ -((zigzag & 1) as i64),
                ))
            }
            opcode::DOUBLE => Ok(Value::Number(rd.f64()?)),
            opcode::STR => self.read_literal(rd, loc).map(Value::Str),
            opcode::STR_REF => self.read_backref(rd, loc).map(Value::Str),
            opcode::DENSE_ARRAY => self.read_dense_array(rd),
            opcode::SPARSE_ARRAY => self.read_sparse_array(rd),
            opcode::MAP => self.read_map(rd),
            opcode::SET => self.read_set(rd),
            opcode::OBJECT => self.read_object(rd),
            opcode::REGEXP => self.read_regexp(rd),
            opcode::ERROR => self.read_error(rd),
            other => Err(DecodeError::InvalidOpcode(other)),
        }
    }

    // ---------------------------------------------------------------- strings

    fn read_literal(&mut self, rd: &mut Reader, loc: StringLocation) -> Result<String, DecodeError> {
        let len = Self::read_varint_u32(rd)? as usize;
        if loc == StringLocation::Void && len > 0 {
            // No string belongs at a void position; a length claiming
            // otherwise is corrupt data.
            return Err(DecodeError::InvalidOpcode(opcode::STR));
        }
        if len > rd.remaining() {
            return Err(DecodeError::LengthOverflow);
        }
        let s = rd.utf8(len)?;
        self.pool.admit(loc, s);
        Ok(s.to_string())
    }

    fn read_backref(&mut self, rd: &mut Reader, loc: StringLocation) -> Result<String, DecodeError> {
        let id = Self::read_varint_u32(rd)?;
        match self.pool.resolve(loc, id) {
            Some(s) => Ok(s.to_string()),
            None => Err(DecodeError::UnknownBackReference(id)),
        }
    }

    /// Reads a record that must be a string (literal or back-reference).
    fn read_str_record(
        &mut self,
        rd: &mut Reader,
        loc: StringLocation,
    ) -> Result<String, DecodeError> {
        match rd.u8()? {
            opcode::STR => self.read_literal(rd, loc),
            opcode::STR_REF => self.read_backref(rd, loc),
            other => Err(DecodeError::InvalidOpcode(other)),
        }
    }

    // ------------------------------------------------------------- composites

    fn read_dense_array(&mut self, rd: &mut Reader) -> Result<Value, DecodeError> {
        let count = Self::read_count(rd)?;
        let loc = location_for(Some(ValueKind::DenseArray), StringRole::Item);
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.read_any(rd, loc)?);
        }
        Ok(Value::DenseArray(items))
    }

    fn read_sparse_array(&mut self, rd: &mut Reader) -> Result<Value, DecodeError> {
        let count = Self::read_count(rd)?;
        let loc = location_for(Some(ValueKind::SparseArray), StringRole::Item);
        let mut pairs = Vec::with_capacity(count);
        for _ in 0..count {
            let index = Self::read_varint_u32(rd)?;
            pairs.push((index, self.read_any(rd, loc)?));
        }
        Ok(Value::SparseArray(pairs))
    }

    fn read_map(&mut self, rd: &mut Reader) -> Result<Value, DecodeError> {
        let count = Self::read_count(rd)?;
        let key_loc = location_for(Some(ValueKind::Map), StringRole::Key);
        let val_loc = location_for(Some(ValueKind::Map), StringRole::Value);
        let mut pairs = Vec::with_capacity(count);
        for _ in 0..count {
            let key = self.read_any(rd, key_loc)?;
            let value = self.read_any(rd, val_loc)?;
            pairs.push((key, value));
        }
        Ok(Value::Map(pairs))
    }

    fn read_set(&mut self, rd: &mut Reader) -> Result<Value, DecodeError> {
        let count = Self::read_count(rd)?;
        let loc = location_for(Some(ValueKind::Set), StringRole::Item);
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.read_any(rd, loc)?);
        }
        Ok(Value::Set(items))
    }

    fn read_object(&mut self, rd: &mut Reader) -> Result<Value, DecodeError> {
        let count = Self::read_count(rd)?;
        let key_loc = location_for(Some(ValueKind::Object), StringRole::Key);
        let val_loc = location_for(Some(ValueKind::Object), StringRole::Value);
        let mut pairs = Vec::with_capacity(count);
        for _ in 0..count {
            let key = self.read_str_record(rd, key_loc)?;
            let value = self.read_any(rd, val_loc)?;
            pairs.push((key, value));
        }
        Ok(Value::Object(pairs))
    }

    fn read_regexp(&mut self, rd: &mut Reader) -> Result<Value, DecodeError> {
        let flags = rd.u8()?;
        let loc = location_for(Some(ValueKind::RegExp), StringRole::Pattern);
        let pattern = self.read_str_record(rd, loc)?;
        Ok(Value::RegExp(RegExpValue { pattern, flags }))
    }

    fn read_error(&mut self, rd: &mut Reader) -> Result<Value, DecodeError> {
        let tag = rd.u8()?;
        let kind = ErrorKind::from_tag(tag).ok_or(DecodeError::InvalidOpcode(tag))?;
        let message =
            self.read_str_record(rd, location_for(Some(ValueKind::Error), StringRole::Message))?;
        let stack = match rd.u8()? {
            0 => None,
            1 => Some(
                self.read_str_record(rd, location_for(Some(ValueKind::Error), StringRole::Stack))?,
            ),
            other => return Err(DecodeError::InvalidOpcode(other)),
        };
        Ok(Value::Error(ErrorValue {
            kind,
            message,
            stack,
        }))
    }

    // ---------------------------------------------------------------- varint

    /// Reads an element/pair count and rejects counts that cannot fit in the
    /// remaining input (every record is at least one byte), before any
    /// allocation happens.
    fn read_count(rd: &mut Reader) -> Result<usize, DecodeError> {
        let count = Self::read_varint_u32(rd)? as usize;
        if count > rd.remaining() {
            return Err(DecodeError::LengthOverflow);
        }
        Ok(count)
    }

    fn read_varint_u32(rd: &mut Reader) -> Result<u32, DecodeError> {
        let mut out = 0u64;
        let mut shift = 0u32;
        for _ in 0..MAX_VARINT32_BYTES {
            let byte = rd.u8()?;
            out |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                return u32::try_from(out).map_err(|_| DecodeError::LengthOverflow);
            }
            shift += 7;
        }
        Err(DecodeError::LengthOverflow)
    }

    fn read_varint_u64(rd: &mut Reader) -> Result<u64, DecodeError> {
        let mut out = 0u64;
        let mut shift = 0u32;
        for _ in 0..MAX_VARINT64_BYTES {
            let byte = rd.u8()?;
            let low7 = (byte & 0x7f) as u64;
            if shift == 63 && low7 > 1 {
                return Err(DecodeError::LengthOverflow);
            }
            out |= low7 << shift;
            if byte & 0x80 == 0 {
                return Ok(out);
            }
            shift += 7;
        }
        Err(DecodeError::LengthOverflow)
    }
}
