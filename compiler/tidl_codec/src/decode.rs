//! Schema-driven decoding.
//!
//! Struct decoding skips fields the schema does not declare, and fields
//! whose wire tag contradicts the declared type; both count as absent.
//! Absent optional fields with defaults decode to their default; absent
//! required fields are an error. Trailing bytes after the top-level
//! value are an error.

use std::collections::BTreeMap;

use tidl_ir::ir::{BaseType, DefId, NamedRef, Program, Type};

use crate::error::CodecError;
use crate::tag::{wire_type, WireType};
use crate::value::Value;
use crate::MAX_DEPTH;

/// Decode one value of type `ty` from `bytes`, consuming all of it.
pub fn decode(program: &Program, ty: &Type, bytes: &[u8]) -> Result<Value, CodecError> {
    let mut reader = Reader::new(bytes);
    let value = decode_value(program, ty, &mut reader, 0)?;
    let remaining = reader.remaining();
    if remaining > 0 {
        return Err(CodecError::TrailingBytes { count: remaining });
    }
    Ok(value)
}

fn decode_value(
    program: &Program,
    ty: &Type,
    reader: &mut Reader<'_>,
    depth: usize,
) -> Result<Value, CodecError> {
    if depth > MAX_DEPTH {
        return Err(CodecError::DepthLimit);
    }
    let value = match program.canonical(ty) {
        Type::Base(BaseType::Bool) => match reader.read_u8()? {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            value => return Err(CodecError::InvalidBool { value }),
        },
        Type::Base(BaseType::Byte) => Value::Byte(reader.read_u8()? as i8),
        Type::Base(BaseType::I16) => Value::I16(reader.read_i16()?),
        Type::Base(BaseType::I32) => Value::I32(reader.read_i32()?),
        Type::Base(BaseType::I64) => Value::I64(reader.read_i64()?),
        Type::Base(BaseType::Double) => Value::Double(reader.read_f64()?),
        Type::Base(BaseType::String) => {
            let len = reader.read_u32()? as usize;
            let bytes = reader.read_bytes(len)?;
            let text = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
            Value::String(text.to_string())
        }
        Type::List(elem) => {
            let items = decode_elements(program, elem, reader, depth)?;
            Value::List(items)
        }
        Type::Set(elem) => {
            let items = decode_elements(program, elem, reader, depth)?;
            Value::Set(items)
        }
        Type::Map(key_ty, value_ty) => {
            expect_tag(reader, wire_type(program, key_ty))?;
            expect_tag(reader, wire_type(program, value_ty))?;
            let count = reader.read_u32()? as usize;
            let mut entries = Vec::new();
            for _ in 0..count {
                let key = decode_value(program, key_ty, reader, depth + 1)?;
                let value = decode_value(program, value_ty, reader, depth + 1)?;
                entries.push((key, value));
            }
            Value::Map(entries)
        }
        // Unknown enum values pass through, so schemas can gain
        // constants without breaking old readers.
        Type::Named(NamedRef::Enum(_)) => Value::I32(reader.read_i32()?),
        Type::Named(NamedRef::Struct(id)) => decode_struct(program, *id, reader, depth)?,
        Type::Named(NamedRef::Typedef(_)) => unreachable!("canonical returned a typedef"),
    };
    Ok(value)
}

fn decode_elements(
    program: &Program,
    elem: &Type,
    reader: &mut Reader<'_>,
    depth: usize,
) -> Result<Vec<Value>, CodecError> {
    expect_tag(reader, wire_type(program, elem))?;
    let count = reader.read_u32()? as usize;
    let mut items = Vec::new();
    for _ in 0..count {
        items.push(decode_value(program, elem, reader, depth + 1)?);
    }
    Ok(items)
}

fn decode_struct(
    program: &Program,
    id: DefId,
    reader: &mut Reader<'_>,
    depth: usize,
) -> Result<Value, CodecError> {
    let def = program.struct_def(id);
    let mut values: BTreeMap<i16, Value> = BTreeMap::new();

    loop {
        let tag = reader.read_u8()?;
        if tag == WireType::Stop.as_byte() {
            break;
        }
        let wire = WireType::from_byte(tag).ok_or(CodecError::InvalidTag { tag })?;
        let fid = reader.read_u16()? as i16;

        match def.field_by_id(fid) {
            Some(field) if wire_type(program, &field.ty) == wire => {
                let value = decode_value(program, &field.ty, reader, depth + 1)?;
                values.insert(fid, value);
            }
            // Unknown id, or a known id whose declared type changed:
            // skip the value and treat the field as absent.
            _ => skip_value(reader, wire, depth + 1)?,
        }
    }

    for field in &def.fields {
        if values.contains_key(&field.id) {
            continue;
        }
        // Required fields must be on the wire; a default never stands
        // in for one.
        if field.is_required() {
            return Err(CodecError::MissingRequired {
                strct: def.name.clone(),
                field: field.name.clone(),
            });
        }
        if let Some(default) = &field.default {
            values.insert(field.id, Value::from_const(default));
        }
    }

    Ok(Value::Struct(values))
}

/// Skip one value of the given wire type, without a schema.
pub fn skip_value(
    reader: &mut Reader<'_>,
    wire: WireType,
    depth: usize,
) -> Result<(), CodecError> {
    if depth > MAX_DEPTH {
        return Err(CodecError::DepthLimit);
    }
    match wire {
        WireType::Stop => return Err(CodecError::InvalidTag { tag: 0 }),
        WireType::Bool | WireType::Byte => {
            reader.read_bytes(1)?;
        }
        WireType::I16 => {
            reader.read_bytes(2)?;
        }
        WireType::I32 => {
            reader.read_bytes(4)?;
        }
        WireType::I64 | WireType::Double => {
            reader.read_bytes(8)?;
        }
        WireType::Str => {
            let len = reader.read_u32()? as usize;
            reader.read_bytes(len)?;
        }
        WireType::Struct => loop {
            let tag = reader.read_u8()?;
            if tag == WireType::Stop.as_byte() {
                break;
            }
            let wire = WireType::from_byte(tag).ok_or(CodecError::InvalidTag { tag })?;
            reader.read_u16()?;
            skip_value(reader, wire, depth + 1)?;
        },
        WireType::List | WireType::Set => {
            let elem = read_element_tag(reader)?;
            let count = reader.read_u32()? as usize;
            for _ in 0..count {
                skip_value(reader, elem, depth + 1)?;
            }
        }
        WireType::Map => {
            let key = read_element_tag(reader)?;
            let value = read_element_tag(reader)?;
            let count = reader.read_u32()? as usize;
            for _ in 0..count {
                skip_value(reader, key, depth + 1)?;
                skip_value(reader, value, depth + 1)?;
            }
        }
    }
    Ok(())
}

fn read_element_tag(reader: &mut Reader<'_>) -> Result<WireType, CodecError> {
    let tag = reader.read_u8()?;
    WireType::from_byte(tag).ok_or(CodecError::InvalidTag { tag })
}

fn expect_tag(reader: &mut Reader<'_>, expected: WireType) -> Result<(), CodecError> {
    let found = reader.read_u8()?;
    if found == expected.as_byte() {
        Ok(())
    } else {
        Err(CodecError::TagMismatch {
            expected: expected.as_byte(),
            found,
        })
    }
}

/// Big-endian byte reader.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < len {
            return Err(CodecError::UnexpectedEof);
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_i16(&mut self) -> Result<i16, CodecError> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        let bytes = self.read_bytes(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(i64::from_be_bytes(raw))
    }

    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        let bytes = self.read_bytes(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(f64::from_be_bytes(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reader_eof() {
        let mut reader = Reader::new(&[1, 2]);
        assert_eq!(reader.read_u16(), Ok(0x0102));
        assert_eq!(reader.read_u8(), Err(CodecError::UnexpectedEof));
    }

    #[test]
    fn test_skip_scalars_and_string() {
        // i32, then a 3-byte string.
        let bytes = [0, 0, 0, 7, 0, 0, 0, 3, b'a', b'b', b'c'];
        let mut reader = Reader::new(&bytes);
        skip_value(&mut reader, WireType::I32, 0).unwrap_or_else(|e| panic!("{e}"));
        skip_value(&mut reader, WireType::Str, 0).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_skip_nested_struct() {
        // struct { 1: i16 = 5, 2: list<bool> [true] } stop
        let bytes = [
            6, 0, 1, 0, 5, // i16 field id 1
            15, 0, 2, 2, 0, 0, 0, 1, 1, // list<bool> field id 2
            0, // stop
        ];
        let mut reader = Reader::new(&bytes);
        skip_value(&mut reader, WireType::Struct, 0).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_skip_depth_limit() {
        // A run of nested list headers: list<list<list<...>>> each with
        // one element, never terminating in a scalar.
        let mut bytes = Vec::new();
        for _ in 0..(MAX_DEPTH + 2) {
            bytes.push(WireType::List.as_byte());
            bytes.extend_from_slice(&1u32.to_be_bytes());
        }
        let mut reader = Reader::new(&bytes);
        assert_eq!(
            skip_value(&mut reader, WireType::List, 0),
            Err(CodecError::DepthLimit)
        );
    }
}
