//! Schema-driven encoding.
//!
//! Output is canonical: struct fields are written in ascending id order
//! and absent optional fields are omitted entirely, never written as a
//! default placeholder. Equal values therefore always produce equal
//! bytes; defaults only take effect on the decode side.

use std::collections::BTreeMap;

use tidl_ir::ir::{BaseType, DefId, NamedRef, Program, Type};

use crate::error::CodecError;
use crate::tag::wire_type;
use crate::value::Value;

/// Encode `value` as `ty`.
pub fn encode(program: &Program, ty: &Type, value: &Value) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    encode_value(program, ty, value, &mut buf)?;
    Ok(buf)
}

fn encode_value(
    program: &Program,
    ty: &Type,
    value: &Value,
    buf: &mut Vec<u8>,
) -> Result<(), CodecError> {
    match (program.canonical(ty), value) {
        (Type::Base(BaseType::Bool), Value::Bool(v)) => buf.push(u8::from(*v)),
        (Type::Base(BaseType::Byte), Value::Byte(v)) => buf.push(*v as u8),
        (Type::Base(BaseType::I16), Value::I16(v)) => buf.extend_from_slice(&v.to_be_bytes()),
        (Type::Base(BaseType::I32), Value::I32(v)) => buf.extend_from_slice(&v.to_be_bytes()),
        (Type::Base(BaseType::I64), Value::I64(v)) => buf.extend_from_slice(&v.to_be_bytes()),
        (Type::Base(BaseType::Double), Value::Double(v)) => {
            buf.extend_from_slice(&v.to_be_bytes());
        }
        (Type::Base(BaseType::String), Value::String(v)) => {
            write_len(buf, v.len())?;
            buf.extend_from_slice(v.as_bytes());
        }
        (Type::List(elem), Value::List(items)) => {
            buf.push(wire_type(program, elem).as_byte());
            write_len(buf, items.len())?;
            for item in items {
                encode_value(program, elem, item, buf)?;
            }
        }
        (Type::Set(elem), Value::Set(items)) => {
            buf.push(wire_type(program, elem).as_byte());
            write_len(buf, items.len())?;
            for item in items {
                encode_value(program, elem, item, buf)?;
            }
        }
        (Type::Map(key_ty, value_ty), Value::Map(entries)) => {
            buf.push(wire_type(program, key_ty).as_byte());
            buf.push(wire_type(program, value_ty).as_byte());
            write_len(buf, entries.len())?;
            for (key, value) in entries {
                encode_value(program, key_ty, key, buf)?;
                encode_value(program, value_ty, value, buf)?;
            }
        }
        (Type::Named(NamedRef::Enum(id)), Value::I32(v)) => {
            let def = program.enum_def(*id);
            if !def.contains_value(*v) {
                return Err(CodecError::UnknownEnumValue {
                    name: def.name.clone(),
                    value: *v,
                });
            }
            buf.extend_from_slice(&v.to_be_bytes());
        }
        (Type::Named(NamedRef::Struct(id)), Value::Struct(fields)) => {
            encode_struct(program, *id, fields, buf)?;
        }
        (expected, found) => {
            return Err(CodecError::TypeMismatch {
                expected: type_kind_name(expected),
                found: found.kind_name(),
            });
        }
    }
    Ok(())
}

/// Encode a struct body: `(tag, id, value)*` then a stop byte.
fn encode_struct(
    program: &Program,
    id: DefId,
    values: &BTreeMap<i16, Value>,
    buf: &mut Vec<u8>,
) -> Result<(), CodecError> {
    let def = program.struct_def(id);

    for &fid in values.keys() {
        if def.field_by_id(fid).is_none() {
            return Err(CodecError::UnknownFieldId {
                strct: def.name.clone(),
                id: fid,
            });
        }
    }

    let mut fields: Vec<_> = def.fields.iter().collect();
    fields.sort_by_key(|f| f.id);

    for field in fields {
        let Some(value) = values.get(&field.id) else {
            if field.is_required() {
                return Err(CodecError::MissingRequired {
                    strct: def.name.clone(),
                    field: field.name.clone(),
                });
            }
            // Absent optionals are omitted, never written as a default.
            continue;
        };
        buf.push(wire_type(program, &field.ty).as_byte());
        buf.extend_from_slice(&(field.id as u16).to_be_bytes());
        encode_value(program, &field.ty, value, buf)?;
    }
    buf.push(0);
    Ok(())
}

fn write_len(buf: &mut Vec<u8>, len: usize) -> Result<(), CodecError> {
    let len = u32::try_from(len).map_err(|_| CodecError::LengthOverflow { len })?;
    buf.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

fn type_kind_name(ty: &Type) -> &'static str {
    match ty {
        Type::Base(base) => base.name(),
        Type::List(_) => "list",
        Type::Set(_) => "set",
        Type::Map(_, _) => "map",
        Type::Named(NamedRef::Enum(_)) => "enum",
        Type::Named(NamedRef::Struct(_)) => "struct",
        Type::Named(NamedRef::Typedef(_)) => "typedef",
    }
}
