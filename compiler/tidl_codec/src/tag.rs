//! Wire type tags.

use tidl_ir::ir::{BaseType, NamedRef, Program, Type};

/// On-wire type tag, one byte.
///
/// Written before each struct field and once per container to describe
/// element types, so a decoder can skip values it has no schema for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
    Stop = 0,
    Bool = 2,
    Byte = 3,
    Double = 4,
    I16 = 6,
    I32 = 8,
    I64 = 10,
    Str = 11,
    Struct = 12,
    Map = 13,
    Set = 14,
    List = 15,
}

impl WireType {
    /// Parse a tag byte.
    pub fn from_byte(byte: u8) -> Option<WireType> {
        match byte {
            0 => Some(WireType::Stop),
            2 => Some(WireType::Bool),
            3 => Some(WireType::Byte),
            4 => Some(WireType::Double),
            6 => Some(WireType::I16),
            8 => Some(WireType::I32),
            10 => Some(WireType::I64),
            11 => Some(WireType::Str),
            12 => Some(WireType::Struct),
            13 => Some(WireType::Map),
            14 => Some(WireType::Set),
            15 => Some(WireType::List),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// The wire tag a resolved type encodes with. Enums travel as `i32`.
pub fn wire_type(program: &Program, ty: &Type) -> WireType {
    match program.canonical(ty) {
        Type::Base(BaseType::Bool) => WireType::Bool,
        Type::Base(BaseType::Byte) => WireType::Byte,
        Type::Base(BaseType::I16) => WireType::I16,
        Type::Base(BaseType::I32) => WireType::I32,
        Type::Base(BaseType::I64) => WireType::I64,
        Type::Base(BaseType::Double) => WireType::Double,
        Type::Base(BaseType::String) => WireType::Str,
        Type::List(_) => WireType::List,
        Type::Set(_) => WireType::Set,
        Type::Map(_, _) => WireType::Map,
        Type::Named(NamedRef::Enum(_)) => WireType::I32,
        Type::Named(NamedRef::Struct(_)) => WireType::Struct,
        // `canonical` chases typedefs to completion.
        Type::Named(NamedRef::Typedef(_)) => unreachable!("canonical returned a typedef"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_bytes_round_trip() {
        for tag in [
            WireType::Stop,
            WireType::Bool,
            WireType::Byte,
            WireType::Double,
            WireType::I16,
            WireType::I32,
            WireType::I64,
            WireType::Str,
            WireType::Struct,
            WireType::Map,
            WireType::Set,
            WireType::List,
        ] {
            assert_eq!(WireType::from_byte(tag.as_byte()), Some(tag));
        }
        assert_eq!(WireType::from_byte(1), None);
        assert_eq!(WireType::from_byte(16), None);
    }
}
