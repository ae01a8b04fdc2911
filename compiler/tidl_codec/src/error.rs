//! Codec error types.

use thiserror::Error;

/// Errors from encoding or decoding a value against a schema.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CodecError {
    /// A required field with no value and no default.
    #[error("required field `{field}` of `{strct}` is missing")]
    MissingRequired { strct: String, field: String },

    /// A value whose shape does not fit the declared type.
    #[error("expected a {expected} value, found a {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A struct value carrying a field id its definition does not declare.
    #[error("struct `{strct}` has no field with id {id}")]
    UnknownFieldId { strct: String, id: i16 },

    /// An enum value the definition does not contain.
    #[error("enum `{name}` has no constant with value {value}")]
    UnknownEnumValue { name: String, value: i32 },

    /// A string or container larger than the wire format can express.
    #[error("length {len} exceeds the wire format limit")]
    LengthOverflow { len: usize },

    /// Input ended inside a value.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A byte that is not a known wire tag.
    #[error("invalid wire tag {tag:#04x}")]
    InvalidTag { tag: u8 },

    /// A container element tag that contradicts the schema.
    #[error("expected element tag {expected:#04x}, found {found:#04x}")]
    TagMismatch { expected: u8, found: u8 },

    /// A bool byte other than 0 or 1.
    #[error("invalid bool byte {value:#04x}")]
    InvalidBool { value: u8 },

    /// A string field holding non-UTF-8 bytes.
    #[error("invalid UTF-8 in string value")]
    InvalidUtf8,

    /// Nesting beyond [`crate::MAX_DEPTH`], from data or schema.
    #[error("value nesting exceeds the depth limit")]
    DepthLimit,

    /// Bytes left over after the decoded value.
    #[error("{count} trailing bytes after value")]
    TrailingBytes { count: usize },
}
