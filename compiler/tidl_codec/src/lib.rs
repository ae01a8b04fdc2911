//! Canonical binary codec driven by resolved schemas.
//!
//! Encoding and decoding are pure functions over a [`Program`] from the
//! resolver, a resolved [`Type`], and bytes or a [`Value`]. The wire
//! format is big-endian throughout: a struct is a sequence of
//! `(tag, field id, value)` triples ending in a stop byte, strings and
//! containers carry a `u32` length, and containers additionally carry
//! element tags so unknown fields can be skipped without a schema.
//!
//! [`Program`]: tidl_ir::ir::Program
//! [`Type`]: tidl_ir::ir::Type

mod decode;
mod encode;
mod error;
mod tag;
mod value;

pub use decode::{decode, skip_value, Reader};
pub use encode::encode;
pub use error::CodecError;
pub use tag::{wire_type, WireType};
pub use value::Value;

/// Maximum nesting depth accepted when decoding or skipping values.
///
/// Guards against stack exhaustion from deeply nested or malicious
/// input.
pub const MAX_DEPTH: usize = 64;
