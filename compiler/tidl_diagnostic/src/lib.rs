//! Diagnostic system for the tidl compiler.
//!
//! Compilation produces an ordered list of (severity, location, message)
//! records rather than stopping at the first problem. Each stage appends
//! to a [`Diagnostics`] collector and continues with best-effort recovery;
//! a document with any accumulated diagnostic never produces an IR, but
//! sibling documents that do not depend on it may still compile.

mod collector;
mod diagnostic;
mod error_code;

pub use collector::Diagnostics;
pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
