//! Core data types for the tidl compiler: spans, tokens, the unresolved
//! AST, and the resolved IR type graph.
//!
//! The AST ([`ast`]) exists only while one document is compiled; the IR
//! ([`ir`]) is immutable after resolution and shared read-only by codegen
//! backends and the binary codec.

pub mod ast;
pub mod ir;
mod span;
mod token;

pub use span::Span;
pub use token::{Token, TokenKind};
