//! Token types shared between the lexer and the parser.

use crate::Span;

/// A token with its source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// Token kinds produced by the lexer.
///
/// Comments never appear here; the lexer consumes them as trivia.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Keywords
    Include,
    Namespace,
    Typedef,
    Enum,
    Struct,
    Exception,
    Const,
    Service,
    Extends,
    Throws,
    Oneway,
    Required,
    Optional,
    Void,
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    StringTy,
    List,
    Set,
    Map,
    True,
    False,

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Lt,
    Gt,
    Comma,
    Semicolon,
    Colon,
    Eq,
    Dot,
    Minus,
    Star,

    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),

    /// Produced for malformed input; the lexer has already reported it.
    Error,
    Eof,
}

impl TokenKind {
    /// Human-readable name for error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            TokenKind::Include => "include",
            TokenKind::Namespace => "namespace",
            TokenKind::Typedef => "typedef",
            TokenKind::Enum => "enum",
            TokenKind::Struct => "struct",
            TokenKind::Exception => "exception",
            TokenKind::Const => "const",
            TokenKind::Service => "service",
            TokenKind::Extends => "extends",
            TokenKind::Throws => "throws",
            TokenKind::Oneway => "oneway",
            TokenKind::Required => "required",
            TokenKind::Optional => "optional",
            TokenKind::Void => "void",
            TokenKind::Bool => "bool",
            TokenKind::Byte => "byte",
            TokenKind::I16 => "i16",
            TokenKind::I32 => "i32",
            TokenKind::I64 => "i64",
            TokenKind::Double => "double",
            TokenKind::StringTy => "string",
            TokenKind::List => "list",
            TokenKind::Set => "set",
            TokenKind::Map => "map",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Eq => "=",
            TokenKind::Dot => ".",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Int(_) => "integer literal",
            TokenKind::Float(_) => "float literal",
            TokenKind::Str(_) => "string literal",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of file",
        }
    }

    /// Whether this token can begin a top-level definition or header.
    ///
    /// The parser synchronizes to these after a malformed definition.
    pub fn starts_definition(&self) -> bool {
        matches!(
            self,
            TokenKind::Include
                | TokenKind::Namespace
                | TokenKind::Typedef
                | TokenKind::Enum
                | TokenKind::Struct
                | TokenKind::Exception
                | TokenKind::Const
                | TokenKind::Service
        )
    }
}
