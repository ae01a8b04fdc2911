//! Lexer for tidl using logos.
//!
//! Produces a finite token stream ending in [`TokenKind::Eof`]. Comments
//! (`#`, `// ...`, `/* ... */`) are consumed as trivia and never emitted.
//! An unterminated string or block comment is reported as a lexical
//! diagnostic and lexing continues at the next match, so a single pass
//! surfaces every problem in the document.

use logos::Logos;
use tidl_diagnostic::{Diagnostic, Diagnostics, ErrorCode};
use tidl_ir::{Span, Token, TokenKind};

/// Raw token from logos, before literal cooking.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[regex(r"//[^\n]*")]
    #[regex(r"#[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", priority = 4)]
    BlockComment,

    // A block comment that runs to end of input without `*/`.
    #[regex(r"/\*([^*]|\*+[^*/])*\*?", priority = 3)]
    UnterminatedBlockComment,

    #[token("include")]
    Include,
    #[token("namespace")]
    Namespace,
    #[token("typedef")]
    Typedef,
    #[token("enum")]
    Enum,
    #[token("struct")]
    Struct,
    #[token("exception")]
    Exception,
    #[token("const")]
    Const,
    #[token("service")]
    Service,
    #[token("extends")]
    Extends,
    #[token("throws")]
    Throws,
    #[token("oneway")]
    Oneway,
    #[token("required")]
    Required,
    #[token("optional")]
    Optional,
    #[token("void")]
    Void,
    #[token("bool")]
    Bool,
    #[token("byte")]
    Byte,
    #[token("i16")]
    I16,
    #[token("i32")]
    I32,
    #[token("i64")]
    I64,
    #[token("double")]
    Double,
    #[token("string")]
    StringTy,
    #[token("list")]
    List,
    #[token("set")]
    Set,
    #[token("map")]
    Map,
    #[token("true")]
    True,
    #[token("false")]
    False,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("=")]
    Eq,
    #[token(".")]
    Dot,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,

    // Hex integer
    #[regex(r"0x[0-9a-fA-F]+", |lex| {
        i64::from_str_radix(&lex.slice()[2..], 16).ok()
    })]
    HexInt(i64),

    // Decimal integer
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok(), priority = 3)]
    Int(i64),

    // Float
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| {
        lex.slice().parse::<f64>().ok()
    })]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| {
        lex.slice().parse::<f64>().ok()
    })]
    Float(f64),

    // String literals, double or single quoted (no unescaped newlines)
    #[regex(r#""([^"\\\n]|\\.)*""#, priority = 4)]
    #[regex(r"'([^'\\\n]|\\.)*'", priority = 4)]
    Str,

    // A string missing its closing quote; stops at the newline so the
    // parser can continue on the next line.
    #[regex(r#""([^"\\\n]|\\.)*"#, priority = 3)]
    #[regex(r"'([^'\\\n]|\\.)*", priority = 3)]
    UnterminatedStr,

    // Identifier
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", priority = 2)]
    Ident,
}

/// Lex source text into a token stream.
///
/// Lexical errors are recorded in `diagnostics`; lexing never aborts.
/// The returned stream always ends with an EOF token.
pub fn lex(source: &str, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        let slice = lexer.slice();

        match result {
            Ok(RawToken::LineComment | RawToken::BlockComment) => {}
            Ok(RawToken::UnterminatedBlockComment) => {
                diagnostics.emit(
                    Diagnostic::error(ErrorCode::E0002)
                        .with_message("unterminated block comment")
                        .with_label(Span::point(span.start), "comment opened here"),
                );
            }
            Ok(RawToken::UnterminatedStr) => {
                diagnostics.emit(
                    Diagnostic::error(ErrorCode::E0001)
                        .with_message("unterminated string literal")
                        .with_label(span, "missing closing quote"),
                );
                tokens.push(Token::new(TokenKind::Error, span));
            }
            Ok(raw) => {
                tokens.push(Token::new(convert_token(raw, slice), span));
            }
            Err(()) => {
                diagnostics.emit(
                    Diagnostic::error(ErrorCode::E0003)
                        .with_message(format!("invalid token `{slice}`"))
                        .with_label(span, "not valid here"),
                );
                tokens.push(Token::new(TokenKind::Error, span));
            }
        }
    }

    let eof = u32::try_from(source.len())
        .unwrap_or_else(|_| panic!("source file exceeds {} bytes", u32::MAX));
    tokens.push(Token::new(TokenKind::Eof, Span::point(eof)));
    tokens
}

/// Convert a raw token to a `TokenKind`, cooking string literals.
fn convert_token(raw: RawToken, slice: &str) -> TokenKind {
    match raw {
        RawToken::Int(n) | RawToken::HexInt(n) => TokenKind::Int(n),
        RawToken::Float(f) => TokenKind::Float(f),
        RawToken::Str => {
            let content = &slice[1..slice.len() - 1];
            TokenKind::Str(unescape_string(content))
        }
        RawToken::Ident => TokenKind::Ident(slice.to_string()),

        RawToken::Include => TokenKind::Include,
        RawToken::Namespace => TokenKind::Namespace,
        RawToken::Typedef => TokenKind::Typedef,
        RawToken::Enum => TokenKind::Enum,
        RawToken::Struct => TokenKind::Struct,
        RawToken::Exception => TokenKind::Exception,
        RawToken::Const => TokenKind::Const,
        RawToken::Service => TokenKind::Service,
        RawToken::Extends => TokenKind::Extends,
        RawToken::Throws => TokenKind::Throws,
        RawToken::Oneway => TokenKind::Oneway,
        RawToken::Required => TokenKind::Required,
        RawToken::Optional => TokenKind::Optional,
        RawToken::Void => TokenKind::Void,
        RawToken::Bool => TokenKind::Bool,
        RawToken::Byte => TokenKind::Byte,
        RawToken::I16 => TokenKind::I16,
        RawToken::I32 => TokenKind::I32,
        RawToken::I64 => TokenKind::I64,
        RawToken::Double => TokenKind::Double,
        RawToken::StringTy => TokenKind::StringTy,
        RawToken::List => TokenKind::List,
        RawToken::Set => TokenKind::Set,
        RawToken::Map => TokenKind::Map,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,

        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Eq => TokenKind::Eq,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,

        // Trivia handled by the caller
        RawToken::LineComment
        | RawToken::BlockComment
        | RawToken::UnterminatedBlockComment
        | RawToken::UnterminatedStr => unreachable!("trivia handled in lex()"),
    }
}

/// Process string escape sequences.
fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') | None => result.push('\\'),
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                Some('0') => result.push('\0'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}
