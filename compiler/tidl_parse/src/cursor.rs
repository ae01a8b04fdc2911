//! Token cursor for navigating the token stream.
//!
//! Provides low-level token access, lookahead, and consumption methods.

use tidl_ir::{ast::Ident, Span, Token, TokenKind};

use crate::error::{ParseError, ParseErrorKind};

/// Cursor over a lexed token stream.
///
/// Invariant: the stream is non-empty and its last token is EOF; the
/// cursor never advances past it.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the start of the token stream.
    pub fn new(tokens: &'a [Token]) -> Self {
        debug_assert!(
            matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof),
            "token stream must end with EOF"
        );
        Cursor { tokens, pos: 0 }
    }

    /// Get the current token.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Get the current token's kind.
    #[inline]
    pub fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    /// Get the current token's span.
    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Get the previous token's span.
    #[inline]
    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    /// Check if at end of token stream.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    /// Advance to the next token, returning the one that was current.
    pub fn advance(&mut self) -> &Token {
        let token = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Check if the current token matches the given kind.
    ///
    /// Data-carrying kinds (identifiers, literals) compare by value; use
    /// the dedicated `check_*` methods to match on kind alone.
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Check if the current token is an identifier.
    #[inline]
    pub fn check_ident(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(_))
    }

    /// Advance past the current token if it matches, returning whether it did.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or fail.
    pub fn expect(&mut self, kind: &TokenKind, expected: &'static str) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    found: self.current_kind().clone(),
                    expected,
                },
                self.current_span(),
            ))
        }
    }

    /// Consume an identifier or fail.
    pub fn expect_ident(&mut self, context: &'static str) -> Result<Ident, ParseError> {
        if let TokenKind::Ident(text) = self.current_kind() {
            let text = text.clone();
            let span = self.advance().span;
            Ok(Ident::new(text, span))
        } else {
            Err(ParseError::new(
                ParseErrorKind::ExpectedIdentifier {
                    found: self.current_kind().clone(),
                    context,
                },
                self.current_span(),
            ))
        }
    }
}
