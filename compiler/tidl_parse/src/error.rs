//! Parse error types.
//!
//! Structured error kinds that convert into diagnostics; the parser
//! collects them and continues rather than stopping at the first one.

use tidl_diagnostic::{Diagnostic, ErrorCode};
use tidl_ir::{Span, TokenKind};

/// Structured parse error kinds with contextual data.
#[derive(Clone, Debug)]
pub enum ParseErrorKind {
    /// Expected a specific token, found something else.
    UnexpectedToken {
        found: TokenKind,
        /// Description of what was expected.
        expected: &'static str,
    },

    /// Expected a top-level definition keyword.
    ExpectedDefinition { found: TokenKind },

    /// Expected a type.
    ExpectedType { found: TokenKind },

    /// Expected an identifier.
    ExpectedIdentifier {
        found: TokenKind,
        /// Context: struct name, field name, etc.
        context: &'static str,
    },

    /// Expected an integer field id before `:`.
    ExpectedFieldId { found: TokenKind },

    /// Expected a constant literal.
    ExpectedLiteral { found: TokenKind },

    /// A struct/enum definition nested inside a struct body.
    NestedDefinition { keyword: &'static str },
}

impl ParseErrorKind {
    /// Get the error code for this kind.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnexpectedToken { .. } => ErrorCode::E1001,
            Self::ExpectedDefinition { .. } => ErrorCode::E1002,
            Self::ExpectedType { .. } => ErrorCode::E1003,
            Self::ExpectedIdentifier { .. } => ErrorCode::E1004,
            Self::ExpectedFieldId { .. } => ErrorCode::E1005,
            Self::ExpectedLiteral { .. } => ErrorCode::E1006,
            Self::NestedDefinition { .. } => ErrorCode::E1007,
        }
    }

    /// Generate the primary error message.
    pub fn message(&self) -> String {
        match self {
            Self::UnexpectedToken { found, expected } => {
                format!("expected {expected}, found `{}`", found.display_name())
            }
            Self::ExpectedDefinition { found } => {
                format!(
                    "expected a definition (typedef, enum, struct, exception, const, or service), \
                     found `{}`",
                    found.display_name()
                )
            }
            Self::ExpectedType { found } => {
                format!("expected a type, found `{}`", found.display_name())
            }
            Self::ExpectedIdentifier { found, context } => {
                format!("expected {context}, found `{}`", found.display_name())
            }
            Self::ExpectedFieldId { found } => {
                format!(
                    "expected a field id before `:`, found `{}`",
                    found.display_name()
                )
            }
            Self::ExpectedLiteral { found } => {
                format!("expected a constant value, found `{}`", found.display_name())
            }
            Self::NestedDefinition { keyword } => {
                format!("`{keyword}` definitions cannot be nested inside a struct body")
            }
        }
    }
}

/// A parse error with its source location.
#[derive(Clone, Debug)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        ParseError { kind, span }
    }

    /// Convert into a diagnostic record.
    pub fn into_diagnostic(self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.kind.error_code())
            .with_message(self.kind.message())
            .with_label(self.span, "here");
        if let ParseErrorKind::NestedDefinition { .. } = self.kind {
            diag = diag.with_note("declare it at the top level and reference it by name");
        }
        diag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let kind = ParseErrorKind::UnexpectedToken {
            found: TokenKind::Comma,
            expected: "`{`",
        };
        assert_eq!(kind.message(), "expected `{`, found `,`");
        assert_eq!(kind.error_code(), ErrorCode::E1001);

        let kind = ParseErrorKind::ExpectedFieldId {
            found: TokenKind::Ident("name".to_string()),
        };
        assert!(kind.message().contains("field id"));
    }

    #[test]
    fn test_into_diagnostic() {
        let err = ParseError::new(
            ParseErrorKind::NestedDefinition { keyword: "struct" },
            Span::new(4, 10),
        );
        let diag = err.into_diagnostic();
        assert_eq!(diag.code, ErrorCode::E1007);
        assert_eq!(diag.primary_span(), Some(Span::new(4, 10)));
        assert!(!diag.notes.is_empty());
    }
}
