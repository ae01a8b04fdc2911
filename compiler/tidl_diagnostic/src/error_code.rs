use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Parser errors
/// - E2xxx: Resolver errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unterminated string literal
    E0001,
    /// Unterminated block comment
    E0002,
    /// Invalid character in source
    E0003,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Expected a top-level definition
    E1002,
    /// Expected a type
    E1003,
    /// Expected an identifier
    E1004,
    /// Expected a field id
    E1005,
    /// Expected a constant literal
    E1006,
    /// Struct/enum definition nested inside a struct body
    E1007,

    // Resolver Errors (E2xxx)
    /// Unresolved type or name reference
    E2001,
    /// Circular include
    E2002,
    /// Circular typedef chain
    E2003,
    /// Duplicate field id
    E2004,
    /// Enum value out of range
    E2005,
    /// Duplicate name
    E2006,
    /// Literal does not match its declared type
    E2007,
    /// Unknown or circular service extends
    E2008,
    /// Invalid oneway function (non-void return or throws clause)
    E2009,
    /// Include could not be loaded
    E2010,
    /// Field missing a required/optional qualifier
    E2011,
    /// Field id out of range
    E2012,
}

impl ErrorCode {
    /// Get the numeric code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
        }
    }

    /// Check if this is a parser/syntax error (E1xxx range).
    pub fn is_parser_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this is a resolver error (E2xxx range).
    pub fn is_resolver_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
