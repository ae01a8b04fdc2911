//! Resolution error types.

use tidl_diagnostic::{Diagnostic, ErrorCode};
use tidl_ir::Span;

/// Structured resolution error kinds with contextual data.
#[derive(Clone, Debug)]
pub enum ResolveErrorKind {
    /// A name that resolves to nothing.
    UnresolvedName { name: String },

    /// A qualified reference whose alias matches no include.
    UnknownIncludeAlias { alias: String },

    /// A name that resolved to a definition that is not a type.
    NotAType { name: String, kind: &'static str },

    /// A typedef that aliases back to itself.
    CircularTypedef { name: String },

    /// Two fields in one list sharing a wire id.
    DuplicateFieldId { id: i16, previous: String },

    /// An enum constant value outside `0..=i32::MAX`.
    EnumValueOutOfRange { name: String, value: i64 },

    /// Two definitions sharing a name in the same scope.
    DuplicateName { name: String, kind: &'static str },

    /// A literal whose shape does not fit the declared type.
    LiteralTypeMismatch {
        expected: String,
        found: &'static str,
    },

    /// An integer literal outside the declared type's range.
    IntOutOfRange { value: i64, ty: &'static str },

    /// An enum-typed constant naming a value the enum does not define.
    UndefinedEnumValue { enum_name: String, value: i64 },

    /// A struct literal key naming no field of the struct.
    UnknownStructField { struct_name: String, field: String },

    /// `extends` naming something other than a service.
    ExtendsNonService { name: String, kind: &'static str },

    /// An extends chain that loops back on itself.
    CircularExtends { name: String },

    /// A `oneway` function with a return type or a throws clause.
    OnewayViolation { function: String },

    /// A field without an explicit `required`/`optional` qualifier.
    MissingRequiredness { field: String },

    /// A field id outside `1..=32767`.
    FieldIdOutOfRange { id: i64 },
}

impl ResolveErrorKind {
    /// Get the error code for this kind.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnresolvedName { .. }
            | Self::UnknownIncludeAlias { .. }
            | Self::NotAType { .. } => ErrorCode::E2001,
            Self::CircularTypedef { .. } => ErrorCode::E2003,
            Self::DuplicateFieldId { .. } => ErrorCode::E2004,
            Self::EnumValueOutOfRange { .. } => ErrorCode::E2005,
            Self::DuplicateName { .. } => ErrorCode::E2006,
            Self::LiteralTypeMismatch { .. }
            | Self::IntOutOfRange { .. }
            | Self::UndefinedEnumValue { .. }
            | Self::UnknownStructField { .. } => ErrorCode::E2007,
            Self::ExtendsNonService { .. } | Self::CircularExtends { .. } => ErrorCode::E2008,
            Self::OnewayViolation { .. } => ErrorCode::E2009,
            Self::MissingRequiredness { .. } => ErrorCode::E2011,
            Self::FieldIdOutOfRange { .. } => ErrorCode::E2012,
        }
    }

    /// Generate the primary error message.
    pub fn message(&self) -> String {
        match self {
            Self::UnresolvedName { name } => format!("cannot find `{name}` in this document"),
            Self::UnknownIncludeAlias { alias } => {
                format!("no include provides the alias `{alias}`")
            }
            Self::NotAType { name, kind } => format!("`{name}` is a {kind}, not a type"),
            Self::CircularTypedef { name } => {
                format!("typedef `{name}` is part of an alias cycle")
            }
            Self::DuplicateFieldId { id, previous } => {
                format!("field id {id} is already used by field `{previous}`")
            }
            Self::EnumValueOutOfRange { name, value } => {
                format!("enum constant `{name}` has value {value}, outside 0..=2147483647")
            }
            Self::DuplicateName { name, kind } => format!("duplicate {kind} name `{name}`"),
            Self::LiteralTypeMismatch { expected, found } => {
                format!("expected a value of type `{expected}`, found a {found}")
            }
            Self::IntOutOfRange { value, ty } => {
                format!("value {value} does not fit in `{ty}`")
            }
            Self::UndefinedEnumValue { enum_name, value } => {
                format!("enum `{enum_name}` has no constant with value {value}")
            }
            Self::UnknownStructField { struct_name, field } => {
                format!("struct `{struct_name}` has no field named `{field}`")
            }
            Self::ExtendsNonService { name, kind } => {
                format!("`{name}` is a {kind}; services can only extend services")
            }
            Self::CircularExtends { name } => {
                format!("service `{name}` extends itself, directly or through other services")
            }
            Self::OnewayViolation { function } => {
                format!("oneway function `{function}` must return void and cannot declare throws")
            }
            Self::MissingRequiredness { field } => {
                format!("field `{field}` must be declared `required` or `optional`")
            }
            Self::FieldIdOutOfRange { id } => format!("field id {id} is outside 1..=32767"),
        }
    }
}

/// A resolution error with its source location and an optional
/// secondary location (the first of a conflicting pair).
#[derive(Clone, Debug)]
pub struct ResolveError {
    pub kind: ResolveErrorKind,
    pub span: Span,
    pub secondary: Option<(Span, &'static str)>,
}

impl ResolveError {
    pub fn new(kind: ResolveErrorKind, span: Span) -> Self {
        ResolveError {
            kind,
            span,
            secondary: None,
        }
    }

    #[must_use]
    pub fn with_secondary(mut self, span: Span, message: &'static str) -> Self {
        self.secondary = Some((span, message));
        self
    }

    /// Convert into a diagnostic record.
    pub fn into_diagnostic(self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.kind.error_code())
            .with_message(self.kind.message())
            .with_label(self.span, "here");
        if let Some((span, message)) = self.secondary {
            diag = diag.with_secondary_label(span, message);
        }
        match &self.kind {
            ResolveErrorKind::MissingRequiredness { .. } => {
                diag = diag.with_note("write `required` or `optional` before the field type");
            }
            ResolveErrorKind::FieldIdOutOfRange { .. } => {
                diag = diag.with_note("field ids must fit in a positive 16-bit integer");
            }
            _ => {}
        }
        diag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let kind = ResolveErrorKind::UnresolvedName {
            name: "Missing".to_string(),
        };
        assert_eq!(kind.error_code(), ErrorCode::E2001);

        let kind = ResolveErrorKind::FieldIdOutOfRange { id: 40000 };
        assert_eq!(kind.error_code(), ErrorCode::E2012);
        assert!(kind.message().contains("40000"));
    }

    #[test]
    fn test_secondary_label() {
        let err = ResolveError::new(
            ResolveErrorKind::DuplicateName {
                name: "User".to_string(),
                kind: "struct",
            },
            Span::new(20, 24),
        )
        .with_secondary(Span::new(2, 6), "first defined here");
        let diag = err.into_diagnostic();
        assert_eq!(diag.labels.len(), 2);
        assert_eq!(diag.primary_span(), Some(Span::new(20, 24)));
    }
}
