//! Unresolved AST produced by the parser.
//!
//! AST nodes live only while one document is being compiled; the resolver
//! consumes them and produces the immutable IR in [`crate::ir`].

use crate::Span;

/// An identifier with its source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Ident {
    pub text: String,
    pub span: Span,
}

impl Ident {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Ident {
            text: text.into(),
            span,
        }
    }
}

/// One parsed document, prior to resolution.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub includes: Vec<Include>,
    pub namespaces: Vec<Namespace>,
    pub definitions: Vec<Definition>,
}

/// `include "other.tidl"` — a reference to another document.
///
/// The include alias used to qualify names is the path's file stem.
#[derive(Clone, Debug, PartialEq)]
pub struct Include {
    pub path: String,
    pub span: Span,
}

impl Include {
    /// The alias by which this include's names are qualified:
    /// the final path component without its extension.
    pub fn alias(&self) -> &str {
        let base = self
            .path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.path.as_str());
        base.split('.').next().unwrap_or(base)
    }
}

/// `namespace <scope> <value>` — an opaque per-target string, passed
/// through to codegen backends unmodified. Scope `*` applies to all targets.
#[derive(Clone, Debug, PartialEq)]
pub struct Namespace {
    pub scope: String,
    pub value: String,
    pub span: Span,
}

/// A top-level definition.
#[derive(Clone, Debug, PartialEq)]
pub enum Definition {
    Typedef(Typedef),
    Enum(EnumDef),
    Struct(StructDef),
    Const(ConstDef),
    Service(ServiceDef),
}

impl Definition {
    /// The defined name.
    pub fn name(&self) -> &Ident {
        match self {
            Definition::Typedef(d) => &d.name,
            Definition::Enum(d) => &d.name,
            Definition::Struct(d) => &d.name,
            Definition::Const(d) => &d.name,
            Definition::Service(d) => &d.name,
        }
    }

    /// What kind of definition this is, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Definition::Typedef(_) => "typedef",
            Definition::Enum(_) => "enum",
            Definition::Struct(d) => {
                if d.is_exception {
                    "exception"
                } else {
                    "struct"
                }
            }
            Definition::Const(_) => "const",
            Definition::Service(_) => "service",
        }
    }
}

/// `typedef <type> <name>`.
#[derive(Clone, Debug, PartialEq)]
pub struct Typedef {
    pub name: Ident,
    pub ty: TypeExpr,
}

/// The seven base types of the IDL.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BaseType {
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    String,
}

impl BaseType {
    pub fn name(self) -> &'static str {
        match self {
            BaseType::Bool => "bool",
            BaseType::Byte => "byte",
            BaseType::I16 => "i16",
            BaseType::I32 => "i32",
            BaseType::I64 => "i64",
            BaseType::Double => "double",
            BaseType::String => "string",
        }
    }
}

/// An unresolved type reference.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeExprKind {
    Base(BaseType),
    List(Box<TypeExpr>),
    Set(Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
    /// A named reference, optionally qualified by an include alias
    /// (`alias.Name`).
    Named {
        qualifier: Option<String>,
        name: String,
    },
}

/// Requiredness qualifier on a field.
///
/// The parser records a missing qualifier as `None` on the field; the
/// resolver reports that as an error rather than silently defaulting.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Requiredness {
    Required,
    Optional,
}

/// One field of a struct, exception, argument list, or throws list.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub id: i64,
    pub id_span: Span,
    pub requiredness: Option<Requiredness>,
    pub ty: TypeExpr,
    pub name: Ident,
    pub default: Option<ConstExpr>,
    pub span: Span,
}

/// `enum <name> { ... }`.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumDef {
    pub name: Ident,
    pub variants: Vec<EnumVariant>,
}

/// One enum constant; `value` is `None` for implicitly numbered constants.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumVariant {
    pub name: Ident,
    pub value: Option<i64>,
    pub value_span: Span,
}

/// `struct`/`exception` definition. Also used by the parser for argument
/// and throws lists, which share the field grammar.
#[derive(Clone, Debug, PartialEq)]
pub struct StructDef {
    pub name: Ident,
    pub is_exception: bool,
    pub fields: Vec<Field>,
}

/// `const <type> <name> = <value>`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstDef {
    pub name: Ident,
    pub ty: TypeExpr,
    pub value: ConstExpr,
}

/// An unresolved constant or default literal.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstExpr {
    pub kind: ConstExprKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConstExprKind {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<ConstExpr>),
    /// Brace literal: a map literal, or a struct literal whose keys are
    /// string field names. Which one is decided by the resolver against
    /// the declared type.
    Map(Vec<(ConstExpr, ConstExpr)>),
}

impl ConstExprKind {
    /// Short description of the literal's shape, for error messages.
    pub fn shape_name(&self) -> &'static str {
        match self {
            ConstExprKind::Bool(_) => "bool literal",
            ConstExprKind::Int(_) => "integer literal",
            ConstExprKind::Float(_) => "float literal",
            ConstExprKind::String(_) => "string literal",
            ConstExprKind::List(_) => "list literal",
            ConstExprKind::Map(_) => "map literal",
        }
    }
}

/// `service <name> [extends <ref>] { ... }`.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceDef {
    pub name: Ident,
    pub extends: Option<QualifiedName>,
    pub functions: Vec<Function>,
}

/// A possibly include-qualified name reference.
#[derive(Clone, Debug, PartialEq)]
pub struct QualifiedName {
    pub qualifier: Option<String>,
    pub name: String,
    pub span: Span,
}

/// One service function.
///
/// `throws` is `Some` whenever a throws clause was written, even an empty
/// one, so the resolver can reject `oneway` functions that declare it.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: Ident,
    pub oneway: bool,
    /// `None` means `void`.
    pub return_ty: Option<TypeExpr>,
    pub args: Vec<Field>,
    pub throws: Option<Vec<Field>>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_alias() {
        let inc = Include {
            path: "shared/base.tidl".to_string(),
            span: Span::DUMMY,
        };
        assert_eq!(inc.alias(), "base");

        let inc = Include {
            path: "base".to_string(),
            span: Span::DUMMY,
        };
        assert_eq!(inc.alias(), "base");
    }

    #[test]
    fn test_definition_kind_name() {
        let def = Definition::Struct(StructDef {
            name: Ident::new("Err", Span::DUMMY),
            is_exception: true,
            fields: Vec::new(),
        });
        assert_eq!(def.kind_name(), "exception");
        assert_eq!(def.name().text, "Err");
    }
}
