//! Type resolution.
//!
//! Turns unresolved [`ast::TypeExpr`]s into [`ir::Type`]s. The document
//! under resolution is not yet part of the program, so every definition
//! accessor here falls back to the in-progress document for local ids.

use tidl_ir::ast;
use tidl_ir::ir::{self, DefId, NamedDef, NamedRef, Type};
use tidl_ir::Span;

use crate::error::{ResolveError, ResolveErrorKind};
use crate::Resolver;

impl Resolver<'_> {
    /// Resolve a type expression.
    pub(crate) fn resolve_type(&self, ty: &ast::TypeExpr) -> Result<Type, ResolveError> {
        match &ty.kind {
            ast::TypeExprKind::Base(base) => Ok(Type::Base(*base)),
            ast::TypeExprKind::List(elem) => {
                Ok(Type::List(Box::new(self.resolve_type(elem)?)))
            }
            ast::TypeExprKind::Set(elem) => Ok(Type::Set(Box::new(self.resolve_type(elem)?))),
            ast::TypeExprKind::Map(key, value) => Ok(Type::Map(
                Box::new(self.resolve_type(key)?),
                Box::new(self.resolve_type(value)?),
            )),
            ast::TypeExprKind::Named { qualifier, name } => {
                self.resolve_named(qualifier.as_deref(), name, ty.span)
            }
        }
    }

    /// Resolve a (possibly include-qualified) name to a type.
    fn resolve_named(
        &self,
        qualifier: Option<&str>,
        name: &str,
        span: Span,
    ) -> Result<Type, ResolveError> {
        let (doc, entry) = self.lookup_name(qualifier, name, span)?;

        let named = match entry {
            NamedDef::Typedef(index) => NamedRef::Typedef(DefId { doc, index }),
            NamedDef::Struct(index) => NamedRef::Struct(DefId { doc, index }),
            NamedDef::Enum(index) => NamedRef::Enum(DefId { doc, index }),
            NamedDef::Service(_) => {
                return Err(ResolveError::new(
                    ResolveErrorKind::NotAType {
                        name: name.to_string(),
                        kind: "service",
                    },
                    span,
                ));
            }
            NamedDef::Const(_) => {
                return Err(ResolveError::new(
                    ResolveErrorKind::NotAType {
                        name: name.to_string(),
                        kind: "constant",
                    },
                    span,
                ));
            }
        };
        Ok(Type::Named(named))
    }

    /// Look up a name in the current document, or in an included one when
    /// qualified. Unqualified names never search includes.
    pub(crate) fn lookup_name(
        &self,
        qualifier: Option<&str>,
        name: &str,
        span: Span,
    ) -> Result<(ir::DocId, NamedDef), ResolveError> {
        match qualifier {
            Some(alias) => {
                let doc = self.out.include_by_alias(alias).ok_or_else(|| {
                    ResolveError::new(
                        ResolveErrorKind::UnknownIncludeAlias {
                            alias: alias.to_string(),
                        },
                        span,
                    )
                })?;
                let entry = self.program.document(doc).lookup(name).ok_or_else(|| {
                    ResolveError::new(
                        ResolveErrorKind::UnresolvedName {
                            name: format!("{alias}.{name}"),
                        },
                        span,
                    )
                })?;
                Ok((doc, entry))
            }
            None => {
                let (entry, _) = self.names.get(name).ok_or_else(|| {
                    ResolveError::new(
                        ResolveErrorKind::UnresolvedName {
                            name: name.to_string(),
                        },
                        span,
                    )
                })?;
                Ok((self.doc_id, *entry))
            }
        }
    }

    /// Chase typedef aliases to the underlying type.
    ///
    /// Cyclic typedefs were already replaced with a placeholder body, so
    /// chasing terminates.
    pub(crate) fn canonical<'t>(&'t self, mut ty: &'t Type) -> &'t Type {
        while let Type::Named(NamedRef::Typedef(id)) = ty {
            ty = &self.typedef_at(*id).ty;
        }
        ty
    }

    pub(crate) fn typedef_at(&self, id: DefId) -> &ir::Typedef {
        if id.doc == self.doc_id {
            &self.out.typedefs[id.index as usize]
        } else {
            self.program.typedef(id)
        }
    }

    pub(crate) fn struct_at(&self, id: DefId) -> &ir::Struct {
        if id.doc == self.doc_id {
            &self.out.structs[id.index as usize]
        } else {
            self.program.struct_def(id)
        }
    }

    pub(crate) fn enum_at(&self, id: DefId) -> &ir::Enum {
        if id.doc == self.doc_id {
            &self.out.enums[id.index as usize]
        } else {
            self.program.enum_def(id)
        }
    }

    /// Render a resolved type for error messages.
    pub(crate) fn display_type(&self, ty: &Type) -> String {
        match ty {
            Type::Base(base) => base.name().to_string(),
            Type::List(elem) => format!("list<{}>", self.display_type(elem)),
            Type::Set(elem) => format!("set<{}>", self.display_type(elem)),
            Type::Map(key, value) => {
                format!(
                    "map<{}, {}>",
                    self.display_type(key),
                    self.display_type(value)
                )
            }
            Type::Named(NamedRef::Typedef(id)) => self.typedef_at(*id).name.clone(),
            Type::Named(NamedRef::Struct(id)) => self.struct_at(*id).name.clone(),
            Type::Named(NamedRef::Enum(id)) => self.enum_at(*id).name.clone(),
        }
    }
}
