//! Constant literal lowering.
//!
//! Checks a parsed literal against its declared type and produces the
//! typed [`ConstValue`] stored in the IR. Integer literals narrow to the
//! declared width with an explicit range check; integers promote to
//! `double`. A brace literal is a map or a struct value depending on the
//! declared type, with struct keys given as field-name strings.

use tidl_ir::ast::{ConstExpr, ConstExprKind};
use tidl_ir::ir::{BaseType, ConstValue, DefId, NamedRef, Type};
use tidl_ir::Span;

use crate::error::{ResolveError, ResolveErrorKind};
use crate::Resolver;

impl Resolver<'_> {
    /// Lower a literal against its declared type.
    pub(crate) fn lower_const(
        &self,
        ty: &Type,
        expr: &ConstExpr,
    ) -> Result<ConstValue, ResolveError> {
        let canonical = self.canonical(ty);
        match (canonical, &expr.kind) {
            (Type::Base(BaseType::Bool), ConstExprKind::Bool(value)) => {
                Ok(ConstValue::Bool(*value))
            }
            (Type::Base(BaseType::Byte), ConstExprKind::Int(value)) => {
                narrow(*value, "byte", expr.span).map(ConstValue::Byte)
            }
            (Type::Base(BaseType::I16), ConstExprKind::Int(value)) => {
                narrow(*value, "i16", expr.span).map(ConstValue::I16)
            }
            (Type::Base(BaseType::I32), ConstExprKind::Int(value)) => {
                narrow(*value, "i32", expr.span).map(ConstValue::I32)
            }
            (Type::Base(BaseType::I64), ConstExprKind::Int(value)) => Ok(ConstValue::I64(*value)),
            (Type::Base(BaseType::Double), ConstExprKind::Float(value)) => {
                Ok(ConstValue::Double(*value))
            }
            // Integers promote to double.
            (Type::Base(BaseType::Double), ConstExprKind::Int(value)) => {
                Ok(ConstValue::Double(*value as f64))
            }
            (Type::Base(BaseType::String), ConstExprKind::String(value)) => {
                Ok(ConstValue::String(value.clone()))
            }
            (Type::List(elem), ConstExprKind::List(items)) => items
                .iter()
                .map(|item| self.lower_const(elem, item))
                .collect::<Result<Vec<_>, _>>()
                .map(ConstValue::List),
            (Type::Set(elem), ConstExprKind::List(items)) => items
                .iter()
                .map(|item| self.lower_const(elem, item))
                .collect::<Result<Vec<_>, _>>()
                .map(ConstValue::Set),
            (Type::Map(key_ty, value_ty), ConstExprKind::Map(entries)) => entries
                .iter()
                .map(|(key, value)| {
                    Ok((
                        self.lower_const(key_ty, key)?,
                        self.lower_const(value_ty, value)?,
                    ))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ConstValue::Map),
            (Type::Named(NamedRef::Enum(id)), ConstExprKind::Int(value)) => {
                self.lower_enum_value(*id, *value, expr.span)
            }
            (Type::Named(NamedRef::Struct(id)), ConstExprKind::Map(entries)) => {
                self.lower_struct_literal(*id, entries)
            }
            (expected, found) => Err(ResolveError::new(
                ResolveErrorKind::LiteralTypeMismatch {
                    expected: self.display_type(expected),
                    found: found.shape_name(),
                },
                expr.span,
            )),
        }
    }

    /// An enum-typed value must be one of the enum's defined constants.
    fn lower_enum_value(
        &self,
        id: DefId,
        value: i64,
        span: Span,
    ) -> Result<ConstValue, ResolveError> {
        let def = self.enum_at(id);
        let Ok(value) = i32::try_from(value) else {
            return Err(ResolveError::new(
                ResolveErrorKind::UndefinedEnumValue {
                    enum_name: def.name.clone(),
                    value,
                },
                span,
            ));
        };
        if def.contains_value(value) {
            Ok(ConstValue::I32(value))
        } else {
            Err(ResolveError::new(
                ResolveErrorKind::UndefinedEnumValue {
                    enum_name: def.name.clone(),
                    value: i64::from(value),
                },
                span,
            ))
        }
    }

    /// Lower `{ "field": value, ... }` against a struct definition.
    ///
    /// Fields may be omitted; presence is only enforced at encode time.
    /// The result is keyed by field id, sorted ascending.
    fn lower_struct_literal(
        &self,
        id: DefId,
        entries: &[(ConstExpr, ConstExpr)],
    ) -> Result<ConstValue, ResolveError> {
        let def = self.struct_at(id);
        let mut values: Vec<(i16, ConstValue)> = Vec::with_capacity(entries.len());

        for (key, value) in entries {
            let ConstExprKind::String(field_name) = &key.kind else {
                return Err(ResolveError::new(
                    ResolveErrorKind::LiteralTypeMismatch {
                        expected: format!("a field name of struct `{}`", def.name),
                        found: key.kind.shape_name(),
                    },
                    key.span,
                ));
            };
            let Some(field) = def.field_by_name(field_name) else {
                return Err(ResolveError::new(
                    ResolveErrorKind::UnknownStructField {
                        struct_name: def.name.clone(),
                        field: field_name.clone(),
                    },
                    key.span,
                ));
            };
            if values.iter().any(|(fid, _)| *fid == field.id) {
                return Err(ResolveError::new(
                    ResolveErrorKind::DuplicateName {
                        name: field_name.clone(),
                        kind: "struct literal key",
                    },
                    key.span,
                ));
            }
            values.push((field.id, self.lower_const(&field.ty, value)?));
        }

        values.sort_by_key(|(fid, _)| *fid);
        Ok(ConstValue::Struct(values))
    }
}

/// Narrow an i64 literal to a smaller integer width.
fn narrow<T: TryFrom<i64>>(
    value: i64,
    ty: &'static str,
    span: Span,
) -> Result<T, ResolveError> {
    T::try_from(value).map_err(|_| {
        ResolveError::new(ResolveErrorKind::IntOutOfRange { value, ty }, span)
    })
}
