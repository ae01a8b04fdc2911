//! Grammar productions.
//!
//! Headers, definitions, types, fields, constant literals, and services.
//! Productions return `Err` for malformed input without consuming past
//! the offending token; recovery is handled by the caller (the top-level
//! loop for definitions, the field-list loop for fields and functions).

use tidl_ir::ast::{
    BaseType, ConstDef, ConstExpr, ConstExprKind, EnumDef, EnumVariant, Field, Function, Include,
    Namespace, QualifiedName, Requiredness, ServiceDef, StructDef, TypeExpr, TypeExprKind, Typedef,
};
use tidl_ir::{Span, TokenKind};

use crate::error::{ParseError, ParseErrorKind};
use crate::Parser;

impl Parser<'_> {
    // ---- Headers ----

    /// `include "<path>"`
    pub(crate) fn parse_include(&mut self) -> Result<Include, ParseError> {
        let start = self.cursor.advance().span;
        let (path, path_span) = self.expect_string("an include path")?;
        Ok(Include {
            path,
            span: start.merge(path_span),
        })
    }

    /// `namespace <scope> <dotted.value>`
    pub(crate) fn parse_namespace(&mut self) -> Result<Namespace, ParseError> {
        let start = self.cursor.advance().span;

        let scope = if self.cursor.eat(&TokenKind::Star) {
            "*".to_string()
        } else {
            self.cursor.expect_ident("a namespace scope")?.text
        };

        let mut value = self.cursor.expect_ident("a namespace value")?.text;
        while self.cursor.eat(&TokenKind::Dot) {
            value.push('.');
            value.push_str(&self.cursor.expect_ident("a namespace value")?.text);
        }

        Ok(Namespace {
            scope,
            value,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    // ---- Definitions ----

    /// `typedef <type> <name>`
    pub(crate) fn parse_typedef(&mut self) -> Result<Typedef, ParseError> {
        self.cursor.advance();
        let ty = self.parse_type()?;
        let name = self.cursor.expect_ident("a typedef name")?;
        Ok(Typedef { name, ty })
    }

    /// `enum <name> { <variant> [= <int>], ... }`
    pub(crate) fn parse_enum(&mut self) -> Result<EnumDef, ParseError> {
        self.cursor.advance();
        let name = self.cursor.expect_ident("an enum name")?;
        self.cursor.expect(&TokenKind::LBrace, "`{`")?;

        let mut variants = Vec::new();
        loop {
            self.eat_separators();
            if self.cursor.check(&TokenKind::RBrace) || self.cursor.is_at_end() {
                break;
            }
            let name = self.cursor.expect_ident("an enum constant name")?;
            let (value, value_span) = if self.cursor.eat(&TokenKind::Eq) {
                let (value, span) = self.parse_int_literal("an integer")?;
                (Some(value), span)
            } else {
                (None, name.span)
            };
            variants.push(EnumVariant {
                name,
                value,
                value_span,
            });
        }

        self.cursor.expect(&TokenKind::RBrace, "`}`")?;
        Ok(EnumDef { name, variants })
    }

    /// `struct <name> { <fields> }` or `exception <name> { <fields> }`
    pub(crate) fn parse_struct(&mut self, is_exception: bool) -> Result<StructDef, ParseError> {
        self.cursor.advance();
        let context = if is_exception {
            "an exception name"
        } else {
            "a struct name"
        };
        let name = self.cursor.expect_ident(context)?;
        self.cursor.expect(&TokenKind::LBrace, "`{`")?;
        let fields = self.parse_field_list(&TokenKind::RBrace);
        self.cursor.expect(&TokenKind::RBrace, "`}`")?;
        Ok(StructDef {
            name,
            is_exception,
            fields,
        })
    }

    /// `const <type> <name> = <value>`
    pub(crate) fn parse_const(&mut self) -> Result<ConstDef, ParseError> {
        self.cursor.advance();
        let ty = self.parse_type()?;
        let name = self.cursor.expect_ident("a constant name")?;
        self.cursor.expect(&TokenKind::Eq, "`=`")?;
        let value = self.parse_const_value()?;
        Ok(ConstDef { name, ty, value })
    }

    /// `service <name> [extends <ref>] { <functions> }`
    pub(crate) fn parse_service(&mut self) -> Result<ServiceDef, ParseError> {
        self.cursor.advance();
        let name = self.cursor.expect_ident("a service name")?;

        let extends = if self.cursor.eat(&TokenKind::Extends) {
            Some(self.parse_qualified_name("a service name to extend")?)
        } else {
            None
        };

        self.cursor.expect(&TokenKind::LBrace, "`{`")?;

        let mut functions = Vec::new();
        loop {
            self.eat_separators();
            if self.cursor.check(&TokenKind::RBrace) || self.cursor.is_at_end() {
                break;
            }
            match self.parse_function() {
                Ok(function) => functions.push(function),
                Err(err) => {
                    self.diagnostics.emit(err.into_diagnostic());
                    self.recover_function();
                }
            }
        }

        self.cursor.expect(&TokenKind::RBrace, "`}`")?;
        Ok(ServiceDef {
            name,
            extends,
            functions,
        })
    }

    /// `[oneway] <type-or-void> <name> ( <args> ) [throws ( <fields> )]`
    fn parse_function(&mut self) -> Result<Function, ParseError> {
        let start = self.cursor.current_span();

        let oneway = self.cursor.eat(&TokenKind::Oneway);
        let return_ty = if self.cursor.eat(&TokenKind::Void) {
            None
        } else {
            Some(self.parse_type()?)
        };
        let name = self.cursor.expect_ident("a function name")?;

        self.cursor.expect(&TokenKind::LParen, "`(`")?;
        let args = self.parse_field_list(&TokenKind::RParen);
        self.cursor.expect(&TokenKind::RParen, "`)`")?;

        let throws = if self.cursor.eat(&TokenKind::Throws) {
            self.cursor.expect(&TokenKind::LParen, "`(`")?;
            let fields = self.parse_field_list(&TokenKind::RParen);
            self.cursor.expect(&TokenKind::RParen, "`)`")?;
            Some(fields)
        } else {
            None
        };

        Ok(Function {
            name,
            oneway,
            return_ty,
            args,
            throws,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    // ---- Fields ----

    /// A `{`- or `(`-delimited field list; stops before `close`.
    ///
    /// Malformed fields are reported and skipped so the remaining fields
    /// in the same body still parse.
    fn parse_field_list(&mut self, close: &TokenKind) -> Vec<Field> {
        let mut fields = Vec::new();
        loop {
            self.eat_separators();
            // A closing delimiter that doesn't match `close` means the list
            // is unterminated; stop and let the caller report it.
            if self.cursor.check(close)
                || self.cursor.check(&TokenKind::RBrace)
                || self.cursor.check(&TokenKind::RParen)
                || self.cursor.is_at_end()
            {
                break;
            }

            match self.cursor.current_kind() {
                kind @ (TokenKind::Struct | TokenKind::Enum | TokenKind::Exception) => {
                    let err = ParseError::new(
                        ParseErrorKind::NestedDefinition {
                            keyword: kind.display_name(),
                        },
                        self.cursor.current_span(),
                    );
                    self.diagnostics.emit(err.into_diagnostic());
                    self.skip_nested_definition();
                }
                _ => match self.parse_field() {
                    Ok(field) => fields.push(field),
                    Err(err) => {
                        self.diagnostics.emit(err.into_diagnostic());
                        self.recover_field(close);
                    }
                },
            }
        }
        fields
    }

    /// `<id> : [required|optional] <type> <name> [= <value>]`
    fn parse_field(&mut self) -> Result<Field, ParseError> {
        if !matches!(
            self.cursor.current_kind(),
            TokenKind::Int(_) | TokenKind::Minus
        ) {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedFieldId {
                    found: self.cursor.current_kind().clone(),
                },
                self.cursor.current_span(),
            ));
        }
        let (id, id_span) = self.parse_int_literal("an integer")?;
        self.cursor.expect(&TokenKind::Colon, "`:`")?;

        let requiredness = if self.cursor.eat(&TokenKind::Required) {
            Some(Requiredness::Required)
        } else if self.cursor.eat(&TokenKind::Optional) {
            Some(Requiredness::Optional)
        } else {
            None
        };

        let ty = self.parse_type()?;
        let name = self.cursor.expect_ident("a field name")?;

        let default = if self.cursor.eat(&TokenKind::Eq) {
            Some(self.parse_const_value()?)
        } else {
            None
        };

        Ok(Field {
            id,
            id_span,
            requiredness,
            ty,
            name,
            default,
            span: id_span.merge(self.cursor.previous_span()),
        })
    }

    // ---- Types ----

    /// A type expression: a base type, container, or (qualified) name.
    fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        let start = self.cursor.current_span();

        let base = match self.cursor.current_kind() {
            TokenKind::Bool => Some(BaseType::Bool),
            TokenKind::Byte => Some(BaseType::Byte),
            TokenKind::I16 => Some(BaseType::I16),
            TokenKind::I32 => Some(BaseType::I32),
            TokenKind::I64 => Some(BaseType::I64),
            TokenKind::Double => Some(BaseType::Double),
            TokenKind::StringTy => Some(BaseType::String),
            _ => None,
        };
        if let Some(base) = base {
            let span = self.cursor.advance().span;
            return Ok(TypeExpr {
                kind: TypeExprKind::Base(base),
                span,
            });
        }

        let kind = match self.cursor.current_kind() {
            TokenKind::List => {
                self.cursor.advance();
                self.cursor.expect(&TokenKind::Lt, "`<`")?;
                let elem = self.parse_type()?;
                self.cursor.expect(&TokenKind::Gt, "`>`")?;
                TypeExprKind::List(Box::new(elem))
            }
            TokenKind::Set => {
                self.cursor.advance();
                self.cursor.expect(&TokenKind::Lt, "`<`")?;
                let elem = self.parse_type()?;
                self.cursor.expect(&TokenKind::Gt, "`>`")?;
                TypeExprKind::Set(Box::new(elem))
            }
            TokenKind::Map => {
                self.cursor.advance();
                self.cursor.expect(&TokenKind::Lt, "`<`")?;
                let key = self.parse_type()?;
                self.cursor.expect(&TokenKind::Comma, "`,`")?;
                let value = self.parse_type()?;
                self.cursor.expect(&TokenKind::Gt, "`>`")?;
                TypeExprKind::Map(Box::new(key), Box::new(value))
            }
            TokenKind::Ident(_) => {
                let name = self.parse_qualified_name("a type name")?;
                TypeExprKind::Named {
                    qualifier: name.qualifier,
                    name: name.name,
                }
            }
            found => {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedType {
                        found: found.clone(),
                    },
                    self.cursor.current_span(),
                ));
            }
        };

        Ok(TypeExpr {
            kind,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    /// `<name>` or `<alias>.<name>`.
    fn parse_qualified_name(&mut self, context: &'static str) -> Result<QualifiedName, ParseError> {
        let first = self.cursor.expect_ident(context)?;
        if self.cursor.eat(&TokenKind::Dot) {
            let second = self.cursor.expect_ident(context)?;
            Ok(QualifiedName {
                qualifier: Some(first.text),
                name: second.text,
                span: first.span.merge(second.span),
            })
        } else {
            Ok(QualifiedName {
                qualifier: None,
                name: first.text,
                span: first.span,
            })
        }
    }

    // ---- Constant values ----

    /// A constant literal: scalar, `[...]` list, or `{...}` map/struct.
    fn parse_const_value(&mut self) -> Result<ConstExpr, ParseError> {
        let start = self.cursor.current_span();

        let kind = match self.cursor.current_kind() {
            TokenKind::True => {
                self.cursor.advance();
                ConstExprKind::Bool(true)
            }
            TokenKind::False => {
                self.cursor.advance();
                ConstExprKind::Bool(false)
            }
            TokenKind::Int(value) => {
                let value = *value;
                self.cursor.advance();
                ConstExprKind::Int(value)
            }
            TokenKind::Float(value) => {
                let value = *value;
                self.cursor.advance();
                ConstExprKind::Float(value)
            }
            TokenKind::Str(value) => {
                let value = value.clone();
                self.cursor.advance();
                ConstExprKind::String(value)
            }
            TokenKind::Minus => {
                self.cursor.advance();
                match self.cursor.current_kind() {
                    TokenKind::Int(value) => {
                        let value = *value;
                        self.cursor.advance();
                        ConstExprKind::Int(-value)
                    }
                    TokenKind::Float(value) => {
                        let value = *value;
                        self.cursor.advance();
                        ConstExprKind::Float(-value)
                    }
                    found => {
                        return Err(ParseError::new(
                            ParseErrorKind::ExpectedLiteral {
                                found: found.clone(),
                            },
                            self.cursor.current_span(),
                        ));
                    }
                }
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let mut items = Vec::new();
                loop {
                    self.eat_separators();
                    if self.cursor.check(&TokenKind::RBracket) || self.cursor.is_at_end() {
                        break;
                    }
                    items.push(self.parse_const_value()?);
                }
                self.cursor.expect(&TokenKind::RBracket, "`]`")?;
                ConstExprKind::List(items)
            }
            TokenKind::LBrace => {
                self.cursor.advance();
                let mut entries = Vec::new();
                loop {
                    self.eat_separators();
                    if self.cursor.check(&TokenKind::RBrace) || self.cursor.is_at_end() {
                        break;
                    }
                    let key = self.parse_const_value()?;
                    self.cursor.expect(&TokenKind::Colon, "`:`")?;
                    let value = self.parse_const_value()?;
                    entries.push((key, value));
                }
                self.cursor.expect(&TokenKind::RBrace, "`}`")?;
                ConstExprKind::Map(entries)
            }
            found => {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedLiteral {
                        found: found.clone(),
                    },
                    self.cursor.current_span(),
                ));
            }
        };

        Ok(ConstExpr {
            kind,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    // ---- Shared helpers ----

    /// An integer, optionally negated. Accepts decimal and hex literals;
    /// the lexer has already folded hex into `Int`.
    fn parse_int_literal(&mut self, expected: &'static str) -> Result<(i64, Span), ParseError> {
        let start = self.cursor.current_span();
        let negative = self.cursor.eat(&TokenKind::Minus);
        if let TokenKind::Int(value) = self.cursor.current_kind() {
            let value = *value;
            let span = start.merge(self.cursor.advance().span);
            Ok((if negative { -value } else { value }, span))
        } else {
            Err(ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    found: self.cursor.current_kind().clone(),
                    expected,
                },
                self.cursor.current_span(),
            ))
        }
    }

    fn expect_string(&mut self, expected: &'static str) -> Result<(String, Span), ParseError> {
        if let TokenKind::Str(value) = self.cursor.current_kind() {
            let value = value.clone();
            let span = self.cursor.advance().span;
            Ok((value, span))
        } else {
            Err(ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    found: self.cursor.current_kind().clone(),
                    expected,
                },
                self.cursor.current_span(),
            ))
        }
    }

    // ---- Recovery ----

    /// Skip a definition that appeared inside a body: the keyword, its
    /// name, and its brace-delimited block if one follows.
    fn skip_nested_definition(&mut self) {
        self.cursor.advance();
        if self.cursor.check_ident() {
            self.cursor.advance();
        }
        if self.cursor.check(&TokenKind::LBrace) {
            self.skip_balanced_braces();
        }
    }

    /// Skip a `{`-delimited block, honoring nesting. Current token must
    /// be `{`.
    fn skip_balanced_braces(&mut self) {
        let mut depth = 0usize;
        while !self.cursor.is_at_end() {
            match self.cursor.current_kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.cursor.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.cursor.advance();
        }
    }

    /// After a malformed field, skip to the next plausible field start,
    /// a separator, or the closing delimiter.
    fn recover_field(&mut self, close: &TokenKind) {
        while !self.cursor.is_at_end() {
            match self.cursor.current_kind() {
                TokenKind::Comma | TokenKind::Semicolon => {
                    self.cursor.advance();
                    return;
                }
                TokenKind::Int(_)
                | TokenKind::Minus
                | TokenKind::Struct
                | TokenKind::Enum
                | TokenKind::Exception
                | TokenKind::RBrace => return,
                kind if kind == close => return,
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// After a malformed function, skip to the next statement separator
    /// at the top level of the service body.
    fn recover_function(&mut self) {
        let mut paren_depth = 0usize;
        while !self.cursor.is_at_end() {
            match self.cursor.current_kind() {
                TokenKind::LParen => paren_depth += 1,
                TokenKind::RParen => paren_depth = paren_depth.saturating_sub(1),
                TokenKind::Comma | TokenKind::Semicolon if paren_depth == 0 => {
                    self.cursor.advance();
                    return;
                }
                TokenKind::RBrace if paren_depth == 0 => return,
                _ => {}
            }
            self.cursor.advance();
        }
    }
}
