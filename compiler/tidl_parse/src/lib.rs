//! Recursive descent parser for tidl.
//!
//! Consumes the lexed token stream and produces an unresolved AST
//! [`Document`]. Parsing does not stop at the first error: a malformed
//! top-level definition records a diagnostic and the parser discards
//! tokens until the next top-level keyword, so a single pass reports
//! every syntax error in a document.

mod cursor;
mod error;
mod grammar;

pub use cursor::Cursor;
pub use error::{ParseError, ParseErrorKind};

use tidl_diagnostic::Diagnostics;
use tidl_ir::{ast, Token, TokenKind};

/// Parse a token stream into a document AST.
///
/// Syntax errors are recorded in `diagnostics`; the returned AST contains
/// every definition that parsed cleanly.
pub fn parse_document(tokens: &[Token], diagnostics: &mut Diagnostics) -> ast::Document {
    Parser::new(tokens, diagnostics).run()
}

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Parser<'a> {
    /// Create a new parser.
    pub fn new(tokens: &'a [Token], diagnostics: &'a mut Diagnostics) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            diagnostics,
        }
    }

    /// Parse the whole document.
    fn run(mut self) -> ast::Document {
        let mut doc = ast::Document::default();

        while !self.cursor.is_at_end() {
            self.eat_separators();
            if self.cursor.is_at_end() {
                break;
            }

            let result = match self.cursor.current_kind() {
                TokenKind::Include => self.parse_include().map(|inc| doc.includes.push(inc)),
                TokenKind::Namespace => self.parse_namespace().map(|ns| doc.namespaces.push(ns)),
                TokenKind::Typedef => self
                    .parse_typedef()
                    .map(|d| doc.definitions.push(ast::Definition::Typedef(d))),
                TokenKind::Enum => self
                    .parse_enum()
                    .map(|d| doc.definitions.push(ast::Definition::Enum(d))),
                TokenKind::Struct => self
                    .parse_struct(false)
                    .map(|d| doc.definitions.push(ast::Definition::Struct(d))),
                TokenKind::Exception => self
                    .parse_struct(true)
                    .map(|d| doc.definitions.push(ast::Definition::Struct(d))),
                TokenKind::Const => self
                    .parse_const()
                    .map(|d| doc.definitions.push(ast::Definition::Const(d))),
                TokenKind::Service => self
                    .parse_service()
                    .map(|d| doc.definitions.push(ast::Definition::Service(d))),
                other => {
                    let err = ParseError::new(
                        ParseErrorKind::ExpectedDefinition {
                            found: other.clone(),
                        },
                        self.cursor.current_span(),
                    );
                    self.cursor.advance();
                    Err(err)
                }
            };

            if let Err(err) = result {
                self.diagnostics.emit(err.into_diagnostic());
                self.synchronize();
            }
        }

        doc
    }

    /// Consume optional statement terminators (`;` or `,`).
    fn eat_separators(&mut self) {
        while self.cursor.eat(&TokenKind::Semicolon) || self.cursor.eat(&TokenKind::Comma) {}
    }

    /// Discard tokens until the next top-level definition keyword.
    ///
    /// Every production consumes its leading keyword before it can fail,
    /// so stopping at a definition keyword cannot loop.
    fn synchronize(&mut self) {
        while !self.cursor.is_at_end() && !self.cursor.current_kind().starts_definition() {
            self.cursor.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tidl_diagnostic::ErrorCode;
    use tidl_ir::ast::{ConstExprKind, Definition, Requiredness, TypeExprKind};

    fn parse(source: &str) -> (ast::Document, Diagnostics) {
        let mut diags = Diagnostics::new();
        let tokens = tidl_lexer::lex(source, &mut diags);
        let doc = parse_document(&tokens, &mut diags);
        (doc, diags)
    }

    fn parse_ok(source: &str) -> ast::Document {
        let (doc, diags) = parse(source);
        assert!(!diags.has_errors(), "unexpected diagnostics: {diags:?}");
        doc
    }

    #[test]
    fn test_parse_headers() {
        let doc = parse_ok(
            r#"
            include "shared/base.tidl"
            namespace rust com.example.demo
            namespace * demo
            "#,
        );
        assert_eq!(doc.includes.len(), 1);
        assert_eq!(doc.includes[0].path, "shared/base.tidl");
        assert_eq!(doc.includes[0].alias(), "base");
        assert_eq!(doc.namespaces.len(), 2);
        assert_eq!(doc.namespaces[0].scope, "rust");
        assert_eq!(doc.namespaces[0].value, "com.example.demo");
        assert_eq!(doc.namespaces[1].scope, "*");
    }

    #[test]
    fn test_parse_typedef() {
        let doc = parse_ok("typedef map<string, list<i64>> Index");
        let Definition::Typedef(td) = &doc.definitions[0] else {
            panic!("expected typedef");
        };
        assert_eq!(td.name.text, "Index");
        assert!(matches!(td.ty.kind, TypeExprKind::Map(_, _)));
    }

    #[test]
    fn test_parse_enum() {
        let doc = parse_ok("enum E { A, B = 2, C = 0xa, D }");
        let Definition::Enum(e) = &doc.definitions[0] else {
            panic!("expected enum");
        };
        let values: Vec<_> = e.variants.iter().map(|v| v.value).collect();
        assert_eq!(values, vec![None, Some(2), Some(10), None]);
    }

    #[test]
    fn test_parse_struct_fields() {
        let doc = parse_ok(
            r#"
            struct User {
                1: required string name;
                2: optional i32 age = 30
                3: list<string> tags,
            }
            "#,
        );
        let Definition::Struct(s) = &doc.definitions[0] else {
            panic!("expected struct");
        };
        assert!(!s.is_exception);
        assert_eq!(s.fields.len(), 3);
        assert_eq!(s.fields[0].requiredness, Some(Requiredness::Required));
        assert_eq!(s.fields[1].requiredness, Some(Requiredness::Optional));
        assert_eq!(s.fields[2].requiredness, None);
        assert!(matches!(
            s.fields[1].default.as_ref().map(|d| &d.kind),
            Some(ConstExprKind::Int(30))
        ));
    }

    #[test]
    fn test_parse_exception() {
        let doc = parse_ok("exception NotFound { 1: required string message }");
        let Definition::Struct(s) = &doc.definitions[0] else {
            panic!("expected exception");
        };
        assert!(s.is_exception);
    }

    #[test]
    fn test_parse_const_composites() {
        let doc = parse_ok(
            r#"
            const map<string, i32> SCORES = { "a": 1, "b": -2 }
            const list<double> WEIGHTS = [1.5, 2.5]
            const bool ENABLED = true
            "#,
        );
        assert_eq!(doc.definitions.len(), 3);
        let Definition::Const(c) = &doc.definitions[0] else {
            panic!("expected const");
        };
        let ConstExprKind::Map(entries) = &c.value.kind else {
            panic!("expected map literal");
        };
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[1].1.kind, ConstExprKind::Int(-2)));
    }

    #[test]
    fn test_parse_service() {
        let doc = parse_ok(
            r#"
            service UserService extends base.Service {
                User get(1: required i64 id) throws (1: optional NotFound nf);
                oneway void ping();
            }
            "#,
        );
        let Definition::Service(s) = &doc.definitions[0] else {
            panic!("expected service");
        };
        let extends = s.extends.as_ref().map(|e| (e.qualifier.clone(), e.name.clone()));
        assert_eq!(
            extends,
            Some((Some("base".to_string()), "Service".to_string()))
        );
        assert_eq!(s.functions.len(), 2);

        let get = &s.functions[0];
        assert!(!get.oneway);
        assert!(get.return_ty.is_some());
        assert_eq!(get.args.len(), 1);
        assert_eq!(get.throws.as_ref().map(Vec::len), Some(1));

        let ping = &s.functions[1];
        assert!(ping.oneway);
        assert!(ping.return_ty.is_none());
        assert!(ping.throws.is_none());
    }

    #[test]
    fn test_batched_errors_report_all() {
        let (doc, diags) = parse(
            r#"
            typedef i32
            struct Good { 1: required i32 x }
            enum { A }
            struct AlsoGood { 1: optional string s }
            "#,
        );
        // Both malformed definitions reported, both good ones kept.
        assert_eq!(diags.len(), 2);
        assert_eq!(doc.definitions.len(), 2);
    }

    #[test]
    fn test_nested_struct_rejected() {
        let (doc, diags) = parse(
            r#"
            struct Outer {
                1: required i32 x
                struct Inner { 1: required i32 y }
                2: required i32 z
            }
            "#,
        );
        assert!(diags
            .iter()
            .any(|d| d.code == ErrorCode::E1007));
        // The surrounding struct still parses, with the nested block skipped.
        let Definition::Struct(s) = &doc.definitions[0] else {
            panic!("expected struct");
        };
        assert_eq!(s.fields.len(), 2);
    }

    #[test]
    fn test_field_error_recovers_within_body() {
        let (doc, diags) = parse(
            r#"
            struct S {
                1: required i32 good
                2: nonsense<< bad
                3: optional string alsoGood
            }
            "#,
        );
        assert!(diags.has_errors());
        let Definition::Struct(s) = &doc.definitions[0] else {
            panic!("expected struct");
        };
        let names: Vec<_> = s.fields.iter().map(|f| f.name.text.as_str()).collect();
        assert_eq!(names, vec!["good", "alsoGood"]);
    }

    #[test]
    fn test_negative_field_id_parses() {
        // Positivity is enforced by the resolver, not the parser.
        let doc = parse_ok("struct S { -1: optional i32 x }");
        let Definition::Struct(s) = &doc.definitions[0] else {
            panic!("expected struct");
        };
        assert_eq!(s.fields[0].id, -1);
    }
}
