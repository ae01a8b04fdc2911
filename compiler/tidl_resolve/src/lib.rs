//! Name resolution and validation.
//!
//! Consumes one parsed document at a time and produces the resolved
//! [`ir::Document`]. Documents are resolved in include order, so every
//! include of the document under resolution is already in the
//! [`Program`]; the include graph itself (loading, cycles) is the
//! compile driver's concern.
//!
//! Resolution validates everything the codec and codegen backends rely
//! on: unique names per document, unique positive field ids, explicit
//! requiredness, enum values in `0..=i32::MAX`, acyclic typedefs, and
//! defaults whose literals fit their declared types. Errors are batched
//! into the shared [`Diagnostics`] collector; a document with any error
//! produces no IR.

mod error;
mod literal;
mod types;

pub use error::{ResolveError, ResolveErrorKind};

use rustc_hash::{FxHashMap, FxHashSet};
use tidl_diagnostic::Diagnostics;
use tidl_ir::ast;
use tidl_ir::ir::{self, DefId, DocId, NamedDef, Program, Type};
use tidl_ir::Span;

/// Resolve one document against the already-resolved documents in
/// `program`.
///
/// `includes` maps each include alias to its resolved document; the
/// compile driver derives it from the include graph. The returned
/// document expects to be added to `program` next: its ids are minted
/// from [`Program::next_doc_id`].
///
/// Returns `None` when any error was emitted.
pub fn resolve_document(
    program: &Program,
    path: &str,
    ast: &ast::Document,
    includes: &[(String, DocId)],
    diagnostics: &mut Diagnostics,
) -> Option<ir::Document> {
    tracing::debug!(path, definitions = ast.definitions.len(), "resolving document");
    let before = diagnostics.len();

    let mut resolver = Resolver {
        program,
        doc_id: program.next_doc_id(),
        out: ir::Document::new(path),
        names: FxHashMap::default(),
        diagnostics,
    };

    resolver.register_includes(ast, includes);
    resolver.out.namespaces = ast
        .namespaces
        .iter()
        .map(|ns| ir::Namespace {
            scope: ns.scope.clone(),
            value: ns.value.clone(),
        })
        .collect();

    let kept = resolver.declare(ast);
    resolver.resolve_bodies(ast, &kept);

    if resolver.diagnostics.len() > before {
        None
    } else {
        Some(resolver.out)
    }
}

/// Resolution state for one document.
pub(crate) struct Resolver<'a> {
    pub(crate) program: &'a Program,
    pub(crate) doc_id: DocId,
    pub(crate) out: ir::Document,
    /// Local definitions with their declaration spans.
    pub(crate) names: FxHashMap<String, (NamedDef, Span)>,
    diagnostics: &'a mut Diagnostics,
}

impl Resolver<'_> {
    fn emit(&mut self, err: ResolveError) {
        self.diagnostics.emit(err.into_diagnostic());
    }

    fn register_includes(&mut self, ast: &ast::Document, includes: &[(String, DocId)]) {
        for (alias, doc) in includes {
            if self.out.include_by_alias(alias).is_some() {
                let span = ast
                    .includes
                    .iter()
                    .find(|inc| inc.alias() == alias)
                    .map_or(Span::DUMMY, |inc| inc.span);
                self.emit(ResolveError::new(
                    ResolveErrorKind::DuplicateName {
                        name: alias.clone(),
                        kind: "include alias",
                    },
                    span,
                ));
                continue;
            }
            self.out.includes.push(ir::IncludeRef {
                alias: alias.clone(),
                doc: *doc,
            });
        }
    }

    /// First pass: register every definition name and assign its index.
    ///
    /// Returns one flag per definition; duplicates are dropped and do not
    /// occupy an index.
    fn declare(&mut self, ast: &ast::Document) -> Vec<bool> {
        let mut typedefs = 0u32;
        let mut enums = 0u32;
        let mut structs = 0u32;
        let mut services = 0u32;
        let mut consts = 0u32;

        let mut kept = Vec::with_capacity(ast.definitions.len());
        for def in &ast.definitions {
            let name = def.name();
            if let Some((_, first)) = self.names.get(&name.text) {
                let first = *first;
                self.emit(
                    ResolveError::new(
                        ResolveErrorKind::DuplicateName {
                            name: name.text.clone(),
                            kind: def.kind_name(),
                        },
                        name.span,
                    )
                    .with_secondary(first, "first defined here"),
                );
                kept.push(false);
                continue;
            }

            let entry = match def {
                ast::Definition::Typedef(_) => {
                    typedefs += 1;
                    NamedDef::Typedef(typedefs - 1)
                }
                ast::Definition::Enum(_) => {
                    enums += 1;
                    NamedDef::Enum(enums - 1)
                }
                ast::Definition::Struct(_) => {
                    structs += 1;
                    NamedDef::Struct(structs - 1)
                }
                ast::Definition::Service(_) => {
                    services += 1;
                    NamedDef::Service(services - 1)
                }
                ast::Definition::Const(_) => {
                    consts += 1;
                    NamedDef::Const(consts - 1)
                }
            };
            self.names.insert(name.text.clone(), (entry, name.span));
            self.out.index_name(name.text.as_str(), entry);
            kept.push(true);
        }
        kept
    }

    /// Second pass: resolve definition bodies.
    ///
    /// Kinds are resolved in dependency order rather than source order:
    /// typedefs, then enums, then struct shells, then struct defaults,
    /// then consts, then services. Defaults and consts are lowered only
    /// once every type they can mention is resolved, so forward
    /// references within a document work.
    fn resolve_bodies(&mut self, ast: &ast::Document, kept: &[bool]) {
        let cyclic = self.detect_typedef_cycles(ast, kept);

        let mut typedef_index = 0u32;
        for def in defs(ast, kept) {
            if let ast::Definition::Typedef(td) = def {
                let ty = if cyclic.contains(&typedef_index) {
                    self.emit(ResolveError::new(
                        ResolveErrorKind::CircularTypedef {
                            name: td.name.text.clone(),
                        },
                        td.name.span,
                    ));
                    // Placeholder so alias chasing terminates.
                    Type::Base(ir::BaseType::Bool)
                } else {
                    match self.resolve_type(&td.ty) {
                        Ok(ty) => ty,
                        Err(err) => {
                            self.emit(err);
                            Type::Base(ir::BaseType::Bool)
                        }
                    }
                };
                self.out.typedefs.push(ir::Typedef {
                    name: td.name.text.clone(),
                    ty,
                });
                typedef_index += 1;
            }
        }

        for def in defs(ast, kept) {
            if let ast::Definition::Enum(ed) = def {
                let resolved = self.resolve_enum(ed);
                self.out.enums.push(resolved);
            }
        }

        // Struct shells first; defaults can reference any struct or enum
        // in the document, so they are lowered in a separate pass below.
        let mut deferred: Vec<(usize, usize, &ast::ConstExpr)> = Vec::new();
        for def in defs(ast, kept) {
            if let ast::Definition::Struct(sd) = def {
                let (fields, defaults) = self.resolve_field_list(&sd.fields);
                let struct_index = self.out.structs.len();
                for (field_index, expr) in defaults {
                    deferred.push((struct_index, field_index, expr));
                }
                self.out.structs.push(ir::Struct {
                    name: sd.name.text.clone(),
                    is_exception: sd.is_exception,
                    fields,
                });
            }
        }
        for (struct_index, field_index, expr) in deferred {
            let ty = self.out.structs[struct_index].fields[field_index].ty.clone();
            match self.lower_const(&ty, expr) {
                Ok(value) => {
                    self.out.structs[struct_index].fields[field_index].default = Some(value);
                }
                Err(err) => self.emit(err),
            }
        }

        for def in defs(ast, kept) {
            if let ast::Definition::Const(cd) = def {
                match self.resolve_type(&cd.ty) {
                    Ok(ty) => match self.lower_const(&ty, &cd.value) {
                        Ok(value) => self.out.consts.push(ir::Const {
                            name: cd.name.text.clone(),
                            ty,
                            value,
                        }),
                        Err(err) => self.emit(err),
                    },
                    Err(err) => self.emit(err),
                }
            }
        }

        let cyclic_services = self.detect_extends_cycles(ast, kept);
        let mut service_index = 0u32;
        for def in defs(ast, kept) {
            if let ast::Definition::Service(sd) = def {
                let cyclic = cyclic_services.contains(&service_index);
                let resolved = self.resolve_service(sd, cyclic);
                self.out.services.push(resolved);
                service_index += 1;
            }
        }
    }

    /// Resolve an enum body, numbering implicit constants.
    ///
    /// An unvalued constant takes the previous value plus one, starting
    /// at zero. Values must stay in `0..=i32::MAX`.
    fn resolve_enum(&mut self, def: &ast::EnumDef) -> ir::Enum {
        let mut seen: FxHashMap<String, Span> = FxHashMap::default();
        let mut variants = Vec::with_capacity(def.variants.len());
        let mut next: i64 = 0;

        for variant in &def.variants {
            if let Some(first) = seen.get(&variant.name.text) {
                let first = *first;
                self.emit(
                    ResolveError::new(
                        ResolveErrorKind::DuplicateName {
                            name: variant.name.text.clone(),
                            kind: "enum constant",
                        },
                        variant.name.span,
                    )
                    .with_secondary(first, "first defined here"),
                );
                continue;
            }
            seen.insert(variant.name.text.clone(), variant.name.span);

            let value = variant.value.unwrap_or(next);
            if !(0..=i64::from(i32::MAX)).contains(&value) {
                self.emit(ResolveError::new(
                    ResolveErrorKind::EnumValueOutOfRange {
                        name: variant.name.text.clone(),
                        value,
                    },
                    variant.value_span,
                ));
                continue;
            }
            #[allow(clippy::cast_possible_truncation)]
            variants.push((variant.name.text.clone(), value as i32));
            next = value + 1;
        }

        ir::Enum {
            name: def.name.text.clone(),
            variants,
        }
    }

    /// Resolve a field list shared by struct bodies, argument lists, and
    /// throws lists.
    ///
    /// Returns the resolved fields plus the defaults still to lower,
    /// as (index into the returned fields, literal) pairs.
    fn resolve_field_list<'ast>(
        &mut self,
        fields: &'ast [ast::Field],
    ) -> (Vec<ir::Field>, Vec<(usize, &'ast ast::ConstExpr)>) {
        let mut out: Vec<ir::Field> = Vec::with_capacity(fields.len());
        let mut deferred = Vec::new();
        let mut by_id: FxHashMap<i16, (String, Span)> = FxHashMap::default();
        let mut by_name: FxHashMap<String, Span> = FxHashMap::default();

        for field in fields {
            if !(1..=i64::from(i16::MAX)).contains(&field.id) {
                self.emit(ResolveError::new(
                    ResolveErrorKind::FieldIdOutOfRange { id: field.id },
                    field.id_span,
                ));
                continue;
            }
            #[allow(clippy::cast_possible_truncation)]
            let id = field.id as i16;

            if let Some((previous, first)) = by_id.get(&id) {
                let (previous, first) = (previous.clone(), *first);
                self.emit(
                    ResolveError::new(
                        ResolveErrorKind::DuplicateFieldId { id, previous },
                        field.id_span,
                    )
                    .with_secondary(first, "id first used here"),
                );
                continue;
            }
            if let Some(first) = by_name.get(&field.name.text) {
                let first = *first;
                self.emit(
                    ResolveError::new(
                        ResolveErrorKind::DuplicateName {
                            name: field.name.text.clone(),
                            kind: "field",
                        },
                        field.name.span,
                    )
                    .with_secondary(first, "first defined here"),
                );
                continue;
            }

            let Some(requiredness) = field.requiredness else {
                self.emit(ResolveError::new(
                    ResolveErrorKind::MissingRequiredness {
                        field: field.name.text.clone(),
                    },
                    field.span,
                ));
                continue;
            };

            let ty = match self.resolve_type(&field.ty) {
                Ok(ty) => ty,
                Err(err) => {
                    self.emit(err);
                    continue;
                }
            };

            by_id.insert(id, (field.name.text.clone(), field.id_span));
            by_name.insert(field.name.text.clone(), field.name.span);
            if let Some(expr) = &field.default {
                deferred.push((out.len(), expr));
            }
            out.push(ir::Field {
                id,
                requiredness,
                ty,
                name: field.name.text.clone(),
                default: None,
            });
        }

        (out, deferred)
    }

    /// Resolve a field list and lower its defaults in place.
    ///
    /// Used for argument and throws lists, whose defaults cannot forward
    /// reference anything unresolved: services are resolved last.
    fn resolve_fields_with_defaults(&mut self, fields: &[ast::Field]) -> Vec<ir::Field> {
        let (mut out, deferred) = self.resolve_field_list(fields);
        for (index, expr) in deferred {
            let ty = out[index].ty.clone();
            match self.lower_const(&ty, expr) {
                Ok(value) => out[index].default = Some(value),
                Err(err) => self.emit(err),
            }
        }
        out
    }

    fn resolve_service(&mut self, def: &ast::ServiceDef, cyclic_extends: bool) -> ir::Service {
        let extends = if cyclic_extends {
            if let Some(q) = &def.extends {
                self.emit(ResolveError::new(
                    ResolveErrorKind::CircularExtends {
                        name: def.name.text.clone(),
                    },
                    q.span,
                ));
            }
            None
        } else {
            def.extends.as_ref().and_then(|q| self.resolve_extends(q))
        };

        let mut seen: FxHashMap<String, Span> = FxHashMap::default();
        let mut functions = Vec::with_capacity(def.functions.len());
        for func in &def.functions {
            if let Some(first) = seen.get(&func.name.text) {
                let first = *first;
                self.emit(
                    ResolveError::new(
                        ResolveErrorKind::DuplicateName {
                            name: func.name.text.clone(),
                            kind: "function",
                        },
                        func.name.span,
                    )
                    .with_secondary(first, "first defined here"),
                );
                continue;
            }
            seen.insert(func.name.text.clone(), func.name.span);

            if func.oneway && (func.return_ty.is_some() || func.throws.is_some()) {
                self.emit(ResolveError::new(
                    ResolveErrorKind::OnewayViolation {
                        function: func.name.text.clone(),
                    },
                    func.span,
                ));
            }

            let return_ty = match &func.return_ty {
                None => None,
                Some(ty) => match self.resolve_type(ty) {
                    Ok(ty) => Some(ty),
                    Err(err) => {
                        self.emit(err);
                        None
                    }
                },
            };
            let args = self.resolve_fields_with_defaults(&func.args);
            let throws = func
                .throws
                .as_deref()
                .map_or_else(Vec::new, |t| self.resolve_fields_with_defaults(t));

            functions.push(ir::Function {
                name: func.name.text.clone(),
                oneway: func.oneway,
                return_ty,
                args,
                throws,
            });
        }

        ir::Service {
            name: def.name.text.clone(),
            extends,
            functions,
        }
    }

    fn resolve_extends(&mut self, name: &ast::QualifiedName) -> Option<DefId> {
        match self.lookup_name(name.qualifier.as_deref(), &name.name, name.span) {
            Ok((doc, NamedDef::Service(index))) => Some(DefId { doc, index }),
            Ok((_, entry)) => {
                self.emit(ResolveError::new(
                    ResolveErrorKind::ExtendsNonService {
                        name: name.name.clone(),
                        kind: named_def_kind(entry),
                    },
                    name.span,
                ));
                None
            }
            Err(err) => {
                self.emit(err);
                None
            }
        }
    }

    /// Find typedefs that alias back to themselves, directly or through
    /// other typedefs in this document. Cross-document cycles cannot
    /// occur: includes are acyclic and included documents are already
    /// fully resolved.
    fn detect_typedef_cycles(&self, ast: &ast::Document, kept: &[bool]) -> FxHashSet<u32> {
        let mut names: FxHashMap<&str, usize> = FxHashMap::default();
        let mut exprs: Vec<&ast::TypeExpr> = Vec::new();
        for def in defs(ast, kept) {
            if let ast::Definition::Typedef(td) = def {
                names.insert(td.name.text.as_str(), exprs.len());
                exprs.push(&td.ty);
            }
        }

        let graph: Vec<Vec<usize>> = exprs
            .iter()
            .map(|expr| {
                let mut edges = Vec::new();
                collect_typedef_edges(expr, &names, &mut edges);
                edges
            })
            .collect();

        let mut colors = vec![0u8; graph.len()];
        let mut cyclic = FxHashSet::default();
        for node in 0..graph.len() {
            if colors[node] == 0 {
                visit(node, &graph, &mut colors, &mut cyclic);
            }
        }
        cyclic
    }

    /// Find services whose extends chain loops back to itself within
    /// this document. Qualified extends point at already-resolved
    /// documents and cannot close a cycle.
    fn detect_extends_cycles(&self, ast: &ast::Document, kept: &[bool]) -> FxHashSet<u32> {
        let mut names: FxHashMap<&str, usize> = FxHashMap::default();
        let mut extends: Vec<Option<&ast::QualifiedName>> = Vec::new();
        for def in defs(ast, kept) {
            if let ast::Definition::Service(sd) = def {
                names.insert(sd.name.text.as_str(), extends.len());
                extends.push(sd.extends.as_ref());
            }
        }

        let graph: Vec<Vec<usize>> = extends
            .iter()
            .map(|ext| match ext {
                Some(q) if q.qualifier.is_none() => {
                    names.get(q.name.as_str()).map(|&i| vec![i]).unwrap_or_default()
                }
                _ => Vec::new(),
            })
            .collect();

        let mut colors = vec![0u8; graph.len()];
        let mut cyclic = FxHashSet::default();
        for node in 0..graph.len() {
            if colors[node] == 0 {
                visit(node, &graph, &mut colors, &mut cyclic);
            }
        }
        cyclic
    }
}

/// Iterate the definitions that survived the declaration pass.
fn defs<'a>(
    ast: &'a ast::Document,
    kept: &'a [bool],
) -> impl Iterator<Item = &'a ast::Definition> {
    ast.definitions
        .iter()
        .enumerate()
        .filter(|(i, _)| kept[*i])
        .map(|(_, def)| def)
}

/// Record edges from a typedef body to other typedefs in the same
/// document. Qualified names point at already-resolved documents and
/// cannot participate in a cycle.
fn collect_typedef_edges(
    expr: &ast::TypeExpr,
    names: &FxHashMap<&str, usize>,
    edges: &mut Vec<usize>,
) {
    match &expr.kind {
        ast::TypeExprKind::Base(_) => {}
        ast::TypeExprKind::List(elem) | ast::TypeExprKind::Set(elem) => {
            collect_typedef_edges(elem, names, edges);
        }
        ast::TypeExprKind::Map(key, value) => {
            collect_typedef_edges(key, names, edges);
            collect_typedef_edges(value, names, edges);
        }
        ast::TypeExprKind::Named {
            qualifier: None,
            name,
        } => {
            if let Some(&index) = names.get(name.as_str()) {
                edges.push(index);
            }
        }
        ast::TypeExprKind::Named { .. } => {}
    }
}

/// Depth-first search; a back edge to a gray node marks that node cyclic.
fn visit(node: usize, graph: &[Vec<usize>], colors: &mut [u8], cyclic: &mut FxHashSet<u32>) {
    colors[node] = 1;
    for &next in &graph[node] {
        match colors[next] {
            0 => visit(next, graph, colors, cyclic),
            1 => {
                cyclic.insert(next as u32);
            }
            _ => {}
        }
    }
    colors[node] = 2;
}

fn named_def_kind(entry: NamedDef) -> &'static str {
    match entry {
        NamedDef::Typedef(_) => "typedef",
        NamedDef::Struct(_) => "struct",
        NamedDef::Enum(_) => "enum",
        NamedDef::Service(_) => "service",
        NamedDef::Const(_) => "constant",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tidl_diagnostic::ErrorCode;
    use tidl_ir::ir::{BaseType, ConstValue, NamedRef};

    fn parse(source: &str, diags: &mut Diagnostics) -> ast::Document {
        let tokens = tidl_lexer::lex(source, diags);
        let doc = tidl_parse::parse_document(&tokens, diags);
        assert!(!diags.has_errors(), "source must parse: {diags:?}");
        doc
    }

    fn resolve(source: &str) -> (Option<ir::Document>, Diagnostics) {
        let mut diags = Diagnostics::new();
        let ast = parse(source, &mut diags);
        let program = Program::new();
        let doc = resolve_document(&program, "test.tidl", &ast, &[], &mut diags);
        (doc, diags)
    }

    fn resolve_ok(source: &str) -> ir::Document {
        let (doc, diags) = resolve(source);
        match doc {
            Some(doc) => doc,
            None => panic!("resolution failed: {diags:?}"),
        }
    }

    fn codes(diags: &Diagnostics) -> Vec<ErrorCode> {
        diags.iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_enum_implicit_numbering() {
        let doc = resolve_ok("enum E { A, B = 2, C = 0xa, D }");
        let expected = vec![
            ("A".to_string(), 0),
            ("B".to_string(), 2),
            ("C".to_string(), 10),
            ("D".to_string(), 11),
        ];
        assert_eq!(doc.enums[0].variants, expected);
    }

    #[test]
    fn test_struct_fields_and_defaults() {
        let doc = resolve_ok(
            r#"
            struct User {
                1: required string name
                2: optional i32 age = 30
                3: optional list<string> tags = ["a", "b"]
            }
            "#,
        );
        let s = &doc.structs[0];
        assert_eq!(s.fields[0].id, 1);
        assert!(s.fields[0].is_required());
        assert_eq!(s.fields[1].default, Some(ConstValue::I32(30)));
        assert_eq!(
            s.fields[2].default,
            Some(ConstValue::List(vec![
                ConstValue::String("a".to_string()),
                ConstValue::String("b".to_string()),
            ]))
        );
    }

    #[test]
    fn test_typedef_forward_reference() {
        let doc = resolve_ok(
            r#"
            typedef Id UserId
            typedef i64 Id
            "#,
        );
        assert_eq!(doc.typedefs[1].ty, Type::Base(BaseType::I64));
        let Type::Named(NamedRef::Typedef(id)) = doc.typedefs[0].ty else {
            panic!("expected typedef reference");
        };
        assert_eq!(id.index, 1);
    }

    #[test]
    fn test_typedef_cycle() {
        let (doc, diags) = resolve(
            r#"
            typedef B A
            typedef A B
            "#,
        );
        assert!(doc.is_none());
        assert!(codes(&diags).contains(&ErrorCode::E2003));
    }

    #[test]
    fn test_duplicate_field_id() {
        let (doc, diags) = resolve(
            "struct S { 1: required i32 a; 1: required i32 b }",
        );
        assert!(doc.is_none());
        assert_eq!(codes(&diags), vec![ErrorCode::E2004]);
    }

    #[test]
    fn test_field_id_range() {
        let (doc, diags) = resolve(
            r#"
            struct S {
                0: required i32 zero
                40000: required i32 big
                -1: required i32 neg
            }
            "#,
        );
        assert!(doc.is_none());
        assert_eq!(
            codes(&diags),
            vec![ErrorCode::E2012, ErrorCode::E2012, ErrorCode::E2012]
        );
    }

    #[test]
    fn test_missing_requiredness() {
        let (doc, diags) = resolve("struct S { 1: i32 x }");
        assert!(doc.is_none());
        assert_eq!(codes(&diags), vec![ErrorCode::E2011]);
    }

    #[test]
    fn test_duplicate_definition_name() {
        let (doc, diags) = resolve(
            r#"
            struct User { 1: required i32 x }
            enum User { A }
            "#,
        );
        assert!(doc.is_none());
        assert_eq!(codes(&diags), vec![ErrorCode::E2006]);
    }

    #[test]
    fn test_unresolved_type() {
        let (doc, diags) = resolve("struct S { 1: required Missing x }");
        assert!(doc.is_none());
        assert_eq!(codes(&diags), vec![ErrorCode::E2001]);
    }

    #[test]
    fn test_enum_value_out_of_range() {
        let (doc, diags) = resolve("enum E { A = -1, B = 5000000000 }");
        assert!(doc.is_none());
        assert_eq!(codes(&diags), vec![ErrorCode::E2005, ErrorCode::E2005]);
    }

    #[test]
    fn test_enum_const_must_name_defined_value() {
        let (doc, diags) = resolve(
            r#"
            enum Color { RED = 1, BLUE = 2 }
            const Color BAD = 5
            "#,
        );
        assert!(doc.is_none());
        assert_eq!(codes(&diags), vec![ErrorCode::E2007]);

        let doc = resolve_ok(
            r#"
            enum Color { RED = 1, BLUE = 2 }
            const Color OK = 2
            "#,
        );
        assert_eq!(doc.consts[0].value, ConstValue::I32(2));
    }

    #[test]
    fn test_const_struct_literal() {
        let doc = resolve_ok(
            r#"
            struct Point {
                1: required i32 x
                2: optional i32 y = 0
            }
            const Point ORIGIN = { "x": 0 }
            "#,
        );
        assert_eq!(
            doc.consts[0].value,
            ConstValue::Struct(vec![(1, ConstValue::I32(0))])
        );
    }

    #[test]
    fn test_const_struct_literal_may_omit_fields() {
        // Presence is only enforced at encode time, not on literals.
        let doc = resolve_ok(
            r#"
            struct Point { 1: required i32 x }
            const Point EMPTY = {}
            "#,
        );
        assert_eq!(doc.consts[0].value, ConstValue::Struct(vec![]));
    }

    #[test]
    fn test_const_struct_literal_unknown_field() {
        let (doc, diags) = resolve(
            r#"
            struct Point { 1: required i32 x }
            const Point BAD = { "z": 1 }
            "#,
        );
        assert!(doc.is_none());
        assert_eq!(codes(&diags), vec![ErrorCode::E2007]);
    }

    #[test]
    fn test_literal_mismatch() {
        let (doc, diags) = resolve(r#"const i32 BAD = "nope""#);
        assert!(doc.is_none());
        assert_eq!(codes(&diags), vec![ErrorCode::E2007]);
    }

    #[test]
    fn test_map_literal_key_mismatch() {
        let (doc, diags) = resolve(r#"const map<string, string> BAD = { 1: "one" }"#);
        assert!(doc.is_none());
        assert_eq!(codes(&diags), vec![ErrorCode::E2007]);
    }

    #[test]
    fn test_int_narrowing() {
        let (doc, diags) = resolve("const byte BAD = 300");
        assert!(doc.is_none());
        assert_eq!(codes(&diags), vec![ErrorCode::E2007]);

        let doc = resolve_ok("const byte OK = -128");
        assert_eq!(doc.consts[0].value, ConstValue::Byte(-128));
    }

    #[test]
    fn test_oneway_violations() {
        let (doc, diags) = resolve(
            r#"
            service S {
                oneway i32 bad1()
                oneway void bad2() throws ()
                oneway void good()
            }
            "#,
        );
        assert!(doc.is_none());
        assert_eq!(codes(&diags), vec![ErrorCode::E2009, ErrorCode::E2009]);
    }

    #[test]
    fn test_extends_non_service() {
        let (doc, diags) = resolve(
            r#"
            struct NotAService { 1: required i32 x }
            service S extends NotAService {}
            "#,
        );
        assert!(doc.is_none());
        assert_eq!(codes(&diags), vec![ErrorCode::E2008]);
    }

    #[test]
    fn test_extends_self() {
        let (doc, diags) = resolve("service A extends A {}");
        assert!(doc.is_none());
        assert_eq!(codes(&diags), vec![ErrorCode::E2008]);
    }

    #[test]
    fn test_extends_cycle() {
        let (doc, diags) = resolve(
            r#"
            service A extends B {}
            service B extends A {}
            "#,
        );
        assert!(doc.is_none());
        assert_eq!(codes(&diags), vec![ErrorCode::E2008]);
    }

    #[test]
    fn test_extends_chain_resolves() {
        let doc = resolve_ok(
            r#"
            service Base {}
            service Derived extends Base {}
            "#,
        );
        let extends = doc.services[1].extends;
        assert_eq!(extends.map(|id| id.index), Some(0));
    }

    #[test]
    fn test_cross_document_reference() {
        let mut diags = Diagnostics::new();
        let mut program = Program::new();

        let base_ast = parse("struct User { 1: required string name }", &mut diags);
        let base = resolve_document(&program, "base.tidl", &base_ast, &[], &mut diags)
            .unwrap_or_else(|| panic!("base must resolve: {diags:?}"));
        let base_id = program.add_document(base);

        let main_ast = parse(
            r#"
            include "base.tidl"
            struct Wrapper { 1: required base.User user }
            service S extends base.Missing {}
            "#,
            &mut diags,
        );
        let includes = vec![("base".to_string(), base_id)];
        let doc = resolve_document(&program, "main.tidl", &main_ast, &includes, &mut diags);

        // The unresolved extends fails the document, but the qualified
        // struct reference itself is fine.
        assert!(doc.is_none());
        assert_eq!(codes(&diags), vec![ErrorCode::E2001]);
    }

    #[test]
    fn test_cross_document_reference_resolves() {
        let mut diags = Diagnostics::new();
        let mut program = Program::new();

        let base_ast = parse("struct User { 1: required string name }", &mut diags);
        let base = resolve_document(&program, "base.tidl", &base_ast, &[], &mut diags)
            .unwrap_or_else(|| panic!("base must resolve: {diags:?}"));
        let base_id = program.add_document(base);

        let main_ast = parse(
            r#"
            include "base.tidl"
            struct Wrapper { 1: required base.User user }
            "#,
            &mut diags,
        );
        let includes = vec![("base".to_string(), base_id)];
        let doc = resolve_document(&program, "main.tidl", &main_ast, &includes, &mut diags)
            .unwrap_or_else(|| panic!("main must resolve: {diags:?}"));

        let expected = Type::Named(NamedRef::Struct(DefId {
            doc: base_id,
            index: 0,
        }));
        assert_eq!(doc.structs[0].fields[0].ty, expected);
    }

    #[test]
    fn test_service_functions_resolve() {
        let doc = resolve_ok(
            r#"
            exception NotFound { 1: optional string message }
            struct User { 1: required i64 id }
            service UserService {
                User get(1: required i64 id) throws (1: optional NotFound nf)
                oneway void ping()
            }
            "#,
        );
        let svc = &doc.services[0];
        assert_eq!(svc.functions.len(), 2);
        assert_eq!(svc.functions[0].throws.len(), 1);
        assert!(svc.functions[1].oneway);
        assert!(svc.functions[1].return_ty.is_none());
    }
}
