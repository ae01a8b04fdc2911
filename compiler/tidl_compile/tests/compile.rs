//! End-to-end driver tests over in-memory and filesystem sources.

use pretty_assertions::assert_eq;
use tidl_compile::{compile, FsLoader, MemoryLoader};
use tidl_diagnostic::ErrorCode;
use tidl_ir::ir::{NamedDef, NamedRef, Type};

#[test]
fn test_single_document() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.tidl",
        r#"
        namespace rust demo
        enum Status { OK, GONE = 10 }
        struct Ping { 1: required Status status }
        "#,
    );

    let output = compile(&loader, "main.tidl");
    assert!(!output.has_errors());
    let root = output.root();
    let doc_id = match root.doc {
        Some(id) => id,
        None => panic!("root must resolve: {:?}", root.diagnostics),
    };
    let doc = output.program.document(doc_id);
    assert_eq!(doc.namespaces[0].value, "demo");
    assert_eq!(doc.enums[0].variants[1], ("GONE".to_string(), 10));
}

#[test]
fn test_include_chain_resolves_in_dependency_order() {
    let mut loader = MemoryLoader::new();
    loader.insert("base.tidl", "struct User { 1: required string name }");
    loader.insert(
        "main.tidl",
        r#"
        include "base.tidl"
        struct Wrapper { 1: required base.User user }
        "#,
    );

    let output = compile(&loader, "main.tidl");
    assert!(!output.has_errors());
    assert_eq!(output.documents.len(), 2);
    // Includes come first.
    assert_eq!(output.documents[0].path, "base.tidl");
    assert_eq!(output.documents[1].path, "main.tidl");

    let base_id = match output.documents[0].doc {
        Some(id) => id,
        None => panic!("base must resolve"),
    };
    let main_id = match output.documents[1].doc {
        Some(id) => id,
        None => panic!("main must resolve"),
    };
    let main = output.program.document(main_id);
    let Type::Named(NamedRef::Struct(user)) = &main.structs[0].fields[0].ty else {
        panic!("expected struct reference");
    };
    assert_eq!(user.doc, base_id);
}

#[test]
fn test_diamond_include_loads_once() {
    let mut loader = MemoryLoader::new();
    loader.insert("shared.tidl", "typedef i64 Id");
    loader.insert(
        "left.tidl",
        r#"
        include "shared.tidl"
        struct L { 1: required shared.Id id }
        "#,
    );
    loader.insert(
        "right.tidl",
        r#"
        include "shared.tidl"
        struct R { 1: required shared.Id id }
        "#,
    );
    loader.insert(
        "main.tidl",
        r#"
        include "left.tidl"
        include "right.tidl"
        struct M {
            1: required left.L l
            2: required right.R r
        }
        "#,
    );

    let output = compile(&loader, "main.tidl");
    assert!(!output.has_errors());
    // shared appears exactly once.
    let shared: Vec<_> = output
        .documents
        .iter()
        .filter(|d| d.path == "shared.tidl")
        .collect();
    assert_eq!(shared.len(), 1);
    assert_eq!(output.documents.len(), 4);
}

#[test]
fn test_circular_include_reported() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "a.tidl",
        r#"
        include "b.tidl"
        struct A { 1: required i32 x }
        "#,
    );
    loader.insert(
        "b.tidl",
        r#"
        include "a.tidl"
        struct B { 1: required i32 x }
        "#,
    );

    let output = compile(&loader, "a.tidl");
    assert!(output.has_errors());
    // Every document on the cycle fails with its own diagnostic.
    assert_eq!(output.documents.len(), 2);
    for result in &output.documents {
        assert!(result.doc.is_none(), "{} must not resolve", result.path);
        assert!(
            result.diagnostics.iter().any(|d| d.code == ErrorCode::E2002),
            "{} must report the cycle: {:?}",
            result.path,
            result.diagnostics
        );
    }
}

#[test]
fn test_missing_include_reported() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.tidl",
        r#"
        include "nowhere.tidl"
        struct S { 1: required i32 x }
        "#,
    );

    let output = compile(&loader, "main.tidl");
    let root = output.root();
    assert!(root.doc.is_none());
    assert_eq!(
        root.diagnostics.iter().map(|d| d.code).collect::<Vec<_>>(),
        vec![ErrorCode::E2010]
    );
}

#[test]
fn test_missing_root_reported() {
    let loader = MemoryLoader::new();
    let output = compile(&loader, "ghost.tidl");
    assert_eq!(output.documents.len(), 1);
    let root = output.root();
    assert!(root.doc.is_none());
    assert_eq!(
        root.diagnostics.iter().map(|d| d.code).collect::<Vec<_>>(),
        vec![ErrorCode::E2010]
    );
}

#[test]
fn test_parse_errors_block_resolution() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.tidl",
        r#"
        struct Good { 1: required i32 x }
        enum { A }
        "#,
    );

    let output = compile(&loader, "main.tidl");
    let root = output.root();
    assert!(root.doc.is_none());
    // Only the parse error; no phantom resolution errors on the
    // partial AST.
    assert_eq!(
        root.diagnostics.iter().map(|d| d.code).collect::<Vec<_>>(),
        vec![ErrorCode::E1004]
    );
}

#[test]
fn test_broken_include_aborts_includer() {
    let mut loader = MemoryLoader::new();
    loader.insert("base.tidl", "struct User { 1: i32 x }");
    loader.insert(
        "main.tidl",
        r#"
        include "base.tidl"
        struct Wrapper { 1: required base.User user }
        "#,
    );

    let output = compile(&loader, "main.tidl");
    assert!(output.has_errors());
    // base carries the real error; main records only that its include
    // is unusable, without phantom resolution errors.
    assert_eq!(
        output.documents[0]
            .diagnostics
            .iter()
            .map(|d| d.code)
            .collect::<Vec<_>>(),
        vec![ErrorCode::E2011]
    );
    assert!(output.documents[1].doc.is_none());
    assert_eq!(
        output.documents[1]
            .diagnostics
            .iter()
            .map(|d| d.code)
            .collect::<Vec<_>>(),
        vec![ErrorCode::E2010]
    );
}

#[test]
fn test_fs_loader_with_subdirectory_includes() {
    let dir = std::env::temp_dir().join(format!("tidl_compile_test_{}", std::process::id()));
    let shared = dir.join("shared");
    std::fs::create_dir_all(&shared).unwrap_or_else(|e| panic!("{e}"));
    std::fs::write(shared.join("base.tidl"), "typedef i64 Id")
        .unwrap_or_else(|e| panic!("{e}"));
    std::fs::write(
        dir.join("main.tidl"),
        r#"
        include "shared/base.tidl"
        struct S { 1: required base.Id id }
        "#,
    )
    .unwrap_or_else(|e| panic!("{e}"));

    let loader = FsLoader::new();
    let output = compile(&loader, &dir.join("main.tidl").to_string_lossy());
    std::fs::remove_dir_all(&dir).unwrap_or_else(|e| panic!("{e}"));

    assert!(!output.has_errors(), "{:?}", output.documents);
    assert_eq!(output.documents.len(), 2);
}
