//! Compile driver.
//!
//! Walks the include graph from a root document, loading, lexing, and
//! parsing each document once, then resolves documents in dependency
//! order so every include is fully resolved before its includer. Cycle
//! detection and load failures are handled here, before any resolution;
//! everything symbol-level lives in `tidl_resolve`.
//!
//! Each document gets its own [`Diagnostics`] collector, so errors stay
//! attributed to the file whose spans they carry.

mod loader;

pub use loader::{FsLoader, LoadError, MemoryLoader, SourceLoader};

use rustc_hash::{FxHashMap, FxHashSet};
use tidl_diagnostic::{Diagnostic, Diagnostics, ErrorCode};
use tidl_ir::ast;
use tidl_ir::ir::{DocId, Program};
use tidl_ir::Span;

/// The outcome of compiling one document.
#[derive(Debug)]
pub struct CompileResult {
    pub path: String,
    pub diagnostics: Diagnostics,
    /// The resolved document, when it compiled cleanly.
    pub doc: Option<DocId>,
}

/// The outcome of a whole compilation: every document reachable from
/// the root, in dependency order with the root last.
#[derive(Debug)]
pub struct CompileOutput {
    pub program: Program,
    pub documents: Vec<CompileResult>,
}

impl CompileOutput {
    /// The root document's result.
    ///
    /// # Panics
    ///
    /// Never in practice: `compile` always records the root.
    pub fn root(&self) -> &CompileResult {
        match self.documents.last() {
            Some(result) => result,
            None => panic!("compilation produced no documents"),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.documents.iter().any(|r| r.diagnostics.has_errors())
    }
}

/// Compile the document at `root` and everything it includes.
pub fn compile(loader: &dyn SourceLoader, root: &str) -> CompileOutput {
    let (order, cycle_members) = load_documents(loader, root);
    tracing::debug!(documents = order.len(), "include graph loaded");

    let mut program = Program::new();
    let mut documents = Vec::with_capacity(order.len());

    for loaded in order {
        let mut diagnostics = loaded.diagnostics;
        let mut includes = Vec::new();
        let mut ready = !loaded.failed;
        // Includes that loaded but did not compile; the ones that never
        // loaded already carry a diagnostic from the loading walk.
        let mut broken: Vec<(String, Span)> = Vec::new();

        for (include, (alias, path)) in loaded.ast.includes.iter().zip(&loaded.includes) {
            match path.as_ref().and_then(|p| program.document_by_path(p)) {
                Some(id) => includes.push((alias.clone(), id)),
                None => {
                    ready = false;
                    if let Some(p) = path {
                        broken.push((p.clone(), include.span));
                    }
                }
            }
        }

        if !ready {
            if cycle_members.contains(&loaded.path) {
                if !diagnostics.iter().any(|d| d.code == ErrorCode::E2002) {
                    let span = broken.first().map_or(Span::DUMMY, |(_, s)| *s);
                    diagnostics.emit(cycle_member(span));
                }
            } else {
                for (path, span) in &broken {
                    diagnostics.emit(broken_include(path, *span));
                }
            }
        }

        let doc = if ready {
            tidl_resolve::resolve_document(
                &program,
                &loaded.path,
                &loaded.ast,
                &includes,
                &mut diagnostics,
            )
            .map(|doc| program.add_document(doc))
        } else {
            None
        };

        documents.push(CompileResult {
            path: loaded.path,
            diagnostics,
            doc,
        });
    }

    tracing::info!(
        documents = documents.len(),
        errors = documents.iter().any(|d| d.diagnostics.has_errors()),
        "compilation finished"
    );
    CompileOutput { program, documents }
}

/// One loaded and parsed document, pre-resolution.
struct LoadedDoc {
    path: String,
    ast: ast::Document,
    diagnostics: Diagnostics,
    /// Include aliases with the canonical path each resolved to, or
    /// `None` when loading it failed or closed a cycle.
    includes: Vec<(String, Option<String>)>,
    failed: bool,
}

enum LoadState {
    Loading,
    Done,
}

struct LoadDriver<'a> {
    loader: &'a dyn SourceLoader,
    state: FxHashMap<String, LoadState>,
    /// Documents currently being loaded, outermost first.
    stack: Vec<String>,
    /// Every document on a detected include cycle.
    cycle_members: FxHashSet<String>,
    /// Post-order: includes before includers.
    order: Vec<LoadedDoc>,
}

/// Load every document reachable from `root`, depth first.
///
/// Returns the documents in post-order plus the set of paths that sit
/// on an include cycle.
fn load_documents(loader: &dyn SourceLoader, root: &str) -> (Vec<LoadedDoc>, FxHashSet<String>) {
    let mut driver = LoadDriver {
        loader,
        state: FxHashMap::default(),
        stack: Vec::new(),
        cycle_members: FxHashSet::default(),
        order: Vec::new(),
    };

    match loader.load(None, root) {
        Ok((path, text)) => driver.visit(path, &text),
        Err(err) => {
            let mut diagnostics = Diagnostics::new();
            diagnostics.emit(load_failure(root, Span::DUMMY, &err));
            driver.order.push(LoadedDoc {
                path: root.to_string(),
                ast: ast::Document::default(),
                diagnostics,
                includes: Vec::new(),
                failed: true,
            });
        }
    }
    (driver.order, driver.cycle_members)
}

impl LoadDriver<'_> {
    fn visit(&mut self, path: String, text: &str) {
        tracing::debug!(path = %path, "loading document");
        self.state.insert(path.clone(), LoadState::Loading);
        self.stack.push(path.clone());

        let mut diagnostics = Diagnostics::new();
        let tokens = tidl_lexer::lex(text, &mut diagnostics);
        let ast = tidl_parse::parse_document(&tokens, &mut diagnostics);
        // Resolving a partially parsed document would report phantom
        // errors on top of the real ones.
        let mut failed = diagnostics.has_errors();

        let mut includes = Vec::new();
        for include in &ast.includes {
            let alias = include.alias().to_string();
            match self.loader.load(Some(&path), &include.path) {
                Err(err) => {
                    diagnostics.emit(load_failure(&include.path, include.span, &err));
                    failed = true;
                    includes.push((alias, None));
                }
                Ok((canonical, text)) => match self.state.get(&canonical) {
                    Some(LoadState::Loading) => {
                        // Everything from the cycle entry to here is on
                        // the cycle.
                        if let Some(pos) = self.stack.iter().position(|p| *p == canonical) {
                            self.cycle_members.extend(self.stack[pos..].iter().cloned());
                        }
                        diagnostics.emit(circular_include(&include.path, include.span));
                        failed = true;
                        includes.push((alias, None));
                    }
                    Some(LoadState::Done) => includes.push((alias, Some(canonical))),
                    None => {
                        self.visit(canonical.clone(), &text);
                        includes.push((alias, Some(canonical)));
                    }
                },
            }
        }

        self.stack.pop();
        self.state.insert(path.clone(), LoadState::Done);
        self.order.push(LoadedDoc {
            path,
            ast,
            diagnostics,
            includes,
            failed,
        });
    }
}

fn load_failure(path: &str, span: Span, err: &LoadError) -> Diagnostic {
    let diag =
        Diagnostic::fatal(ErrorCode::E2010).with_message(format!("cannot load \"{path}\": {err}"));
    if span == Span::DUMMY {
        diag
    } else {
        diag.with_label(span, "included here")
    }
}

fn circular_include(path: &str, span: Span) -> Diagnostic {
    Diagnostic::fatal(ErrorCode::E2002)
        .with_message(format!("including \"{path}\" creates a cycle"))
        .with_label(span, "cycle enters here")
        .with_note("includes must form an acyclic graph")
}

fn cycle_member(span: Span) -> Diagnostic {
    let diag = Diagnostic::fatal(ErrorCode::E2002)
        .with_message("this file is part of an include cycle")
        .with_note("includes must form an acyclic graph");
    if span == Span::DUMMY {
        diag
    } else {
        diag.with_label(span, "cycle passes through this include")
    }
}

fn broken_include(path: &str, span: Span) -> Diagnostic {
    Diagnostic::fatal(ErrorCode::E2010)
        .with_message(format!("include \"{path}\" did not compile"))
        .with_label(span, "included here")
}
