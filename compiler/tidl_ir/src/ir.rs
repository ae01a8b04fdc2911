//! Resolved, immutable IR type graph.
//!
//! Produced once per document by the resolver and shared read-only by
//! every consumer (codegen backends, the binary codec). Cross-document
//! references are [`DefId`]s resolved during compilation and cached here;
//! nothing is re-resolved at codec runtime.

use rustc_hash::FxHashMap;

pub use crate::ast::{BaseType, Requiredness};

/// Identity of one resolved document within a [`Program`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocId(pub u32);

/// Stable identity of a definition: owning document plus index into that
/// document's per-kind table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DefId {
    pub doc: DocId,
    pub index: u32,
}

/// A resolved reference to a named definition, tagged with its kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NamedRef {
    Typedef(DefId),
    Struct(DefId),
    Enum(DefId),
}

/// A fully resolved type.
///
/// A closed tagged variant: the type system has no user-extensible kinds,
/// so consumers match exhaustively.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Base(BaseType),
    List(Box<Type>),
    Set(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Named(NamedRef),
}

/// A resolved, typed constant value.
///
/// Used for `const` definitions and for field defaults. Struct values are
/// keyed by field id, sorted ascending.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Bool(bool),
    Byte(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Double(f64),
    String(String),
    List(Vec<ConstValue>),
    Set(Vec<ConstValue>),
    Map(Vec<(ConstValue, ConstValue)>),
    Struct(Vec<(i16, ConstValue)>),
}

/// A resolved field.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub id: i16,
    pub requiredness: Requiredness,
    pub ty: Type,
    pub name: String,
    pub default: Option<ConstValue>,
}

impl Field {
    pub fn is_required(&self) -> bool {
        self.requiredness == Requiredness::Required
    }
}

/// A resolved struct or exception.
#[derive(Clone, Debug, PartialEq)]
pub struct Struct {
    pub name: String,
    pub is_exception: bool,
    pub fields: Vec<Field>,
}

impl Struct {
    /// Look up a field by wire id.
    pub fn field_by_id(&self, id: i16) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Look up a field by name.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A resolved enum: ordered (constant name, value) pairs.
#[derive(Clone, Debug, PartialEq)]
pub struct Enum {
    pub name: String,
    pub variants: Vec<(String, i32)>,
}

impl Enum {
    /// Whether `value` is one of this enum's defined constants.
    pub fn contains_value(&self, value: i32) -> bool {
        self.variants.iter().any(|(_, v)| *v == value)
    }

    /// The value of the constant named `name`, if defined.
    pub fn value_of(&self, name: &str) -> Option<i32> {
        self.variants
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

/// A resolved typedef alias.
#[derive(Clone, Debug, PartialEq)]
pub struct Typedef {
    pub name: String,
    pub ty: Type,
}

/// A resolved service.
#[derive(Clone, Debug, PartialEq)]
pub struct Service {
    pub name: String,
    pub extends: Option<DefId>,
    pub functions: Vec<Function>,
}

/// A resolved service function.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: String,
    pub oneway: bool,
    /// `None` means `void`.
    pub return_ty: Option<Type>,
    pub args: Vec<Field>,
    pub throws: Vec<Field>,
}

/// A resolved constant definition.
#[derive(Clone, Debug, PartialEq)]
pub struct Const {
    pub name: String,
    pub ty: Type,
    pub value: ConstValue,
}

/// A namespace declaration, passed through to codegen unmodified.
#[derive(Clone, Debug, PartialEq)]
pub struct Namespace {
    pub scope: String,
    pub value: String,
}

/// A resolved include: the alias by which the included document's names
/// are qualified, and the document it resolved to.
#[derive(Clone, Debug, PartialEq)]
pub struct IncludeRef {
    pub alias: String,
    pub doc: DocId,
}

/// Index entry for name lookup within a document.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NamedDef {
    Typedef(u32),
    Struct(u32),
    Enum(u32),
    Service(u32),
    Const(u32),
}

/// One resolved document: the unit a codegen backend traverses.
///
/// All names are already resolved and all invariants validated; backends
/// and the codec never re-validate.
#[derive(Clone, Debug, Default)]
pub struct Document {
    pub path: String,
    pub namespaces: Vec<Namespace>,
    pub includes: Vec<IncludeRef>,
    pub typedefs: Vec<Typedef>,
    pub enums: Vec<Enum>,
    pub structs: Vec<Struct>,
    pub services: Vec<Service>,
    pub consts: Vec<Const>,
    names: FxHashMap<String, NamedDef>,
}

impl Document {
    /// Create an empty document for `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Document {
            path: path.into(),
            ..Document::default()
        }
    }

    /// Look up a definition declared in this document.
    pub fn lookup(&self, name: &str) -> Option<NamedDef> {
        self.names.get(name).copied()
    }

    /// Look up the document id of an include by its alias.
    pub fn include_by_alias(&self, alias: &str) -> Option<DocId> {
        self.includes
            .iter()
            .find(|inc| inc.alias == alias)
            .map(|inc| inc.doc)
    }

    /// Register a definition in the name index.
    ///
    /// The resolver guarantees uniqueness before calling this.
    pub fn index_name(&mut self, name: impl Into<String>, def: NamedDef) {
        self.names.insert(name.into(), def);
    }
}

/// The arena of all resolved documents in one compilation.
#[derive(Clone, Debug, Default)]
pub struct Program {
    docs: Vec<Document>,
    by_path: FxHashMap<String, DocId>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    /// The id the next call to [`Program::add_document`] will assign.
    ///
    /// The resolver uses this to mint [`DefId`]s for the document it is
    /// building before that document is added to the program.
    pub fn next_doc_id(&self) -> DocId {
        DocId(self.docs.len() as u32)
    }

    /// Add a resolved document, returning its id.
    pub fn add_document(&mut self, doc: Document) -> DocId {
        let id = DocId(u32::try_from(self.docs.len()).unwrap_or_else(|_| {
            panic!("program exceeds {} documents", u32::MAX);
        }));
        self.by_path.insert(doc.path.clone(), id);
        self.docs.push(doc);
        id
    }

    pub fn document(&self, id: DocId) -> &Document {
        &self.docs[id.0 as usize]
    }

    pub fn document_by_path(&self, path: &str) -> Option<DocId> {
        self.by_path.get(path).copied()
    }

    pub fn documents(&self) -> impl Iterator<Item = (DocId, &Document)> {
        self.docs
            .iter()
            .enumerate()
            .map(|(i, d)| (DocId(i as u32), d))
    }

    pub fn typedef(&self, id: DefId) -> &Typedef {
        &self.document(id.doc).typedefs[id.index as usize]
    }

    pub fn struct_def(&self, id: DefId) -> &Struct {
        &self.document(id.doc).structs[id.index as usize]
    }

    pub fn enum_def(&self, id: DefId) -> &Enum {
        &self.document(id.doc).enums[id.index as usize]
    }

    pub fn service(&self, id: DefId) -> &Service {
        &self.document(id.doc).services[id.index as usize]
    }

    /// Chase typedef aliases until reaching a non-typedef type.
    ///
    /// Typedef chains are validated acyclic during resolution, so this
    /// always terminates.
    pub fn canonical<'a>(&'a self, mut ty: &'a Type) -> &'a Type {
        while let Type::Named(NamedRef::Typedef(id)) = ty {
            ty = &self.typedef(*id).ty;
        }
        ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_program() -> (Program, DocId) {
        let mut doc = Document::new("a.tidl");
        doc.typedefs.push(Typedef {
            name: "UserId".to_string(),
            ty: Type::Base(BaseType::I64),
        });
        doc.index_name("UserId", NamedDef::Typedef(0));
        doc.structs.push(Struct {
            name: "User".to_string(),
            is_exception: false,
            fields: vec![Field {
                id: 1,
                requiredness: Requiredness::Required,
                ty: Type::Base(BaseType::String),
                name: "name".to_string(),
                default: None,
            }],
        });
        doc.index_name("User", NamedDef::Struct(0));

        let mut program = Program::new();
        let id = program.add_document(doc);
        (program, id)
    }

    #[test]
    fn test_document_lookup() {
        let (program, id) = sample_program();
        let doc = program.document(id);
        assert_eq!(doc.lookup("UserId"), Some(NamedDef::Typedef(0)));
        assert_eq!(doc.lookup("User"), Some(NamedDef::Struct(0)));
        assert_eq!(doc.lookup("Missing"), None);
    }

    #[test]
    fn test_canonical_chases_typedefs() {
        let (program, id) = sample_program();
        let ty = Type::Named(NamedRef::Typedef(DefId { doc: id, index: 0 }));
        assert_eq!(program.canonical(&ty), &Type::Base(BaseType::I64));
    }

    #[test]
    fn test_struct_field_lookup() {
        let (program, id) = sample_program();
        let s = program.struct_def(DefId { doc: id, index: 0 });
        assert_eq!(s.field_by_id(1).map(|f| f.name.as_str()), Some("name"));
        assert!(s.field_by_id(2).is_none());
        assert!(s.field_by_name("name").is_some());
    }

    #[test]
    fn test_enum_helpers() {
        let e = Enum {
            name: "Status".to_string(),
            variants: vec![("OK".to_string(), 0), ("GONE".to_string(), 10)],
        };
        assert!(e.contains_value(10));
        assert!(!e.contains_value(5));
        assert_eq!(e.value_of("OK"), Some(0));
        assert_eq!(e.value_of("NOPE"), None);
    }

    #[test]
    fn test_document_by_path() {
        let (program, id) = sample_program();
        assert_eq!(program.document_by_path("a.tidl"), Some(id));
        assert_eq!(program.document_by_path("b.tidl"), None);
    }
}
