//! Source loading.
//!
//! The driver is generic over where documents come from: the filesystem
//! in the CLI and build-script cases, or an in-memory table in tests and
//! embedding scenarios.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Failure to load an included document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {path}")]
    NotFound { path: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Resolves include paths and loads document text.
pub trait SourceLoader {
    /// Load the document `path` as written in an include (or on the
    /// command line, when `from` is `None`, for the root document).
    ///
    /// Returns the canonical path, which keys the document for cycle
    /// detection and deduplication, and the source text.
    fn load(&self, from: Option<&str>, path: &str) -> Result<(String, String), LoadError>;
}

/// Loads documents from the filesystem.
///
/// Includes are tried relative to the including file first, then as
/// given, then against each search path in order.
#[derive(Clone, Debug, Default)]
pub struct FsLoader {
    search_paths: Vec<PathBuf>,
}

impl FsLoader {
    pub fn new() -> Self {
        FsLoader::default()
    }

    pub fn with_search_paths(paths: Vec<PathBuf>) -> Self {
        FsLoader {
            search_paths: paths,
        }
    }

    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }
}

impl SourceLoader for FsLoader {
    fn load(&self, from: Option<&str>, path: &str) -> Result<(String, String), LoadError> {
        let mut candidates = Vec::new();
        if let Some(from) = from {
            if let Some(dir) = Path::new(from).parent() {
                candidates.push(dir.join(path));
            }
        }
        candidates.push(PathBuf::from(path));
        for search in &self.search_paths {
            candidates.push(search.join(path));
        }

        for candidate in candidates {
            match fs::read_to_string(&candidate) {
                Ok(text) => {
                    // One file reached through different includes must
                    // get one key.
                    let key = fs::canonicalize(&candidate)
                        .unwrap_or(candidate)
                        .to_string_lossy()
                        .into_owned();
                    return Ok((key, text));
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(LoadError::Io {
                        path: candidate.to_string_lossy().into_owned(),
                        source: err,
                    });
                }
            }
        }
        Err(LoadError::NotFound {
            path: path.to_string(),
        })
    }
}

/// Loads documents from an in-memory table, keyed by exact path.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    files: FxHashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        MemoryLoader::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, _from: Option<&str>, path: &str) -> Result<(String, String), LoadError> {
        self.files
            .get(path)
            .map(|text| (path.to_string(), text.clone()))
            .ok_or_else(|| LoadError::NotFound {
                path: path.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_loader() {
        let mut loader = MemoryLoader::new();
        loader.insert("a.tidl", "struct A {}");
        let (path, text) = match loader.load(None, "a.tidl") {
            Ok(loaded) => loaded,
            Err(err) => panic!("{err}"),
        };
        assert_eq!(path, "a.tidl");
        assert_eq!(text, "struct A {}");
        assert!(matches!(
            loader.load(Some("a.tidl"), "b.tidl"),
            Err(LoadError::NotFound { .. })
        ));
    }
}
