//! Symbol catalog built from a directory scan.
//!
//! Scans the immediate entries of one directory, selects regular `.txt`
//! files, and assigns each discovered symbol a dense identifier starting
//! at 1 (id 0 is the reserved null sentinel with no file behind it).
//!
//! Discovered files are sorted by file name before id assignment so the
//! assignment is deterministic across runs and platforms; native
//! directory-iteration order is filesystem-dependent and is never relied
//! on. Readers and result slots use the same order.

use std::path::{Path, PathBuf};

use crate::domain::{SymbolEntry, SymbolId};

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur while building the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The input path does not exist or is not a directory.
    #[error("directory not found: {path}")]
    DirectoryNotFound {
        /// The offending path.
        path: PathBuf,
    },

    /// Filesystem error during the scan.
    #[error("I/O error scanning {path}: {source}")]
    Io {
        /// The path being scanned.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Symbol Catalog
// =============================================================================

/// Immutable mapping between symbol ids, names, and source files.
///
/// Built once at pipeline start and alive for the whole run. Valid symbol
/// ids are `1..symbol_count()` inclusive-exclusive; the sentinel id 0 has
/// no entry.
#[derive(Debug, Clone)]
pub struct SymbolCatalog {
    entries: Vec<SymbolEntry>,
}

impl SymbolCatalog {
    /// Scan a directory and build the catalog.
    ///
    /// Selects only regular files with a `.txt` extension among the
    /// immediate (non-recursive) entries. The symbol name is the file name
    /// minus its extension. Read-only filesystem access, no other side
    /// effects.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DirectoryNotFound`] if `directory` does not
    /// exist or is not a directory, or [`CatalogError::Io`] if the scan
    /// fails partway.
    pub fn build(directory: &Path) -> Result<Self, CatalogError> {
        if !directory.is_dir() {
            return Err(CatalogError::DirectoryNotFound {
                path: directory.to_path_buf(),
            });
        }

        let read_dir = std::fs::read_dir(directory).map_err(|source| CatalogError::Io {
            path: directory.to_path_buf(),
            source,
        })?;

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| CatalogError::Io {
                path: directory.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
                files.push(path);
            }
        }

        // Sort by file name for a deterministic id assignment.
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let entries: Vec<SymbolEntry> = files
            .into_iter()
            .enumerate()
            .map(|(i, path)| {
                let symbol_name = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();

                SymbolEntry {
                    symbol_id: SymbolId::new(i as u32 + 1),
                    symbol_name,
                    source_path: path,
                }
            })
            .collect();

        tracing::debug!(
            directory = %directory.display(),
            symbols = entries.len(),
            "Symbol catalog built"
        );

        Ok(Self { entries })
    }

    /// Number of symbol ids including the reserved sentinel.
    ///
    /// Equals discovered files + 1; valid real ids are `1..symbol_count()`.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.entries.len() + 1
    }

    /// Catalog entries in id order, sentinel excluded.
    #[must_use]
    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    /// Look up the entry for a symbol id.
    ///
    /// Returns `None` for the sentinel and for out-of-range ids.
    #[must_use]
    pub fn entry(&self, id: SymbolId) -> Option<&SymbolEntry> {
        if id.is_null() {
            return None;
        }
        self.entries.get(id.slot())
    }

    /// Check whether the scan found no symbol files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn build_missing_directory_fails() {
        let result = SymbolCatalog::build(Path::new("/nonexistent/tick/data"));
        assert!(matches!(
            result,
            Err(CatalogError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn build_on_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "AAPL.txt", "");

        let result = SymbolCatalog::build(&dir.path().join("AAPL.txt"));
        assert!(matches!(
            result,
            Err(CatalogError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn ids_assigned_in_name_order_starting_at_one() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "MSFT.txt", "");
        write_file(dir.path(), "AAPL.txt", "");
        write_file(dir.path(), "GOOGL.txt", "");

        let catalog = SymbolCatalog::build(dir.path()).unwrap();
        assert_eq!(catalog.symbol_count(), 4);

        let names: Vec<&str> = catalog
            .entries()
            .iter()
            .map(|e| e.symbol_name.as_str())
            .collect();
        assert_eq!(names, vec!["AAPL", "GOOGL", "MSFT"]);

        for (i, entry) in catalog.entries().iter().enumerate() {
            assert_eq!(entry.symbol_id, SymbolId::new(i as u32 + 1));
        }
    }

    #[test]
    fn non_txt_files_and_subdirectories_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "AAPL.txt", "");
        write_file(dir.path(), "notes.csv", "");
        write_file(dir.path(), "README", "");
        fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let catalog = SymbolCatalog::build(dir.path()).unwrap();
        assert_eq!(catalog.entries().len(), 1);
        assert_eq!(catalog.entries()[0].symbol_name, "AAPL");
    }

    #[test]
    fn entry_lookup_rejects_sentinel_and_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "AAPL.txt", "");

        let catalog = SymbolCatalog::build(dir.path()).unwrap();
        assert!(catalog.entry(SymbolId::NULL).is_none());
        assert!(catalog.entry(SymbolId::new(1)).is_some());
        assert!(catalog.entry(SymbolId::new(2)).is_none());
    }

    #[test]
    fn empty_directory_yields_sentinel_only_count() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = SymbolCatalog::build(dir.path()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.symbol_count(), 1);
    }
}
