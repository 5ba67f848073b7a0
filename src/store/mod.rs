//! Read access to the prompt library on disk.
//!
//! The library root holds one directory per category, each containing `.md`
//! prompt files. A few directory names are reserved (the flattened copy and the
//! directory holding the base prompt) and never show up as categories.

mod flatten;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{Category, Document};

pub use flatten::{flatten, safe_flattened_name, FlattenReport, FlattenedCopy};

/// Extension every prompt document carries.
pub const DOCUMENT_EXTENSION: &str = "md";

/// Document store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Prompt store unavailable: {} is missing or not a directory", .0.display())]
    StoreUnavailable(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A category together with its documents, as shown in the combine menus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryListing {
    pub category: Category,
    pub documents: Vec<Document>,
}

/// Read-only view over a prompt library root.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
    reserved: Vec<String>,
}

impl DocumentStore {
    /// Create a store rooted at `root`. Subdirectories named in `reserved` are
    /// hidden from [`list_categories`](Self::list_categories).
    pub fn new<I, S>(root: impl Into<PathBuf>, reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root: root.into(),
            reserved: reserved.into_iter().map(Into::into).collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every non-reserved immediate subdirectory of the root, sorted by name.
    pub fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::StoreUnavailable(self.root.clone()));
        }

        let entries =
            fs::read_dir(&self.root).map_err(|e| StoreError::io(&self.root, e))?;

        let mut categories = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.root, e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.reserved.iter().any(|r| *r == name) {
                continue;
            }
            categories.push(Category { name, path });
        }
        categories.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(
            "Found {} categories under {}",
            categories.len(),
            self.root.display()
        );
        Ok(categories)
    }

    /// Every `.md` file directly inside a category, sorted by name.
    pub fn list_documents(&self, category: &Category) -> Result<Vec<Document>, StoreError> {
        if !category.path.is_dir() {
            return Err(StoreError::StoreUnavailable(category.path.clone()));
        }

        let documents = list_markdown_files(&category.path)?
            .into_iter()
            .filter_map(|path| {
                let name = path.file_stem()?.to_string_lossy().into_owned();
                Some(Document {
                    category: Some(category.name.clone()),
                    name,
                    path,
                })
            })
            .collect();

        Ok(documents)
    }

    /// All categories with their documents, captured once per session.
    pub fn catalog(&self) -> Result<Vec<CategoryListing>, StoreError> {
        self.list_categories()?
            .into_iter()
            .map(|category| {
                let documents = self.list_documents(&category)?;
                Ok(CategoryListing {
                    category,
                    documents,
                })
            })
            .collect()
    }
}

/// Read a document's full UTF-8 text.
pub fn read_text(path: &Path) -> Result<String, StoreError> {
    fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// `.md` files directly under `dir` (no recursion), sorted by filename.
pub fn list_markdown_files(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    if !dir.is_dir() {
        return Err(StoreError::StoreUnavailable(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))? {
        let entry = entry.map_err(|e| StoreError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && is_document(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

pub(crate) fn is_document(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == DOCUMENT_EXTENSION)
}
