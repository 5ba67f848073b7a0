use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::document::display_name;

/// A document chosen during a combine session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub category: String,
    pub name: String,
    pub path: PathBuf,
}

impl SelectionEntry {
    /// Manifest label, e.g. `Grammar: Fix Typos`.
    pub fn label(&self) -> String {
        format!("{}: {}", display_name(&self.category), display_name(&self.name))
    }
}

/// Result of [`SelectionList::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadySelected,
}

/// Ordered list of selected documents, unique by path.
///
/// Entries keep insertion order; that order drives both the combined prompt's
/// manifest and the order bodies are appended in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionList {
    entries: Vec<SelectionEntry>,
}

impl SelectionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: SelectionEntry) -> AddOutcome {
        if self.contains(&entry.path) {
            return AddOutcome::AlreadySelected;
        }
        self.entries.push(entry);
        AddOutcome::Added
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct category names, sorted. Used to build output filenames.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self.entries.iter().map(|e| e.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }
}
