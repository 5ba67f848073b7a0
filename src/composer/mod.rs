//! Combine the base prompt with selected prompts into one system prompt.
//!
//! A combined prompt is the base text, a numbered manifest of every component,
//! then each selected prompt's body with its title demoted one heading level.
//! It is written as `combined_<categories>_<timestamp>.md` with a `.json`
//! metadata record beside it.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use crate::models::{
    display_name, Composition, CompositionMetadata, SelectedPrompt, SelectionList,
};
use crate::store::{self, StoreError};

/// Second-resolution, lexically sortable.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const MANIFEST_HEADER: &str = "# Combined Prompts";
const MANIFEST_INTRO: &str = "This system prompt combines the following components:";
const TRANSFORMATIONS_HEADER: &str = "# Additional Transformations";

/// Composer errors.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error(transparent)]
    Read(#[from] StoreError),

    #[error("Failed to write {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Paths written by [`persist`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedComposition {
    pub prompt_path: PathBuf,
    pub metadata_path: PathBuf,
}

/// Reads the base prompt and writes combined prompts to an output directory.
#[derive(Debug, Clone)]
pub struct Composer {
    base_path: PathBuf,
    output_dir: PathBuf,
}

impl Composer {
    pub fn new(base_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Identifier of the base prompt: its file stem.
    pub fn base_name(&self) -> String {
        self.base_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Build the combined prompt for `selections`, stamped with the current time.
    pub fn compose(&self, selections: &SelectionList) -> Result<Composition, ComposeError> {
        let base_text = store::read_text(&self.base_path)?;
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        compose(&self.base_name(), &base_text, selections, &timestamp)
    }

    /// Compose and persist in one step.
    pub fn save(&self, selections: &SelectionList) -> Result<SavedComposition, ComposeError> {
        let composition = self.compose(selections)?;
        persist(&composition, &self.output_dir)
    }
}

/// Build a combined prompt from already-loaded base text.
///
/// Trailing whitespace on the base text is dropped so exactly one blank line
/// separates it from the manifest. Each selected document is read from disk in
/// selection order.
pub fn compose(
    base_name: &str,
    base_text: &str,
    selections: &SelectionList,
    timestamp: &str,
) -> Result<Composition, ComposeError> {
    let mut text = String::with_capacity(base_text.len() * 2);
    text.push_str(base_text.trim_end());
    text.push_str("\n\n");

    text.push_str(MANIFEST_HEADER);
    text.push_str("\n\n");
    text.push_str(MANIFEST_INTRO);
    text.push_str("\n\n");
    text.push_str(&format!("1. {} (foundation)\n", display_name(base_name)));
    for (i, entry) in selections.entries().iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 2, entry.label()));
    }

    text.push('\n');
    text.push_str(TRANSFORMATIONS_HEADER);
    text.push_str("\n\n");

    for entry in selections.entries() {
        let body = store::read_text(&entry.path)?;
        text.push_str(&demote_heading(&body));
        text.push_str("\n\n");
    }

    let metadata = CompositionMetadata {
        timestamp: timestamp.to_string(),
        base_prompt: base_name.to_string(),
        selected_prompts: selections
            .entries()
            .iter()
            .map(|e| SelectedPrompt {
                category: e.category.clone(),
                name: e.name.clone(),
            })
            .collect(),
    };

    Ok(Composition {
        text,
        metadata,
        categories: selections.categories(),
    })
}

/// Push a leading markdown heading down one level (`# Title` → `## Title`).
///
/// Text that does not open with a heading is returned unchanged.
pub fn demote_heading(text: &str) -> Cow<'_, str> {
    if text.starts_with('#') {
        Cow::Owned(format!("#{}", text))
    } else {
        Cow::Borrowed(text)
    }
}

/// `combined_<categories>_<timestamp>`, without extension.
pub fn output_stem(categories: &[String], timestamp: &str) -> String {
    format!("combined_{}_{}", categories.join("_"), timestamp)
}

/// Write the combined prompt and its metadata record into `output_dir`.
///
/// The directory is created if needed. The prompt is written first; if the
/// metadata write then fails the prompt stays on disk.
pub fn persist(
    composition: &Composition,
    output_dir: &Path,
) -> Result<SavedComposition, ComposeError> {
    if !output_dir.exists() {
        fs::create_dir_all(output_dir).map_err(|source| ComposeError::Persist {
            path: output_dir.to_path_buf(),
            source,
        })?;
        tracing::info!("Created output directory: {}", output_dir.display());
    }

    let stem = output_stem(&composition.categories, &composition.metadata.timestamp);
    let prompt_path = output_dir.join(format!("{}.md", stem));
    let metadata_path = output_dir.join(format!("{}.json", stem));

    fs::write(&prompt_path, &composition.text).map_err(|source| ComposeError::Persist {
        path: prompt_path.clone(),
        source,
    })?;
    tracing::debug!("Wrote combined prompt to {}", prompt_path.display());

    let json = serde_json::to_string_pretty(&composition.metadata)?;
    fs::write(&metadata_path, json).map_err(|source| ComposeError::Persist {
        path: metadata_path.clone(),
        source,
    })?;

    Ok(SavedComposition {
        prompt_path,
        metadata_path,
    })
}
