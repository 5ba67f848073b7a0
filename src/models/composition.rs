use serde::{Deserialize, Serialize};

/// Provenance record written as JSON next to each combined prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionMetadata {
    /// Local time the prompt was combined, formatted `%Y%m%d_%H%M%S`.
    pub timestamp: String,
    /// Stem of the base document, e.g. `basic-cleanup`.
    pub base_prompt: String,
    pub selected_prompts: Vec<SelectedPrompt>,
}

/// One `{category, name}` pair in [`CompositionMetadata::selected_prompts`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedPrompt {
    pub category: String,
    pub name: String,
}

/// A combined prompt held in memory before it is written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub text: String,
    pub metadata: CompositionMetadata,
    /// Distinct categories of the selection, sorted.
    pub categories: Vec<String>,
}
