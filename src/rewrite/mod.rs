//! Batch rewrite of the flattened prompt store.
//!
//! Every prompt is sent to the generation service wrapped in a fixed
//! instruction, the reply is passed through [`clean`], and the file is
//! overwritten in place. One document at a time, with a fixed pause after
//! each successful call. Failures are recorded per document and never stop
//! the batch.

mod clean;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use clean::clean;

use crate::generation::GenerationService;
use crate::store::{self, StoreError};

/// Pause after each successful generation call.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

const INSTRUCTION_HEAD: &str = r#"I have a system prompt that needs to be updated to include clear workflow and output formatting instructions with consistent person references.

Here is the current system prompt:

```
"#;

const INSTRUCTION_TAIL: &str = r#"
```

Please rewrite this system prompt to explicitly include:

1. A clear workflow instruction that states:
   - "The user will provide text" (always refer to the user in the third person)
   - "You will apply the transformation described in the prompt" (always address the AI assistant in the second person)
   - "You will return the edited/transformed text" (always address the AI assistant in the second person)

2. Output formatting instructions that specify:
   - "Return only the transformed text"
   - "Do not add any commentary before or after the output"
   - "Do not include phrases like 'Here's the transformed text:' or 'I've applied the changes:'"

IMPORTANT:
- Always refer to the user in the third person (e.g., "The user will provide text...")
- Always address the AI assistant in the second person (e.g., "You will apply the transformation...")
- Never use first-person language for the AI (e.g., do NOT use "I will apply...")
- Never use second-person language for the user (e.g., do NOT use "You will provide...")

Keep the original transformation instructions intact; only add the workflow and formatting instructions with the correct person references.
Return only the updated system prompt, nothing else. Do not include phrases like "Here is the rewritten system prompt:" or any other introductory or concluding text."#;

/// Wrap a prompt in the rewrite instruction.
pub fn build_instruction(current_prompt: &str) -> String {
    let mut instruction =
        String::with_capacity(INSTRUCTION_HEAD.len() + current_prompt.len() + INSTRUCTION_TAIL.len());
    instruction.push_str(INSTRUCTION_HEAD);
    instruction.push_str(current_prompt);
    instruction.push_str(INSTRUCTION_TAIL);
    instruction
}

/// Why a document was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Readme,
    Empty,
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Updated,
    Skipped(SkipReason),
    Failed(String),
}

/// A document the batch could not rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub name: String,
    pub detail: String,
}

/// Per-document progress handed to the caller's callback.
///
/// `index` is the 1-based position in the batch. `Started` fires before the
/// document is read or sent, `Finished` once its outcome is known.
#[derive(Debug, Clone)]
pub enum BatchEvent<'a> {
    Started {
        index: usize,
        total: usize,
        name: &'a str,
    },
    Finished {
        index: usize,
        total: usize,
        name: &'a str,
        outcome: &'a DocumentOutcome,
    },
}

/// Accumulated result of [`run_batch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    fn record(mut self, name: &str, outcome: &DocumentOutcome) -> Self {
        match outcome {
            DocumentOutcome::Updated => self.updated += 1,
            DocumentOutcome::Skipped(_) => self.skipped += 1,
            DocumentOutcome::Failed(detail) => self.failures.push(BatchFailure {
                name: name.to_string(),
                detail: detail.clone(),
            }),
        }
        self
    }

    /// Documents visited, whatever the outcome.
    pub fn processed(&self) -> usize {
        self.updated + self.skipped + self.failures.len()
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
        }
    }
}

/// Prompts in the flattened store, in the order the batch visits them.
pub fn discover(flat_dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    store::list_markdown_files(flat_dir)
}

/// Files whose name marks them as documentation rather than a prompt.
pub fn is_readme(name: &str) -> bool {
    name.to_uppercase().contains("README")
}

/// Rewrite every document in order, reporting progress to `on_event`.
pub async fn run_batch<S, F>(
    documents: &[PathBuf],
    service: &S,
    options: &BatchOptions,
    mut on_event: F,
) -> BatchReport
where
    S: GenerationService,
    F: FnMut(&BatchEvent<'_>),
{
    let total = documents.len();
    let mut report = BatchReport {
        total,
        ..Default::default()
    };

    for (i, path) in documents.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        on_event(&BatchEvent::Started {
            index: i + 1,
            total,
            name: &name,
        });

        let outcome = rewrite_document(path, &name, service).await;
        match &outcome {
            DocumentOutcome::Updated => tracing::debug!("Rewrote {}", name),
            DocumentOutcome::Skipped(reason) => tracing::debug!("Skipped {} ({:?})", name, reason),
            DocumentOutcome::Failed(detail) => {
                tracing::warn!("Failed to rewrite {}: {}", name, detail)
            }
        }

        on_event(&BatchEvent::Finished {
            index: i + 1,
            total,
            name: &name,
            outcome: &outcome,
        });
        report = report.record(&name, &outcome);

        if outcome == DocumentOutcome::Updated && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
    }

    tracing::info!(
        "Rewrite finished: {} updated, {} skipped, {} failed",
        report.updated,
        report.skipped,
        report.failures.len()
    );
    report
}

/// Rewrite a single document in place.
pub async fn rewrite_document<S: GenerationService>(
    path: &Path,
    name: &str,
    service: &S,
) -> DocumentOutcome {
    if is_readme(name) {
        return DocumentOutcome::Skipped(SkipReason::Readme);
    }

    let current = match store::read_text(path) {
        Ok(text) => text,
        Err(e) => return DocumentOutcome::Failed(e.to_string()),
    };
    if current.trim().is_empty() {
        return DocumentOutcome::Skipped(SkipReason::Empty);
    }

    let reply = match service.generate(&build_instruction(&current)).await {
        Ok(reply) => reply,
        Err(e) => return DocumentOutcome::Failed(e.to_string()),
    };

    let cleaned = clean(&reply);
    if cleaned.is_empty() {
        return DocumentOutcome::Failed(
            "generation service returned no prompt body after cleanup".to_string(),
        );
    }

    match fs::write(path, cleaned) {
        Ok(()) => DocumentOutcome::Updated,
        Err(e) => DocumentOutcome::Failed(format!("failed to write {}: {}", path.display(), e)),
    }
}
