use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A named group of prompts, backed by a directory under the library root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Directory name, used verbatim in metadata and output filenames.
    pub name: String,
    pub path: PathBuf,
}

impl Category {
    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }
}

/// A single prompt file.
///
/// The base document lives outside any category, so `category` is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub category: Option<String>,
    /// Filename without the `.md` extension.
    pub name: String,
    pub path: PathBuf,
}

impl Document {
    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }
}

/// Turn a file or directory name into a menu label.
///
/// Word separators (`-`, `_`) become spaces and every word is title-cased, so
/// `fix-typos` renders as `Fix Typos`.
pub fn display_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut at_word_start = true;
    for c in raw.chars() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_dashes() {
        assert_eq!(display_name("fix-typos"), "Fix Typos");
    }

    #[test]
    fn test_display_name_underscores_and_case() {
        assert_eq!(display_name("EMAIL_formatting"), "Email Formatting");
    }

    #[test]
    fn test_display_name_digits_break_words() {
        assert_eq!(display_name("3d-models"), "3D Models");
    }
}
