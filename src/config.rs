use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::composer::Composer;
use crate::generation::{DEFAULT_HOST, DEFAULT_MODEL};
use crate::rewrite::{BatchOptions, DEFAULT_DELAY};
use crate::store::DocumentStore;

const APP_NAME: &str = "prompt-library";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Root of the categorized prompt library.
    pub prompts_dir: PathBuf,
    /// Name of the flattened copy, created inside `prompts_dir`.
    pub flat_dir_name: String,
    /// Base prompt, relative to `prompts_dir`.
    pub base_prompt: PathBuf,
    /// Where combined prompts are written.
    pub output_dir: PathBuf,
    pub ollama_host: String,
    pub model: String,
    /// Per-request timeout for the generation service. `None` waits forever.
    pub request_timeout_secs: Option<u64>,
    pub rewrite_delay_ms: u64,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            prompts_dir: PathBuf::from("system-prompts"),
            flat_dir_name: "flat-structure".to_string(),
            base_prompt: PathBuf::from("basic").join("basic-cleanup.md"),
            output_dir: PathBuf::from("custom-system-prompts"),
            ollama_host: DEFAULT_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: Some(300),
            rewrite_delay_ms: DEFAULT_DELAY.as_millis() as u64,
        }
    }
}

impl LibraryConfig {
    /// Load configuration from the user's config directory.
    /// Returns default config if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        let loaded = get_config_path().and_then(|path| Self::load_from(&path));
        match loaded {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load from an explicit path; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn flat_dir(&self) -> PathBuf {
        self.prompts_dir.join(&self.flat_dir_name)
    }

    pub fn base_prompt_path(&self) -> PathBuf {
        self.prompts_dir.join(&self.base_prompt)
    }

    /// Top-level directories that are not categories: the flattened copy and
    /// the directory holding the base prompt.
    pub fn reserved_dirs(&self) -> Vec<String> {
        let mut reserved = vec![self.flat_dir_name.clone()];
        if let Some(Component::Normal(first)) = self.base_prompt.components().next() {
            if self.base_prompt.components().count() > 1 {
                reserved.push(first.to_string_lossy().into_owned());
            }
        }
        reserved
    }

    pub fn store(&self) -> DocumentStore {
        DocumentStore::new(&self.prompts_dir, self.reserved_dirs())
    }

    pub fn composer(&self) -> Composer {
        Composer::new(self.base_prompt_path(), &self.output_dir)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            delay: Duration::from_millis(self.rewrite_delay_ms),
        }
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reserved_dirs() {
        let config = LibraryConfig::default();
        assert_eq!(config.reserved_dirs(), vec!["flat-structure", "basic"]);
    }

    #[test]
    fn test_base_prompt_at_root_reserves_nothing_extra() {
        let config = LibraryConfig {
            base_prompt: PathBuf::from("basic-cleanup.md"),
            ..Default::default()
        };
        assert_eq!(config.reserved_dirs(), vec!["flat-structure"]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"model": "mistral", "rewrite_delay_ms": 0}"#).unwrap();

        let config = LibraryConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "mistral");
        assert_eq!(config.rewrite_delay_ms, 0);
        assert_eq!(config.flat_dir_name, "flat-structure");
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = LibraryConfig::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, LibraryConfig::default());
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(LibraryConfig::load_from(&path).is_err());
    }
}
