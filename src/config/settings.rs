// Configuration structs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use super::constants::*;
use crate::models::SamplingConfig;

/// One selectable model: a display label and the artifact it loads from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub label: String,
    pub path: PathBuf,
}

impl ModelEntry {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// Options passed to the backend when a model is loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Context window in tokens
    pub context_size: usize,
    /// Worker threads for inference
    pub threads: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            context_size: DEFAULT_CONTEXT_SIZE,
            threads: DEFAULT_THREADS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model registry, in display order
    pub models: Vec<ModelEntry>,

    /// Label selected when a session starts
    pub default_model: String,

    /// Instruction label placed before the question in the prompt (usually empty)
    pub instruction: String,

    pub inference: InferenceConfig,

    pub sampling: SamplingConfig,

    /// Destination of the feedback export (overwritten on every save)
    pub feedback_path: PathBuf,

    /// Use the full-screen interface (default: true). Falls back to line
    /// mode when stdout is not a terminal.
    pub tui_enabled: bool,

    /// Directory for the log file while the TUI owns the terminal
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = data_dir();
        let models_dir = data_dir.join("models");

        Self {
            models: DEFAULT_MODEL_LABELS
                .iter()
                .map(|label| ModelEntry::new(*label, models_dir.join(format!("{label}.gguf"))))
                .collect(),
            default_model: DEFAULT_MODEL_LABEL.to_string(),
            instruction: String::new(),
            inference: InferenceConfig::default(),
            sampling: SamplingConfig::default(),
            feedback_path: PathBuf::from(DEFAULT_FEEDBACK_FILE),
            tui_enabled: true,
            log_dir: data_dir.join("logs"),
        }
    }
}

impl Config {
    /// Reject configurations the session could not run with
    pub fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            bail!("No models configured");
        }

        let mut seen = HashSet::new();
        for entry in &self.models {
            if entry.label.trim().is_empty() {
                bail!("Model label must not be empty (path: {})", entry.path.display());
            }
            if !seen.insert(entry.label.as_str()) {
                bail!("Duplicate model label '{}'", entry.label);
            }
        }

        if !seen.contains(self.default_model.as_str()) {
            bail!(
                "Default model '{}' is not one of the configured models",
                self.default_model
            );
        }

        if self.inference.context_size == 0 {
            bail!("inference.context_size must be greater than 0");
        }
        if self.inference.threads == 0 {
            bail!("inference.threads must be greater than 0");
        }
        if self.sampling.max_tokens >= self.inference.context_size {
            bail!(
                "sampling.max_tokens ({}) must be smaller than inference.context_size ({})",
                self.sampling.max_tokens,
                self.inference.context_size
            );
        }

        self.sampling.validate().map_err(anyhow::Error::msg)?;

        Ok(())
    }
}

/// `~/.guideline-assistant`, or the working directory when there is no home
fn data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DATA_DIR_NAME))
}
