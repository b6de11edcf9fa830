// Model registry - closed set of selectable models

use std::path::Path;

use crate::config::ModelEntry;
use crate::errors::AssistantError;

/// Ordered label → artifact path mapping, fixed for the process lifetime
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
}

impl ModelRegistry {
    pub fn new(entries: Vec<ModelEntry>) -> Self {
        Self { entries }
    }

    /// Resolve a label to its artifact path
    pub fn path_for(&self, label: &str) -> Result<&Path, AssistantError> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.path.as_path())
            .ok_or_else(|| AssistantError::Configuration(label.to_string()))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.iter().any(|e| e.label == label)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.label == label)
    }

    /// Labels in display order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    /// Label after `label`, wrapping around; the first label if unknown
    pub fn next_label(&self, label: &str) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let next = self.index_of(label).map(|i| (i + 1) % self.entries.len()).unwrap_or(0);
        Some(self.entries[next].label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
