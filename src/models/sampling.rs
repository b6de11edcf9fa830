// Sampling configuration
// Controls how the next-token distribution is truncated during generation

use serde::{Deserialize, Serialize};

use crate::config::constants::DEFAULT_SEED;
use crate::errors::AssistantError;

/// Sampling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Hard cap on generated tokens (>= 1)
    pub max_tokens: usize,

    /// Sampling randomness, 0.0 = greedy (0.0 - 2.0)
    pub temperature: f64,

    /// Nucleus truncation (0.0 exclusive - 1.0)
    pub top_p: f64,

    /// Top-k truncation (>= 1)
    pub top_k: usize,

    /// Literal strings that end generation; the output is cut right before them
    pub stop: Vec<String>,

    /// Seed for the sampler
    pub seed: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 120,
            temperature: 0.2,
            top_p: 0.6,
            top_k: 30,
            stop: vec!["\n\n".to_string(), "##".to_string()],
            seed: DEFAULT_SEED,
        }
    }
}

impl SamplingConfig {
    /// Reject combinations the backend cannot honour, before any blocking call
    pub fn validate(&self) -> Result<(), AssistantError> {
        let invalid = |reason: String| Err(AssistantError::InvalidSampling(reason));

        if self.max_tokens == 0 {
            return invalid("max_tokens must be at least 1".to_string());
        }
        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            return invalid(format!(
                "temperature must be in [0, 2], got {}",
                self.temperature
            ));
        }
        if !self.top_p.is_finite() || self.top_p <= 0.0 || self.top_p > 1.0 {
            return invalid(format!("top_p must be in (0, 1], got {}", self.top_p));
        }
        if self.top_k == 0 {
            return invalid("top_k must be at least 1".to_string());
        }
        if self.stop.iter().any(|s| s.is_empty()) {
            return invalid("stop sequences must not be empty".to_string());
        }

        Ok(())
    }
}

/// Byte offset of the earliest stop sequence in `text`, if any
pub fn truncate_at_stop(text: &str, stop: &[String]) -> Option<usize> {
    stop.iter().filter_map(|s| text.find(s.as_str())).min()
}
