// Response generation - the seam between the session and an inference backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::sampling::{truncate_at_stop, SamplingConfig};
use crate::config::InferenceConfig;
use crate::errors::AssistantError;

/// A loaded model that can complete prompts.
///
/// Handles are shared between sessions, so `complete` takes `&self`;
/// implementations that need mutable engine state lock internally.
pub trait TextGeneration: Send + Sync {
    /// Produce raw completion text for `prompt`
    fn complete(&self, prompt: &str, config: &SamplingConfig) -> Result<String>;

    /// Get model name/description
    fn name(&self) -> &str;
}

/// Shared handle to a loaded model
pub type LoadedModel = Arc<dyn TextGeneration>;

/// Turns an artifact path into a loaded model. Loading is expensive and
/// blocking; callers go through `ModelCache` so it happens once per path.
pub trait ModelLoader: Send + Sync {
    fn load(&self, path: &Path, options: &InferenceConfig) -> Result<LoadedModel>;
}

/// Generated text plus wall-clock latency of the backend call
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub latency: Duration,
}

impl Completion {
    pub fn latency_seconds(&self) -> f64 {
        self.latency.as_secs_f64()
    }
}

/// Run one blocking completion.
///
/// The sampling config is validated before the backend is touched. Output
/// is cut before the first stop sequence, then trimmed of surrounding
/// whitespace.
pub fn generate(
    model: &dyn TextGeneration,
    prompt: &str,
    config: &SamplingConfig,
) -> Result<Completion, AssistantError> {
    config.validate()?;

    let start = Instant::now();
    let raw = model
        .complete(prompt, config)
        .map_err(AssistantError::Generation)?;
    let latency = start.elapsed();

    debug!(
        "{} produced {} chars in {:.2}s",
        model.name(),
        raw.len(),
        latency.as_secs_f64()
    );

    let kept = match truncate_at_stop(&raw, &config.stop) {
        Some(cut) => &raw[..cut],
        None => raw.as_str(),
    };

    Ok(Completion {
        text: kept.trim().to_string(),
        latency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Canned {
        reply: Result<String, String>,
        calls: AtomicUsize,
    }

    impl TextGeneration for Canned {
        fn complete(&self, _prompt: &str, _config: &SamplingConfig) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(anyhow::Error::msg)
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    fn canned(reply: Result<&str, &str>) -> Canned {
        Canned {
            reply: reply.map(str::to_string).map_err(str::to_string),
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_generate_trims_output() {
        let model = canned(Ok("  \n Start with lifestyle changes.\n  "));
        let completion = generate(&model, ": q\nAnswer:", &SamplingConfig::default()).unwrap();
        assert_eq!(completion.text, "Start with lifestyle changes.");
        assert!(completion.latency_seconds() >= 0.0);
    }

    #[test]
    fn test_generate_cuts_at_stop_sequences() {
        let model = canned(Ok("Start lifestyle changes.\n\n## Extra section the model rambled"));
        let completion = generate(&model, "p", &SamplingConfig::default()).unwrap();
        assert_eq!(completion.text, "Start lifestyle changes.");

        let model = canned(Ok("Recheck in 1 week ## Notes"));
        let completion = generate(&model, "p", &SamplingConfig::default()).unwrap();
        assert_eq!(completion.text, "Recheck in 1 week");
    }

    #[test]
    fn test_generate_without_stop_keeps_full_text() {
        let model = canned(Ok("Line one.\n\n## Line two."));
        let config = SamplingConfig {
            stop: Vec::new(),
            ..Default::default()
        };
        let completion = generate(&model, "p", &config).unwrap();
        assert_eq!(completion.text, "Line one.\n\n## Line two.");
    }

    #[test]
    fn test_generate_maps_backend_failure() {
        let model = canned(Err("out of memory"));
        let err = generate(&model, "p", &SamplingConfig::default()).unwrap_err();
        assert!(matches!(err, AssistantError::Generation(_)));
        assert!(err.to_string().contains("out of memory"));
    }

    #[test]
    fn test_invalid_config_never_reaches_backend() {
        let model = canned(Ok("unused"));
        let config = SamplingConfig {
            top_k: 0,
            ..Default::default()
        };
        let err = generate(&model, "p", &config).unwrap_err();
        assert!(matches!(err, AssistantError::InvalidSampling(_)));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }
}
