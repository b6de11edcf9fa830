// Candle GGUF loader - quantized llama-family inference in pure Rust
//
// Artifacts are single .gguf files. The tokenizer is read from
// `<stem>.tokenizer.json` next to the artifact, or `tokenizer.json` in the
// same directory.

use anyhow::{anyhow, bail, Context, Result};
use candle_core::quantized::gguf_file;
use candle_core::{Device, Tensor};
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::quantized_llama::ModelWeights;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::config::InferenceConfig;
use crate::models::generator::{LoadedModel, ModelLoader, TextGeneration};
use crate::models::sampling::{truncate_at_stop, SamplingConfig};

/// Rotary tables in quantized_llama are sized for this many positions.
const MAX_POSITIONS: usize = 4096;

/// End-of-sequence spellings across llama-family tokenizers
const EOS_TOKENS: &[&str] = &["</s>", "<|end_of_text|>", "<|eot_id|>", "<|endoftext|>"];

static THREAD_INIT: Once = Once::new();

/// Candle model loader
pub struct CandleGgufLoader {
    device: Device,
}

impl CandleGgufLoader {
    pub fn new() -> Self {
        Self {
            device: select_device(),
        }
    }
}

impl Default for CandleGgufLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// CUDA or Metal when compiled in and available, CPU otherwise
fn select_device() -> Device {
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            return device;
        }
    }

    #[cfg(all(target_os = "macos", feature = "candle-metal"))]
    {
        if let Ok(device) = Device::new_metal(0) {
            return device;
        }
    }

    Device::Cpu
}

/// Candle sizes its CPU pool from RAYON_NUM_THREADS on first use, so the
/// thread count can only be applied before the first load.
fn apply_thread_count(threads: usize) {
    THREAD_INIT.call_once(|| {
        if std::env::var_os("RAYON_NUM_THREADS").is_none() {
            std::env::set_var("RAYON_NUM_THREADS", threads.to_string());
            debug!("Inference threads set to {}", threads);
        }
    });
}

fn tokenizer_candidates(artifact: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![artifact.with_extension("tokenizer.json")];
    if let Some(dir) = artifact.parent() {
        candidates.push(dir.join("tokenizer.json"));
    }
    candidates
}

fn load_tokenizer(artifact: &Path) -> Result<Tokenizer> {
    let path = tokenizer_candidates(artifact)
        .into_iter()
        .find(|p| p.exists())
        .ok_or_else(|| {
            anyhow!(
                "No tokenizer.json found next to {}",
                artifact.display()
            )
        })?;

    Tokenizer::from_file(&path)
        .map_err(|e| anyhow!("Failed to load tokenizer {}: {}", path.display(), e))
}

impl ModelLoader for CandleGgufLoader {
    fn load(&self, path: &Path, options: &InferenceConfig) -> Result<LoadedModel> {
        apply_thread_count(options.threads);

        if !path.is_file() {
            bail!("Model artifact not found: {}", path.display());
        }

        let mut file = File::open(path)
            .with_context(|| format!("Failed to open model artifact {}", path.display()))?;
        let content = gguf_file::Content::read(&mut file)
            .with_context(|| format!("Not a valid GGUF file: {}", path.display()))?;
        let weights = ModelWeights::from_gguf(content, &mut file, &self.device)
            .context("Failed to build model weights")?;

        let tokenizer = load_tokenizer(path)?;
        let eos_ids: Vec<u32> = EOS_TOKENS
            .iter()
            .filter_map(|t| tokenizer.token_to_id(t))
            .collect();

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let context_size = options.context_size.min(MAX_POSITIONS);
        info!(
            "Loaded {} (context {} tokens, {} eos ids)",
            name,
            context_size,
            eos_ids.len()
        );

        Ok(Arc::new(GgufModel {
            name,
            weights: Mutex::new(weights),
            tokenizer,
            device: self.device.clone(),
            eos_ids,
            context_size,
        }))
    }
}

/// Loaded quantized model implementing the TextGeneration trait
pub struct GgufModel {
    name: String,
    // Forward passes mutate the KV cache; one completion at a time per model.
    weights: Mutex<ModelWeights>,
    tokenizer: Tokenizer,
    device: Device,
    eos_ids: Vec<u32>,
    context_size: usize,
}

impl GgufModel {
    fn decode(&self, tokens: &[u32]) -> Result<String> {
        self.tokenizer
            .decode(tokens, true)
            .map_err(|e| anyhow!("Decode failed: {}", e))
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        Ok(encoding.get_ids().to_vec())
    }
}

fn sampling_for(config: &SamplingConfig) -> Sampling {
    if config.temperature <= 0.0 {
        Sampling::ArgMax
    } else {
        Sampling::TopKThenTopP {
            k: config.top_k,
            p: config.top_p,
            temperature: config.temperature,
        }
    }
}

impl TextGeneration for GgufModel {
    fn complete(&self, prompt: &str, config: &SamplingConfig) -> Result<String> {
        let mut input = self.encode(prompt)?;

        // Keep the tail of over-long prompts so the answer cue survives.
        let budget = self.context_size.saturating_sub(config.max_tokens).max(1);
        if input.len() > budget {
            debug!("Prompt truncated from {} to {} tokens", input.len(), budget);
            let excess = input.len() - budget;
            input.drain(..excess);
        }

        let mut weights = self
            .weights
            .lock()
            .map_err(|_| anyhow!("Model {} lock poisoned", self.name))?;
        let mut processor = LogitsProcessor::from_sampling(config.seed, sampling_for(config));

        let mut generated: Vec<u32> = Vec::with_capacity(config.max_tokens);
        let mut index_pos = 0;

        for _ in 0..config.max_tokens {
            let x = Tensor::new(input.as_slice(), &self.device)?.unsqueeze(0)?;
            let logits = weights.forward(&x, index_pos)?.squeeze(0)?;
            index_pos += input.len();

            let next = processor.sample(&logits)?;
            if self.eos_ids.contains(&next) {
                break;
            }
            generated.push(next);

            if !config.stop.is_empty() {
                let text = self.decode(&generated)?;
                if let Some(cut) = truncate_at_stop(&text, &config.stop) {
                    return Ok(text[..cut].to_string());
                }
            }

            input = vec![next];
        }

        self.decode(&generated)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_fails_to_load() {
        let loader = CandleGgufLoader::new();
        let result = loader.load(
            Path::new("/nonexistent/BitFit.gguf"),
            &InferenceConfig::default(),
        );
        let msg = format!("{:#}", result.err().expect("expected an error"));
        assert!(msg.contains("not found"), "unexpected error: {}", msg);
    }

    #[test]
    fn test_garbage_artifact_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("QLoRA.gguf");
        std::fs::write(&path, b"definitely not gguf").unwrap();

        let loader = CandleGgufLoader::new();
        let result = loader.load(&path, &InferenceConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_tokenizer_candidates_prefer_sibling_file() {
        let candidates = tokenizer_candidates(Path::new("/models/LoRA.gguf"));
        assert_eq!(candidates[0], PathBuf::from("/models/LoRA.tokenizer.json"));
        assert_eq!(candidates[1], PathBuf::from("/models/tokenizer.json"));
    }

    #[test]
    fn test_zero_temperature_is_greedy() {
        let config = SamplingConfig {
            temperature: 0.0,
            ..Default::default()
        };
        assert!(matches!(sampling_for(&config), Sampling::ArgMax));
        assert!(matches!(
            sampling_for(&SamplingConfig::default()),
            Sampling::TopKThenTopP { k: 30, .. }
        ));
    }
}
