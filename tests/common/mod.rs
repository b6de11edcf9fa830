// Shared fakes for integration tests

#![allow(dead_code)]

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use guideline_assistant::config::{InferenceConfig, ModelEntry};
use guideline_assistant::models::{
    LoadedModel, ModelCache, ModelLoader, ModelRegistry, ModelSelector, SamplingConfig,
    TextGeneration,
};
use guideline_assistant::Assistant;

/// Model that replays a script of replies; `Err` entries simulate backend failures
pub struct ScriptedModel {
    name: String,
    replies: Mutex<Vec<Result<String, String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl TextGeneration for ScriptedModel {
    fn complete(&self, prompt: &str, _config: &SamplingConfig) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Ok(format!("  default reply from {}  ", self.name));
        }
        replies.remove(0).map_err(anyhow::Error::msg)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Loader that counts loads and hands out scripted models
#[derive(Default)]
pub struct FakeLoader {
    pub loads: AtomicUsize,
    pub script: Mutex<Vec<Result<String, String>>>,
    pub last_model: Mutex<Option<Arc<ScriptedModel>>>,
}

impl FakeLoader {
    pub fn with_script(script: Vec<Result<&str, &str>>) -> Self {
        Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ModelLoader for FakeLoader {
    fn load(&self, path: &Path, _options: &InferenceConfig) -> Result<LoadedModel> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if path.extension().and_then(|e| e.to_str()) != Some("gguf") {
            bail!("not a GGUF artifact: {}", path.display());
        }

        let model = Arc::new(ScriptedModel {
            name: path.file_stem().unwrap().to_string_lossy().into_owned(),
            replies: Mutex::new(std::mem::take(&mut *self.script.lock().unwrap())),
            prompts: Mutex::new(Vec::new()),
        });
        *self.last_model.lock().unwrap() = Some(Arc::clone(&model));
        Ok(model)
    }
}

pub fn registry() -> ModelRegistry {
    ModelRegistry::new(vec![
        ModelEntry::new("LoRA", PathBuf::from("/models/LoRA.gguf")),
        ModelEntry::new("QLoRA", PathBuf::from("/models/QLoRA.gguf")),
        ModelEntry::new("BitFit", PathBuf::from("/models/BitFit.gguf")),
        ModelEntry::new("Corrupt", PathBuf::from("/models/corrupt.bin")),
    ])
}

pub fn assistant_with(loader: Arc<FakeLoader>) -> Assistant {
    let loader: Arc<dyn ModelLoader> = loader;
    let cache = Arc::new(ModelCache::new(loader, InferenceConfig::default()));
    Assistant::new(
        ModelSelector::new(registry(), cache),
        SamplingConfig::default(),
        String::new(),
    )
}
