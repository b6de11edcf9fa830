// Model cache and selector
//
// The cache is the one process-wide shared resource: keyed by artifact path,
// filled on first request, never evicted. A per-path OnceCell serializes
// concurrent loads of the same path so the expensive load runs at most once.

use anyhow::Result;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::generator::{LoadedModel, ModelLoader};
use super::registry::ModelRegistry;
use crate::config::InferenceConfig;
use crate::errors::AssistantError;

pub struct ModelCache {
    loader: Arc<dyn ModelLoader>,
    options: InferenceConfig,
    slots: DashMap<PathBuf, Arc<OnceCell<LoadedModel>>>,
}

impl ModelCache {
    pub fn new(loader: Arc<dyn ModelLoader>, options: InferenceConfig) -> Self {
        Self {
            loader,
            options,
            slots: DashMap::new(),
        }
    }

    /// Return the handle for `path`, loading it on first use.
    ///
    /// A failed load leaves the slot empty; the next request tries again.
    pub fn get(&self, path: &Path) -> Result<LoadedModel> {
        // Clone the slot out so the map shard is not locked during the load.
        let slot = Arc::clone(&self.slots.entry(path.to_path_buf()).or_default());

        let model = slot.get_or_try_init(|| {
            info!("Loading model from {}", path.display());
            let start = Instant::now();
            let loaded = self.loader.load(path, &self.options);
            match &loaded {
                Ok(model) => info!(
                    "Loaded {} in {:.1}s",
                    model.name(),
                    start.elapsed().as_secs_f64()
                ),
                Err(e) => warn!("Failed to load {}: {:#}", path.display(), e),
            }
            loaded
        })?;

        Ok(Arc::clone(model))
    }

    pub fn is_loaded(&self, path: &Path) -> bool {
        self.slots
            .get(path)
            .map(|slot| slot.value().get().is_some())
            .unwrap_or(false)
    }

    /// Number of models currently resident
    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.value().get().is_some()).count()
    }
}

/// Maps a model label to a loaded handle via the registry and shared cache
pub struct ModelSelector {
    registry: ModelRegistry,
    cache: Arc<ModelCache>,
}

impl ModelSelector {
    pub fn new(registry: ModelRegistry, cache: Arc<ModelCache>) -> Self {
        Self { registry, cache }
    }

    /// Resolve and (lazily) load the model for `label`
    pub fn get_model(&self, label: &str) -> Result<LoadedModel, AssistantError> {
        let path = self.registry.path_for(label)?;
        self.cache
            .get(path)
            .map_err(|source| AssistantError::ModelLoad {
                label: label.to_string(),
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn is_loaded(&self, label: &str) -> bool {
        self.registry
            .path_for(label)
            .map(|path| self.cache.is_loaded(path))
            .unwrap_or(false)
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<ModelCache> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelEntry;
    use crate::models::{SamplingConfig, TextGeneration};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    struct Named(String);

    impl TextGeneration for Named {
        fn complete(&self, _prompt: &str, _config: &SamplingConfig) -> Result<String> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            &self.0
        }
    }

    #[derive(Default)]
    struct CountingLoader {
        loads: AtomicUsize,
    }

    impl ModelLoader for CountingLoader {
        fn load(&self, path: &Path, _options: &InferenceConfig) -> Result<LoadedModel> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if !path.to_string_lossy().ends_with(".gguf") {
                anyhow::bail!("not a model artifact: {}", path.display());
            }
            // Slow enough that concurrent callers overlap
            thread::sleep(Duration::from_millis(20));
            Ok(Arc::new(Named(path.display().to_string())))
        }
    }

    fn cache_with(loader: &Arc<CountingLoader>) -> ModelCache {
        let loader: Arc<dyn ModelLoader> = loader.clone();
        ModelCache::new(loader, InferenceConfig::default())
    }

    #[test]
    fn test_same_path_returns_same_handle() {
        let loader = Arc::new(CountingLoader::default());
        let cache = cache_with(&loader);

        let a = cache.get(Path::new("/m/a.gguf")).unwrap();
        let b = cache.get(Path::new("/m/a.gguf")).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_distinct_paths_stay_resident() {
        let loader = Arc::new(CountingLoader::default());
        let cache = cache_with(&loader);

        let a = cache.get(Path::new("/m/a.gguf")).unwrap();
        cache.get(Path::new("/m/b.gguf")).unwrap();
        let a_again = cache.get(Path::new("/m/a.gguf")).unwrap();

        assert!(Arc::ptr_eq(&a, &a_again));
        assert_eq!(cache.loaded_count(), 2);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_load_is_retried_later() {
        let loader = Arc::new(CountingLoader::default());
        let cache = cache_with(&loader);

        assert!(cache.get(Path::new("/m/broken.bin")).is_err());
        assert!(!cache.is_loaded(Path::new("/m/broken.bin")));
        assert!(cache.get(Path::new("/m/broken.bin")).is_err());
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
        assert_eq!(cache.loaded_count(), 0);
    }

    #[test]
    fn test_concurrent_requests_load_once() {
        let loader = Arc::new(CountingLoader::default());
        let cache = Arc::new(cache_with(&loader));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.get(Path::new("/m/shared.gguf")).unwrap()
                })
            })
            .collect();

        let models: Vec<LoadedModel> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert!(models.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_selector_maps_errors() {
        let loader = Arc::new(CountingLoader::default());
        let registry = ModelRegistry::new(vec![
            ModelEntry::new("BitFit", "/m/bitfit.gguf"),
            ModelEntry::new("Broken", "/m/broken.bin"),
        ]);
        let selector = ModelSelector::new(registry, Arc::new(cache_with(&loader)));

        assert!(matches!(
            selector.get_model("Nope"),
            Err(AssistantError::Configuration(_))
        ));
        assert!(matches!(
            selector.get_model("Broken"),
            Err(AssistantError::ModelLoad { ref label, .. }) if label == "Broken"
        ));

        assert!(!selector.is_loaded("BitFit"));
        selector.get_model("BitFit").unwrap();
        assert!(selector.is_loaded("BitFit"));
    }
}
