// Model loaders: Candle GGUF (default) or a stand-in when built without a backend
#[cfg(feature = "candle")]
pub mod candle;

use anyhow::{bail, Result};
use std::path::Path;
use std::sync::Arc;

use super::generator::{LoadedModel, ModelLoader};
use crate::config::InferenceConfig;

/// Loader that always fails; used when no inference backend is compiled in
pub struct UnavailableLoader;

impl ModelLoader for UnavailableLoader {
    fn load(&self, path: &Path, _options: &InferenceConfig) -> Result<LoadedModel> {
        bail!(
            "Cannot load {}: built without an inference backend (enable the `candle` feature)",
            path.display()
        )
    }
}

/// The loader this build should use
pub fn default_loader() -> Arc<dyn ModelLoader> {
    #[cfg(feature = "candle")]
    {
        Arc::new(candle::CandleGgufLoader::new())
    }

    #[cfg(not(feature = "candle"))]
    {
        Arc::new(UnavailableLoader)
    }
}
