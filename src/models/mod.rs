// Model selection and generation
// Registry of selectable models, the shared model cache, and the backend seam

mod cache;
mod generator;
pub mod loaders;
mod registry;
mod sampling;

pub use cache::{ModelCache, ModelSelector};
pub use generator::{generate, Completion, LoadedModel, ModelLoader, TextGeneration};
pub use loaders::default_loader;
pub use registry::ModelRegistry;
pub use sampling::{truncate_at_stop, SamplingConfig};
