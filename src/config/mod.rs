// Configuration module
// Public interface for configuration loading

pub mod constants;
mod loader;
mod settings;

pub use loader::{config_path, load_config, load_config_from, parse_config};
pub use settings::{Config, InferenceConfig, ModelEntry};
