// Project-wide constants
//
// Centralised here so file names and other magic values have one
// source of truth. Import via `use crate::config::constants::*;`.

/// Application name, used for the config directory and window title.
pub const APP_NAME: &str = "guideline-assistant";

/// Title shown at the top of the interface.
pub const APP_TITLE: &str = "Pediatric Hypertension Guidelines Assistant";

/// Config file name inside `<config_dir>/guideline-assistant/`.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Hidden data directory under the home directory (models, logs).
pub const DATA_DIR_NAME: &str = ".guideline-assistant";

/// Default export destination, relative to the working directory.
pub const DEFAULT_FEEDBACK_FILE: &str = "feedback_data.csv";

/// Log file written while the TUI owns the terminal.
pub const LOG_FILE_NAME: &str = "guideline-assistant.log";

/// Model selected when a session starts.
pub const DEFAULT_MODEL_LABEL: &str = "BitFit";

/// Context window requested from the backend (tokens).
pub const DEFAULT_CONTEXT_SIZE: usize = 8192;

/// Inference threads requested from the backend.
pub const DEFAULT_THREADS: usize = 4;

/// Sampling seed. Fixed so identical prompts give identical answers.
pub const DEFAULT_SEED: u64 = 299_792_458;

/// Adapters shipped with the assistant, in display order.
pub const DEFAULT_MODEL_LABELS: [&str; 4] = ["LoRA", "QLoRA", "BitFit", "BaseModel"];
