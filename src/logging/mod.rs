// Logging: tracing setup and the feedback log
//
// While the full-screen interface owns the terminal, diagnostics go to a
// file under the configured log directory instead of stderr.

pub mod feedback;

pub use feedback::{FeedbackLog, FeedbackRecord, Verdict};

use anyhow::{anyhow, Context, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::constants::LOG_FILE_NAME;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. `Some(dir)` logs to a file in `dir`,
/// `None` logs to stderr.
pub fn init_tracing(log_dir: Option<&Path>) -> Result<()> {
    match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let path = dir.join(LOG_FILE_NAME);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e)),
    }
}
