// Guideline Assistant
// Main entry point

use anyhow::{Context, Result};
use std::io::{self, IsTerminal};
use std::sync::Arc;

use guideline_assistant::cli::{Repl, TuiApp};
use guideline_assistant::config::load_config;
use guideline_assistant::logging::init_tracing;
use guideline_assistant::models::{default_loader, ModelCache, ModelRegistry, ModelSelector};
use guideline_assistant::session::SessionContext;
use guideline_assistant::Assistant;

fn main() -> Result<()> {
    let config = load_config()?;

    let use_tui = config.tui_enabled && io::stdout().is_terminal();

    // The TUI owns the terminal, so its logs go to a file
    if use_tui {
        init_tracing(Some(&config.log_dir))?;
    } else {
        init_tracing(None)?;
    }

    // Process-wide model cache, shared by every session for the process lifetime
    let cache = Arc::new(ModelCache::new(default_loader(), config.inference.clone()));
    let selector = ModelSelector::new(ModelRegistry::new(config.models.clone()), cache);
    let assistant = Assistant::new(selector, config.sampling.clone(), config.instruction.clone());
    let session = SessionContext::new(config.default_model.clone());

    tracing::info!(
        "Starting with {} models, default {}",
        config.models.len(),
        config.default_model
    );

    if use_tui {
        TuiApp::new(assistant, session, config.feedback_path.clone())
            .run()
            .context("Terminal interface failed")?;
    } else {
        Repl::new(assistant, session, config.feedback_path.clone()).run()?;
    }

    Ok(())
}
