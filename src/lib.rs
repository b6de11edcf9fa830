// Guideline Assistant - local-model clinical question answering
// Library exports

pub mod assistant;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod session;

pub use assistant::{Answer, Assistant};
pub use errors::{AssistantError, ErrorKind, ValidationWarning};
