// Error taxonomy for a single user action
//
// Nothing here is fatal to the process. Each variant maps to an ErrorKind tag
// that the presentation layer turns into a warning or an error notice.

use std::path::PathBuf;
use thiserror::Error;

/// Rejected user actions. These are not failures, just input the session
/// refuses to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationWarning {
    #[error("Please enter a detailed clinical question (minimum 3 words)")]
    QuestionTooShort,

    #[error("Please enter a corrected response before submitting.")]
    EmptyCorrection,

    #[error("No response to give feedback on yet. Ask a question first.")]
    NoPendingExchange,
}

#[derive(Debug, Error)]
pub enum AssistantError {
    /// Unknown model label
    #[error("Unknown model '{0}'")]
    Configuration(String),

    #[error("Failed to load model '{label}' from {}: {source:#}", path.display())]
    ModelLoad {
        label: String,
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Error generating response: {0:#}")]
    Generation(#[source] anyhow::Error),

    #[error("Invalid sampling configuration: {0}")]
    InvalidSampling(String),

    #[error(transparent)]
    Validation(#[from] ValidationWarning),

    #[error("Failed to save feedback to {}: {source:#}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Coarse classification used for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    ModelLoad,
    Generation,
    Validation,
    Export,
}

impl AssistantError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AssistantError::Configuration(_) | AssistantError::InvalidSampling(_) => {
                ErrorKind::Configuration
            }
            AssistantError::ModelLoad { .. } => ErrorKind::ModelLoad,
            AssistantError::Generation(_) => ErrorKind::Generation,
            AssistantError::Validation(_) => ErrorKind::Validation,
            AssistantError::Export { .. } => ErrorKind::Export,
        }
    }

    /// True for rejected input, false for real failures
    pub fn is_warning(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}
