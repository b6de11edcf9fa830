// Session state
//
// Everything one user's session owns: the selected model, the transcript,
// the exchange awaiting feedback, and the feedback log. Every operation is a
// single update; a failed operation leaves the session as it was.

use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use super::conversation::Transcript;
use crate::errors::{AssistantError, ValidationWarning};
use crate::logging::{FeedbackLog, FeedbackRecord, Verdict};
use crate::models::ModelRegistry;

/// The most recent question/response pair and the feedback given on it
#[derive(Debug, Clone, PartialEq)]
pub struct LastExchange {
    pub question: String,
    pub response: String,
    pub model_label: String,
    pub feedback: Option<Verdict>,
    pub corrected_response: Option<String>,
}

impl LastExchange {
    fn snapshot(&self) -> FeedbackRecord {
        FeedbackRecord {
            question: self.question.clone(),
            response: self.response.clone(),
            model: self.model_label.clone(),
            feedback: self.feedback,
            corrected_response: self.corrected_response.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionContext {
    selected_model: String,
    transcript: Transcript,
    last_exchange: Option<LastExchange>,
    feedback: FeedbackLog,
    last_latency: Option<Duration>,
}

impl SessionContext {
    pub fn new(selected_model: impl Into<String>) -> Self {
        Self {
            selected_model: selected_model.into(),
            transcript: Transcript::new(),
            last_exchange: None,
            feedback: FeedbackLog::new(),
            last_latency: None,
        }
    }

    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn last_exchange(&self) -> Option<&LastExchange> {
        self.last_exchange.as_ref()
    }

    pub fn feedback_log(&self) -> &FeedbackLog {
        &self.feedback
    }

    /// Latency of the most recent successful generation
    pub fn last_latency(&self) -> Option<Duration> {
        self.last_latency
    }

    /// Switch the active model. Loads nothing.
    ///
    /// Returns whether the selection changed.
    pub fn select_model(
        &mut self,
        registry: &ModelRegistry,
        label: &str,
    ) -> Result<bool, AssistantError> {
        if !registry.contains(label) {
            return Err(AssistantError::Configuration(label.to_string()));
        }
        if self.selected_model == label {
            return Ok(false);
        }

        info!("Model selection: {} -> {}", self.selected_model, label);
        self.selected_model = label.to_string();
        Ok(true)
    }

    /// Empty the transcript. The pending exchange and feedback log stay.
    pub fn clear_history(&mut self) {
        debug!("Clearing {} transcript entries", self.transcript.len());
        self.transcript.clear();
    }

    /// Commit a completed exchange: append the pair, then replace the
    /// pending exchange wholesale.
    pub fn record_exchange(&mut self, question: &str, response: &str, model_label: &str) {
        self.transcript.push_exchange(question, response, model_label);
        self.last_exchange = Some(LastExchange {
            question: question.to_string(),
            response: response.to_string(),
            model_label: model_label.to_string(),
            feedback: None,
            corrected_response: None,
        });
    }

    pub(crate) fn set_last_latency(&mut self, latency: Duration) {
        self.last_latency = Some(latency);
    }

    /// Mark the pending exchange and append a snapshot to the feedback log
    pub fn submit_feedback(&mut self, verdict: Verdict) -> Result<&FeedbackRecord, AssistantError> {
        let exchange = self
            .last_exchange
            .as_mut()
            .ok_or(ValidationWarning::NoPendingExchange)?;

        exchange.feedback = Some(verdict);
        let record = exchange.snapshot();
        info!("Feedback recorded: {} ({})", verdict, record.model);
        Ok(self.feedback.append(record))
    }

    /// Attach a corrected response to the pending exchange and append a
    /// snapshot. Earlier snapshots for the same exchange are kept.
    pub fn submit_correction(&mut self, text: &str) -> Result<&FeedbackRecord, AssistantError> {
        let correction = text.trim();
        let exchange = self
            .last_exchange
            .as_mut()
            .ok_or(ValidationWarning::NoPendingExchange)?;
        if correction.is_empty() {
            return Err(ValidationWarning::EmptyCorrection.into());
        }

        exchange.corrected_response = Some(correction.to_string());
        let record = exchange.snapshot();
        info!("Correction recorded ({})", record.model);
        Ok(self.feedback.append(record))
    }

    /// Write the feedback log to `destination`, replacing any existing file
    pub fn export_feedback(&self, destination: &Path) -> Result<usize, AssistantError> {
        let rows = self
            .feedback
            .export(destination)
            .map_err(|source| AssistantError::Export {
                path: destination.to_path_buf(),
                source,
            })?;
        info!("Saved {} feedback records to {}", rows, destination.display());
        Ok(rows)
    }
}
