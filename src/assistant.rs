// Assistant - one question in, one committed exchange out
//
// Validation, model lookup, prompt building and generation all happen before
// the session is touched, so any failure leaves the session unchanged.

use std::time::Duration;
use tracing::{debug, info};

use crate::errors::{AssistantError, ValidationWarning};
use crate::models::{generate, LoadedModel, ModelRegistry, ModelSelector, SamplingConfig};
use crate::session::{build_prompt, is_valid, SessionContext};

/// A successful generation, as committed to the session
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub model: String,
    pub latency: Duration,
}

impl Answer {
    /// Status line shown after a response
    pub fn summary(&self) -> String {
        format!(
            "Response generated in {:.2}s | Model: {}",
            self.latency.as_secs_f64(),
            self.model
        )
    }
}

pub struct Assistant {
    selector: ModelSelector,
    sampling: SamplingConfig,
    instruction: String,
}

impl Assistant {
    pub fn new(selector: ModelSelector, sampling: SamplingConfig, instruction: String) -> Self {
        Self {
            selector,
            sampling,
            instruction,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        self.selector.registry()
    }

    pub fn selector(&self) -> &ModelSelector {
        &self.selector
    }

    /// Load `label` now rather than on the next question
    pub fn preload(&self, label: &str) -> Result<LoadedModel, AssistantError> {
        self.selector.get_model(label)
    }

    /// Answer `question` with the session's selected model and record the
    /// exchange
    pub fn ask(
        &self,
        session: &mut SessionContext,
        question: &str,
    ) -> Result<Answer, AssistantError> {
        if !is_valid(question) {
            return Err(ValidationWarning::QuestionTooShort.into());
        }

        let label = session.selected_model().to_string();
        let model = self.selector.get_model(&label)?;
        let prompt = build_prompt(&self.instruction, question);
        debug!("Prompt for {}: {:?}", label, prompt);

        let completion = generate(model.as_ref(), &prompt, &self.sampling)?;

        session.record_exchange(question, &completion.text, &label);
        session.set_last_latency(completion.latency);
        info!(
            "Answered with {} in {:.2}s",
            label,
            completion.latency_seconds()
        );

        Ok(Answer {
            text: completion.text,
            model: label,
            latency: completion.latency,
        })
    }
}
