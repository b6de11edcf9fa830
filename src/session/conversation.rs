// Conversation transcript
//
// Entries are only ever appended as a User/Assistant pair, so the transcript
// never holds a question without its answer.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "You"),
            Speaker::Assistant => write!(f, "Assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    pub speaker: Speaker,
    pub text: String,
}

/// Append-only, displayed most recent first
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<ConversationEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a question and the model's answer (tagged with the model label)
    pub fn push_exchange(&mut self, question: &str, response: &str, model_label: &str) {
        self.entries.push(ConversationEntry {
            speaker: Speaker::User,
            text: question.to_string(),
        });
        self.entries.push(ConversationEntry {
            speaker: Speaker::Assistant,
            text: format!("Model: {model_label}\n{response}"),
        });
    }

    /// Entries in append order
    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    /// Entries for display, most recent first
    pub fn iter_recent_first(&self) -> impl Iterator<Item = &ConversationEntry> {
        self.entries.iter().rev()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of complete question/answer pairs
    pub fn turn_count(&self) -> usize {
        self.entries.len() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_creation() {
        let transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.turn_count(), 0);
    }

    #[test]
    fn test_push_exchange_appends_pair() {
        let mut transcript = Transcript::new();
        transcript.push_exchange("Q1", "R1", "BitFit");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.turn_count(), 1);
        let entries = transcript.entries();
        assert_eq!(entries[0].speaker, Speaker::User);
        assert_eq!(entries[0].text, "Q1");
        assert_eq!(entries[1].speaker, Speaker::Assistant);
        assert_eq!(entries[1].text, "Model: BitFit\nR1");
    }

    #[test]
    fn test_recent_first_order() {
        let mut transcript = Transcript::new();
        transcript.push_exchange("first", "a", "LoRA");
        transcript.push_exchange("second", "b", "LoRA");

        let texts: Vec<&str> = transcript.iter_recent_first().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Model: LoRA\nb", "second", "Model: LoRA\na", "first"]);
    }

    #[test]
    fn test_clear() {
        let mut transcript = Transcript::new();
        transcript.push_exchange("q", "r", "m");
        transcript.clear();
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_speaker_display() {
        assert_eq!(Speaker::User.to_string(), "You");
        assert_eq!(Speaker::Assistant.to_string(), "Assistant");
    }
}
