// Slash command handling
//
// Both front ends feed raw input through `Command::parse` and `dispatch`.
// Every outcome, including failures, comes back as a `Notice`.

use std::path::Path;
use tracing::warn;

use crate::assistant::Assistant;
use crate::errors::AssistantError;
use crate::logging::Verdict;
use crate::session::SessionContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Models,
    Model(String),
    History,
    Good,
    Bad,
    Correct(String),
    Clear,
    Save,
    Ask(String),
}

impl Command {
    /// `None` for blank input. Unknown slash commands are reported by
    /// `dispatch` rather than sent to the model.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        if !trimmed.starts_with('/') {
            return Some(Command::Ask(input.to_string()));
        }

        let (name, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (trimmed, ""),
        };

        Some(match name {
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            "/models" => Command::Models,
            "/model" if rest.is_empty() => Command::Models,
            "/model" => Command::Model(rest.to_string()),
            "/history" => Command::History,
            "/good" | "/accurate" => Command::Good,
            "/bad" | "/inaccurate" => Command::Bad,
            "/correct" => Command::Correct(rest.to_string()),
            "/clear" => Command::Clear,
            "/save" => Command::Save,
            // Keep the raw text so the notice can name the command
            _ => Command::Ask(trimmed.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// User-visible outcome of one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

impl From<&AssistantError> for Notice {
    fn from(err: &AssistantError) -> Self {
        if err.is_warning() {
            Notice::warning(err.to_string())
        } else {
            Notice::error(err.to_string())
        }
    }
}

/// Run one command against the session
pub fn dispatch(
    assistant: &Assistant,
    session: &mut SessionContext,
    feedback_path: &Path,
    command: Command,
) -> Notice {
    let result = match command {
        Command::Help => Ok(Notice::info(format_help())),
        Command::Quit => Ok(Notice::info("Goodbye!")),
        Command::Models => Ok(Notice::info(format_models(assistant, session))),
        Command::History => Ok(Notice::info(format_history(session))),
        Command::Model(label) => switch_model(assistant, session, &label),
        Command::Ask(text) if text.starts_with('/') => Ok(Notice::warning(format!(
            "Unknown command: {}. Type /help for commands.",
            text.split_whitespace().next().unwrap_or(text.as_str())
        ))),
        Command::Ask(question) => assistant
            .ask(session, &question)
            .map(|answer| Notice::success(answer.summary())),
        Command::Good => session
            .submit_feedback(Verdict::Correct)
            .map(|_| Notice::success("Feedback recorded: Response is correct!")),
        Command::Bad => session.submit_feedback(Verdict::Incorrect).map(|_| {
            Notice::warning("Feedback recorded: Response is incorrect. Please provide correction.")
        }),
        Command::Correct(text) => session.submit_correction(&text).map(|_| {
            Notice::success("Correction submitted! This will help improve future responses.")
        }),
        Command::Clear => {
            session.clear_history();
            Ok(Notice::info("Chat history cleared"))
        }
        Command::Save => session.export_feedback(feedback_path).map(|rows| {
            Notice::success(format!(
                "Feedback data saved! ({} records → {})",
                rows,
                feedback_path.display()
            ))
        }),
    };

    result.unwrap_or_else(|err| {
        if !err.is_warning() {
            warn!("{}", err);
        }
        Notice::from(&err)
    })
}

/// Load `label` eagerly, then select it. The selection only changes once the
/// model is resident.
fn switch_model(
    assistant: &Assistant,
    session: &mut SessionContext,
    label: &str,
) -> Result<Notice, AssistantError> {
    assistant.preload(label)?;
    let changed = session.select_model(assistant.registry(), label)?;
    Ok(if changed {
        Notice::success(format!("Switched to {label}"))
    } else {
        Notice::info(format!("{label} is already selected"))
    })
}

fn format_help() -> String {
    r#"Available commands:
  /model <name>   - Switch model
  /models         - List models
  /history        - Show conversation (most recent first)
  /good           - Mark the last response accurate
  /bad            - Mark the last response inaccurate
  /correct <text> - Submit a better response
  /clear          - Clear chat history
  /save           - Save feedback data
  /help           - Show this help message
  /quit           - Exit

Type a clinical question to get started!"#
        .to_string()
}

fn format_models(assistant: &Assistant, session: &SessionContext) -> String {
    let mut output = String::from("Models:\n");
    for label in assistant.registry().labels() {
        let marker = if label == session.selected_model() { "*" } else { " " };
        let state = if assistant.selector().is_loaded(label) { " (loaded)" } else { "" };
        output.push_str(&format!("  {marker} {label}{state}\n"));
    }
    output
}

fn format_history(session: &SessionContext) -> String {
    if session.transcript().is_empty() {
        return "No conversation yet.".to_string();
    }
    session
        .transcript()
        .iter_recent_first()
        .map(|entry| format!("{}: {}", entry.speaker, entry.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blank_input() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("  \n "), None);
    }

    #[test]
    fn test_parse_question_kept_verbatim() {
        assert_eq!(
            Command::parse(" What is stage 1? "),
            Some(Command::Ask(" What is stage 1? ".to_string()))
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/exit"), Some(Command::Quit));
        assert_eq!(Command::parse("/good"), Some(Command::Good));
        assert_eq!(Command::parse("/inaccurate"), Some(Command::Bad));
        assert_eq!(Command::parse("/model"), Some(Command::Models));
        assert_eq!(
            Command::parse("/model  QLoRA "),
            Some(Command::Model("QLoRA".to_string()))
        );
        assert_eq!(
            Command::parse("/correct Use amlodipine first."),
            Some(Command::Correct("Use amlodipine first.".to_string()))
        );
        assert_eq!(Command::parse("/correct"), Some(Command::Correct(String::new())));
    }

    #[test]
    fn test_notice_from_error_level() {
        let warning =
            AssistantError::Validation(crate::errors::ValidationWarning::QuestionTooShort);
        assert_eq!(Notice::from(&warning).level, NoticeLevel::Warning);

        let failure = AssistantError::Configuration("x".to_string());
        assert_eq!(Notice::from(&failure).level, NoticeLevel::Error);
    }
}
