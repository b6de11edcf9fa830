// Line-mode REPL
// Used when the full-screen interface is disabled or stdout is not a terminal

use anyhow::Result;
use crossterm::{style::Stylize, terminal};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use super::commands::{dispatch, Command, Notice, NoticeLevel};
use crate::assistant::Assistant;
use crate::config::constants::APP_TITLE;
use crate::session::SessionContext;

/// Get current terminal width, or default to 80 if not a TTY
fn terminal_width() -> usize {
    terminal::size().map(|(w, _)| w as usize).unwrap_or(80)
}

pub struct Repl {
    assistant: Assistant,
    session: SessionContext,
    feedback_path: PathBuf,
    is_interactive: bool,
}

impl Repl {
    pub fn new(assistant: Assistant, session: SessionContext, feedback_path: PathBuf) -> Self {
        Self {
            assistant,
            session,
            feedback_path,
            is_interactive: io::stdout().is_terminal(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        if self.is_interactive {
            println!("{}", APP_TITLE.bold());
            println!("Enter a clinical question, and receive expert-aligned responses.");
            println!("Model: {}. Type /help for commands.", self.session.selected_model());
        }

        let label = self.session.selected_model().to_string();
        if self.is_interactive {
            println!("{}", format!("Loading {label}...").dark_grey());
        }
        if let Err(e) = self.assistant.preload(&label) {
            self.print_notice(&Notice::from(&e));
        }

        let mut editor = DefaultEditor::new()?;

        loop {
            if self.is_interactive {
                println!("{}", "─".repeat(terminal_width()).dark_grey());
            }

            let line = match editor.readline("> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };

            let Some(command) = Command::parse(&line) else {
                continue;
            };
            let _ = editor.add_history_entry(line.as_str());

            if command == Command::Quit {
                break;
            }

            let is_question =
                matches!(&command, Command::Ask(q) if !q.trim_start().starts_with('/'));
            if is_question && self.is_interactive {
                println!(
                    "{}",
                    format!("Analyzing with {}...", self.session.selected_model()).dark_grey()
                );
            }

            let notice = dispatch(&self.assistant, &mut self.session, &self.feedback_path, command);

            if is_question && notice.level == NoticeLevel::Success {
                if let Some(exchange) = self.session.last_exchange() {
                    println!("{}", exchange.response);
                }
            }
            self.print_notice(&notice);
        }

        if self.is_interactive {
            println!("Goodbye!");
        }
        Ok(())
    }

    fn print_notice(&self, notice: &Notice) {
        if !self.is_interactive {
            match notice.level {
                NoticeLevel::Error | NoticeLevel::Warning => eprintln!("{}", notice.text),
                _ => println!("{}", notice.text),
            }
            return;
        }

        let styled = match notice.level {
            NoticeLevel::Info => notice.text.clone().stylize(),
            NoticeLevel::Success => notice.text.clone().green(),
            NoticeLevel::Warning => notice.text.clone().yellow(),
            NoticeLevel::Error => notice.text.clone().red(),
        };
        println!("{}", styled);
    }
}
