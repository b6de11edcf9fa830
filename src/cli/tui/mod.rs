// TuiApp - full-screen ratatui interface
//
// Layout:  model list and key help on the left; transcript (most recent
//          first) above the feedback pane on the right; question box and a
//          status line at the bottom.
//
// Every action runs synchronously. Before a blocking call (model load or
// generation) the frame is redrawn with a busy status so the user sees what
// the interface is waiting on.

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::path::PathBuf;
use tracing::debug;
use tui_textarea::TextArea;

mod input_widget;
mod status_widget;
mod view;

pub use status_widget::StatusWidget;

use super::commands::{dispatch, Command, Notice, NoticeLevel};
use crate::assistant::Assistant;
use crate::session::SessionContext;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Rows moved per PageUp/PageDown
const SCROLL_STEP: u16 = 5;

pub struct TuiApp {
    assistant: Assistant,
    session: SessionContext,
    feedback_path: PathBuf,

    // Input: tui-textarea manages multi-line state
    input: TextArea<'static>,

    // Set when the pending command was typed into the question box
    from_input: bool,

    notice: Option<Notice>,
    busy: Option<String>,
    scroll: u16,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(assistant: Assistant, session: SessionContext, feedback_path: PathBuf) -> Self {
        Self {
            assistant,
            session,
            feedback_path,
            input: input_widget::new_textarea(),
            from_input: false,
            notice: None,
            busy: None,
            scroll: 0,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Current question box contents
    pub fn input_text(&self) -> String {
        self.input.lines().join("\n")
    }

    /// Translate a key press into a command, or apply it to the input box
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => Some(Command::Quit),
            KeyCode::Char('c') if ctrl => Some(Command::Quit),
            KeyCode::F(2) | KeyCode::BackTab => {
                let next = self
                    .assistant
                    .registry()
                    .next_label(self.session.selected_model())?;
                Some(Command::Model(next.to_string()))
            }
            KeyCode::Char('g') if ctrl => Some(Command::Good),
            KeyCode::Char('b') if ctrl => Some(Command::Bad),
            KeyCode::Char('l') if ctrl => Some(Command::Clear),
            KeyCode::Char('s') if ctrl => Some(Command::Save),
            // Correction text comes from the question box; cleared on success
            KeyCode::Char('r') if ctrl => Some(Command::Correct(self.input_text())),
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(SCROLL_STEP);
                None
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(SCROLL_STEP);
                None
            }
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
                self.input.insert_newline();
                None
            }
            KeyCode::Enter => {
                let command = Command::parse(&self.input_text());
                self.from_input = command.is_some();
                command
            }
            _ => {
                self.input.input(key);
                None
            }
        }
    }

    /// Busy message for commands that block on the model
    fn busy_message(&self, command: &Command) -> Option<String> {
        match command {
            Command::Ask(q) if !q.trim_start().starts_with('/') => Some(format!(
                "Analyzing with {}...",
                self.session.selected_model()
            )),
            Command::Model(label) if !self.assistant.selector().is_loaded(label) => {
                Some(format!("Loading {label}..."))
            }
            _ => None,
        }
    }

    /// Run a command against the session and keep its notice for display
    pub fn execute(&mut self, command: Command) {
        if command == Command::Quit {
            self.from_input = false;
            self.should_quit = true;
            return;
        }

        // Typed text and correction text stay in the box until the action succeeds
        let consumes_input =
            std::mem::take(&mut self.from_input) || matches!(command, Command::Correct(_));
        let resets_view = matches!(command, Command::Ask(_) | Command::Clear);
        let feedback_before = self.session.feedback_log().len();

        let notice = dispatch(&self.assistant, &mut self.session, &self.feedback_path, command);

        // "/bad" succeeds with a warning-level notice
        let succeeded = matches!(notice.level, NoticeLevel::Success | NoticeLevel::Info)
            || self.session.feedback_log().len() > feedback_before;
        if consumes_input && succeeded {
            self.input = input_widget::new_textarea();
        }
        if resets_view {
            self.scroll = 0;
        }
        self.notice = Some(notice);
    }

    /// Load the selected model before the first question, like the page
    /// does on first render
    fn preload_selected(&mut self, terminal: &mut TuiTerminal) -> Result<()> {
        let label = self.session.selected_model().to_string();
        self.busy = Some(format!("Loading {label}..."));
        terminal.draw(|f| view::draw(f, &*self))?;

        if let Err(e) = self.assistant.preload(&label) {
            self.notice = Some(Notice::from(&e));
        }
        self.busy = None;
        Ok(())
    }

    fn event_loop(&mut self, terminal: &mut TuiTerminal) -> Result<()> {
        self.preload_selected(terminal)?;

        while !self.should_quit {
            terminal.draw(|f| view::draw(f, &*self))?;

            let Event::Key(key) = event::read()? else {
                continue;
            };
            let Some(command) = self.handle_key(key) else {
                continue;
            };
            debug!("TUI command: {:?}", command);

            if let Some(message) = self.busy_message(&command) {
                self.busy = Some(message);
                terminal.draw(|f| view::draw(f, &*self))?;
            }
            self.execute(command);
            self.busy = None;
        }

        Ok(())
    }

    /// Take over the terminal until the user quits
    pub fn run(mut self) -> Result<()> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        let result = self.event_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }
}
