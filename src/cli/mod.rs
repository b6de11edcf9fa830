// CLI module
// Front ends: full-screen TUI and line-mode REPL, sharing one command set

pub mod commands;
mod repl;
pub mod tui;

pub use commands::{dispatch, Command, Notice, NoticeLevel};
pub use repl::Repl;
pub use tui::TuiApp;
