// Session: prompt building, input validation, transcript and per-user state

mod conversation;
pub mod prompt;
mod state;
pub mod validator;

pub use conversation::{ConversationEntry, Speaker, Transcript};
pub use prompt::build_prompt;
pub use state::{LastExchange, SessionContext};
pub use validator::is_valid;
