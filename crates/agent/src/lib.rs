pub mod config;
pub mod controller;
pub mod parser;
pub mod session;
pub mod synthesis;

pub use config::AgentConfig;
pub use controller::TurnController;
pub use session::ConversationSession;
pub use synthesis::{ToolCreationTool, TOOL_CREATION_TOOL};
