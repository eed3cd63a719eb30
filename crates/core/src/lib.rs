pub mod error;
pub mod registry;
pub mod traits;
pub mod types;

pub use error::WeaverError;
pub use registry::{run_tool, ToolCatalogueEntry, ToolRegistry};
pub use traits::{Completion, InferenceEngine, Tool};
pub use types::{ActionRequest, ChatMessage, GenerationResult, Notice, Role, TurnStatus};
