use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::error::WeaverError;
use crate::types::ChatMessage;

/// A capability the agent can invoke, either declared statically at
/// startup or synthesized at run time from a description.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name of the tool (e.g., "create_object").
    fn name(&self) -> &str;

    /// Description advertised to the model in the tool catalogue.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's parameters (may be empty).
    fn parameters(&self) -> Value;

    /// Execute the tool with the given arguments, returning displayable
    /// text. Failures are caught at the registry boundary.
    async fn execute(&self, args: Value) -> Result<String>;
}

/// Result of a completion request.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub model: String,
    pub latency_ms: u64,
}

/// The black-box asynchronous text-completion service.
///
/// An engine instance is tied to one model; switching models means
/// tearing this down and constructing a new instance, after the turn
/// controller has been reset to idle.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Engine name (e.g., "ollama").
    fn name(&self) -> &str;

    /// Send the ordered message sequence and return the completion text.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<Completion, WeaverError>;
}
