use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single entry in the conversation, sent verbatim (in order) to the
/// inference engine when building a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A structured action extracted from model output.
///
/// Transient: produced by the response parser, consumed by the turn
/// controller, never persisted. Field names match the wire format the
/// model is instructed to emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub tool_name: String,
    pub arguments: Value,
}

/// What a single model turn decoded to.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    /// Plain conversational text, no action block.
    TextOnly(String),
    /// An action block with no surrounding text.
    ActionOnly(ActionRequest),
    /// Conversational text plus one action block (block already stripped).
    TextAndAction(String, ActionRequest),
    /// An action block was present but undecodable; carries the
    /// original, unstripped text for transparency.
    Malformed(String),
}

/// The turn controller's state machine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Idle,
    Generating,
    Retrying,
    SynthesizingTool,
    Error,
}

/// A user-facing turn outcome, rendered by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    /// The assistant's conversational text (persisted to history).
    Assistant { text: String },
    /// A tool is about to run (not persisted).
    ToolExecuting { name: String, arguments: Value },
    /// What a tool returned (not persisted).
    ToolResult { text: String },
    /// An error surfaced to the user (not persisted).
    Error { text: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_request_wire_format() {
        let action = ActionRequest {
            tool_name: "change_ground_color".into(),
            arguments: serde_json::json!({"color": "red"}),
        };
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("\"tool_name\""));
        assert!(json.contains("\"arguments\""));

        let back: ActionRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn test_role_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_notice_serialization() {
        let notice = Notice::ToolExecuting {
            name: "list_objects".into(),
            arguments: serde_json::json!({}),
        };
        let json = serde_json::to_string(&notice).unwrap();
        let back: Notice = serde_json::from_str(&json).unwrap();
        assert_eq!(back, notice);
    }
}
