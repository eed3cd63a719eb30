//! Conversation session state and prompt assembly.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use sceneweaver_core::{ChatMessage, ToolCatalogueEntry};

/// Owns the ordered message history for one conversation and builds
/// the prompt sent to the inference engine each turn.
///
/// Two things are deliberately never stored in history: the system
/// preamble (prepended only while history is empty) and the tool
/// catalogue message (regenerated every call so it always reflects the
/// current registry, including tools created mid-conversation).
#[derive(Debug, Clone)]
pub struct ConversationSession {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    system_prompt: String,
    history: Vec<ChatMessage>,
}

impl ConversationSession {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            created_at: Utc::now(),
            system_prompt: system_prompt.into(),
            history: Vec::new(),
        }
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.history.push(ChatMessage::user(text));
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.history.push(ChatMessage::assistant(text));
    }

    /// Clear the history, e.g. when the underlying engine is reloaded.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Assemble the ordered message sequence for the next completion:
    /// system preamble (first turn only), then the regenerated tool
    /// catalogue, then the history verbatim.
    pub fn build_prompt(&self, catalogue: &[ToolCatalogueEntry]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);

        if self.history.is_empty() && !self.system_prompt.is_empty() {
            messages.push(ChatMessage::system(self.system_prompt.clone()));
        }

        messages.push(ChatMessage::assistant(catalogue_message(catalogue)));
        messages.extend(self.history.iter().cloned());

        messages
    }
}

/// Render the synthetic assistant message enumerating every registered
/// tool plus the structured-action output convention.
pub fn catalogue_message(catalogue: &[ToolCatalogueEntry]) -> String {
    let mut text = String::from("You have the following tools available:\n");

    if catalogue.is_empty() {
        text.push_str("- None currently defined.\n");
    } else {
        for entry in catalogue {
            let params = serde_json::to_string(&entry.parameters).unwrap_or_default();
            text.push_str(&format!(
                "- {}: {} Parameters: {}\n",
                entry.name, entry.description, params
            ));
        }
    }

    text.push_str(
        "\nTo use a tool, output a JSON block like this, along with any normal text:\n\
         ```json\n{\n  \"tool_name\": \"<name_of_tool>\",\n  \"arguments\": { <arguments_object> }\n}\n```",
    );
    text
}
