use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use sceneweaver_core::{ChatMessage, Completion, InferenceEngine, WeaverError};

/// One scripted outcome for a completion request.
#[derive(Debug, Clone)]
enum Outcome {
    Text(String),
    Failure(String),
}

/// A scripted inference engine for tests: replies with a queue of
/// canned outcomes and records every prompt it receives.
#[derive(Default)]
pub struct ScriptedEngine {
    outcomes: Mutex<VecDeque<Outcome>>,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful completion.
    pub fn push_text(&self, text: impl Into<String>) {
        self.outcomes
            .lock()
            .expect("outcome queue lock poisoned")
            .push_back(Outcome::Text(text.into()));
    }

    /// Queue an engine failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.outcomes
            .lock()
            .expect("outcome queue lock poisoned")
            .push_back(Outcome::Failure(message.into()));
    }

    /// All prompts received so far, in order.
    pub fn received_prompts(&self) -> Vec<Vec<ChatMessage>> {
        self.prompts.lock().expect("prompt log lock poisoned").clone()
    }

    /// Number of completion requests made.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().expect("prompt log lock poisoned").len()
    }
}

#[async_trait]
impl InferenceEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        _temperature: f32,
    ) -> Result<Completion, WeaverError> {
        self.prompts
            .lock()
            .expect("prompt log lock poisoned")
            .push(messages.to_vec());

        let outcome = self
            .outcomes
            .lock()
            .expect("outcome queue lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Outcome::Failure("scripted engine exhausted".to_string()));

        match outcome {
            Outcome::Text(content) => Ok(Completion {
                content,
                model: "scripted".to_string(),
                latency_ms: 0,
            }),
            Outcome::Failure(message) => Err(WeaverError::Engine(message)),
        }
    }
}
