//! The turn-taking state machine.
//!
//! Drives one user turn end-to-end: append to the session, request a
//! completion, parse it, dispatch at most one action, and return to
//! idle. Every failure path also ends at idle so the system always
//! accepts the next user turn.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use sceneweaver_core::{
    run_tool, ActionRequest, GenerationResult, InferenceEngine, Notice, ToolRegistry, TurnStatus,
    WeaverError,
};
use sceneweaver_world::{ChangeGroundColorTool, CreateObjectTool, ListObjectsTool, World};

use crate::config::AgentConfig;
use crate::parser;
use crate::session::ConversationSession;
use crate::synthesis::{ToolCreationTool, TOOL_CREATION_TOOL};

/// Surfaced and persisted when the model produced only an action block,
/// so the user is never left without turn feedback.
pub const ACTION_ONLY_PLACEHOLDER: &str = "[Performing the requested action]";

/// Persisted as the assistant turn when the model produced no usable
/// text at all.
pub const EMPTY_TURN_STANDIN: &str =
    "[assistant attempted an action but the formatting was incorrect]";

/// Orchestrates turns against one engine, one session, and one tool
/// registry. Exactly one turn is in flight at a time.
pub struct TurnController {
    config: AgentConfig,
    session: ConversationSession,
    registry: Arc<RwLock<ToolRegistry>>,
    engine: Arc<dyn InferenceEngine>,
    world: World,
    status: TurnStatus,
    retry_count: u32,
}

impl TurnController {
    /// Create a controller and seed the registry with the static tool
    /// set plus the tool-creation tool.
    pub async fn new(
        engine: Arc<dyn InferenceEngine>,
        world: World,
        config: AgentConfig,
    ) -> Result<Self, WeaverError> {
        let controller = Self {
            session: ConversationSession::new(&config.system_prompt),
            registry: Arc::new(RwLock::new(ToolRegistry::new())),
            engine,
            world,
            config,
            status: TurnStatus::Idle,
            retry_count: 0,
        };
        controller.seed_registry().await?;
        Ok(controller)
    }

    async fn seed_registry(&self) -> Result<(), WeaverError> {
        let mut registry = self.registry.write().await;
        registry.clear();
        registry.register(Arc::new(ToolCreationTool::new(
            self.registry.clone(),
            self.engine.clone(),
            self.world.clone(),
        )))?;
        registry.register(Arc::new(CreateObjectTool::new(self.world.clone())))?;
        registry.register(Arc::new(ChangeGroundColorTool::new(self.world.clone())))?;
        registry.register(Arc::new(ListObjectsTool::new(self.world.clone())))?;
        Ok(())
    }

    pub fn status(&self) -> TurnStatus {
        self.status
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn registry(&self) -> Arc<RwLock<ToolRegistry>> {
        self.registry.clone()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn set_temperature(&mut self, temperature: f32) {
        self.config.temperature = temperature;
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.config.model = model.into();
    }

    /// Swap in a new engine instance (model switch): history is
    /// cleared and the registry is re-seeded with the static set. The
    /// new engine is not considered valid until this completes.
    pub async fn reset(&mut self, engine: Arc<dyn InferenceEngine>) -> Result<(), WeaverError> {
        info!(engine = %engine.name(), "Resetting session for new engine");
        self.engine = engine;
        self.session.reset();
        self.retry_count = 0;
        self.status = TurnStatus::Idle;
        self.seed_registry().await
    }

    /// Run one user turn to completion, returning the outcomes to
    /// render. A message arriving while a turn is in flight is
    /// rejected as a no-op.
    #[instrument(skip_all, fields(session_id = %self.session.session_id))]
    pub async fn user_turn(&mut self, text: &str) -> Vec<Notice> {
        if self.status != TurnStatus::Idle {
            warn!(status = ?self.status, "Rejecting user message while a turn is in flight");
            return Vec::new();
        }

        let mut notices = Vec::new();
        self.status = TurnStatus::Generating;
        self.retry_count = 0;
        self.session.append_user(text);

        loop {
            let prompt = {
                let registry = self.registry.read().await;
                self.session.build_prompt(&registry.catalogue())
            };
            debug!(message_count = prompt.len(), "Requesting completion");

            let engine = self.engine.clone();
            let result = engine.complete(&prompt, self.config.temperature).await;
            match result {
                Ok(completion) => {
                    self.retry_count = 0;
                    self.handle_completion(&completion.content, &mut notices).await;
                    break;
                }
                Err(e) => {
                    self.retry_count += 1;
                    if self.retry_count <= self.config.retry_limit {
                        warn!(
                            attempt = self.retry_count,
                            limit = self.config.retry_limit,
                            error = %e,
                            "Generation failed, retrying"
                        );
                        notices.push(Notice::Error {
                            text: format!(
                                "Generation failed, retrying... ({}/{})",
                                self.retry_count, self.config.retry_limit
                            ),
                        });
                        self.status = TurnStatus::Retrying;
                        tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                        self.status = TurnStatus::Generating;
                    } else {
                        error!(error = %e, "Generation failed after exhausting retries");
                        notices.push(Notice::Error {
                            text: format!(
                                "Generation failed after {} retries. Error: {e}",
                                self.config.retry_limit
                            ),
                        });
                        self.status = TurnStatus::Error;
                        self.retry_count = 0;
                        break;
                    }
                }
            }
        }

        self.status = TurnStatus::Idle;
        notices
    }

    async fn handle_completion(&mut self, raw: &str, notices: &mut Vec<Notice>) {
        match parser::parse(raw) {
            GenerationResult::TextOnly(text) => {
                let text = if text.is_empty() {
                    EMPTY_TURN_STANDIN.to_string()
                } else {
                    text
                };
                self.session.append_assistant(&text);
                notices.push(Notice::Assistant { text });
            }
            GenerationResult::Malformed(raw_text) => {
                // The action is discarded; the original text, malformed
                // block included, is shown and persisted.
                notices.push(Notice::Error {
                    text: "The assistant tried to call a tool with an invalid JSON format; \
                           the action was discarded."
                        .to_string(),
                });
                self.session.append_assistant(&raw_text);
                notices.push(Notice::Assistant { text: raw_text });
            }
            GenerationResult::ActionOnly(action) => {
                self.session.append_assistant(ACTION_ONLY_PLACEHOLDER);
                notices.push(Notice::Assistant {
                    text: ACTION_ONLY_PLACEHOLDER.to_string(),
                });
                self.dispatch(action, notices).await;
            }
            GenerationResult::TextAndAction(text, action) => {
                self.session.append_assistant(&text);
                notices.push(Notice::Assistant { text });
                self.dispatch(action, notices).await;
            }
        }
    }

    /// Look up and run the requested tool. At most one action executes
    /// per turn, and its result is surfaced but never persisted.
    async fn dispatch(&mut self, action: ActionRequest, notices: &mut Vec<Notice>) {
        let resolved = {
            let registry = self.registry.read().await;
            match registry.get(&action.tool_name) {
                Some(tool) => Ok(tool),
                None => Err(registry.list()),
            }
        };

        match resolved {
            Err(available) => {
                warn!(tool = %action.tool_name, "Model called an unknown tool");
                notices.push(Notice::Error {
                    text: WeaverError::UnknownTool {
                        name: action.tool_name.clone(),
                        available,
                    }
                    .to_string(),
                });
            }
            Ok(tool) => {
                info!(tool = %action.tool_name, "Executing tool");
                notices.push(Notice::ToolExecuting {
                    name: action.tool_name.clone(),
                    arguments: action.arguments.clone(),
                });
                if action.tool_name == TOOL_CREATION_TOOL {
                    self.status = TurnStatus::SynthesizingTool;
                }
                // The registry lock is not held here: a tool (the
                // creation tool) may itself take the write lock.
                let result = run_tool(tool.as_ref(), action.arguments).await;
                notices.push(Notice::ToolResult { text: result });
            }
        }
    }
}
