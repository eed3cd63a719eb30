/// The preamble included as the system message on the first turn of a
/// session.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant controlling a 3D world in a game. \
You can interact with the user through chat and use available tools to modify the world. \
Be descriptive and engaging.";

/// Configuration for the running agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model identifier, selects which inference engine instance to load.
    pub model: String,
    /// Sampling temperature for conversational turns.
    pub temperature: f32,
    /// How many times a failed generation is retried before the turn
    /// is abandoned.
    pub retry_limit: u32,
    /// Delay between generation retries.
    pub retry_delay_ms: u64,
    /// System preamble text.
    pub system_prompt: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "qwen2.5-coder:7b".to_string(),
            temperature: 0.7,
            retry_limit: 2,
            retry_delay_ms: 500,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}
