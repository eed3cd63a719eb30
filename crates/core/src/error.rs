use thiserror::Error;

/// Top-level error type for the Sceneweaver runtime.
#[derive(Debug, Error)]
pub enum WeaverError {
    #[error("inference engine error: {0}")]
    Engine(String),

    #[error("a tool named '{0}' already exists")]
    DuplicateToolName(String),

    #[error("tool name '{0}' is invalid: use letters, numbers, and underscores, starting with a letter or underscore")]
    InvalidToolName(String),

    #[error("Unknown tool called: '{name}'. Available tools: {}", .available.join(", "))]
    UnknownTool { name: String, available: Vec<String> },

    #[error("tool synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("Error during execution of tool '{name}': {message}")]
    ToolInvocation { name: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tool_lists_available() {
        let err = WeaverError::UnknownTool {
            name: "fly_to_moon".into(),
            available: vec!["create_object".into(), "list_objects".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("fly_to_moon"));
        assert!(msg.contains("create_object, list_objects"));
    }
}
