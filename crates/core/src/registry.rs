use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::WeaverError;
use crate::traits::Tool;

static TOOL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid tool name regex"));

/// One row of the tool catalogue advertised to the model each prompt.
#[derive(Debug, Clone)]
pub struct ToolCatalogueEntry {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Mapping from tool name to callable.
///
/// Names are unique at all times; a registration that would collide or
/// that carries an invalid identifier is rejected, leaving the registry
/// unchanged.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Whether a name matches the tool identifier pattern.
    pub fn is_valid_name(name: &str) -> bool {
        TOOL_NAME_RE.is_match(name)
    }

    /// Register a tool. Rejects invalid identifiers and duplicate names.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), WeaverError> {
        let name = tool.name().to_string();
        if !TOOL_NAME_RE.is_match(&name) {
            return Err(WeaverError::InvalidToolName(name));
        }
        if self.tools.contains_key(&name) {
            return Err(WeaverError::DuplicateToolName(name));
        }
        debug!(tool = %name, "Registering tool");
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All registered tool names, sorted for deterministic output.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Name/description/schema triples for the prompt builder, sorted
    /// by name.
    pub fn catalogue(&self) -> Vec<ToolCatalogueEntry> {
        let mut entries: Vec<ToolCatalogueEntry> = self
            .tools
            .values()
            .map(|tool| ToolCatalogueEntry {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Drop every registered tool. Used when the session resets before
    /// the static set is re-seeded.
    pub fn clear(&mut self) {
        self.tools.clear();
    }

    /// Invoke a tool by name. Always returns displayable text: a
    /// failure inside the callable is caught here and converted into a
    /// textual error result, never propagated.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<String, WeaverError> {
        let tool = self.get(name).ok_or_else(|| WeaverError::UnknownTool {
            name: name.to_string(),
            available: self.list(),
        })?;
        Ok(run_tool(tool.as_ref(), args).await)
    }
}

/// Execute a resolved tool, converting any failure into a textual
/// error result. Callers that must not hold the registry lock during
/// execution (a tool may mutate the registry) resolve first, drop the
/// lock, and run through this.
pub async fn run_tool(tool: &dyn Tool, args: Value) -> String {
    match tool.execute(args).await {
        Ok(text) => text,
        Err(e) => {
            warn!(tool = %tool.name(), error = %e, "Tool execution failed");
            WeaverError::ToolInvocation {
                name: tool.name().to_string(),
                message: e.to_string(),
            }
            .to_string()
        }
    }
}
