//! Runtime tool synthesis.
//!
//! The tool-creation tool asks the inference engine for a Rhai script
//! body implementing a described behavior, compiles it against a fixed
//! capability surface over the world, and registers the result as an
//! ordinary tool. From the turn controller's perspective creating a
//! tool is just another action dispatch.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use rhai::{Dynamic, Scope, AST};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};

use sceneweaver_core::{
    ChatMessage, InferenceEngine, Tool, ToolRegistry, WeaverError,
};
use sceneweaver_world::{Entity, World};

/// Reserved name of the tool-creation tool.
pub const TOOL_CREATION_TOOL: &str = "tool_creation_tool";

/// Temperature for code-generation sub-requests; lower than the
/// conversational default for consistency.
const CODEGEN_TEMPERATURE: f32 = 0.5;

static CODE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```rhai\s*(.*?)\s*```").expect("valid code block regex"));

/// Build the fixed-capability script engine: synthesized code can call
/// exactly these world operations and nothing else.
fn capability_engine(world: &World) -> rhai::Engine {
    let mut engine = rhai::Engine::new();

    let w = world.clone();
    engine.register_fn(
        "spawn_object",
        move |shape: &str, x: f64, y: f64, z: f64, size: f64, color: &str| -> String {
            match shape.parse() {
                Ok(shape) => w
                    .spawn_object(shape, sceneweaver_world::Vec3::new(x, y, z), size, color)
                    .unwrap_or_else(|e| format!("Error: {e}")),
                Err(e) => format!("Error: {e}"),
            }
        },
    );

    let w = world.clone();
    engine.register_fn("set_ground_color", move |color: &str| -> String {
        w.set_ground_color(color).unwrap_or_else(|e| format!("Error: {e}"))
    });

    let w = world.clone();
    engine.register_fn("list_objects", move || -> String { w.list_objects() });

    let w = world.clone();
    engine.register_fn("find_object", move |name: &str| -> Dynamic {
        match w.find_entity(name) {
            None => Dynamic::UNIT,
            Some(Entity::Player) => {
                let mut map = rhai::Map::new();
                map.insert("kind".into(), "player".into());
                let pos = w.player_position();
                map.insert("x".into(), pos.x.into());
                map.insert("y".into(), pos.y.into());
                map.insert("z".into(), pos.z.into());
                map.into()
            }
            Some(Entity::Ground) => {
                let mut map = rhai::Map::new();
                map.insert("kind".into(), "ground".into());
                map.insert("color".into(), w.ground_color().into());
                map.into()
            }
            Some(Entity::Object(o)) => {
                let mut map = rhai::Map::new();
                map.insert("kind".into(), "object".into());
                map.insert("name".into(), o.name.into());
                map.insert("shape".into(), o.shape.to_string().into());
                map.insert("color".into(), o.color.into());
                map.insert("size".into(), o.size.into());
                map.insert("x".into(), o.position.x.into());
                map.insert("y".into(), o.position.y.into());
                map.insert("z".into(), o.position.z.into());
                map.into()
            }
        }
    });

    let w = world.clone();
    engine.register_fn(
        "move_object",
        move |name: &str, x: f64, y: f64, z: f64| -> String {
            w.move_object(name, sceneweaver_world::Vec3::new(x, y, z))
                .unwrap_or_else(|e| format!("Error: {e}"))
        },
    );

    let w = world.clone();
    engine.register_fn("remove_object", move |name: &str| -> String {
        w.remove_object(name).unwrap_or_else(|e| format!("Error: {e}"))
    });

    engine
}

fn codegen_prompt(name: &str, description: &str) -> String {
    format!(
        "Generate only the Rhai script code for the body of a function.\n\
         The function implements a tool named '{name}'.\n\
         It must accept a single object map argument named 'params'.\n\
         The function should perform the following action based on the description: {description}.\n\
         The script can call these world functions (use float literals for numbers):\n\
         - spawn_object(shape, x, y, z, size, color) -> string\n\
         - set_ground_color(color) -> string\n\
         - list_objects() -> string\n\
         - find_object(name) -> object map, or () if not found\n\
         - move_object(name, x, y, z) -> string\n\
         - remove_object(name) -> string\n\
         The function *must* return a string indicating success or failure \
         (e.g., \"Object moved successfully.\" or \"Error: Object not found.\").\n\
         Only output the raw Rhai code inside a ```rhai ... ``` block. Do not include the \
         function signature itself, just the code inside the curly braces.\n\n\
         Example Description: \"Moves an object named in 'params.target' to the position in \
         'params.x', 'params.y', 'params.z'.\"\n\
         Example Output:\n\
         ```rhai\n\
         let name = params.target;\n\
         if name == () {{ return \"Error: Missing required parameter 'target'.\"; }}\n\
         move_object(name, params.x, params.y, params.z)\n\
         ```"
    )
}

/// Extract the fenced Rhai block from a code-generation reply.
fn extract_code_block(reply: &str) -> Option<String> {
    CODE_BLOCK_RE
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// A tool whose body was generated at run time and compiled to a Rhai
/// AST. Invocation is wrapped so its failure mode is indistinguishable
/// from a static tool's: script errors become error text and
/// non-string results are coerced to a generic success message.
pub struct SynthesizedTool {
    name: String,
    description: String,
    engine: rhai::Engine,
    ast: AST,
}

#[async_trait]
impl Tool for SynthesizedTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "description": "Parameters defined by the tool description."
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let params = match rhai::serde::to_dynamic(&args) {
            Ok(d) => d,
            Err(e) => return Ok(format!("Error executing tool '{}': {e}", self.name)),
        };

        let mut scope = Scope::new();
        match self
            .engine
            .call_fn::<Dynamic>(&mut scope, &self.ast, "run", (params,))
        {
            Ok(result) => match result.into_immutable_string() {
                Ok(text) => Ok(text.to_string()),
                Err(_) => Ok(format!("Tool '{}' executed.", self.name)),
            },
            Err(e) => {
                warn!(tool = %self.name, error = %e, "Synthesized tool failed");
                Ok(format!("Error executing tool '{}': {e}", self.name))
            }
        }
    }
}

/// Request generated code for `description`, compile it, and wrap it
/// as a tool named `name` bound to the world capability set.
pub async fn synthesize(
    name: &str,
    description: &str,
    engine: &dyn InferenceEngine,
    world: &World,
) -> Result<SynthesizedTool, WeaverError> {
    // Single-shot sub-request, independent of the conversation history.
    let prompt = vec![ChatMessage::user(codegen_prompt(name, description))];
    let completion = engine
        .complete(&prompt, CODEGEN_TEMPERATURE)
        .await
        .map_err(|e| WeaverError::SynthesisFailed(format!("code generation failed: {e}")))?;

    let body = extract_code_block(&completion.content).ok_or_else(|| {
        WeaverError::SynthesisFailed(
            "the reply did not contain the expected ```rhai code block".to_string(),
        )
    })?;

    let script_engine = capability_engine(world);
    let script = format!("fn run(params) {{\n{body}\n}}");
    let ast = script_engine
        .compile(&script)
        .map_err(|e| WeaverError::SynthesisFailed(format!("generated code did not compile: {e}")))?;

    info!(tool = %name, "Synthesized new tool");
    Ok(SynthesizedTool {
        name: name.to_string(),
        description: description.to_string(),
        engine: script_engine,
        ast,
    })
}

/// The reserved tool whose side effect is registry mutation: invoking
/// it runs the synthesis pipeline and registers the result.
pub struct ToolCreationTool {
    registry: Arc<RwLock<ToolRegistry>>,
    engine: Arc<dyn InferenceEngine>,
    world: World,
}

impl ToolCreationTool {
    pub fn new(
        registry: Arc<RwLock<ToolRegistry>>,
        engine: Arc<dyn InferenceEngine>,
        world: World,
    ) -> Self {
        Self {
            registry,
            engine,
            world,
        }
    }
}

#[async_trait]
impl Tool for ToolCreationTool {
    fn name(&self) -> &str {
        TOOL_CREATION_TOOL
    }

    fn description(&self) -> &str {
        "Creates a new tool that you can use later. Provide a 'name' for the new tool and a \
         'description' of what it should do and what parameters it needs (as properties of a \
         single object argument). The description should be clear enough to generate code for \
         the tool's function."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "The name for the new tool."
                },
                "description": {
                    "type": "string",
                    "description": "Detailed description of the new tool's function and its parameters."
                }
            },
            "required": ["name", "description"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let name = args.get("name").and_then(Value::as_str).unwrap_or("");
        let description = args.get("description").and_then(Value::as_str).unwrap_or("");

        if name.is_empty() || description.is_empty() {
            return Ok("Error: Tool creation requires both 'name' and 'description'.".to_string());
        }
        if !ToolRegistry::is_valid_name(name) {
            return Ok(format!(
                "Error: Tool name '{name}' is invalid. Use letters, numbers, and underscores, \
                 starting with a letter or underscore."
            ));
        }
        if self.registry.read().await.contains(name) {
            return Ok(format!("Error: A tool with the name '{name}' already exists."));
        }

        match synthesize(name, description, self.engine.as_ref(), &self.world).await {
            Ok(tool) => {
                if let Err(e) = self.registry.write().await.register(Arc::new(tool)) {
                    return Ok(format!("Failed to create tool '{name}'. Error: {e}"));
                }
                Ok(format!("Tool '{name}' created successfully! You can now use it."))
            }
            Err(e) => Ok(format!("Failed to create tool '{name}'. Error: {e}")),
        }
    }
}
