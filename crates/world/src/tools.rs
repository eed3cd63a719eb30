//! The static tool set seeded into the registry at startup.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;

use sceneweaver_core::Tool;

use crate::scene::{Shape, Vec3, World};

fn parse_position(value: &Value) -> Result<Vec3> {
    let (x, y, z) = (
        value.get("x").and_then(Value::as_f64),
        value.get("y").and_then(Value::as_f64),
        value.get("z").and_then(Value::as_f64),
    );
    match (x, y, z) {
        (Some(x), Some(y), Some(z)) => Ok(Vec3::new(x, y, z)),
        _ => Err(anyhow!(
            "Invalid or missing 'position' object with x, y, z coordinates."
        )),
    }
}

/// Creates a simple geometric object in the world.
pub struct CreateObjectTool {
    world: World,
}

impl CreateObjectTool {
    pub fn new(world: World) -> Self {
        Self { world }
    }
}

#[async_trait]
impl Tool for CreateObjectTool {
    fn name(&self) -> &str {
        "create_object"
    }

    fn description(&self) -> &str {
        "Creates a simple geometric object in the 3D world."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "shape": {
                    "type": "string",
                    "description": "Shape of the object (e.g., 'cube', 'sphere').",
                    "enum": ["cube", "sphere", "cylinder", "cone"]
                },
                "position": {
                    "type": "object",
                    "properties": {
                        "x": {"type": "number"},
                        "y": {"type": "number"},
                        "z": {"type": "number"}
                    },
                    "required": ["x", "y", "z"],
                    "description": "World coordinates {x, y, z}."
                },
                "size": {
                    "type": "number",
                    "description": "Approximate size of the object (e.g., 1). Default 1.",
                    "default": 1
                },
                "color": {
                    "type": "string",
                    "description": "Color of the object (e.g., 'red', '#00ff00'). Default 'gray'.",
                    "default": "gray"
                }
            },
            "required": ["shape", "position"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let shape: Shape = args
            .get("shape")
            .and_then(Value::as_str)
            .unwrap_or("cube")
            .parse()?;
        let position = parse_position(
            args.get("position")
                .ok_or_else(|| anyhow!("Invalid or missing 'position' object with x, y, z coordinates."))?,
        )?;
        let size = args.get("size").and_then(Value::as_f64).unwrap_or(1.0);
        let color = args.get("color").and_then(Value::as_str).unwrap_or("gray");

        self.world.spawn_object(shape, position, size, color)
    }
}

/// Changes the color of the ground plane.
pub struct ChangeGroundColorTool {
    world: World,
}

impl ChangeGroundColorTool {
    pub fn new(world: World) -> Self {
        Self { world }
    }
}

#[async_trait]
impl Tool for ChangeGroundColorTool {
    fn name(&self) -> &str {
        "change_ground_color"
    }

    fn description(&self) -> &str {
        "Changes the color of the ground plane."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "color": {
                    "type": "string",
                    "description": "The new color for the ground (e.g., 'green', '#ff00ff')."
                }
            },
            "required": ["color"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let color = args
            .get("color")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("'color' parameter is required."))?;
        self.world.set_ground_color(color)
    }
}

/// Lists the named objects currently in the scene.
pub struct ListObjectsTool {
    world: World,
}

impl ListObjectsTool {
    pub fn new(world: World) -> Self {
        Self { world }
    }
}

#[async_trait]
impl Tool for ListObjectsTool {
    fn name(&self) -> &str {
        "list_objects"
    }

    fn description(&self) -> &str {
        "Lists the names and types of objects currently in the scene (excluding player and ground)."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({})
    }

    async fn execute(&self, _args: Value) -> Result<String> {
        Ok(self.world.list_objects())
    }
}
