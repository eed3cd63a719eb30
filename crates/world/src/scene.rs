//! In-memory scene state.
//!
//! Holds the named entities the agent's tools operate on: a ground
//! plane, the player avatar, and user-created objects. Rendering is a
//! separate collaborator; this crate only models what exists.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid hex color regex"));

const NAMED_COLORS: &[&str] = &[
    "black", "white", "gray", "grey", "red", "green", "blue", "yellow", "orange", "purple",
    "pink", "brown", "cyan", "magenta", "lime", "teal", "navy", "maroon", "olive", "silver",
    "gold", "beige", "coral", "crimson", "indigo", "ivory", "khaki", "lavender", "salmon",
    "turquoise", "violet",
];

/// Validate a color value: a known color name or a hex code.
pub fn is_valid_color(color: &str) -> bool {
    let lower = color.to_ascii_lowercase();
    NAMED_COLORS.contains(&lower.as_str()) || HEX_COLOR_RE.is_match(color)
}

/// A position in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"x\":{},\"y\":{},\"z\":{}}}", self.x, self.y, self.z)
    }
}

/// Geometric primitives the world can spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Cube,
    Sphere,
    Cylinder,
    Cone,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Shape::Cube => "cube",
            Shape::Sphere => "sphere",
            Shape::Cylinder => "cylinder",
            Shape::Cone => "cone",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Shape {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cube" => Ok(Shape::Cube),
            "sphere" => Ok(Shape::Sphere),
            "cylinder" => Ok(Shape::Cylinder),
            "cone" => Ok(Shape::Cone),
            other => anyhow::bail!("unknown shape '{other}'"),
        }
    }
}

/// A user-created object in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    pub shape: Shape,
    pub size: f64,
    pub color: String,
    pub position: Vec3,
}

/// A resolved entity. The player and the ground are reserved and only
/// match when named literally.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Player,
    Ground,
    Object(SceneObject),
}

#[derive(Debug)]
struct SceneState {
    objects: Vec<SceneObject>,
    ground_color: String,
    player_position: Vec3,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            ground_color: "green".to_string(),
            player_position: Vec3::new(0.0, 0.5, 0.0),
        }
    }
}

/// Cloneable handle to the shared scene. This is the capability set
/// passed into every tool callable, static or synthesized.
#[derive(Clone, Default)]
pub struct World {
    inner: Arc<Mutex<SceneState>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an object, auto-naming it `<shape>_<color>` with a
    /// numeric suffix on collision. Returns a success sentence naming
    /// the object.
    pub fn spawn_object(
        &self,
        shape: Shape,
        position: Vec3,
        size: f64,
        color: &str,
    ) -> anyhow::Result<String> {
        if !is_valid_color(color) {
            anyhow::bail!(
                "Invalid color value \"{color}\". Please use standard color names or hex codes (e.g., 'blue', '#00ff00')."
            );
        }
        let size = size.max(0.1);

        let mut state = self.inner.lock().expect("scene lock poisoned");
        let base_name = format!("{}_{}", shape, color.trim_start_matches('#'));
        let mut name = base_name.clone();
        let mut counter = 1;
        while state.objects.iter().any(|o| o.name == name) {
            counter += 1;
            name = format!("{base_name}_{counter}");
        }

        let object = SceneObject {
            name: name.clone(),
            shape,
            size,
            color: color.to_string(),
            position,
        };
        debug!(object = %name, %shape, "Spawning object");
        state.objects.push(object);

        Ok(format!(
            "Object '{name}' ({shape}) created successfully at {position}."
        ))
    }

    /// Recolor the ground plane.
    pub fn set_ground_color(&self, color: &str) -> anyhow::Result<String> {
        if !is_valid_color(color) {
            anyhow::bail!(
                "Invalid color value \"{color}\". Please use standard color names or hex codes (e.g., 'blue', '#00ff00')."
            );
        }
        let mut state = self.inner.lock().expect("scene lock poisoned");
        state.ground_color = color.to_string();
        Ok(format!("Ground color changed to {color}."))
    }

    pub fn ground_color(&self) -> String {
        self.inner.lock().expect("scene lock poisoned").ground_color.clone()
    }

    pub fn player_position(&self) -> Vec3 {
        self.inner.lock().expect("scene lock poisoned").player_position
    }

    /// List user-created objects (the player and the ground excluded).
    pub fn list_objects(&self) -> String {
        let state = self.inner.lock().expect("scene lock poisoned");
        if state.objects.is_empty() {
            return "There are no user-created objects currently in the scene.".to_string();
        }
        let lines: Vec<String> = state
            .objects
            .iter()
            .map(|o| format!("- {} (Type: {})", o.name, o.shape))
            .collect();
        format!("Objects in the scene:\n{}", lines.join("\n"))
    }

    /// Resolve a name to an entity, case-insensitively. The player and
    /// the ground are matched only when named literally, so the model
    /// cannot clobber them by accident.
    pub fn find_entity(&self, name: &str) -> Option<Entity> {
        if name.eq_ignore_ascii_case("player") {
            return Some(Entity::Player);
        }
        if name.eq_ignore_ascii_case("ground") {
            return Some(Entity::Ground);
        }
        let state = self.inner.lock().expect("scene lock poisoned");
        state
            .objects
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
            .cloned()
            .map(Entity::Object)
    }

    /// Move a user-created object to a new position.
    pub fn move_object(&self, name: &str, position: Vec3) -> anyhow::Result<String> {
        let mut state = self.inner.lock().expect("scene lock poisoned");
        let object = state
            .objects
            .iter_mut()
            .find(|o| o.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow::anyhow!("Object named '{name}' not found."))?;
        object.position = position;
        let moved = object.name.clone();
        Ok(format!("Object '{moved}' moved successfully to {position}."))
    }

    /// Remove a user-created object from the scene.
    pub fn remove_object(&self, name: &str) -> anyhow::Result<String> {
        let mut state = self.inner.lock().expect("scene lock poisoned");
        let index = state
            .objects
            .iter()
            .position(|o| o.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow::anyhow!("Object named '{name}' not found."))?;
        let removed = state.objects.remove(index);
        Ok(format!("Object '{}' removed from the scene.", removed.name))
    }

    pub fn object_count(&self) -> usize {
        self.inner.lock().expect("scene lock poisoned").objects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_auto_names_with_suffix() {
        let world = World::new();
        let first = world
            .spawn_object(Shape::Cube, Vec3::new(0.0, 1.0, 0.0), 1.0, "red")
            .unwrap();
        assert!(first.contains("'cube_red'"));

        let second = world
            .spawn_object(Shape::Cube, Vec3::new(2.0, 1.0, 0.0), 1.0, "red")
            .unwrap();
        assert!(second.contains("'cube_red_2'"));
    }

    #[test]
    fn test_spawn_clamps_size() {
        let world = World::new();
        world
            .spawn_object(Shape::Sphere, Vec3::new(0.0, 0.0, 0.0), -5.0, "blue")
            .unwrap();
        match world.find_entity("sphere_blue") {
            Some(Entity::Object(o)) => assert!(o.size >= 0.1),
            other => panic!("unexpected entity: {other:?}"),
        }
    }

    #[test]
    fn test_spawn_rejects_bad_color() {
        let world = World::new();
        let err = world
            .spawn_object(Shape::Cube, Vec3::new(0.0, 0.0, 0.0), 1.0, "notacolor")
            .unwrap_err();
        assert!(err.to_string().contains("Invalid color"));
    }

    #[test]
    fn test_ground_color_change() {
        let world = World::new();
        let msg = world.set_ground_color("#ff00ff").unwrap();
        assert!(msg.contains("#ff00ff"));
        assert_eq!(world.ground_color(), "#ff00ff");
        assert!(world.set_ground_color("bogus!!").is_err());
    }

    #[test]
    fn test_find_entity_case_insensitive() {
        let world = World::new();
        world
            .spawn_object(Shape::Cone, Vec3::new(1.0, 0.0, 1.0), 2.0, "gold")
            .unwrap();
        match world.find_entity("CONE_GOLD") {
            Some(Entity::Object(o)) => assert_eq!(o.name, "cone_gold"),
            other => panic!("unexpected entity: {other:?}"),
        }
    }

    #[test]
    fn test_reserved_entities_match_only_literal_names() {
        let world = World::new();
        assert_eq!(world.find_entity("Player"), Some(Entity::Player));
        assert_eq!(world.find_entity("GROUND"), Some(Entity::Ground));
        assert_eq!(world.find_entity("cube_red"), None);
    }

    #[test]
    fn test_list_objects_excludes_reserved() {
        let world = World::new();
        assert!(world.list_objects().contains("no user-created objects"));

        world
            .spawn_object(Shape::Cylinder, Vec3::new(0.0, 0.0, 0.0), 1.0, "teal")
            .unwrap();
        let listing = world.list_objects();
        assert!(listing.contains("- cylinder_teal (Type: cylinder)"));
        assert!(!listing.to_lowercase().contains("player"));
    }

    #[test]
    fn test_move_and_remove() {
        let world = World::new();
        world
            .spawn_object(Shape::Cube, Vec3::new(0.0, 0.0, 0.0), 1.0, "red")
            .unwrap();

        let msg = world.move_object("Cube_Red", Vec3::new(3.0, 0.0, 3.0)).unwrap();
        assert!(msg.contains("moved successfully"));
        match world.find_entity("cube_red") {
            Some(Entity::Object(o)) => assert_eq!(o.position, Vec3::new(3.0, 0.0, 3.0)),
            other => panic!("unexpected entity: {other:?}"),
        }

        world.remove_object("cube_red").unwrap();
        assert_eq!(world.object_count(), 0);
        assert!(world.remove_object("cube_red").is_err());
    }

    #[test]
    fn test_shape_parsing() {
        assert_eq!("Sphere".parse::<Shape>().unwrap(), Shape::Sphere);
        assert!("dodecahedron".parse::<Shape>().is_err());
    }
}
