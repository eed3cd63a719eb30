pub mod scene;
pub mod tools;

pub use scene::{Entity, SceneObject, Shape, Vec3, World};
pub use tools::{ChangeGroundColorTool, CreateObjectTool, ListObjectsTool};
