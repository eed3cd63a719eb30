pub mod mock;
pub mod ollama;

use std::sync::Arc;

use sceneweaver_core::InferenceEngine;

pub use mock::ScriptedEngine;
pub use ollama::OllamaEngine;

/// Construct an engine for the given model identifier.
///
/// Model switching works by dropping the old handle and calling this
/// again; the turn controller must be reset before the new handle is
/// considered valid.
pub fn load_engine(model: impl Into<String>, base_url: Option<&str>) -> Arc<dyn InferenceEngine> {
    let mut engine = OllamaEngine::new(model);
    if let Some(url) = base_url {
        engine = engine.with_base_url(url);
    }
    Arc::new(engine)
}
