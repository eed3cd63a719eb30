//! Splits raw model output into display text and an optional
//! structured action request.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use sceneweaver_core::{ActionRequest, GenerationResult};

static ACTION_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("valid action block regex"));

/// Parse raw model output.
///
/// At most one fenced ```json block is honored. A well-formed block is
/// stripped from the text; an undecodable one is discarded and the
/// *original, unstripped* text is returned as `Malformed`, so the user
/// still sees what the model attempted.
pub fn parse(raw: &str) -> GenerationResult {
    let Some(captures) = ACTION_BLOCK_RE.captures(raw) else {
        return GenerationResult::TextOnly(raw.trim().to_string());
    };

    let block = captures.get(1).map(|m| m.as_str().trim()).unwrap_or("");
    let whole_match = captures.get(0).map(|m| m.range()).unwrap_or(0..0);

    match decode_action(block) {
        Ok(action) => {
            let mut stripped = String::with_capacity(raw.len());
            stripped.push_str(&raw[..whole_match.start]);
            stripped.push_str(&raw[whole_match.end..]);
            let text = stripped.trim().to_string();

            debug!(tool = %action.tool_name, "Parsed structured action");
            if text.is_empty() {
                GenerationResult::ActionOnly(action)
            } else {
                GenerationResult::TextAndAction(text, action)
            }
        }
        Err(reason) => {
            debug!(%reason, "Discarding malformed action block");
            GenerationResult::Malformed(raw.trim().to_string())
        }
    }
}

fn decode_action(block: &str) -> Result<ActionRequest, String> {
    let value: Value =
        serde_json::from_str(block).map_err(|e| format!("invalid JSON: {e}"))?;

    let tool_name = value
        .get("tool_name")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "tool call JSON must have 'tool_name' and 'arguments'".to_string())?
        .to_string();

    let arguments = match value.get("arguments") {
        Some(args) if !args.is_null() => args.clone(),
        _ => return Err("tool call JSON must have 'tool_name' and 'arguments'".to_string()),
    };

    Ok(ActionRequest {
        tool_name,
        arguments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_only() {
        let result = parse("The sky is lovely today.");
        assert_eq!(
            result,
            GenerationResult::TextOnly("The sky is lovely today.".into())
        );
    }

    #[test]
    fn test_text_and_action() {
        let raw = "I'll paint the ground red for you!\n```json\n{\"tool_name\": \"change_ground_color\", \"arguments\": {\"color\": \"red\"}}\n```";
        match parse(raw) {
            GenerationResult::TextAndAction(text, action) => {
                assert_eq!(text, "I'll paint the ground red for you!");
                assert_eq!(action.tool_name, "change_ground_color");
                assert_eq!(action.arguments, serde_json::json!({"color": "red"}));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_action_only() {
        let raw = "```json\n{\"tool_name\": \"list_objects\", \"arguments\": {}}\n```";
        match parse(raw) {
            GenerationResult::ActionOnly(action) => {
                assert_eq!(action.tool_name, "list_objects");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_json_keeps_original_text() {
        let raw = "Watch this!\n```json\n{not valid json\n```";
        match parse(raw) {
            GenerationResult::Malformed(text) => {
                assert!(text.contains("Watch this!"));
                assert!(text.contains("{not valid json"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_fields_is_malformed() {
        let raw = "```json\n{\"tool\": \"wrong_key\"}\n```";
        assert!(matches!(parse(raw), GenerationResult::Malformed(_)));

        let raw = "```json\n{\"tool_name\": \"x\"}\n```";
        assert!(matches!(parse(raw), GenerationResult::Malformed(_)));

        let raw = "```json\n{\"tool_name\": \"\", \"arguments\": {}}\n```";
        assert!(matches!(parse(raw), GenerationResult::Malformed(_)));
    }

    #[test]
    fn test_only_first_block_is_honored() {
        let raw = "```json\n{\"tool_name\": \"list_objects\", \"arguments\": {}}\n```\nand\n```json\n{\"tool_name\": \"create_object\", \"arguments\": {}}\n```";
        match parse(raw) {
            GenerationResult::TextAndAction(text, action) => {
                assert_eq!(action.tool_name, "list_objects");
                // The second block stays in the display text untouched.
                assert!(text.contains("create_object"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let embedded = serde_json::json!({
            "tool_name": "create_object",
            "arguments": {"shape": "sphere", "position": {"x": 0, "y": 1, "z": 0}}
        });
        let raw = format!("Sure!\n```json\n{embedded}\n```");
        match parse(&raw) {
            GenerationResult::TextAndAction(_, action) => {
                assert_eq!(serde_json::to_value(&action).unwrap(), embedded);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_output() {
        assert_eq!(parse(""), GenerationResult::TextOnly(String::new()));
    }
}
