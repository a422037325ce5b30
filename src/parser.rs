//! Extracting the JSON payload from a raw model response.
//!
//! Models frequently wrap their output in a fenced code block; we look for a
//! ```json fence first and fall back to parsing the whole text. Schema
//! checks live in `domain::QuestionPayload::validate`, not here.

use serde_json::Value;

use crate::domain::QuestionPayload;

/// Parse the JSON object or array contained in `raw`, tolerating an optional
/// fenced code block wrapper. Fenced and unfenced equivalents parse to the
/// same value; malformed JSON fails deterministically.
pub fn extract_json(raw: &str) -> Result<Value, String> {
  let candidate = fenced_json_block(raw).unwrap_or_else(|| raw.trim());
  serde_json::from_str::<Value>(candidate).map_err(|e| format!("JSON parse error: {}", e))
}

/// The contents of the first ```json ... ``` block, if any. A bare ``` fence
/// is accepted too since models are inconsistent about the language tag.
fn fenced_json_block(raw: &str) -> Option<&str> {
  let open = raw.find("```")?;
  let after_fence = &raw[open + 3..];
  let body_start = after_fence.find('\n')? + 1;
  let tag = after_fence[..body_start - 1].trim();
  if !tag.is_empty() && !tag.eq_ignore_ascii_case("json") {
    return None;
  }
  let body = &after_fence[body_start..];
  let close = body.find("```")?;
  Some(body[..close].trim())
}

/// Flatten a parsed value into question payloads: a single object yields one,
/// an array yields one per element. Anything else is a parse-level failure.
pub fn questions_from_value(value: Value) -> Result<Vec<QuestionPayload>, String> {
  let items = match value {
    Value::Array(items) => items,
    obj @ Value::Object(_) => vec![obj],
    other => return Err(format!("expected a JSON object or array, got {}", type_name(&other))),
  };
  items
    .into_iter()
    .map(|v| serde_json::from_value::<QuestionPayload>(v).map_err(|e| format!("bad question shape: {}", e)))
    .collect()
}

fn type_name(v: &Value) -> &'static str {
  match v {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}
