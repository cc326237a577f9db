//! Recover a JSON object from free-form model output.

use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};

const FENCE: &str = "```";

/// Extract a JSON object from raw model text.
///
/// Two stages only: parse the text with an optional surrounding code fence
/// removed, then parse the span between the first `{` and the last `}`.
///
/// # Errors
/// Returns [`GatewayError::Parse`] when neither stage yields a JSON object.
pub fn extract_json(raw: &str) -> GatewayResult<Value> {
    let text = strip_fence(raw.trim());

    let first_error = match serde_json::from_str::<Value>(&text) {
        Ok(value) if value.is_object() => return Ok(value),
        Ok(_) => "top-level JSON value is not an object".to_string(),
        Err(e) => e.to_string(),
    };

    if let Some(value) = object_span(&text)
        .and_then(|span| serde_json::from_str::<Value>(span).ok())
        .filter(Value::is_object)
    {
        return Ok(value);
    }

    tracing::error!(error = %first_error, "Failed to parse JSON from model response");
    Err(GatewayError::Parse(first_error))
}

/// Drop a leading fence line and, when present, the closing fence line.
fn strip_fence(text: &str) -> String {
    if !text.starts_with(FENCE) {
        return text.to_string();
    }

    let mut lines: Vec<&str> = text.lines().skip(1).collect();
    if lines
        .last()
        .is_some_and(|last| last.trim_start().starts_with(FENCE))
    {
        lines.pop();
    }
    lines.join("\n")
}

/// Slice from the first `{` to the last `}` inclusive.
fn object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Value {
        json!({
            "title": "Groceries",
            "summary": "## List\n\n- **milk**",
            "todos": ["Buy milk"],
            "reminders": [{"event": "Buy milk", "datetime": "2024-01-02T17:00:00Z"}],
            "urls": [],
            "collections": ["Shopping"]
        })
    }

    #[test]
    fn test_plain_json() {
        let raw = serde_json::to_string(&sample()).unwrap();
        assert_eq!(extract_json(&raw).ok(), Some(sample()));
    }

    #[test]
    fn test_fenced_json_matches_plain() {
        let body = serde_json::to_string_pretty(&sample()).unwrap();
        let fenced = format!("```json\n{body}\n```");
        assert_eq!(extract_json(&fenced).ok(), Some(sample()));

        let bare_fence = format!("  ```\n{body}\n```  \n");
        assert_eq!(extract_json(&bare_fence).ok(), Some(sample()));
    }

    #[test]
    fn test_fence_without_closing_line() {
        let fenced = "```json\n{\"title\": \"a\"}";
        assert_eq!(extract_json(fenced).ok(), Some(json!({"title": "a"})));
    }

    #[test]
    fn test_closing_fence_glued_to_object() {
        let fenced = "```json\n{\"title\": \"a\"}```";
        assert_eq!(extract_json(fenced).ok(), Some(json!({"title": "a"})));
    }

    #[test]
    fn test_leading_and_trailing_noise() {
        let raw = "Sure! Here is the memory:\n{\"title\": \"a\", \"todos\": []}\nHope that helps.";
        assert_eq!(
            extract_json(raw).ok(),
            Some(json!({"title": "a", "todos": []}))
        );
    }

    #[test]
    fn test_unrecoverable_text_is_parse_error() {
        assert!(matches!(
            extract_json("no json here"),
            Err(GatewayError::Parse(_))
        ));
        assert!(matches!(
            extract_json("} backwards {"),
            Err(GatewayError::Parse(_))
        ));
        assert!(matches!(
            extract_json("{\"title\": "),
            Err(GatewayError::Parse(_))
        ));
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        assert!(matches!(extract_json("[1, 2]"), Err(GatewayError::Parse(_))));
        assert!(matches!(extract_json("\"text\""), Err(GatewayError::Parse(_))));
    }
}
