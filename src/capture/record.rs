//! Normalized memory record.

use serde::{Deserialize, Serialize};

/// A reminder extracted from the capture.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// What to be reminded of. Never empty after coercion.
    pub event: String,
    /// ISO-8601 UTC timestamp, or empty when no time was implied.
    pub datetime: String,
}

/// The memory record produced for one capture.
///
/// `embedding` and `transcript` are filled in by the request handler after
/// analysis; both serialize as `null` when absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryResult {
    /// Short headline.
    pub title: String,
    /// Markdown summary.
    pub summary: String,
    /// Imperative action items.
    pub todos: Vec<String>,
    /// Dated reminders.
    pub reminders: Vec<Reminder>,
    /// Absolute URLs found in the context.
    pub urls: Vec<String>,
    /// Suggested collections, at most three.
    pub collections: Vec<String>,
    /// Embedding of the record text.
    pub embedding: Option<Vec<f64>>,
    /// Voice transcript, if one was produced.
    pub transcript: Option<String>,
}

impl MemoryResult {
    /// Text used to embed this record alongside the raw note and transcript.
    ///
    /// Non-empty pieces are joined with single spaces; an empty return means
    /// there is nothing worth embedding.
    #[must_use]
    pub fn embedding_input(&self, note: &str, transcript: &str) -> String {
        let todos = self.todos.join(" ");
        let urls = self.urls.join(" ");
        [
            self.title.as_str(),
            self.summary.as_str(),
            todos.as_str(),
            urls.as_str(),
            note,
            transcript,
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let record = MemoryResult {
            title: "Milk".to_string(),
            ..MemoryResult::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["title"], "Milk");
        assert!(json["embedding"].is_null());
        assert!(json["transcript"].is_null());
        assert_eq!(json["todos"], serde_json::json!([]));
        assert_eq!(json["reminders"], serde_json::json!([]));
    }

    #[test]
    fn test_embedding_input_joins_non_empty_parts() {
        let record = MemoryResult {
            title: "Groceries".to_string(),
            summary: "Buy **milk**.".to_string(),
            todos: vec!["Buy milk".to_string(), "Call mom".to_string()],
            urls: vec!["https://shop.example".to_string()],
            ..MemoryResult::default()
        };
        assert_eq!(
            record.embedding_input("  milk at 5pm ", ""),
            "Groceries Buy **milk**. Buy milk Call mom https://shop.example milk at 5pm"
        );
    }

    #[test]
    fn test_embedding_input_empty_when_nothing_to_embed() {
        let record = MemoryResult::default();
        assert!(record.embedding_input("", "   ").is_empty());
    }
}
