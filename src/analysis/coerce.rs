//! Coerce loosely-typed model output into a [`MemoryResult`].
//!
//! Coercion is total: whatever JSON comes in, a well-typed record comes out.

use serde_json::Value;

use crate::capture::{MemoryResult, Reminder};

/// Maximum number of collections kept on a record.
pub const MAX_COLLECTIONS: usize = 3;

/// Normalize a decoded model response.
///
/// Strings are trimmed, list fields accept a single value in place of an
/// array, empty entries and reminders without an event are dropped, and
/// collections are clamped to [`MAX_COLLECTIONS`]. Non-object input yields an
/// empty record.
#[must_use]
pub fn coerce(value: &Value) -> MemoryResult {
    let mut collections = string_list(field(value, "collections"));
    collections.truncate(MAX_COLLECTIONS);

    MemoryResult {
        title: scalar(field(value, "title")),
        summary: scalar(field(value, "summary")),
        todos: string_list(field(value, "todos")),
        reminders: reminders(field(value, "reminders")),
        urls: string_list(field(value, "urls")),
        collections,
        embedding: None,
        transcript: None,
    }
}

fn field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value.as_object().and_then(|map| map.get(name))
}

/// Stringify and trim; `null` and missing become empty.
fn scalar(value: Option<&Value>) -> String {
    value.map(stringify).unwrap_or_default().trim().to_string()
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A list, or a single truthy value wrapped as one, with blank entries removed.
fn string_list(value: Option<&Value>) -> Vec<String> {
    let items: Vec<&Value> = match value {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single) if is_falsy(single) => Vec::new(),
        Some(single) => vec![single],
    };

    items
        .into_iter()
        .map(|item| stringify(item).trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// `null`, `false`, zero, and empty strings or containers.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn reminders(value: Option<&Value>) -> Vec<Reminder> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .map(|entry| Reminder {
            event: scalar(entry.get("event")),
            datetime: scalar(entry.get("datetime")),
        })
        .filter(|reminder| !reminder.event.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_well_formed_input() {
        let record = coerce(&json!({
            "title": "  Groceries ",
            "summary": "## List\n\n- **milk**\n",
            "todos": ["Buy milk", "  "],
            "reminders": [{"event": "Buy milk", "datetime": "2024-01-02T17:00:00Z"}],
            "urls": ["https://shop.example "],
            "collections": ["Shopping"]
        }));

        assert_eq!(record.title, "Groceries");
        assert_eq!(record.summary, "## List\n\n- **milk**");
        assert_eq!(record.todos, vec!["Buy milk"]);
        assert_eq!(
            record.reminders,
            vec![Reminder {
                event: "Buy milk".to_string(),
                datetime: "2024-01-02T17:00:00Z".to_string(),
            }]
        );
        assert_eq!(record.urls, vec!["https://shop.example"]);
        assert_eq!(record.collections, vec!["Shopping"]);
        assert!(record.embedding.is_none());
        assert!(record.transcript.is_none());
    }

    #[test]
    fn test_non_object_inputs_give_empty_record() {
        for input in [json!(null), json!([1, 2]), json!("text"), json!(42), json!(true)] {
            assert_eq!(coerce(&input), MemoryResult::default());
        }
    }

    #[test]
    fn test_single_values_are_wrapped() {
        let record = coerce(&json!({
            "todos": "Call mom",
            "urls": "https://a.example",
            "collections": 7
        }));
        assert_eq!(record.todos, vec!["Call mom"]);
        assert_eq!(record.urls, vec!["https://a.example"]);
        assert_eq!(record.collections, vec!["7"]);
    }

    #[test]
    fn test_falsy_single_values_are_absent() {
        let record = coerce(&json!({
            "todos": false,
            "urls": 0,
            "collections": {}
        }));
        assert!(record.todos.is_empty());
        assert!(record.urls.is_empty());
        assert!(record.collections.is_empty());

        let record = coerce(&json!({"todos": true, "collections": {"name": "Work"}}));
        assert_eq!(record.todos, vec!["true"]);
        assert_eq!(record.collections, vec!["{\"name\":\"Work\"}"]);
    }

    #[test]
    fn test_wrong_types_are_stringified() {
        let record = coerce(&json!({
            "title": 12,
            "summary": null,
            "todos": [1, null, true, {"nested": "x"}, ["inner"]]
        }));
        assert_eq!(record.title, "12");
        assert_eq!(record.summary, "");
        assert_eq!(
            record.todos,
            vec!["1", "true", "{\"nested\":\"x\"}", "[\"inner\"]"]
        );
    }

    #[test]
    fn test_reminder_filtering() {
        let record = coerce(&json!({
            "reminders": [
                {"event": "  ", "datetime": "2024-01-02T17:00:00Z"},
                "not an object",
                {"event": "Dentist"},
                {"event": "Pay rent", "datetime": null},
                {"datetime": "2024-01-03T09:00:00Z"}
            ]
        }));
        assert_eq!(
            record.reminders,
            vec![
                Reminder {
                    event: "Dentist".to_string(),
                    datetime: String::new(),
                },
                Reminder {
                    event: "Pay rent".to_string(),
                    datetime: String::new(),
                },
            ]
        );

        let single = coerce(&json!({"reminders": {"event": "Dentist"}}));
        assert!(single.reminders.is_empty());
    }

    #[test]
    fn test_collections_are_clamped() {
        let record = coerce(&json!({
            "collections": ["Work", "", "Home", "Travel", "Food"]
        }));
        assert_eq!(record.collections, vec!["Work", "Home", "Travel"]);
    }

    #[test]
    fn test_idempotent_on_valid_records() {
        let once = coerce(&json!({
            "title": " Trip ",
            "summary": "# Trip\n\n- Pack",
            "todos": ["Pack bags", ""],
            "reminders": [{"event": "Flight", "datetime": "2024-05-01T08:00:00Z"}],
            "urls": "https://airline.example",
            "collections": ["Travel", "Family", "Summer", "Extra"]
        }));
        let reencoded = serde_json::to_value(&once).unwrap();
        assert_eq!(coerce(&reencoded), once);
    }
}
