//! Prompt builder for capture analysis.

use chrono::{SecondsFormat, Utc};

/// Context line used when the caller supplied no text at all.
pub const EMPTY_CONTEXT: &str = "(no additional text context provided)";

/// The exact output schema requested from the model.
pub const OUTPUT_SCHEMA: &str = r#"{"title": string, "summary": string, "todos": string[], "reminders": [{"event": string, "datetime": string}], "urls": string[], "collections": string[]}"#;

const INSTRUCTIONS: &[&str] = &[
    "You are a Memory Assistant inside a personal knowledge app. Return ONLY valid JSON.",
    "Your goal is to turn the inputs (image + note + transcript) into a concise memory summary, not a photo caption.",
];

const STYLE_RULES: &[&str] = &[
    "Summary style: 2-5 short sentences focused on the memory's key information.",
    "- Speak as a memory manager, not as a photographer.",
    "- NEVER say phrases like 'the image shows', 'the photo shows', 'in the picture'.",
    "- Begin with the subject directly (e.g., 'Burger sauce recipe: ...'), not 'The image shows a burger ...'.",
    "- Highlight entities (people/orgs/products), numbers (prices/qty), decisions/actions, deadlines, and must-know facts.",
    "- Prefer factual, bullet-like sentences separated by periods; no first-person voice.",
    "- You MUST format 'summary' in Markdown: use headings (#/##/###), bullet lists (- or 1.), and **bold** where useful.",
    "- Include blank lines between headings and paragraphs for readability. Do NOT use code fences.",
    "Title: a very short, scannable headline (<= 7 words), noun-led (e.g., 'Burger Sauce Recipe').",
    "Extract concrete, actionable todos; write them as imperative phrases.",
    "If any date/time is implied, set reminders with ISO 8601 UTC in 'datetime'. If not, leave empty.",
    "If the context contains any URLs, include them in 'urls' as absolute URLs. Only use URLs that appear in the context.",
    "Also propose up to 3 concise 'collections' (topics like 'Fashion', 'Minecraft', 'Textile').",
    "Collections policy: Prefer selecting 0-3 from the provided Existing collections when they fit well.",
    "Only propose a new collection if none of the existing collections are suitable, and propose at most ONE new collection.",
    "New collection naming: Title Case, 1-3 words, specific (avoid generic terms), no emojis/punctuation, no duplicates of existing collections.",
    "Do not return more than 3 total collections, and no more than 1 new; return [] if nothing fits.",
];

/// Build the instruction text sent to the generative model.
///
/// Deterministic for a given input; the clock is only read when `now_utc` is
/// absent or blank.
#[must_use]
pub fn build_prompt(
    note: &str,
    transcript: &str,
    now_utc: Option<&str>,
    existing_collections: &str,
) -> String {
    let context = build_context(note, transcript, existing_collections);
    let now = now_utc
        .filter(|value| !value.trim().is_empty())
        .map_or_else(
            || Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
            str::to_string,
        );

    let mut out = String::with_capacity(4096 + context.len());
    for line in INSTRUCTIONS {
        push_line(&mut out, line);
    }
    push_line(&mut out, "Produce a JSON object with this exact schema:");
    push_line(&mut out, OUTPUT_SCHEMA);
    for line in STYLE_RULES {
        push_line(&mut out, line);
    }
    push_line(
        &mut out,
        &format!(
            "Current datetime (UTC): {now}. Use this as the 'now' reference when interpreting phrases like 'tomorrow'."
        ),
    );
    push_line(
        &mut out,
        "If nothing is found for a field, return an empty list or an empty string accordingly.",
    );
    out.push('\n');
    out.push_str("Context:\n");
    out.push_str(&context);
    out.push_str("\n\n");
    out.push_str("Respond with JSON only, no code fences, no extra text.");
    out
}

/// Labeled context lines; a line is dropped when its source is blank.
fn build_context(note: &str, transcript: &str, existing_collections: &str) -> String {
    let mut lines = Vec::with_capacity(3);

    let note = note.trim();
    if !note.is_empty() {
        lines.push(format!("User note: {note}"));
    }

    let transcript = transcript.trim();
    if !transcript.is_empty() {
        lines.push(format!("Transcribed voice note: {transcript}"));
    }

    let collections = existing_collections.trim();
    if !collections.is_empty() {
        lines.push(format!(
            "Existing collections (use if relevant; create new only if needed):\n{collections}"
        ));
    }

    if lines.is_empty() {
        EMPTY_CONTEXT.to_string()
    } else {
        lines.join("\n")
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
