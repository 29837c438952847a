//! Content normalization — turns a section value into editor markup.

use serde_json::Value;

/// Renders one section value as markup.
///
/// - string: returned unchanged
/// - sequence: each element wrapped in `<p>…</p>`, in order
/// - anything else: indented JSON with line breaks as `<br>`
pub fn format_content(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| format!("<p>{}</p>", paragraph_text(item)))
            .collect(),
        other => serde_json::to_string_pretty(other)
            .map(|pretty| pretty.replace('\n', "<br>"))
            .unwrap_or_else(|_| other.to_string()),
    }
}

/// Like `format_content`, but an absent section renders as empty markup.
pub fn format_section(content: Option<&Value>) -> String {
    content.map(format_content).unwrap_or_default()
}

fn paragraph_text(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
