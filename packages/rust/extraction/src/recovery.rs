//! Best-effort recovery of a JSON array from a model reply.

use serde_json::Value;
use tracing::{debug, warn};

use dmfinder_shared::ExtractedContact;

use crate::records::{classify, dedup_contacts};

/// Characters of the offending reply included in parse-failure logs.
const PREVIEW_CHARS: usize = 200;

/// Turn a raw model reply into validated, deduplicated contacts.
///
/// Never fails: unparseable replies and non-array values yield an empty list.
pub fn parse_contacts(content: &str) -> Vec<ExtractedContact> {
    let records = match recover_json(content) {
        Ok(Value::Array(records)) => records,
        Ok(other) => {
            warn!(kind = json_kind(&other), "model reply is not a JSON array");
            return Vec::new();
        }
        Err(e) => {
            warn!(
                error = %e,
                preview = %content.chars().take(PREVIEW_CHARS).collect::<String>(),
                "failed to parse model reply as JSON"
            );
            return Vec::new();
        }
    };

    let total = records.len();
    let contacts: Vec<ExtractedContact> = records.iter().filter_map(classify).collect();
    let valid = contacts.len();
    let merged = dedup_contacts(contacts);

    debug!(total, valid, merged = merged.len(), "contacts recovered");
    merged
}

/// Parse JSON out of a possibly noisy reply.
///
/// Tried in order: the whole reply; the body of a ```` ```json ```` fence,
/// else of a bare ```` ``` ```` fence; the slice from the first `[` to the
/// last `]`. The error from the strict parse is returned if all fail.
pub fn recover_json(content: &str) -> serde_json::Result<Value> {
    let trimmed = content.trim();

    let strict_err = match serde_json::from_str(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if let Some(inner) = fenced_body(trimmed) {
        if let Ok(value) = serde_json::from_str(inner) {
            return Ok(value);
        }
    }

    if let Some(slice) = bracketed(trimmed) {
        if let Ok(value) = serde_json::from_str(slice) {
            return Ok(value);
        }
    }

    Err(strict_err)
}

/// Body of the first code fence, preferring a `json`-tagged one. An
/// unterminated fence runs to the end of the text.
fn fenced_body(content: &str) -> Option<&str> {
    ["```json", "```"].into_iter().find_map(|opener| {
        let start = content.find(opener)? + opener.len();
        let rest = &content[start..];
        let end = rest.find("```").unwrap_or(rest.len());
        Some(rest[..end].trim())
    })
}

/// Slice from the first `[` to the last `]`, inclusive.
fn bracketed(content: &str) -> Option<&str> {
    let start = content.find('[')?;
    let end = content.rfind(']')?;
    (start < end).then(|| &content[start..=end])
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
