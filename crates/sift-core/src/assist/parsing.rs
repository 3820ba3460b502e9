//! Parsing of classifier output
//!
//! Models often wrap the requested JSON in commentary. The whole trimmed
//! output is tried first; failing that, the last balanced `{...}` object in
//! the text is parsed on its own.

use serde::Deserialize;
use tracing::debug;

use crate::error::AssistFailure;
use crate::models::{Confidence, Suggestion, SuggestionSource};

#[derive(Debug, Deserialize)]
struct RawClassification {
    #[serde(default)]
    category: String,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    confidence: Option<String>,
}

/// Parse and validate a classifier reply
pub fn parse_classification(output: &str) -> Result<Suggestion, AssistFailure> {
    let trimmed = output.trim();

    let raw = match serde_json::from_str::<RawClassification>(trimmed) {
        Ok(raw) => raw,
        Err(_) => {
            let candidate = last_json_object(trimmed).ok_or_else(|| {
                AssistFailure::Format(format!("output was not JSON: {}", truncate(trimmed, 200)))
            })?;
            serde_json::from_str::<RawClassification>(candidate).map_err(|e| {
                AssistFailure::Format(format!("{} | Raw: {}", e, truncate(candidate, 200)))
            })?
        }
    };

    let category = raw.category.trim();
    if category.is_empty() {
        return Err(AssistFailure::Format("reply has no category".into()));
    }

    let confidence = raw.confidence.as_deref().and_then(|c| {
        let parsed = c.parse::<Confidence>().ok();
        if parsed.is_none() {
            debug!(confidence = c, "Ignoring unrecognized confidence");
        }
        parsed
    });

    Ok(Suggestion {
        category: category.to_string(),
        reason: raw.reason.trim().to_string(),
        source: SuggestionSource::Assistive,
        confidence,
    })
}

/// Last balanced `{...}` object in the text.
///
/// Every `{` is tried as the start of a JSON object, so stray unclosed braces
/// in surrounding commentary do not hide a later object. Of the objects
/// found, the one ending last wins, and the outermost one when nested.
pub fn last_json_object(text: &str) -> Option<&str> {
    let mut best: Option<(usize, usize)> = None;

    for (start, _) in text.rmatch_indices('{') {
        let mut stream =
            serde_json::Deserializer::from_str(&text[start..]).into_iter::<serde_json::Value>();
        if !matches!(stream.next(), Some(Ok(serde_json::Value::Object(_)))) {
            continue;
        }
        let end = start + stream.byte_offset();
        if best.map_or(true, |(_, best_end)| end > best_end) {
            best = Some((start, end));
        }
    }

    best.map(|(start, end)| &text[start..end])
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
