use serde::Deserialize;
use serde_json::Value;

use super::AnalysisError;
use crate::models::{DetectedEvent, Entity};

/// Model output for one document, before the decade is attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedAnalysis {
    pub summary: String,
    pub entities: Vec<Entity>,
    pub events: Vec<DetectedEvent>,
}

/// Strip markdown code fences a model may wrap around its JSON.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Some(start) = trimmed.find("```json") {
        let content_start = start + 7;
        return match trimmed[content_start..].find("```") {
            Some(end) => trimmed[content_start..content_start + end].trim().to_string(),
            // Unclosed fence: keep everything after the opener.
            None => trimmed[content_start..].trim().to_string(),
        };
    }

    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_suffix("```").unwrap_or(rest);
        return rest.trim().to_string();
    }

    trimmed.to_string()
}

/// Parse the combined analysis response. A missing summary becomes empty;
/// malformed entity or event items are skipped rather than failing the
/// parse. Only a response that is not a JSON object at all is an error.
pub fn parse_analysis_response(raw: &str) -> Result<ParsedAnalysis, AnalysisError> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| AnalysisError::ResponseParsing(e.to_string()))?;

    if !value.is_object() {
        return Err(AnalysisError::ResponseParsing(
            "response is not a JSON object".into(),
        ));
    }

    let summary = value
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut entities: Vec<Entity> = parse_array_lenient(value.get("entities"));
    entities.retain(|e| !e.text.trim().is_empty());

    let mut events: Vec<DetectedEvent> = parse_array_lenient(value.get("events"));
    for event in &mut events {
        event.confidence = event.confidence.clamp(0.0, 1.0);
    }

    Ok(ParsedAnalysis {
        summary,
        entities,
        events,
    })
}

/// Parse a JSON array leniently — items that fail to deserialize are
/// skipped, and a missing or non-array value yields an empty vec.
pub fn parse_array_lenient<T: for<'de> Deserialize<'de>>(value: Option<&Value>) -> Vec<T> {
    match value.and_then(Value::as_array) {
        None => vec![],
        Some(items) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
    }
}
