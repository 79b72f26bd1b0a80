use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entity label applied by the regex safety net for fixed-vocabulary
/// musicology terms, regardless of what the model extracted.
pub const MUSICOLOGY_TERM_LABEL: &str = "MUSICOLOGY_TERM";

/// A named entity extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: String,
}

impl Entity {
    pub fn new(text: &str, label: &str) -> Self {
        Self {
            text: text.to_string(),
            label: label.to_string(),
        }
    }
}

/// An event sentence detected during analysis, before it is persisted.
/// A missing type or confidence in model output falls back to a default
/// instead of dropping the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedEvent {
    pub sentence: String,
    #[serde(rename = "type", default = "default_event_type")]
    pub event_type: String,
    #[serde(default)]
    pub confidence: f64,
}

fn default_event_type() -> String {
    "event".to_string()
}

/// Structured output of one analysis run over one document's text.
///
/// `topics` is reserved: always empty today, kept so stored records do not
/// need a migration when topic modelling lands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub entities: Vec<Entity>,
    pub events: Vec<DetectedEvent>,
    pub summary: String,
    /// Dominant decade of the text, e.g. 1930. Multiple of 10.
    pub decade: Option<i32>,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl AnalysisRecord {
    /// A record with nothing in it, used as the degradation base when the
    /// model response is unusable.
    pub fn degraded(summary: &str, decade: Option<i32>) -> Self {
        Self {
            entities: Vec::new(),
            events: Vec::new(),
            summary: summary.to_string(),
            decade,
            topics: Vec::new(),
        }
    }
}

/// Persisted analysis row: one per document per processing run, replaced
/// wholesale on reprocessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub id: Uuid,
    pub document_id: Uuid,
    #[serde(flatten)]
    pub record: AnalysisRecord,
}

impl StoredAnalysis {
    pub fn new(document_id: Uuid, record: AnalysisRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_record_is_empty() {
        let record = AnalysisRecord::degraded("Error parsing model response", Some(1930));
        assert!(record.entities.is_empty());
        assert!(record.events.is_empty());
        assert_eq!(record.summary, "Error parsing model response");
        assert_eq!(record.decade, Some(1930));
        assert!(record.topics.is_empty());
    }

    #[test]
    fn detected_event_uses_type_key() {
        let event = DetectedEvent {
            sentence: "The conference was founded in 1929.".into(),
            event_type: "founded".into(),
            confidence: 0.9,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"founded\""));
    }

    #[test]
    fn stored_analysis_flattens_record() {
        let stored = StoredAnalysis::new(
            Uuid::new_v4(),
            AnalysisRecord {
                entities: vec![Entity::new("Tāla", MUSICOLOGY_TERM_LABEL)],
                events: vec![],
                summary: "A short study of tala systems.".into(),
                decade: Some(1940),
                topics: vec![],
            },
        );
        let json = serde_json::to_string(&stored).unwrap();
        assert!(json.contains("\"summary\":\"A short study of tala systems.\""));
        assert!(json.contains("\"decade\":1940"));
        // Flattened: no nested "record" object.
        assert!(!json.contains("\"record\""));
    }
}
