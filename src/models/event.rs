use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::analysis::{DetectedEvent, Entity};

/// Placeholder `date_str` for events whose date has not been resolved.
pub const EVENT_DATE_UNKNOWN: &str = "Unknown";

/// A historical event extracted from a document and persisted for the
/// timeline. Events are replaced as a set when their document is
/// reprocessed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub document_id: Uuid,
    pub title: String,
    pub description: String,
    /// Human-readable date text. `Unknown` until a date is resolved.
    pub date_str: String,
    /// ISO 8601 date-time, filled by a later normalization pass.
    pub normalized_date: Option<String>,
    pub event_type: String,
    pub confidence: f64,
    /// Entity set of the whole source document, not just this sentence.
    pub entities: Vec<Entity>,
    pub sentence: String,
}

impl Event {
    /// Builds the persisted event for one detected sentence. The title names
    /// the source file because the sentence itself rarely makes a usable
    /// heading, and the document-level entity set rides along for the
    /// co-occurrence graph.
    pub fn from_detection(
        document_id: Uuid,
        filename: &str,
        detection: &DetectedEvent,
        document_entities: &[Entity],
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            title: format!("Event in {filename}"),
            description: detection.sentence.clone(),
            date_str: EVENT_DATE_UNKNOWN.to_string(),
            normalized_date: None,
            event_type: detection.event_type.clone(),
            confidence: detection.confidence,
            entities: document_entities.to_vec(),
            sentence: detection.sentence.clone(),
        }
    }
}
