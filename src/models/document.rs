use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DocumentStatus;

/// An archive document registered with the pipeline.
///
/// The surrounding store owns the row; the core reads it, drives one
/// processing run, and hands back the new `status` and `decade` through a
/// `ProcessingOutcome`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub filename: String,
    pub path: String,
    pub upload_date: DateTime<Utc>,
    pub status: DocumentStatus,
    /// Dominant decade inferred during analysis, e.g. 1930. Multiple of 10.
    pub decade: Option<i32>,
}

impl Document {
    /// Register a freshly uploaded file.
    pub fn new(filename: &str, path: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.to_string(),
            path: path.to_string(),
            upload_date: Utc::now(),
            status: DocumentStatus::Uploaded,
            decade: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_starts_uploaded() {
        let doc = Document::new("journal_1934.pdf", "/archive/journal_1934.pdf");
        assert_eq!(doc.status, DocumentStatus::Uploaded);
        assert_eq!(doc.filename, "journal_1934.pdf");
        assert!(doc.decade.is_none());
    }

    #[test]
    fn document_serializes_with_lowercase_status() {
        let doc = Document::new("a.pdf", "/tmp/a.pdf");
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"status\":\"uploaded\""));
    }
}
