//! Plain substring search across stored events, analyses, and documents.
//!
//! Each source is matched independently and capped at `limit` on its own,
//! then the three result sets are merged in source order. There is no
//! relevance scoring; order within a source follows the input snapshot.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::models::{Document, Event, StoredAnalysis};

/// Result cap per match source when the host does not pick one.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

const JOURNAL_AUTHOR: &str = "Music Academy Journal";
const ARCHIVE_AUTHOR: &str = "Music Academy";
const UNKNOWN: &str = "Unknown";

/// Attribution fields attached to every hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitMetadata {
    pub title: String,
    pub author: String,
    pub decade: String,
    #[serde(rename = "type")]
    pub result_type: String,
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub text: String,
    pub metadata: HitMetadata,
}

/// Search the archive snapshot for a query string.
///
/// Events match on description, sentence, or title; analyses on summary or
/// the serialized entity list; documents on filename. A hit whose synthetic
/// id is already present is not re-added. An empty query matches nothing.
pub fn search(
    query: &str,
    limit: usize,
    events: &[Event],
    analyses: &[StoredAnalysis],
    documents: &[Document],
) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    info!(query = %query, "Searching archive");

    let owners: HashMap<Uuid, &Document> = documents.iter().map(|d| (d.id, d)).collect();
    let mut hits: Vec<SearchHit> = Vec::new();

    for event in events
        .iter()
        .filter(|e| {
            contains_ci(&e.description, &needle)
                || contains_ci(&e.sentence, &needle)
                || contains_ci(&e.title, &needle)
        })
        .take(limit)
    {
        let text = if event.description.is_empty() {
            event.sentence.clone()
        } else {
            event.description.clone()
        };
        hits.push(SearchHit {
            id: format!("event_{}", event.id),
            text,
            metadata: attribution(
                owners.get(&event.document_id).copied(),
                JOURNAL_AUTHOR,
                "Event",
            ),
        });
    }

    for analysis in analyses
        .iter()
        .filter(|a| contains_ci(&a.record.summary, &needle) || contains_ci(&entity_blob(a), &needle))
        .take(limit)
    {
        let id = format!("analysis_{}", analysis.id);
        if hits.iter().any(|h| h.id == id) {
            continue;
        }
        hits.push(SearchHit {
            id,
            text: analysis.record.summary.clone(),
            metadata: attribution(
                owners.get(&analysis.document_id).copied(),
                JOURNAL_AUTHOR,
                "Journal Summary",
            ),
        });
    }

    for document in documents
        .iter()
        .filter(|d| contains_ci(&d.filename, &needle))
        .take(limit)
    {
        let id = format!("doc_{}", document.id);
        if hits.iter().any(|h| h.id == id) {
            continue;
        }
        hits.push(SearchHit {
            id,
            text: format!("Journal Archive: {}", document.filename),
            metadata: attribution(Some(document), ARCHIVE_AUTHOR, "Document"),
        });
    }

    info!(query = %query, hits = hits.len(), "Search complete");
    hits
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn entity_blob(analysis: &StoredAnalysis) -> String {
    serde_json::to_string(&analysis.record.entities).unwrap_or_default()
}

fn attribution(owner: Option<&Document>, author: &str, result_type: &str) -> HitMetadata {
    HitMetadata {
        title: owner.map_or_else(|| UNKNOWN.to_string(), |d| d.filename.clone()),
        author: author.to_string(),
        decade: owner
            .and_then(|d| d.decade)
            .map_or_else(|| UNKNOWN.to_string(), |d| d.to_string()),
        result_type: result_type.to_string(),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
