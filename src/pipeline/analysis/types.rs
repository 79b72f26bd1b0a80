use serde::{Deserialize, Serialize};

use super::AnalysisError;
use crate::models::{AnalysisRecord, Entity};

/// Character budget for model-facing text. Text beyond the budget is not
/// analyzed in this pass; the decade detector and the entity safety net
/// still read the full text.
pub const ANALYSIS_MAX_CHARS: usize = 10_000;

/// Research terms the analysis prompt asks the model to attend to.
pub const PRIMARY_RESEARCH_TERMS: &[&str] =
    &["Marga", "Raagas", "Taala", "Prabandha", "Desi", "Vaadya"];

/// Closed vocabulary of event types.
pub const EVENT_TYPE_LABELS: &[&str] = &[
    "founded",
    "published",
    "performed",
    "recorded",
    "born",
    "died",
    "composed",
];

/// Strategy interface for turning raw document text into an analysis
/// record. Implementations must degrade to an empty or sentinel record on
/// model failure rather than erroring the whole document.
pub trait DocumentAnalyzer {
    fn analyze(&self, text: &str) -> Result<AnalysisRecord, AnalysisError>;
}

/// Named-entity extraction over a block of text.
pub trait EntityTagger {
    fn tag(&self, text: &str) -> Result<Vec<Entity>, AnalysisError>;
}

/// One zero-shot label assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLabel {
    pub label: String,
    #[serde(default)]
    pub confidence: f64,
}

impl EventLabel {
    pub fn new(label: &str, confidence: f64) -> Self {
        Self {
            label: label.to_string(),
            confidence,
        }
    }

    /// A label that never crosses the acceptance threshold. Used to pad
    /// classifier output so it stays aligned with its input batch.
    pub fn none() -> Self {
        Self {
            label: String::new(),
            confidence: 0.0,
        }
    }
}

/// Zero-shot event classification over a batch of candidate sentences.
/// Output order must match input order, one label per sentence.
pub trait EventClassifier {
    fn classify(&self, sentences: &[String]) -> Result<Vec<EventLabel>, AnalysisError>;
}

/// Abstractive summarization of a block of text.
pub trait Summarizer {
    fn summarize(&self, text: &str) -> Result<String, AnalysisError>;
}

/// Truncate to at most `max_chars` characters, never splitting a char.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
