use tracing::{error, info};

use super::lexicon::apply_safety_net;
use super::parser::parse_analysis_response;
use super::prompt::{build_analysis_prompt, ANALYSIS_SYSTEM_PROMPT};
use super::types::{truncate_chars, DocumentAnalyzer, ANALYSIS_MAX_CHARS};
use super::AnalysisError;
use crate::models::AnalysisRecord;
use crate::pipeline::dates::detect_decade;
use crate::pipeline::openrouter::ModelChain;

/// Summary sentinel for a record whose model response was unusable.
pub const PARSE_FAILURE_SUMMARY: &str = "Error parsing LLM response";

/// Remote analysis: one combined prompt against the chat-model chain.
///
/// A chain or parse failure degrades to a sentinel record with empty
/// entity and event sets; the caller never sees an error for it.
pub struct RemoteAnalyzer {
    chain: ModelChain,
}

impl RemoteAnalyzer {
    pub fn new(chain: ModelChain) -> Self {
        Self { chain }
    }
}

impl DocumentAnalyzer for RemoteAnalyzer {
    fn analyze(&self, text: &str) -> Result<AnalysisRecord, AnalysisError> {
        info!(chars = text.len(), "Starting remote document analysis");

        // The decade detector reads the full text; only the model sees the
        // truncated slice.
        let decade = detect_decade(text);
        let analysis_text = truncate_chars(text, ANALYSIS_MAX_CHARS);
        let prompt = build_analysis_prompt(analysis_text);

        let mut record = match self.chain.complete(ANALYSIS_SYSTEM_PROMPT, &prompt) {
            Ok(raw) => match parse_analysis_response(&raw) {
                Ok(parsed) => AnalysisRecord {
                    entities: parsed.entities,
                    events: parsed.events,
                    summary: parsed.summary,
                    decade,
                    topics: Vec::new(),
                },
                Err(e) => {
                    error!(error = %e, "Failed to parse analysis response");
                    AnalysisRecord::degraded(PARSE_FAILURE_SUMMARY, decade)
                }
            },
            Err(e) => {
                error!(error = %e, "Model chain exhausted during analysis");
                AnalysisRecord::degraded(PARSE_FAILURE_SUMMARY, decade)
            }
        };

        apply_safety_net(&mut record.entities, text);

        info!(
            entities = record.entities.len(),
            events = record.events.len(),
            decade = ?record.decade,
            "Remote analysis complete"
        );
        Ok(record)
    }
}
