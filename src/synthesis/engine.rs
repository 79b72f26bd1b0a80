use std::collections::BTreeMap;

use tracing::{error, info};

use super::prompt::{build_synthesis_prompt, SYNTHESIS_SYSTEM_PROMPT};
use super::types::{SynthesisOutcome, SynthesisReport};
use super::SynthesisError;
use crate::config::{Settings, OPENROUTER_BASE_URL};
use crate::models::{Document, StoredAnalysis};
use crate::pipeline::analysis::strip_code_fences;
use crate::pipeline::openrouter::{ModelChain, OpenRouterClient};

/// Per-decade summary collections plus the year range they span.
#[derive(Debug, Clone, PartialEq)]
pub struct DecadeSummaries {
    /// `"<decade>s"` label to verbatim summaries, in label order.
    pub by_decade: BTreeMap<String, Vec<String>>,
    pub start_year: i32,
    pub end_year: i32,
}

/// Group stored analysis summaries under the owning document's decade.
///
/// Documents without a decade are skipped entirely. A decade whose
/// documents all produced empty summaries still gets a (empty) entry, so
/// the synthesis prompt can name it and the model can answer with the
/// sparse-data phrase. Returns `None` when no decade-tagged documents
/// exist at all.
pub fn decade_summaries(
    documents: &[Document],
    analyses: &[StoredAnalysis],
) -> Option<DecadeSummaries> {
    let mut by_decade: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut years: Vec<i32> = Vec::new();

    for analysis in analyses {
        let Some(document) = documents.iter().find(|d| d.id == analysis.document_id) else {
            continue;
        };
        let Some(decade) = document.decade else {
            continue;
        };

        years.push(decade);
        let entry = by_decade.entry(format!("{decade}s")).or_default();
        if !analysis.record.summary.trim().is_empty() {
            entry.push(analysis.record.summary.clone());
        }
    }

    let start_year = *years.iter().min()?;
    let end_year = *years.iter().max()? + 9;
    Some(DecadeSummaries {
        by_decade,
        start_year,
        end_year,
    })
}

/// Drives one synthesis run through the model chain.
pub struct SynthesisEngine {
    chain: ModelChain,
}

impl SynthesisEngine {
    pub fn new(chain: ModelChain) -> Self {
        Self { chain }
    }

    /// Synthesize the research on `term` across decades.
    ///
    /// Chain exhaustion is an error; an unparseable model response is not.
    /// The raw response always survives a parse failure.
    pub fn synthesize(
        &self,
        term: &str,
        start_year: i32,
        end_year: i32,
        decade_data: &BTreeMap<String, Vec<String>>,
    ) -> Result<SynthesisOutcome, SynthesisError> {
        info!(
            term,
            start_year,
            end_year,
            decades = decade_data.len(),
            "Synthesizing research"
        );

        let prompt = build_synthesis_prompt(term, start_year, end_year, decade_data);
        let raw = self.chain.complete(SYNTHESIS_SYSTEM_PROMPT, &prompt)?;

        let cleaned = strip_code_fences(&raw);
        match serde_json::from_str::<SynthesisReport>(&cleaned) {
            Ok(report) => {
                info!(term, decades = report.decades.len(), "Synthesis report parsed");
                Ok(SynthesisOutcome::Report(report))
            }
            Err(e) => {
                error!(term, error = %e, "Failed to parse synthesis response");
                Ok(SynthesisOutcome::Unparsed {
                    error: "Failed to parse synthesis".to_string(),
                    raw,
                })
            }
        }
    }
}

/// Wire a synthesis engine against the remote completion API. Requires the
/// remote credential; local mode has no synthesis chain.
pub fn build_synthesis_engine(settings: &Settings) -> Result<SynthesisEngine, SynthesisError> {
    let key = settings.openrouter_api_key.as_deref().unwrap_or_default();
    let client = OpenRouterClient::new(OPENROUTER_BASE_URL, key, settings.request_timeout_secs)
        .map_err(SynthesisError::Model)?;
    let chain = ModelChain::new(
        Box::new(client),
        vec![settings.main_model.clone(), settings.fallback_model.clone()],
    );
    Ok(SynthesisEngine::new(chain))
}
