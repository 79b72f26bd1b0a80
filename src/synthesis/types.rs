use serde::{Deserialize, Serialize};

/// Findings for one decade of the synthesis report.
///
/// The three finding lists come back from the model as JSON arrays; a
/// missing list defaults to empty rather than failing the whole report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecadeFinding {
    /// Decade label, e.g. `1930s`.
    pub decade: String,
    #[serde(default)]
    pub what_spoken: Vec<String>,
    #[serde(default)]
    pub what_discussed: Vec<String>,
    #[serde(default)]
    pub new_discussion: Vec<String>,
}

/// Cross-decade synthesis for one research concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisReport {
    pub concept: String,
    #[serde(default)]
    pub decades: Vec<DecadeFinding>,
}

/// What one synthesis run produced.
///
/// A model response that is not valid JSON is not an error: the raw text
/// is preserved for diagnosis. Serialized untagged so a `Report` writes as
/// the report object itself and an `Unparsed` as `{"error", "raw"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SynthesisOutcome {
    Report(SynthesisReport),
    Unparsed { error: String, raw: String },
}
