use super::types::{EVENT_TYPE_LABELS, PRIMARY_RESEARCH_TERMS};

/// System prompt for the combined remote analysis call.
pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are an expert musicologist. Output ONLY valid JSON.";

/// System prompt for local entity tagging.
pub const ENTITY_SYSTEM_PROMPT: &str =
    "You are a named-entity tagger for historical musicology texts. Output ONLY a valid JSON array.";

/// System prompt for local zero-shot event classification.
pub const CLASSIFY_SYSTEM_PROMPT: &str =
    "You are a zero-shot sentence classifier. Output ONLY a valid JSON array.";

/// System prompt for local summarization.
pub const SUMMARY_SYSTEM_PROMPT: &str =
    "You are an expert musicologist. Respond with plain prose only.";

/// Build the combined analysis prompt: summary, entities, and events in a
/// single strict-JSON response.
pub fn build_analysis_prompt(analysis_text: &str) -> String {
    let terms = PRIMARY_RESEARCH_TERMS.join(", ");
    format!(
        r#"Analyze the following text from a musicology academic document.

Focus specifically on these key terms if they appear: {terms}.

Tasks:
1. Provide a concise summary (3-5 sentences). If the primary terms are mentioned, explain how they are framed or discussed.
2. Extract key musicology entities (e.g., Rāga, Tāla, instruments, specific terms).
3. Identify important historical or musical events (e.g., performances, publications, births/deaths).

Format your response as JSON:
{{
    "summary": "...",
    "entities": [{{ "text": "...", "label": "..." }}],
    "events": [{{ "sentence": "...", "type": "...", "confidence": 0.9 }}]
}}

Text:
{analysis_text}"#
    )
}

/// Build the entity tagging prompt for the local ensemble.
pub fn build_entity_prompt(text: &str) -> String {
    format!(
        r#"Extract named entities from the following text from a musicology academic document.

Report people, organizations, places, musical works, and technical musicology terms.

Format your response as a JSON array:
[{{ "text": "...", "label": "PERSON | ORG | GPE | WORK_OF_ART | MUSICOLOGY_TERM" }}]

Text:
{text}"#
    )
}

/// Build the zero-shot classification prompt for one batch of candidate
/// sentences. The model must answer with one object per sentence, in
/// order.
pub fn build_classification_prompt(sentences: &[String]) -> String {
    let labels = EVENT_TYPE_LABELS.join(", ");
    let mut listed = String::new();
    for (index, sentence) in sentences.iter().enumerate() {
        listed.push_str(&format!("{}. {}\n", index + 1, sentence));
    }

    format!(
        r#"Classify each numbered sentence below into exactly one of these event types: {labels}.

Respond with a JSON array holding one object per sentence, in the same order:
[{{ "label": "...", "confidence": 0.0 }}]

Confidence is your certainty, between 0 and 1, that the sentence describes an event of the chosen type.

Sentences:
{listed}"#
    )
}

/// Build the summarization prompt for the local ensemble.
pub fn build_summary_prompt(text: &str) -> String {
    let terms = PRIMARY_RESEARCH_TERMS.join(", ");
    format!(
        r#"Summarize the following text from a musicology academic document in 3-5 sentences.

If any of these key terms appear, explain how they are framed or discussed: {terms}.

Text:
{text}"#
    )
}
