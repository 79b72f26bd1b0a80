use std::sync::{Arc, LazyLock};

use tracing::{debug, info, warn};

use super::lexicon::{apply_safety_net, MUSICOLOGY_TERMS};
use super::parser::{parse_array_lenient, strip_code_fences};
use super::prompt::{
    build_classification_prompt, build_entity_prompt, build_summary_prompt,
    CLASSIFY_SYSTEM_PROMPT, ENTITY_SYSTEM_PROMPT, SUMMARY_SYSTEM_PROMPT,
};
use super::types::{
    truncate_chars, DocumentAnalyzer, EntityTagger, EventClassifier, EventLabel, Summarizer,
    ANALYSIS_MAX_CHARS, EVENT_TYPE_LABELS,
};
use super::AnalysisError;
use crate::models::{AnalysisRecord, DetectedEvent, Entity};
use crate::pipeline::dates::detect_decade;
use crate::pipeline::ollama::LlmClient;

/// Shortest sentence (in chars, trimmed) considered an event candidate.
pub const MIN_EVENT_SENTENCE_LEN: usize = 20;

/// Cap on candidate sentences sent to the classifier per document.
pub const MAX_EVENT_CANDIDATES: usize = 100;

/// Zero-shot confidence an event must exceed to be kept.
pub const EVENT_CONFIDENCE_THRESHOLD: f64 = 0.70;

/// Sentences per classification call.
const CLASSIFY_BATCH_SIZE: usize = 10;

static EVENT_KEYWORDS: LazyLock<Vec<String>> = LazyLock::new(|| {
    EVENT_TYPE_LABELS
        .iter()
        .chain(MUSICOLOGY_TERMS.iter())
        .map(|keyword| keyword.to_lowercase())
        .collect()
});

/// Local analysis: task-specialized sub-engines instead of one combined
/// prompt. Each facet degrades independently when its sub-engine fails;
/// the record itself is always produced.
pub struct EnsembleAnalyzer {
    tagger: Box<dyn EntityTagger + Send + Sync>,
    classifier: Box<dyn EventClassifier + Send + Sync>,
    summarizer: Box<dyn Summarizer + Send + Sync>,
}

impl EnsembleAnalyzer {
    pub fn new(
        tagger: Box<dyn EntityTagger + Send + Sync>,
        classifier: Box<dyn EventClassifier + Send + Sync>,
        summarizer: Box<dyn Summarizer + Send + Sync>,
    ) -> Self {
        Self {
            tagger,
            classifier,
            summarizer,
        }
    }
}

impl DocumentAnalyzer for EnsembleAnalyzer {
    fn analyze(&self, text: &str) -> Result<AnalysisRecord, AnalysisError> {
        info!(chars = text.len(), "Starting local ensemble analysis");

        let decade = detect_decade(text);
        let analysis_text = truncate_chars(text, ANALYSIS_MAX_CHARS);

        let mut entities = match self.tagger.tag(analysis_text) {
            Ok(entities) => entities,
            Err(e) => {
                warn!(error = %e, "Entity tagging failed, continuing without model entities");
                Vec::new()
            }
        };

        let summary = match self.summarizer.summarize(analysis_text) {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "Summarization failed, continuing with empty summary");
                String::new()
            }
        };

        let candidates = event_candidates(analysis_text);
        debug!(candidates = candidates.len(), "Selected event candidate sentences");

        let labels = match self.classifier.classify(&candidates) {
            Ok(labels) => labels,
            Err(e) => {
                warn!(error = %e, "Event classification failed, continuing without events");
                Vec::new()
            }
        };

        let events: Vec<DetectedEvent> = candidates
            .into_iter()
            .zip(labels)
            .filter(|(_, label)| label.confidence > EVENT_CONFIDENCE_THRESHOLD)
            .map(|(sentence, label)| DetectedEvent {
                sentence,
                event_type: label.label,
                confidence: label.confidence,
            })
            .collect();

        apply_safety_net(&mut entities, text);

        let record = AnalysisRecord {
            entities,
            events,
            summary,
            decade,
            topics: Vec::new(),
        };
        info!(
            entities = record.entities.len(),
            events = record.events.len(),
            decade = ?record.decade,
            "Local ensemble analysis complete"
        );
        Ok(record)
    }
}

/// Split text into sentences on terminal punctuation.
pub fn segment_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Sentences worth classifying: long enough and containing at least one
/// event-indicator keyword, capped at [`MAX_EVENT_CANDIDATES`].
pub fn event_candidates(text: &str) -> Vec<String> {
    segment_sentences(text)
        .into_iter()
        .filter(|sentence| is_event_candidate(sentence))
        .take(MAX_EVENT_CANDIDATES)
        .collect()
}

fn is_event_candidate(sentence: &str) -> bool {
    let trimmed = sentence.trim();
    if trimmed.chars().count() <= MIN_EVENT_SENTENCE_LEN {
        return false;
    }
    let lower = trimmed.to_lowercase();
    EVENT_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

// ── Ollama-backed sub-engines ───────────────────────────────────────

/// Entity tagging via a local model.
pub struct OllamaEntityTagger {
    client: Arc<dyn LlmClient + Send + Sync>,
    model: String,
}

impl OllamaEntityTagger {
    pub fn new(client: Arc<dyn LlmClient + Send + Sync>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

impl EntityTagger for OllamaEntityTagger {
    fn tag(&self, text: &str) -> Result<Vec<Entity>, AnalysisError> {
        let prompt = build_entity_prompt(text);
        let raw = self
            .client
            .generate(&self.model, &prompt, ENTITY_SYSTEM_PROMPT)?;

        let cleaned = strip_code_fences(&raw);
        let value: serde_json::Value = serde_json::from_str(&cleaned)
            .map_err(|e| AnalysisError::ResponseParsing(e.to_string()))?;

        let mut entities: Vec<Entity> = parse_array_lenient(Some(&value));
        entities.retain(|e| !e.text.trim().is_empty());
        Ok(entities)
    }
}

/// Zero-shot event classification via a local model, batched.
pub struct OllamaEventClassifier {
    client: Arc<dyn LlmClient + Send + Sync>,
    model: String,
}

impl OllamaEventClassifier {
    pub fn new(client: Arc<dyn LlmClient + Send + Sync>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    fn classify_batch(&self, batch: &[String]) -> Result<Vec<EventLabel>, AnalysisError> {
        let prompt = build_classification_prompt(batch);
        let raw = self
            .client
            .generate(&self.model, &prompt, CLASSIFY_SYSTEM_PROMPT)?;

        let cleaned = strip_code_fences(&raw);
        let value: serde_json::Value = serde_json::from_str(&cleaned)
            .map_err(|e| AnalysisError::ResponseParsing(e.to_string()))?;

        Ok(parse_array_lenient(Some(&value)))
    }
}

impl EventClassifier for OllamaEventClassifier {
    fn classify(&self, sentences: &[String]) -> Result<Vec<EventLabel>, AnalysisError> {
        let mut labels = Vec::with_capacity(sentences.len());

        for batch in sentences.chunks(CLASSIFY_BATCH_SIZE) {
            match self.classify_batch(batch) {
                Ok(mut batch_labels) => {
                    // Realign with the batch: a short or long model answer
                    // must not shift later sentences' labels.
                    batch_labels.resize(batch.len(), EventLabel::none());
                    labels.extend(batch_labels);
                }
                Err(e) => {
                    warn!(error = %e, batch = batch.len(), "Classification batch failed, skipping");
                    labels.extend(std::iter::repeat_with(EventLabel::none).take(batch.len()));
                }
            }
        }

        Ok(labels)
    }
}

/// Summarization via a local model. The response is used as plain prose.
pub struct OllamaSummarizer {
    client: Arc<dyn LlmClient + Send + Sync>,
    model: String,
}

impl OllamaSummarizer {
    pub fn new(client: Arc<dyn LlmClient + Send + Sync>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

impl Summarizer for OllamaSummarizer {
    fn summarize(&self, text: &str) -> Result<String, AnalysisError> {
        let prompt = build_summary_prompt(text);
        let raw = self
            .client
            .generate(&self.model, &prompt, SUMMARY_SYSTEM_PROMPT)?;
        Ok(raw.trim().to_string())
    }
}

// ── Mock sub-engines for testing ────────────────────────────────────

pub struct MockEntityTagger {
    entities: Vec<Entity>,
    fail: bool,
}

impl MockEntityTagger {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            entities,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            entities: Vec::new(),
            fail: true,
        }
    }
}

impl EntityTagger for MockEntityTagger {
    fn tag(&self, _text: &str) -> Result<Vec<Entity>, AnalysisError> {
        if self.fail {
            return Err(AnalysisError::ResponseParsing("mock tagger failure".into()));
        }
        Ok(self.entities.clone())
    }
}

/// Mock classifier assigning the same label to every sentence.
pub struct MockEventClassifier {
    label: String,
    confidence: f64,
    fail: bool,
}

impl MockEventClassifier {
    pub fn new(label: &str, confidence: f64) -> Self {
        Self {
            label: label.to_string(),
            confidence,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            label: String::new(),
            confidence: 0.0,
            fail: true,
        }
    }
}

impl EventClassifier for MockEventClassifier {
    fn classify(&self, sentences: &[String]) -> Result<Vec<EventLabel>, AnalysisError> {
        if self.fail {
            return Err(AnalysisError::ResponseParsing(
                "mock classifier failure".into(),
            ));
        }
        Ok(sentences
            .iter()
            .map(|_| EventLabel::new(&self.label, self.confidence))
            .collect())
    }
}

pub struct MockSummarizer {
    summary: String,
    fail: bool,
}

impl MockSummarizer {
    pub fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            summary: String::new(),
            fail: true,
        }
    }
}

impl Summarizer for MockSummarizer {
    fn summarize(&self, _text: &str) -> Result<String, AnalysisError> {
        if self.fail {
            return Err(AnalysisError::ResponseParsing(
                "mock summarizer failure".into(),
            ));
        }
        Ok(self.summary.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MUSICOLOGY_TERM_LABEL;
    use crate::pipeline::ollama::MockLlmClient;

    fn ensemble(
        tagger: MockEntityTagger,
        classifier: MockEventClassifier,
        summarizer: MockSummarizer,
    ) -> EnsembleAnalyzer {
        EnsembleAnalyzer::new(Box::new(tagger), Box::new(classifier), Box::new(summarizer))
    }

    const SAMPLE: &str = "The Music Academy was founded in Madras in 1928. \
        The quarterly journal was published from 1930 onwards. Short note. \
        Nothing noteworthy happened administratively.";

    // ── Sentence segmentation and candidate selection ───────────────

    #[test]
    fn segments_on_terminal_punctuation() {
        let sentences = segment_sentences("First sentence. Second one! A question? Trailing tail");
        assert_eq!(
            sentences,
            vec!["First sentence.", "Second one!", "A question?", "Trailing tail"]
        );
    }

    #[test]
    fn segmenting_empty_text_yields_nothing() {
        assert!(segment_sentences("").is_empty());
        assert!(segment_sentences("   ").is_empty());
    }

    #[test]
    fn candidates_need_length_and_a_keyword() {
        let candidates = event_candidates(SAMPLE);
        // "Short note." is too short; the administrative sentence has no
        // event keyword.
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].contains("founded"));
        assert!(candidates[1].contains("published"));
    }

    #[test]
    fn candidate_keywords_include_musicology_terms() {
        let text = "The discussion of Rāga interpretation continued for several sessions.";
        assert_eq!(event_candidates(text).len(), 1);
    }

    #[test]
    fn candidates_are_capped() {
        let mut text = String::new();
        for i in 0..150 {
            text.push_str(&format!("Concert number {i} was performed before the assembly. "));
        }
        assert_eq!(event_candidates(&text).len(), MAX_EVENT_CANDIDATES);
    }

    // ── Ensemble orchestration ──────────────────────────────────────

    #[test]
    fn full_ensemble_run() {
        let analyzer = ensemble(
            MockEntityTagger::new(vec![Entity::new("Music Academy", "ORG")]),
            MockEventClassifier::new("founded", 0.9),
            MockSummarizer::new("An account of the Academy's founding years."),
        );

        let record = analyzer.analyze(SAMPLE).unwrap();

        assert_eq!(record.summary, "An account of the Academy's founding years.");
        assert!(record.entities.iter().any(|e| e.text == "Music Academy"));
        assert_eq!(record.events.len(), 2);
        assert!(record.events.iter().all(|e| e.event_type == "founded"));
        assert_eq!(record.decade, Some(1920));
    }

    #[test]
    fn low_confidence_events_are_dropped() {
        let analyzer = ensemble(
            MockEntityTagger::new(vec![]),
            MockEventClassifier::new("published", 0.5),
            MockSummarizer::new("s"),
        );
        let record = analyzer.analyze(SAMPLE).unwrap();
        assert!(record.events.is_empty());
    }

    #[test]
    fn threshold_is_strictly_greater() {
        let analyzer = ensemble(
            MockEntityTagger::new(vec![]),
            MockEventClassifier::new("published", EVENT_CONFIDENCE_THRESHOLD),
            MockSummarizer::new("s"),
        );
        let record = analyzer.analyze(SAMPLE).unwrap();
        assert!(record.events.is_empty(), "confidence exactly at the threshold is rejected");
    }

    #[test]
    fn tagger_failure_degrades_entities_only() {
        let analyzer = ensemble(
            MockEntityTagger::failing(),
            MockEventClassifier::new("founded", 0.9),
            MockSummarizer::new("summary survives"),
        );

        let record = analyzer.analyze(SAMPLE).unwrap();
        assert_eq!(record.summary, "summary survives");
        assert_eq!(record.events.len(), 2);
        // No model entities, and no musicology terms in the sample text.
        assert!(record.entities.is_empty());
    }

    #[test]
    fn safety_net_fills_in_after_tagger_failure() {
        let analyzer = ensemble(
            MockEntityTagger::failing(),
            MockEventClassifier::new("founded", 0.9),
            MockSummarizer::new("s"),
        );
        let record = analyzer
            .analyze("A long discourse on Gāndharva performance was recorded in 1931.")
            .unwrap();

        assert!(record
            .entities
            .iter()
            .any(|e| e.text == "Gāndharva" && e.label == MUSICOLOGY_TERM_LABEL));
    }

    #[test]
    fn summarizer_failure_leaves_summary_empty() {
        let analyzer = ensemble(
            MockEntityTagger::new(vec![Entity::new("Madras", "GPE")]),
            MockEventClassifier::new("founded", 0.9),
            MockSummarizer::failing(),
        );
        let record = analyzer.analyze(SAMPLE).unwrap();
        assert_eq!(record.summary, "");
        assert!(!record.entities.is_empty());
    }

    #[test]
    fn classifier_failure_leaves_events_empty() {
        let analyzer = ensemble(
            MockEntityTagger::new(vec![]),
            MockEventClassifier::failing(),
            MockSummarizer::new("still here"),
        );
        let record = analyzer.analyze(SAMPLE).unwrap();
        assert!(record.events.is_empty());
        assert_eq!(record.summary, "still here");
    }

    // ── Ollama-backed engines against a mock runtime ────────────────

    #[test]
    fn ollama_tagger_parses_fenced_array() {
        let client = Arc::new(MockLlmClient::new(
            "```json\n[{\"text\": \"Tyagaraja\", \"label\": \"PERSON\"}, {\"text\": \"\", \"label\": \"ORG\"}]\n```",
        ));
        let tagger = OllamaEntityTagger::new(client, "qwen2.5:3b-instruct");

        let entities = tagger.tag("some text").unwrap();
        assert_eq!(entities.len(), 1, "empty-text entity must be dropped");
        assert_eq!(entities[0].text, "Tyagaraja");
    }

    #[test]
    fn ollama_tagger_rejects_non_json() {
        let client = Arc::new(MockLlmClient::new("no json at all"));
        let tagger = OllamaEntityTagger::new(client, "m");
        assert!(tagger.tag("text").is_err());
    }

    #[test]
    fn ollama_classifier_pads_short_answers() {
        // Model answers for only one of two sentences.
        let client = Arc::new(MockLlmClient::new(
            "[{\"label\": \"published\", \"confidence\": 0.85}]",
        ));
        let classifier = OllamaEventClassifier::new(client, "m");

        let labels = classifier
            .classify(&["first sentence".into(), "second sentence".into()])
            .unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].label, "published");
        assert_eq!(labels[1], EventLabel::none());
    }

    #[test]
    fn ollama_classifier_survives_runtime_failure() {
        let client = Arc::new(MockLlmClient::failing());
        let classifier = OllamaEventClassifier::new(client, "m");

        let labels = classifier.classify(&["a sentence".into()]).unwrap();
        assert_eq!(labels, vec![EventLabel::none()]);
    }

    #[test]
    fn ollama_classifier_empty_input_makes_no_calls() {
        let client = Arc::new(MockLlmClient::failing());
        let classifier = OllamaEventClassifier::new(client, "m");
        assert!(classifier.classify(&[]).unwrap().is_empty());
    }

    #[test]
    fn ollama_summarizer_trims_response() {
        let client = Arc::new(MockLlmClient::new("  A short summary.\n"));
        let summarizer = OllamaSummarizer::new(client, "llama3.2:3b");
        assert_eq!(summarizer.summarize("text").unwrap(), "A short summary.");
    }
}
