//! Document processing lifecycle.
//!
//! One `process` call takes a registered document through extraction and
//! analysis and returns everything the surrounding store needs to persist:
//! terminal status, the analysis row, and the replacement event set. The
//! call itself never fails; every stage error becomes a `Failed` outcome
//! with the cause logged and carried along.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Settings;
use crate::models::{Document, DocumentStatus, Event, StoredAnalysis};
use crate::pipeline::analysis::{build_analyzer, AnalysisError, DocumentAnalyzer};
use crate::pipeline::extraction::{
    DocumentExtractor, ExtractedDocument, ExtractionError, ExtractionWarning, MockOcrEngine,
    OcrEngine, PdfTextExtractor, PdfiumRenderer, TextExtractor,
};

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("No text could be extracted from the document")]
    EmptyDocument,
}

/// Counters describing how extraction went, kept on the outcome for
/// operator-facing status displays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub pages: usize,
    pub warnings: Vec<ExtractionWarning>,
    pub text_chars: usize,
}

impl From<&ExtractedDocument> for ExtractionSummary {
    fn from(extracted: &ExtractedDocument) -> Self {
        Self {
            pages: extracted.pages.len(),
            warnings: extracted.warnings.clone(),
            text_chars: extracted.full_text.chars().count(),
        }
    }
}

/// Result of one processing run over one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingOutcome {
    pub document_id: Uuid,
    /// Terminal status for the document row: `Processed` or `Failed`.
    pub status: DocumentStatus,
    pub decade: Option<i32>,
    pub analysis: Option<StoredAnalysis>,
    /// Full replacement set: callers drop all prior events for this
    /// document before inserting these.
    pub events: Vec<Event>,
    pub extraction: Option<ExtractionSummary>,
    pub error: Option<String>,
}

impl ProcessingOutcome {
    fn failed(
        document_id: Uuid,
        extraction: Option<ExtractionSummary>,
        error: &ProcessingError,
    ) -> Self {
        Self {
            document_id,
            status: DocumentStatus::Failed,
            decade: None,
            analysis: None,
            events: Vec::new(),
            extraction,
            error: Some(error.to_string()),
        }
    }
}

/// Orchestrates the per-document pipeline over injected stage
/// implementations.
pub struct DocumentProcessor {
    extractor: Box<dyn TextExtractor + Send + Sync>,
    analyzer: Box<dyn DocumentAnalyzer + Send + Sync>,
}

impl DocumentProcessor {
    pub fn new(
        extractor: Box<dyn TextExtractor + Send + Sync>,
        analyzer: Box<dyn DocumentAnalyzer + Send + Sync>,
    ) -> Self {
        Self {
            extractor,
            analyzer,
        }
    }

    pub fn process(&self, document: &Document) -> ProcessingOutcome {
        info!(
            document_id = %document.id,
            filename = %document.filename,
            "Processing document"
        );

        let extracted = match self.extractor.extract(Path::new(&document.path)) {
            Ok(extracted) => extracted,
            Err(e) => {
                error!(document_id = %document.id, error = %e, "Text extraction failed");
                return ProcessingOutcome::failed(
                    document.id,
                    None,
                    &ProcessingError::Extraction(e),
                );
            }
        };
        let extraction = ExtractionSummary::from(&extracted);

        if extracted.full_text.trim().is_empty() {
            warn!(document_id = %document.id, "Document produced no text");
            return ProcessingOutcome::failed(
                document.id,
                Some(extraction),
                &ProcessingError::EmptyDocument,
            );
        }

        let record = match self.analyzer.analyze(&extracted.full_text) {
            Ok(record) => record,
            Err(e) => {
                error!(document_id = %document.id, error = %e, "Analysis failed");
                return ProcessingOutcome::failed(
                    document.id,
                    Some(extraction),
                    &ProcessingError::Analysis(e),
                );
            }
        };

        let decade = record.decade;
        let stored = StoredAnalysis::new(document.id, record);
        let events: Vec<Event> = stored
            .record
            .events
            .iter()
            .map(|detection| {
                Event::from_detection(
                    document.id,
                    &document.filename,
                    detection,
                    &stored.record.entities,
                )
            })
            .collect();

        info!(
            document_id = %document.id,
            decade = ?decade,
            entities = stored.record.entities.len(),
            events = events.len(),
            "Document processed"
        );

        ProcessingOutcome {
            document_id: document.id,
            status: DocumentStatus::Processed,
            decade,
            analysis: Some(stored),
            events,
            extraction: Some(extraction),
            error: None,
        }
    }
}

/// Wire a processor from production implementations: embedded text layer
/// plus OCR fallback for extraction, and the analyzer mode selected by the
/// configured credential.
pub fn build_processor(settings: &Settings) -> Result<DocumentProcessor, ProcessingError> {
    let analyzer = build_analyzer(settings)?;
    Ok(DocumentProcessor::new(build_extractor(), analyzer))
}

/// Production extractor wiring. PDFium and Tesseract are both optional at
/// runtime; without them scanned pages degrade to empty text.
pub fn build_extractor() -> Box<dyn TextExtractor + Send + Sync> {
    let extractor = DocumentExtractor::new(Box::new(PdfTextExtractor), build_ocr_engine());

    match PdfiumRenderer::new() {
        Ok(renderer) => Box::new(extractor.with_renderer(Box::new(renderer))),
        Err(e) => {
            warn!(error = %e, "PDFium unavailable, scanned pages will not be rendered for OCR");
            Box::new(extractor)
        }
    }
}

#[cfg(feature = "ocr")]
fn build_ocr_engine() -> Box<dyn OcrEngine + Send + Sync> {
    use crate::pipeline::extraction::{default_tessdata_dir, TesseractOcr};

    match default_tessdata_dir() {
        Some(dir) => match TesseractOcr::new(&dir) {
            Ok(engine) => {
                info!(tessdata = %dir.display(), "Tesseract OCR initialized");
                return Box::new(engine);
            }
            Err(e) => warn!(error = %e, "Tesseract initialization failed"),
        },
        None => warn!("No tessdata directory found, scanned pages will produce empty text"),
    }
    Box::new(MockOcrEngine::new("", 0.0))
}

#[cfg(not(feature = "ocr"))]
fn build_ocr_engine() -> Box<dyn OcrEngine + Send + Sync> {
    warn!("Built without the ocr feature, scanned pages will produce empty text");
    Box::new(MockOcrEngine::new("", 0.0))
}
