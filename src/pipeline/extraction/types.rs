use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Text of a single page as extracted. Ephemeral, lives only for one
/// processing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPage {
    /// 1-based page number.
    pub page_number: usize,
    /// May be empty when both the text layer and OCR came up short.
    pub text: String,
}

/// A non-fatal degradation noted while extracting one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionWarning {
    pub page: usize,
    pub message: String,
}

/// Result of text extraction from a single document.
///
/// `full_text` is the concatenation of every page's text, each followed by
/// a newline, so downstream regex scans see page boundaries as line breaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub full_text: String,
    pub pages: Vec<RawPage>,
    pub warnings: Vec<ExtractionWarning>,
}

/// Raw OCR output for one page image.
#[derive(Debug, Clone)]
pub struct OcrText {
    pub text: String,
    /// Mean recognition confidence in [0, 1].
    pub confidence: f32,
}

/// Embedded text layer access (allows mocking).
pub trait PdfTextSource {
    /// Per-page embedded text, in page order. Empty strings for pages with
    /// no text layer.
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;

    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, ExtractionError>;
}

/// Rasterizes one page to image bytes (allows mocking).
pub trait PageRenderer {
    /// Render the 0-based `page_index` at `scale` pixels per PDF point and
    /// return encoded PNG bytes.
    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_index: usize,
        scale: f32,
    ) -> Result<Vec<u8>, ExtractionError>;
}

/// Optical recognition over one page image (allows mocking).
pub trait OcrEngine {
    fn recognize(&self, image_bytes: &[u8]) -> Result<OcrText, ExtractionError>;
}

/// Document-level extraction orchestrator trait.
pub trait TextExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedDocument, ExtractionError>;
}
