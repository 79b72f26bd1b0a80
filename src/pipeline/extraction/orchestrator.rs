use std::path::Path;

use tracing::{info, warn};

use super::preprocess::{prepare_for_ocr, OCR_UPSCALE_FACTOR};
use super::types::{
    ExtractedDocument, ExtractionWarning, OcrEngine, PageRenderer, PdfTextSource, RawPage,
    TextExtractor,
};
use super::ExtractionError;

/// Concrete implementation of the text extractor.
/// Uses trait objects for the text layer, rendering, and OCR, enabling
/// dependency injection.
pub struct DocumentExtractor {
    text_source: Box<dyn PdfTextSource + Send + Sync>,
    ocr_engine: Box<dyn OcrEngine + Send + Sync>,
    renderer: Option<Box<dyn PageRenderer + Send + Sync>>,
}

impl DocumentExtractor {
    pub fn new(
        text_source: Box<dyn PdfTextSource + Send + Sync>,
        ocr_engine: Box<dyn OcrEngine + Send + Sync>,
    ) -> Self {
        Self {
            text_source,
            ocr_engine,
            renderer: None,
        }
    }

    /// Add a page renderer for OCR of scanned pages. Without one, pages
    /// lacking a text layer degrade to empty text.
    pub fn with_renderer(mut self, renderer: Box<dyn PageRenderer + Send + Sync>) -> Self {
        self.renderer = Some(renderer);
        self
    }
}

impl TextExtractor for DocumentExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedDocument, ExtractionError> {
        info!(path = %path.display(), "Starting text extraction");

        let pdf_bytes = std::fs::read(path)?;
        let page_texts = self.text_source.page_texts(&pdf_bytes)?;

        let mut pages = Vec::with_capacity(page_texts.len());
        let mut warnings = Vec::new();

        for (index, embedded) in page_texts.into_iter().enumerate() {
            let page_number = index + 1;

            // A present text layer wins; OCR is strictly a fallback.
            if !embedded.trim().is_empty() {
                pages.push(RawPage {
                    page_number,
                    text: embedded,
                });
                continue;
            }

            let text = match self.ocr_page(&pdf_bytes, index) {
                Ok(text) => text,
                Err(e) => {
                    warn!(page = page_number, error = %e, "Page OCR failed, degrading to empty text");
                    warnings.push(ExtractionWarning {
                        page: page_number,
                        message: e.to_string(),
                    });
                    String::new()
                }
            };
            pages.push(RawPage { page_number, text });
        }

        let mut full_text = String::new();
        for page in &pages {
            full_text.push_str(&page.text);
            full_text.push('\n');
        }

        info!(
            path = %path.display(),
            pages = pages.len(),
            warnings = warnings.len(),
            text_length = full_text.len(),
            "Text extraction complete"
        );

        Ok(ExtractedDocument {
            full_text,
            pages,
            warnings,
        })
    }
}

impl DocumentExtractor {
    /// Render one text-less page and run it through the OCR chain.
    fn ocr_page(&self, pdf_bytes: &[u8], page_index: usize) -> Result<String, ExtractionError> {
        let renderer = self.renderer.as_ref().ok_or_else(|| {
            ExtractionError::PdfRendering {
                page: page_index,
                reason: "No page renderer available".into(),
            }
        })?;

        let page_image = renderer.render_page(pdf_bytes, page_index, OCR_UPSCALE_FACTOR)?;
        let processed = prepare_for_ocr(&page_image)?;
        let result = self.ocr_engine.recognize(&processed)?;
        Ok(result.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::ocr::MockOcrEngine;
    use crate::pipeline::extraction::pdf::{MockPdfSource, PdfTextExtractor};
    use crate::pipeline::extraction::render::MockPageRenderer;
    use std::io::Write;

    fn temp_file_with(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn embedded_text_passes_through_verbatim() {
        let extractor = DocumentExtractor::new(
            Box::new(MockPdfSource::new(vec![
                "The Academy conference of 1928 resolved",
                "to publish a quarterly journal.",
            ])),
            Box::new(MockOcrEngine::new("should never run", 0.9)),
        );
        let file = temp_file_with(b"pdf bytes ignored by mock");

        let doc = extractor.extract(file.path()).unwrap();

        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[0].page_number, 1);
        assert_eq!(doc.pages[1].page_number, 2);
        assert_eq!(doc.pages[0].text, "The Academy conference of 1928 resolved");
        assert!(doc.warnings.is_empty());
        assert!(
            !doc.full_text.contains("should never run"),
            "OCR must not fire for pages with a text layer"
        );
    }

    #[test]
    fn full_text_joins_pages_with_newlines() {
        let extractor = DocumentExtractor::new(
            Box::new(MockPdfSource::new(vec!["first", "second"])),
            Box::new(MockOcrEngine::new("", 0.0)),
        );
        let file = temp_file_with(b"x");

        let doc = extractor.extract(file.path()).unwrap();
        assert_eq!(doc.full_text, "first\nsecond\n");
    }

    #[test]
    fn empty_page_falls_back_to_ocr() {
        let extractor = DocumentExtractor::new(
            Box::new(MockPdfSource::new(vec!["digital page", "   "])),
            Box::new(MockOcrEngine::new("recognized scan text", 0.8)),
        )
        .with_renderer(Box::new(MockPageRenderer::new(2)));
        let file = temp_file_with(b"x");

        let doc = extractor.extract(file.path()).unwrap();

        assert_eq!(doc.pages[0].text, "digital page");
        assert_eq!(doc.pages[1].text, "recognized scan text");
        assert!(doc.warnings.is_empty());
    }

    #[test]
    fn ocr_failure_degrades_page_with_warning() {
        let extractor = DocumentExtractor::new(
            Box::new(MockPdfSource::new(vec!["", "still fine"])),
            Box::new(MockOcrEngine::failing()),
        )
        .with_renderer(Box::new(MockPageRenderer::new(2)));
        let file = temp_file_with(b"x");

        let doc = extractor.extract(file.path()).unwrap();

        assert_eq!(doc.pages[0].text, "");
        assert_eq!(doc.pages[1].text, "still fine");
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.warnings[0].page, 1);
        assert!(doc.warnings[0].message.contains("OCR"));
    }

    #[test]
    fn missing_renderer_degrades_instead_of_failing() {
        let extractor = DocumentExtractor::new(
            Box::new(MockPdfSource::new(vec![""])),
            Box::new(MockOcrEngine::new("unreachable", 0.9)),
        );
        let file = temp_file_with(b"x");

        let doc = extractor.extract(file.path()).unwrap();

        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].text, "");
        assert_eq!(doc.warnings.len(), 1);
        assert!(doc.warnings[0].message.contains("renderer"));
    }

    #[test]
    fn render_failure_degrades_page() {
        // Mock renderer has zero pages, so every render call errors.
        let extractor = DocumentExtractor::new(
            Box::new(MockPdfSource::new(vec![""])),
            Box::new(MockOcrEngine::new("unreachable", 0.9)),
        )
        .with_renderer(Box::new(MockPageRenderer::new(0)));
        let file = temp_file_with(b"x");

        let doc = extractor.extract(file.path()).unwrap();
        assert_eq!(doc.pages[0].text, "");
        assert_eq!(doc.warnings.len(), 1);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let extractor = DocumentExtractor::new(
            Box::new(MockPdfSource::new(vec!["a"])),
            Box::new(MockOcrEngine::new("", 0.0)),
        );

        let result = extractor.extract(Path::new("/nonexistent/archive/volume.pdf"));
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[test]
    fn unparseable_pdf_is_an_error() {
        let extractor = DocumentExtractor::new(
            Box::new(PdfTextExtractor),
            Box::new(MockOcrEngine::new("", 0.0)),
        );
        let file = temp_file_with(b"this is not a pdf at all");

        let result = extractor.extract(file.path());
        assert!(matches!(result, Err(ExtractionError::PdfParsing(_))));
    }

    #[test]
    fn empty_document_yields_empty_text() {
        let extractor = DocumentExtractor::new(
            Box::new(MockPdfSource::new(vec![])),
            Box::new(MockOcrEngine::new("", 0.0)),
        );
        let file = temp_file_with(b"x");

        let doc = extractor.extract(file.path()).unwrap();
        assert!(doc.pages.is_empty());
        assert_eq!(doc.full_text, "");
    }
}
