use super::types::PdfTextSource;
use super::ExtractionError;

/// Embedded text layer reader backed by the pdf-extract crate.
/// Handles digital PDFs; scanned pages come back as empty strings.
pub struct PdfTextExtractor;

impl PdfTextSource for PdfTextExtractor {
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))
    }

    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, ExtractionError> {
        Ok(self.page_texts(pdf_bytes)?.len())
    }
}

/// Mock text source with fixed per-page text, for orchestrator and
/// processor tests that should not depend on a real PDF.
pub struct MockPdfSource {
    pages: Vec<String>,
    fail: bool,
}

impl MockPdfSource {
    pub fn new(pages: Vec<&str>) -> Self {
        Self {
            pages: pages.into_iter().map(str::to_string).collect(),
            fail: false,
        }
    }

    /// A source whose every call fails with a parse error.
    pub fn failing() -> Self {
        Self {
            pages: Vec::new(),
            fail: true,
        }
    }
}

impl PdfTextSource for MockPdfSource {
    fn page_texts(&self, _pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::PdfParsing("mock parse failure".into()));
        }
        Ok(self.pages.clone())
    }

    fn page_count(&self, _pdf_bytes: &[u8]) -> Result<usize, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::PdfParsing("mock parse failure".into()));
        }
        Ok(self.pages.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generate a valid PDF with text using lopdf (the library that pdf-extract uses internally).
    fn make_test_pdf(text: &str) -> Vec<u8> {
        use lopdf::dictionary;
        use lopdf::{Document, Object, Stream};

        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        // Page content stream: BT /F1 12 Tf (text) Tj ET
        let content = format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET");
        let content_stream = Stream::new(dictionary! {}, content.into_bytes());
        let content_id = doc.add_object(content_stream);

        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        };

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });

        if let Ok(page) = doc.get_object_mut(page_id) {
            if let Object::Dictionary(ref mut dict) = page {
                dict.set("Parent", pages_id);
            }
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });

        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn extracts_text_from_digital_pdf() {
        let source = PdfTextExtractor;
        let pdf_bytes = make_test_pdf("Madras Music Academy Journal 1934");
        let pages = source.page_texts(&pdf_bytes).unwrap();

        assert!(!pages.is_empty(), "Should extract at least one page");
        let full_text: String = pages.concat();
        assert!(
            full_text.contains("Madras") || full_text.contains("1934"),
            "Expected page text to survive extraction, got: {full_text}"
        );
    }

    #[test]
    fn page_count_matches_page_texts() {
        let source = PdfTextExtractor;
        let pdf_bytes = make_test_pdf("Test content");
        let count = source.page_count(&pdf_bytes).unwrap();
        let pages = source.page_texts(&pdf_bytes).unwrap();
        assert_eq!(count, pages.len());
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let source = PdfTextExtractor;
        let result = source.page_texts(b"not a pdf");
        assert!(matches!(result, Err(ExtractionError::PdfParsing(_))));
    }

    #[test]
    fn mock_source_returns_configured_pages() {
        let source = MockPdfSource::new(vec!["first page", ""]);
        let pages = source.page_texts(&[]).unwrap();
        assert_eq!(pages, vec!["first page".to_string(), String::new()]);
        assert_eq!(source.page_count(&[]).unwrap(), 2);
    }

    #[test]
    fn failing_mock_source_errors() {
        let source = MockPdfSource::failing();
        assert!(source.page_texts(&[]).is_err());
    }
}
