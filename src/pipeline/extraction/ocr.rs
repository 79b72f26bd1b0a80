use super::types::{OcrEngine, OcrText};
use super::ExtractionError;

/// Locate a usable tessdata directory.
///
/// Discovery order:
/// 1. `TESSDATA_PREFIX` env var
/// 2. Common system install locations
///
/// A directory counts only if `eng.traineddata` is present.
#[cfg(feature = "ocr")]
pub fn default_tessdata_dir() -> Option<std::path::PathBuf> {
    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let candidate = std::path::PathBuf::from(prefix);
        if candidate.join("eng.traineddata").exists() {
            return Some(candidate);
        }
    }

    const SYSTEM_LOCATIONS: &[&str] = &[
        "/usr/share/tesseract-ocr/5/tessdata",
        "/usr/share/tesseract-ocr/4.00/tessdata",
        "/usr/share/tessdata",
        "/usr/local/share/tessdata",
        "/opt/homebrew/share/tessdata",
    ];
    SYSTEM_LOCATIONS
        .iter()
        .map(std::path::PathBuf::from)
        .find(|dir| dir.join("eng.traineddata").exists())
}

/// Tesseract OCR engine.
/// Only available when compiled with the `ocr` feature flag.
#[cfg(feature = "ocr")]
pub struct TesseractOcr {
    tessdata_dir: std::path::PathBuf,
    lang: String,
}

#[cfg(feature = "ocr")]
impl TesseractOcr {
    /// Initialize with a tessdata directory. English must be installed;
    /// archive volumes are English-language throughout.
    pub fn new(tessdata_dir: &std::path::Path) -> Result<Self, ExtractionError> {
        if !tessdata_dir.join("eng.traineddata").exists() {
            return Err(ExtractionError::TessdataNotFound(tessdata_dir.to_path_buf()));
        }

        Ok(Self {
            tessdata_dir: tessdata_dir.to_path_buf(),
            lang: "eng".to_string(),
        })
    }

    /// Set language(s) for OCR (e.g., "eng", "eng+san").
    pub fn with_languages(mut self, langs: &str) -> Self {
        self.lang = langs.to_string();
        self
    }
}

#[cfg(feature = "ocr")]
impl OcrEngine for TesseractOcr {
    fn recognize(&self, image_bytes: &[u8]) -> Result<OcrText, ExtractionError> {
        let tessdata_str = self
            .tessdata_dir
            .to_str()
            .ok_or_else(|| ExtractionError::OcrInit("Invalid tessdata path".into()))?;

        let tess = tesseract::Tesseract::new(Some(tessdata_str), Some(&self.lang))
            .map_err(|e| ExtractionError::OcrInit(format!("{e:?}")))?;

        let mut tess = tess
            .set_image_from_mem(image_bytes)
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

        let text = tess
            .get_text()
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

        let confidence = tess.mean_text_conf().max(0) as f32 / 100.0;

        Ok(OcrText { text, confidence })
    }
}

/// Mock OCR engine for unit testing without Tesseract.
pub struct MockOcrEngine {
    text: String,
    confidence: f32,
    fail: bool,
}

impl MockOcrEngine {
    pub fn new(text: &str, confidence: f32) -> Self {
        Self {
            text: text.to_string(),
            confidence,
            fail: false,
        }
    }

    /// An engine whose every call fails, for degradation-path tests.
    pub fn failing() -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
            fail: true,
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<OcrText, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::OcrProcessing("mock OCR failure".into()));
        }
        Ok(OcrText {
            text: self.text.clone(),
            confidence: self.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_ocr_returns_configured_text() {
        let engine = MockOcrEngine::new("The Tyagaraja festival of 1940", 0.92);
        let result = engine.recognize(b"fake_image_bytes").unwrap();
        assert_eq!(result.text, "The Tyagaraja festival of 1940");
        assert!((result.confidence - 0.92).abs() < f32::EPSILON);
    }

    #[test]
    fn failing_mock_ocr_errors() {
        let engine = MockOcrEngine::failing();
        let result = engine.recognize(b"fake");
        assert!(matches!(result, Err(ExtractionError::OcrProcessing(_))));
    }

    #[cfg(feature = "ocr")]
    #[test]
    fn tesseract_rejects_missing_tessdata() {
        let dir = tempfile::tempdir().unwrap();
        let result = TesseractOcr::new(dir.path());
        assert!(matches!(result, Err(ExtractionError::TessdataNotFound(_))));
    }

    #[cfg(feature = "ocr")]
    #[test]
    fn tesseract_initializes_with_system_tessdata() {
        let tessdata_dir = std::path::Path::new("/usr/share/tesseract-ocr/5/tessdata");
        if !tessdata_dir.exists() {
            return; // Skip on systems without Tesseract
        }
        let engine = TesseractOcr::new(tessdata_dir).unwrap();
        assert_eq!(engine.lang, "eng");
    }
}
