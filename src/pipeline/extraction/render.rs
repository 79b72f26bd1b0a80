//! PDF page rasterization via Google PDFium.
//!
//! Scanned journal pages have no text layer, so they are rendered to PNG
//! and passed through the OCR chain. PDFium copes with the CIDFonts and
//! odd encodings common in digitized archive volumes.
//!
//! `PdfiumRenderer` is stateless (`Send + Sync`). Each operation creates
//! a fresh `Pdfium` instance because the upstream type is `!Send`.
//! The OS caches `dlopen` calls, so repeat loads are near-free.

use std::io::Cursor;

use image::ImageOutputFormat;
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::types::PageRenderer;
use super::ExtractionError;

/// Maximum dimension (width or height) for rendered page images.
/// Prevents OOM on oversized plates and fold-out pages.
const MAX_DIMENSION_PX: u32 = 4096;

/// Renders PDF pages to PNG images using Google PDFium.
pub struct PdfiumRenderer;

impl PdfiumRenderer {
    /// Create a new renderer, verifying the PDFium library is loadable.
    pub fn new() -> Result<Self, ExtractionError> {
        // Fail fast if the library cannot be found.
        let _ = load_pdfium()?;
        Ok(Self)
    }
}

/// Load the PDFium dynamic library.
///
/// Discovery order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` env var (explicit path to library file)
/// 2. Alongside the running executable
/// 3. System library search paths
fn load_pdfium() -> Result<Pdfium, ExtractionError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        debug!(path = %path, "Loading PDFium from env var");
        let bindings =
            Pdfium::bind_to_library(&path).map_err(|e| ExtractionError::PdfRendering {
                page: 0,
                reason: format!("Failed to load PDFium from {path}: {e}"),
            })?;
        return Ok(Pdfium::new(bindings));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            let lib_path =
                Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
            if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                debug!(dir = %exe_dir.display(), "Loaded PDFium from executable directory");
                return Ok(Pdfium::new(bindings));
            }
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| ExtractionError::PdfRendering {
        page: 0,
        reason: format!(
            "PDFium library not found. Set PDFIUM_DYNAMIC_LIB_PATH or install PDFium: {e}"
        ),
    })?;
    Ok(Pdfium::new(bindings))
}

/// Compute pixel dimensions for rendering at `scale` pixels per point,
/// applying the dimension guard.
///
/// Returns (width_px, height_px), both clamped to [1, MAX_DIMENSION_PX].
/// Preserves aspect ratio when capping.
fn compute_render_dimensions(width_points: f32, height_points: f32, scale: f32) -> (u32, u32) {
    let raw_w = (width_points * scale).max(1.0);
    let raw_h = (height_points * scale).max(1.0);

    let max_dim = raw_w.max(raw_h);
    if max_dim > MAX_DIMENSION_PX as f32 {
        let ratio = MAX_DIMENSION_PX as f32 / max_dim;
        let w = ((raw_w * ratio) as u32).max(1).min(MAX_DIMENSION_PX);
        let h = ((raw_h * ratio) as u32).max(1).min(MAX_DIMENSION_PX);
        (w, h)
    } else {
        (raw_w as u32, raw_h as u32)
    }
}

impl PageRenderer for PdfiumRenderer {
    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_index: usize,
        scale: f32,
    ) -> Result<Vec<u8>, ExtractionError> {
        let pdfium = load_pdfium()?;
        let document = pdfium.load_pdf_from_byte_slice(pdf_bytes, None).map_err(|e| {
            ExtractionError::PdfRendering {
                page: page_index,
                reason: format!("Failed to load PDF: {e}"),
            }
        })?;

        let pages = document.pages();

        let index = u16::try_from(page_index).map_err(|_| ExtractionError::PdfRendering {
            page: page_index,
            reason: format!("Page index {page_index} exceeds u16 maximum"),
        })?;

        let page = pages.get(index).map_err(|_| ExtractionError::PdfRendering {
            page: page_index,
            reason: format!(
                "Page {page_index} out of range (document has {} pages)",
                pages.len()
            ),
        })?;

        let width_points = page.width().value;
        let height_points = page.height().value;
        let (target_w, target_h) = compute_render_dimensions(width_points, height_points, scale);

        let uncapped_w = (width_points * scale) as u32;
        let uncapped_h = (height_points * scale) as u32;
        if target_w != uncapped_w || target_h != uncapped_h {
            warn!(
                page = page_index,
                raw_width = uncapped_w,
                raw_height = uncapped_h,
                capped_width = target_w,
                capped_height = target_h,
                "Page dimensions capped to {MAX_DIMENSION_PX}px",
            );
        }

        let config = PdfRenderConfig::new()
            .set_target_width(target_w as i32)
            .set_maximum_height(target_h as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| ExtractionError::PdfRendering {
                page: page_index,
                reason: format!("Rendering failed: {e}"),
            })?;

        let dynamic_image = bitmap.as_image();
        let mut cursor = Cursor::new(Vec::new());
        dynamic_image
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;

        let png_bytes = cursor.into_inner();

        debug!(
            page = page_index,
            width = target_w,
            height = target_h,
            png_size = png_bytes.len(),
            "Rendered PDF page to PNG"
        );

        Ok(png_bytes)
    }
}

// ── Mock for testing ──────────────────────────────────────

/// Mock page renderer returning a minimal PNG for each valid page.
///
/// Used by orchestrator and processor tests that need a PageRenderer
/// without requiring the actual PDFium binary.
pub struct MockPageRenderer {
    page_count: usize,
}

impl MockPageRenderer {
    pub fn new(page_count: usize) -> Self {
        Self { page_count }
    }
}

impl PageRenderer for MockPageRenderer {
    fn render_page(
        &self,
        _pdf_bytes: &[u8],
        page_index: usize,
        _scale: f32,
    ) -> Result<Vec<u8>, ExtractionError> {
        if page_index >= self.page_count {
            return Err(ExtractionError::PdfRendering {
                page: page_index,
                reason: format!(
                    "Page {page_index} out of range (mock has {} pages)",
                    self.page_count
                ),
            });
        }
        Ok(minimal_png())
    }
}

/// Minimal valid 1x1 red pixel PNG for mock testing.
fn minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
        0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1
        0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, // 8-bit RGB
        0xDE, // IHDR CRC
        0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, // IDAT chunk
        0x08, 0xD7, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, // compressed
        0x03, 0x01, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0xB0, // adler32 + IDAT CRC
        0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, // IEND chunk
        0xAE, 0x42, 0x60, 0x82, // IEND CRC
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Pure dimension logic tests (no PDFium needed) ──

    #[test]
    fn a4_at_double_scale() {
        let (w, h) = compute_render_dimensions(595.0, 842.0, 2.0);
        assert_eq!(w, 1190);
        assert_eq!(h, 1684);
    }

    #[test]
    fn letter_at_double_scale() {
        // US Letter = 612 x 792 points
        let (w, h) = compute_render_dimensions(612.0, 792.0, 2.0);
        assert_eq!(w, 1224);
        assert_eq!(h, 1584);
    }

    #[test]
    fn dimension_guard_caps_oversized() {
        // A fold-out plate: 5000x7000 pts at 2x -> 10000x14000 -> capped
        let (w, h) = compute_render_dimensions(5000.0, 7000.0, 2.0);
        assert!(w <= MAX_DIMENSION_PX, "Width {w} exceeds {MAX_DIMENSION_PX}");
        assert!(h <= MAX_DIMENSION_PX, "Height {h} exceeds {MAX_DIMENSION_PX}");
        assert!(w >= 1);
        assert!(h >= 1);
    }

    #[test]
    fn dimension_guard_preserves_aspect_ratio() {
        let (w, h) = compute_render_dimensions(5000.0, 10000.0, 2.0);
        let ratio = h as f32 / w as f32;
        assert!(
            (ratio - 2.0).abs() < 0.15,
            "Aspect ratio should be ~2:1, got {ratio}"
        );
    }

    #[test]
    fn zero_points_clamped_to_1() {
        let (w, h) = compute_render_dimensions(0.0, 0.0, 2.0);
        assert!(w >= 1, "Width must be >= 1, got {w}");
        assert!(h >= 1, "Height must be >= 1, got {h}");
    }

    #[test]
    fn high_scale_triggers_guard() {
        // A4 at 8x -> 4760x6736 -> capped
        let (w, h) = compute_render_dimensions(595.0, 842.0, 8.0);
        assert!(w <= MAX_DIMENSION_PX, "Width {w} exceeds limit");
        assert!(h <= MAX_DIMENSION_PX, "Height {h} exceeds limit");
    }

    // ── Mock renderer tests ──

    #[test]
    fn mock_returns_png_for_valid_page() {
        let mock = MockPageRenderer::new(3);
        let result = mock.render_page(&[], 0, 2.0);
        assert!(result.is_ok());
        let png = result.unwrap();
        assert!(png.len() > 8);
        assert_eq!(&png[..4], &[0x89, 0x50, 0x4E, 0x47]); // PNG magic
    }

    #[test]
    fn mock_renders_all_pages() {
        let mock = MockPageRenderer::new(5);
        for i in 0..5 {
            assert!(mock.render_page(&[], i, 2.0).is_ok());
        }
    }

    #[test]
    fn mock_errors_for_out_of_range() {
        let mock = MockPageRenderer::new(2);
        let err = mock.render_page(&[], 2, 2.0).unwrap_err();
        assert!(matches!(err, ExtractionError::PdfRendering { page: 2, .. }));
    }

    #[test]
    fn minimal_png_has_valid_signature() {
        let png = minimal_png();
        assert_eq!(&png[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
        let iend = [0x49, 0x45, 0x4E, 0x44];
        assert!(png.windows(4).any(|w| w == iend));
    }
}
