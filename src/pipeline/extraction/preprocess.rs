//! Image preprocessing between page rendering and optical recognition.
//!
//! Scanned journal pages arrive as rendered RGB rasters. OCR accuracy on
//! aged print improves markedly after grayscale conversion, a light median
//! denoise, and global binarization, so every rendered page goes through
//! the same fixed chain before the engine sees it.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma, RgbImage};
use tracing::debug;

use super::ExtractionError;

/// Render scale applied before OCR, in pixels per PDF point.
/// 2.0 keeps small 1930s typefaces legible to the recognizer.
pub const OCR_UPSCALE_FACTOR: f32 = 2.0;

/// Maximum input image size (in bytes) before rejecting.
/// Prevents OOM on corrupt files.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024;

/// Prepare a rendered page image for optical recognition.
///
/// Chain: decode -> grayscale -> 3x3 median denoise -> Otsu global
/// threshold -> PNG encode.
pub fn prepare_for_ocr(image_bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    if image_bytes.len() > MAX_IMAGE_BYTES {
        return Err(ExtractionError::ImageProcessing(format!(
            "Image data exceeds {}MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }

    let img = image::load_from_memory(image_bytes)
        .map_err(|e| ExtractionError::ImageProcessing(format!("Failed to decode image: {e}")))?;

    let gray = rgb_to_gray(&img.to_rgb8());
    let denoised = median_filter_3x3(&gray);
    let threshold = otsu_threshold(&denoised);
    let binary = binarize(&denoised, threshold);

    let png = encode_png_gray(&binary)?;
    debug!(
        width = binary.width(),
        height = binary.height(),
        threshold,
        png_size = png.len(),
        "Prepared page image for OCR"
    );
    Ok(png)
}

/// Convert RGB to grayscale using ITU-R BT.601 luminance.
pub fn rgb_to_gray(rgb: &RgbImage) -> GrayImage {
    let (w, h) = (rgb.width(), rgb.height());
    let mut gray = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let p = rgb.get_pixel(x, y);
            let luma = (0.299 * p.0[0] as f32
                + 0.587 * p.0[1] as f32
                + 0.114 * p.0[2] as f32) as u8;
            gray.put_pixel(x, y, Luma([luma]));
        }
    }
    gray
}

/// 3x3 median filter. Removes salt-and-pepper speckle from aged scans
/// without blurring glyph edges the way a box filter would.
/// Border pixels clamp their neighborhood to the image bounds.
pub fn median_filter_3x3(img: &GrayImage) -> GrayImage {
    let (w, h) = (img.width(), img.height());
    let mut out = GrayImage::new(w, h);
    let mut window = [0u8; 9];

    for y in 0..h {
        for x in 0..w {
            let mut n = 0;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let ny = (y as i64 + dy).clamp(0, h as i64 - 1) as u32;
                    let nx = (x as i64 + dx).clamp(0, w as i64 - 1) as u32;
                    window[n] = img.get_pixel(nx, ny).0[0];
                    n += 1;
                }
            }
            window.sort_unstable();
            out.put_pixel(x, y, Luma([window[4]]));
        }
    }
    out
}

/// Compute Otsu's global threshold: the gray level that maximizes
/// between-class variance over the intensity histogram.
pub fn otsu_threshold(img: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in img.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 128;
    }

    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut sum_bg = 0.0f64;
    let mut weight_bg = 0u64;
    let mut best_threshold = 0u8;
    let mut best_variance = 0.0f64;

    for level in 0..256 {
        weight_bg += histogram[level];
        if weight_bg == 0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0 {
            break;
        }

        sum_bg += level as f64 * histogram[level] as f64;
        let mean_bg = sum_bg / weight_bg as f64;
        let mean_fg = (sum_all - sum_bg) / weight_fg as f64;

        let diff = mean_bg - mean_fg;
        let variance = weight_bg as f64 * weight_fg as f64 * diff * diff;
        if variance > best_variance {
            best_variance = variance;
            best_threshold = level as u8;
        }
    }

    best_threshold
}

/// Binarize: pixels above the threshold become white, the rest black.
pub fn binarize(img: &GrayImage, threshold: u8) -> GrayImage {
    let (w, h) = (img.width(), img.height());
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let v = if img.get_pixel(x, y).0[0] > threshold {
                255
            } else {
                0
            };
            out.put_pixel(x, y, Luma([v]));
        }
    }
    out
}

/// Encode a grayscale image as PNG bytes.
pub fn encode_png_gray(img: &GrayImage) -> Result<Vec<u8>, ExtractionError> {
    let dynamic = DynamicImage::ImageLuma8(img.clone());
    let mut cursor = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut cursor, ImageOutputFormat::Png)
        .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn encode_rgb(img: &RgbImage) -> Vec<u8> {
        let dynamic = DynamicImage::ImageRgb8(img.clone());
        let mut cursor = Cursor::new(Vec::new());
        dynamic.write_to(&mut cursor, ImageOutputFormat::Png).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn grayscale_weights_green_heaviest() {
        let mut img = RgbImage::new(3, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));
        img.put_pixel(2, 0, Rgb([0, 0, 255]));

        let gray = rgb_to_gray(&img);
        let red = gray.get_pixel(0, 0).0[0];
        let green = gray.get_pixel(1, 0).0[0];
        let blue = gray.get_pixel(2, 0).0[0];
        assert!(green > red, "green should be brightest: {green} vs {red}");
        assert!(red > blue, "red should outweigh blue: {red} vs {blue}");
    }

    #[test]
    fn median_filter_removes_lone_speck() {
        // White field with a single black pixel in the middle.
        let mut img = GrayImage::from_pixel(5, 5, Luma([255]));
        img.put_pixel(2, 2, Luma([0]));

        let filtered = median_filter_3x3(&img);
        assert_eq!(filtered.get_pixel(2, 2).0[0], 255, "speck should vanish");
    }

    #[test]
    fn median_filter_keeps_solid_region() {
        // A 3-wide black bar survives because each bar pixel has a
        // black majority in its window.
        let mut img = GrayImage::from_pixel(9, 9, Luma([255]));
        for y in 0..9 {
            for x in 3..6 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        let filtered = median_filter_3x3(&img);
        assert_eq!(filtered.get_pixel(4, 4).0[0], 0);
    }

    #[test]
    fn otsu_separates_bimodal_image() {
        // Half dark (~40), half light (~200): threshold must land between.
        let mut img = GrayImage::new(10, 10);
        for y in 0..10 {
            for x in 0..10 {
                let v = if x < 5 { 40 } else { 200 };
                img.put_pixel(x, y, Luma([v]));
            }
        }
        let t = otsu_threshold(&img);
        assert!(t >= 40 && t < 200, "threshold {t} outside the modes");
    }

    #[test]
    fn binarize_splits_on_threshold() {
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(0, 0, Luma([100]));
        img.put_pixel(1, 0, Luma([160]));

        let binary = binarize(&img, 128);
        assert_eq!(binary.get_pixel(0, 0).0[0], 0);
        assert_eq!(binary.get_pixel(1, 0).0[0], 255);
    }

    #[test]
    fn prepare_for_ocr_outputs_binary_png() {
        let mut img = RgbImage::from_pixel(20, 20, Rgb([230, 225, 210]));
        for x in 5..15 {
            img.put_pixel(x, 10, Rgb([30, 25, 20]));
        }

        let png = prepare_for_ocr(&encode_rgb(&img)).unwrap();
        assert_eq!(&png[..4], &[0x89, 0x50, 0x4E, 0x47], "PNG magic");

        let out = image::load_from_memory(&png).unwrap().to_luma8();
        assert!(
            out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255),
            "output must be binary"
        );
    }

    #[test]
    fn prepare_for_ocr_rejects_garbage() {
        let garbage = [0xDE, 0xAD, 0xBE, 0xEF].repeat(25);
        let result = prepare_for_ocr(&garbage);
        assert!(matches!(result, Err(ExtractionError::ImageProcessing(_))));
    }

    #[test]
    fn upscale_factor_is_at_least_two() {
        assert!(OCR_UPSCALE_FACTOR >= 2.0);
    }
}
