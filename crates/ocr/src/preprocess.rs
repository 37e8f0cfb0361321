use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use imageproc::contrast::{otsu_level, threshold};
use imageproc::filter::bilateral_filter;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// Receipts are upscaled by this factor; small thermal print reads better larger.
const UPSCALE: f32 = 2.0;
/// Long-side cap after upscaling (Tesseract works best around 300 DPI / ~2000 px).
const MAX_SIDE: u32 = 2800;
const BILATERAL_WINDOW: u32 = 9;
const BILATERAL_SIGMA: f32 = 75.0;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Image not loaded: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Load an image file, binarize it, and return PNG bytes ready for OCR.
pub fn prepare_for_ocr(path: &Path) -> Result<Vec<u8>, PreprocessError> {
    let img = image::open(path)?;
    encode_as_png(binarize(img))
}

/// Process raw image bytes (JPEG / PNG / WEBP / …) and return binarized PNG bytes.
pub fn prepare_for_ocr_from_bytes(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    encode_as_png(binarize(img))
}

/// Grayscale → cubic upscale → edge-preserving denoise → Otsu threshold.
fn binarize(img: DynamicImage) -> GrayImage {
    let gray = img.to_luma8();
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return gray;
    }

    let scale = UPSCALE.min(MAX_SIDE as f32 / w.max(h) as f32);
    let new_w = ((w as f32 * scale).round() as u32).max(1);
    let new_h = ((h as f32 * scale).round() as u32).max(1);
    let resized = image::imageops::resize(&gray, new_w, new_h, FilterType::CatmullRom);

    let smoothed = bilateral_filter(&resized, BILATERAL_WINDOW, BILATERAL_SIGMA, BILATERAL_SIGMA);
    let level = otsu_level(&smoothed);
    threshold(&smoothed, level)
}

fn encode_as_png(img: GrayImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    fn solid_gray(width: u32, height: u32, value: u8) -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_fn(width, height, |_, _| Luma([value]));
        DynamicImage::ImageLuma8(img)
    }

    fn half_dark(width: u32, height: u32) -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_fn(width, height, |x, _| {
            Luma([if x < width / 2 { 30 } else { 220 }])
        });
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn small_image_is_upscaled_twice() {
        let out = binarize(solid_gray(10, 6, 128));
        assert_eq!(out.dimensions(), (20, 12));
    }

    #[test]
    fn long_side_is_capped() {
        let out = binarize(solid_gray(1500, 10, 200));
        assert_eq!(out.width(), MAX_SIDE);
        assert!(out.height() < 20);
    }

    #[test]
    fn output_is_black_and_white() {
        let out = binarize(half_dark(40, 8));
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(out.width() - 1, 0)[0], 255);
    }

    #[test]
    fn prepare_from_bytes_produces_png_header() {
        let mut png_bytes = Vec::new();
        half_dark(8, 8)
            .write_to(&mut Cursor::new(&mut png_bytes), image::ImageFormat::Png)
            .unwrap();
        let result = prepare_for_ocr_from_bytes(&png_bytes).unwrap();
        // PNG magic bytes: 0x89 0x50 0x4E 0x47
        assert_eq!(&result[..4], b"\x89PNG");
    }

    #[test]
    fn undecodable_bytes_are_a_load_error() {
        let err = prepare_for_ocr_from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PreprocessError::Load(_)));
    }

    #[test]
    fn prepare_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.png");
        half_dark(6, 6).save(&path).unwrap();
        let result = prepare_for_ocr(&path).unwrap();
        assert_eq!(&result[..4], b"\x89PNG");
    }
}
