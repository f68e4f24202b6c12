//! Image cleanup ahead of OCR: grayscale, contrast, level normalization,
//! upscaling and binarization. Every stage is best-effort; if anything in
//! the chain fails the original bytes are used unchanged.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageOutputFormat};

/// Binarization cutoff: luma at or above this becomes white.
const BINARIZE_CUTOFF: u8 = 190;
/// Upscale factor applied before recognition.
const UPSCALE_FACTOR: f32 = 1.5;
/// Per-dimension cap after upscaling.
const MAX_DIMENSION: u32 = 1600;

/// Prepare raw upload bytes for OCR. Returns PNG-encoded cleaned bytes, or
/// the input unchanged when preprocessing fails at any stage.
pub fn prepare_for_ocr(image_bytes: &[u8]) -> Vec<u8> {
    match clean(image_bytes) {
        Ok(cleaned) => cleaned,
        Err(err) => {
            tracing::warn!(error = %err, "Image preprocessing failed, using original bytes");
            image_bytes.to_vec()
        }
    }
}

fn clean(image_bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let img = image::load_from_memory(image_bytes)?;

    let gray = img.grayscale().adjust_contrast(25.0).to_luma8();
    let mut gray = normalize_levels(gray);

    let (width, height) = gray.dimensions();
    let new_width = scaled_dimension(width);
    let new_height = scaled_dimension(height);
    if (new_width, new_height) != (width, height) {
        gray = image::imageops::resize(&gray, new_width, new_height, FilterType::Triangle);
    }

    binarize(&mut gray);

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(gray).write_to(&mut out, ImageOutputFormat::Png)?;
    Ok(out.into_inner())
}

fn scaled_dimension(dim: u32) -> u32 {
    let scaled = (dim as f32 * UPSCALE_FACTOR) as u32;
    scaled.min(MAX_DIMENSION).max(1)
}

/// Stretch the luma histogram to the full 0..255 range.
fn normalize_levels(mut img: GrayImage) -> GrayImage {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for pixel in img.pixels() {
        min = min.min(pixel[0]);
        max = max.max(pixel[0]);
    }
    if max > min {
        let range = f32::from(max - min);
        for pixel in img.pixels_mut() {
            pixel[0] = ((f32::from(pixel[0] - min) / range) * 255.0) as u8;
        }
    }
    img
}

fn binarize(img: &mut GrayImage) {
    for pixel in img.pixels_mut() {
        pixel[0] = if pixel[0] >= BINARIZE_CUTOFF { 255 } else { 0 };
    }
}
