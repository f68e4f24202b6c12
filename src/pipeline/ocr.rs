//! OCR engine seam. The real engine wraps Tesseract behind the `ocr` cargo
//! feature; builds without it get an engine that reports itself unavailable
//! at call time.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    #[error("OCR engine error: {0}")]
    Engine(String),
}

/// Blocking text recognition over raw image bytes. Implementations run on a
/// blocking thread; the pipeline wraps calls in a timeout.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// Tesseract-backed engine.
#[cfg(feature = "ocr")]
pub struct TesseractOcr {
    language: String,
}

#[cfg(feature = "ocr")]
impl TesseractOcr {
    pub fn new() -> Self {
        Self {
            language: "eng".to_string(),
        }
    }
}

#[cfg(feature = "ocr")]
impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "ocr")]
impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        let tess = tesseract::Tesseract::new(None, Some(&self.language))
            .map_err(|e| OcrError::Unavailable(e.to_string()))?;
        let text = tess
            .set_image_from_mem(image)
            .map_err(|e| OcrError::Engine(e.to_string()))?
            .get_text()
            .map_err(|e| OcrError::Engine(e.to_string()))?;
        Ok(text)
    }
}

/// Stand-in engine for builds without the `ocr` feature.
pub struct UnavailableOcr;

impl OcrEngine for UnavailableOcr {
    fn recognize(&self, _image: &[u8]) -> Result<String, OcrError> {
        Err(OcrError::Unavailable(
            "built without the `ocr` feature".to_string(),
        ))
    }
}
