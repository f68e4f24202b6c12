//! Prescription recognition pipeline: preprocess, OCR, spell correction,
//! tiered medicine extraction, catalogue matching and pharmacy aggregation.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::db::repository::{fallback_pharmacies, medicine_names, stocked_pharmacies};
use crate::db::{with_conn, DatabaseError, Db};
use crate::models::{MatchSource, PharmacyMatch, RecognizedMedicine};
use crate::pipeline::extract::{direct_matches, fuzzy_matches, match_to_catalogue, refine_text};
use crate::pipeline::inference::{InferenceApi, InferenceError};
use crate::pipeline::ocr::{OcrEngine, OcrError};
use crate::pipeline::preprocess::prepare_for_ocr;

/// Wall-clock budget for one OCR pass.
const OCR_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Could not extract any text from the image")]
    NoText,

    #[error("Text recognition timed out")]
    OcrTimeout,

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Recognition task failed: {0}")]
    Join(String),
}

/// Outcome of one prescription upload.
#[derive(Debug)]
pub struct PrescriptionResult {
    /// Recognized (and possibly spell-corrected) text.
    pub text: String,
    /// Catalogue medicines resolved from the text.
    pub medicines: Vec<RecognizedMedicine>,
    /// Pharmacies stocking the resolved medicines.
    pub pharmacies: Vec<PharmacyMatch>,
}

pub struct PrescriptionProcessor {
    ocr: Arc<dyn OcrEngine>,
    inference: Arc<dyn InferenceApi>,
    preprocess_enabled: bool,
    ocr_timeout: Duration,
}

impl PrescriptionProcessor {
    pub fn new(ocr: Arc<dyn OcrEngine>, inference: Arc<dyn InferenceApi>) -> Self {
        Self {
            ocr,
            inference,
            preprocess_enabled: false,
            ocr_timeout: OCR_TIMEOUT,
        }
    }

    pub fn with_preprocessing(mut self, enabled: bool) -> Self {
        self.preprocess_enabled = enabled;
        self
    }

    #[cfg(test)]
    pub fn with_ocr_timeout(mut self, timeout: Duration) -> Self {
        self.ocr_timeout = timeout;
        self
    }

    /// Run the full pipeline over one uploaded image.
    pub async fn process(
        &self,
        db: &Db,
        image: Vec<u8>,
    ) -> Result<PrescriptionResult, PipelineError> {
        let image = if self.preprocess_enabled {
            prepare_for_ocr(&image)
        } else {
            image
        };

        let raw_text = self.recognize_text(image).await?;
        if raw_text.trim().is_empty() {
            return Err(PipelineError::NoText);
        }
        tracing::debug!(chars = raw_text.len(), "OCR text recognized");

        // Spell correction is best-effort; recognition continues on the raw
        // text when no model produces a usable correction.
        let text = match self.inference.spell_correct(&raw_text).await {
            Ok(Some(corrected)) => corrected,
            Ok(None) => raw_text.clone(),
            Err(err) => {
                tracing::warn!(error = %err, "Spell correction unavailable");
                raw_text.clone()
            }
        };

        // One catalogue snapshot feeds refinement and every matching tier.
        let catalogue = with_conn(db, medicine_names)?;
        let refined = refine_text(&text, &catalogue);

        let candidates = self.extract_candidates(&refined, &catalogue).await?;
        if candidates.is_empty() {
            tracing::info!("No medicine candidates recognized");
            return Ok(PrescriptionResult {
                text: refined,
                medicines: Vec::new(),
                pharmacies: Vec::new(),
            });
        }

        let words: Vec<String> = candidates.iter().map(|c| c.word.clone()).collect();
        let matched = match_to_catalogue(&words, &catalogue);

        let mut pharmacies = with_conn(db, |conn| stocked_pharmacies(conn, &matched))?;
        if pharmacies.is_empty() && !matched.is_empty() {
            pharmacies = with_conn(db, |conn| fallback_pharmacies(conn, &matched))?;
        }

        let medicines = matched
            .into_iter()
            .map(|word| RecognizedMedicine {
                word,
                score: None,
                source: MatchSource::Matched,
            })
            .collect();

        // The reported text carries the refinement pass, so the caller sees
        // the same medicine names that were matched.
        Ok(PrescriptionResult {
            text: refined,
            medicines,
            pharmacies,
        })
    }

    async fn recognize_text(&self, image: Vec<u8>) -> Result<String, PipelineError> {
        let ocr = Arc::clone(&self.ocr);
        let task = tokio::task::spawn_blocking(move || ocr.recognize(&image));
        match tokio::time::timeout(self.ocr_timeout, task).await {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(join_err)) => Err(PipelineError::Join(join_err.to_string())),
            Err(_) => Err(PipelineError::OcrTimeout),
        }
    }

    /// Tiered extraction: whole-word hits win outright, then fuzzy hits,
    /// then remote NER restricted to drug spans.
    async fn extract_candidates(
        &self,
        text: &str,
        catalogue: &[String],
    ) -> Result<Vec<RecognizedMedicine>, PipelineError> {
        let direct = direct_matches(text, catalogue);
        if !direct.is_empty() {
            return Ok(direct);
        }

        let fuzzy = fuzzy_matches(text, catalogue);
        if !fuzzy.is_empty() {
            return Ok(fuzzy);
        }

        let entities = self.inference.extract_drug_entities(text).await?;
        Ok(entities
            .into_iter()
            .filter(|e| e.is_drug())
            .map(|e| RecognizedMedicine {
                word: e.word,
                score: Some(e.score),
                source: MatchSource::Huggingface,
            })
            .collect())
    }
}
