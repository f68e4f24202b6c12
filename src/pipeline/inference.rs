//! Hosted-model inference client: spell correction and biomedical NER over
//! the Hugging Face inference API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Spell-correction models tried in order; the first success wins.
const SPELL_MODELS: &[&str] = &["ai-forever/T5-large-spell"];

/// Biomedical NER model used as the last extraction tier.
const NER_MODEL: &str = "d4data/biomedical-ner-all";

/// Per-call timeout for hosted inference requests.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(20);

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("No inference API key configured")]
    MissingApiKey,

    #[error("Inference request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Inference API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected inference response: {0}")]
    ResponseParsing(String),
}

/// One entity span returned by the NER model.
#[derive(Debug, Clone, Deserialize)]
pub struct NerEntity {
    pub word: String,
    pub score: f32,
    pub entity_group: String,
}

impl NerEntity {
    /// Whether the span names a drug.
    pub fn is_drug(&self) -> bool {
        self.entity_group.to_uppercase().contains("DRUG")
    }
}

/// Pull `generated_text` out of a text-generation response. Models answer
/// either with `[{"generated_text": ...}]` or a bare object carrying the
/// same field.
fn generated_text(value: &serde_json::Value) -> Option<String> {
    value
        .get(0)
        .and_then(|entry| entry.get("generated_text"))
        .or_else(|| value.get("generated_text"))
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .filter(|t| !t.trim().is_empty())
}

/// Remote inference seam used by the recognition pipeline.
#[async_trait]
pub trait InferenceApi: Send + Sync {
    /// Best-effort spell correction. `Ok(None)` means no model produced a
    /// usable correction; callers keep the original text.
    async fn spell_correct(&self, text: &str) -> Result<Option<String>, InferenceError>;

    /// Entity extraction over the text. Non-entity responses (e.g. a model
    /// warming up) yield an empty list rather than an error.
    async fn extract_drug_entities(&self, text: &str) -> Result<Vec<NerEntity>, InferenceError>;
}

/// Client for the hosted Hugging Face inference API.
pub struct HuggingFaceClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HuggingFaceClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }

    async fn call_model(
        &self,
        model: &str,
        text: &str,
    ) -> Result<serde_json::Value, InferenceError> {
        let api_key = self.api_key.as_ref().ok_or(InferenceError::MissingApiKey)?;
        let url = format!("{}/models/{}", self.base_url, model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&json!({ "inputs": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl InferenceApi for HuggingFaceClient {
    async fn spell_correct(&self, text: &str) -> Result<Option<String>, InferenceError> {
        if self.api_key.is_none() {
            return Err(InferenceError::MissingApiKey);
        }
        for model in SPELL_MODELS {
            match self.call_model(model, text).await {
                Ok(value) => {
                    let corrected = generated_text(&value);
                    if corrected.is_some() {
                        return Ok(corrected);
                    }
                }
                Err(err) => {
                    tracing::warn!(model, error = %err, "Spell model failed, trying next");
                }
            }
        }
        Ok(None)
    }

    async fn extract_drug_entities(&self, text: &str) -> Result<Vec<NerEntity>, InferenceError> {
        let value = self.call_model(NER_MODEL, text).await?;

        let Some(entries) = value.as_array() else {
            // Model warm-up and similar non-entity payloads.
            tracing::warn!("NER response was not an entity list");
            return Ok(Vec::new());
        };

        let entities = entries
            .iter()
            .filter_map(|entry| serde_json::from_value::<NerEntity>(entry.clone()).ok())
            .collect();
        Ok(entities)
    }
}

#[cfg(test)]
pub mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{InferenceApi, InferenceError, NerEntity};

    /// Scripted inference backend with call counters.
    #[derive(Default)]
    pub struct MockInferenceApi {
        spell_result: Mutex<Option<String>>,
        ner_result: Mutex<Vec<NerEntity>>,
        fail_ner: bool,
        spell_calls: AtomicUsize,
        ner_calls: AtomicUsize,
    }

    impl MockInferenceApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_spell_correction(self, corrected: &str) -> Self {
            *self.spell_result.lock().unwrap() = Some(corrected.to_string());
            self
        }

        pub fn with_entities(self, entities: Vec<NerEntity>) -> Self {
            *self.ner_result.lock().unwrap() = entities;
            self
        }

        pub fn with_failing_ner(mut self) -> Self {
            self.fail_ner = true;
            self
        }

        pub fn spell_calls(&self) -> usize {
            self.spell_calls.load(Ordering::SeqCst)
        }

        pub fn ner_calls(&self) -> usize {
            self.ner_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InferenceApi for MockInferenceApi {
        async fn spell_correct(&self, _text: &str) -> Result<Option<String>, InferenceError> {
            self.spell_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.spell_result.lock().unwrap().clone())
        }

        async fn extract_drug_entities(
            &self,
            _text: &str,
        ) -> Result<Vec<NerEntity>, InferenceError> {
            self.ner_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_ner {
                return Err(InferenceError::Api {
                    status: 503,
                    body: "model overloaded".to_string(),
                });
            }
            Ok(self.ner_result.lock().unwrap().clone())
        }
    }

    pub fn drug_entity(word: &str, score: f32) -> NerEntity {
        NerEntity {
            word: word.to_string(),
            score,
            entity_group: "Medication/Drug".to_string(),
        }
    }
}
