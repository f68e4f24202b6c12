//! Auxiliary AI services behind the drug-safety, translation and
//! health-query endpoints. Each delegates to a configurable remote helper;
//! an unconfigured helper fails at call time, not at startup.

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

/// Per-call timeout for helper requests.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(20);

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Service not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected service response: {0}")]
    ResponseParsing(String),
}

/// Seam for the three auxiliary endpoints.
#[async_trait]
pub trait AiServices: Send + Sync {
    /// Evaluate a medicine list for interactions and warnings. The report
    /// shape is defined by the remote evaluator and passed through verbatim.
    async fn check_drug_safety(
        &self,
        medicines: &[String],
        patient_age: Option<u32>,
        conditions: &[String],
    ) -> Result<Value, ServiceError>;

    /// Translate text between languages. Returns the translated text.
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
    ) -> Result<String, ServiceError>;

    /// Answer a free-form health question, optionally with user context.
    async fn health_query(&self, query: &str, context: &Value) -> Result<Value, ServiceError>;
}

/// HTTP-backed implementation. Each helper URL is optional; a call against
/// a missing URL returns `NotConfigured`.
pub struct RemoteAiServices {
    client: reqwest::Client,
    safety_url: Option<String>,
    translate_url: Option<String>,
    query_url: Option<String>,
}

impl RemoteAiServices {
    pub fn new(
        safety_url: Option<String>,
        translate_url: Option<String>,
        query_url: Option<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            safety_url,
            translate_url,
            query_url,
        }
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ServiceError> {
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl AiServices for RemoteAiServices {
    async fn check_drug_safety(
        &self,
        medicines: &[String],
        patient_age: Option<u32>,
        conditions: &[String],
    ) -> Result<Value, ServiceError> {
        let url = self
            .safety_url
            .as_deref()
            .ok_or(ServiceError::NotConfigured("drug safety"))?;
        self.post_json(
            url,
            &json!({
                "medicines": medicines,
                "patientAge": patient_age,
                "conditions": conditions,
            }),
        )
        .await
    }

    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
    ) -> Result<String, ServiceError> {
        let url = self
            .translate_url
            .as_deref()
            .ok_or(ServiceError::NotConfigured("translation"))?;
        let value = self
            .post_json(
                url,
                &json!({
                    "q": text,
                    "source": source_language,
                    "target": target_language,
                    "format": "text",
                }),
            )
            .await?;
        value
            .get("translatedText")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ServiceError::ResponseParsing("missing translatedText field".to_string())
            })
    }

    async fn health_query(&self, query: &str, context: &Value) -> Result<Value, ServiceError> {
        let url = self
            .query_url
            .as_deref()
            .ok_or(ServiceError::NotConfigured("health query"))?;
        self.post_json(url, &json!({ "query": query, "context": context }))
            .await
    }
}
