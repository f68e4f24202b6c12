//! HTTP router assembly.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::{middleware, Extension, Router};

use crate::api::endpoints::{prescription, query, safety, translate};
use crate::api::middleware::auth::require_auth;
use crate::api::types::ApiContext;

/// Body limit: the 10MB image plus multipart framing overhead.
const BODY_LIMIT: usize = prescription::MAX_UPLOAD_BYTES + 64 * 1024;

/// Build the full application router with all AI routes nested under
/// `/api/ai`.
pub fn api_router(ctx: ApiContext) -> Router {
    let ai_routes = Router::new()
        .route("/upload-prescription", post(prescription::upload_prescription))
        .route("/drug-safety", post(safety::check_drug_safety))
        .route("/translate", post(translate::translate))
        .route("/health-query", post(query::health_query))
        .with_state(ctx.clone())
        .layer(middleware::from_fn(require_auth))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(Extension(ctx));

    Router::new().nest("/api/ai", ai_routes)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::db::repository::{insert_inventory_entry, insert_medicine, insert_pharmacy};
    use crate::db::sqlite::open_memory_database;
    use crate::db::Db;
    use crate::models::{Dosage, InventoryEntry, Medicine, Pharmacy, SafetyInfo};
    use crate::pipeline::inference::mock::MockInferenceApi;
    use crate::pipeline::ocr::mock::MockOcrEngine;
    use crate::pipeline::PrescriptionProcessor;
    use crate::services::mock::MockAiServices;

    fn seeded_db() -> Db {
        let conn = open_memory_database().unwrap();
        let pharmacy = Pharmacy {
            id: Uuid::new_v4(),
            name: "City Care Pharmacy".into(),
            location: Some("Downtown".into()),
        };
        insert_pharmacy(&conn, &pharmacy).unwrap();

        for name in ["Paracetamol", "Ibuprofen"] {
            let medicine = Medicine {
                id: Uuid::new_v4(),
                name: name.into(),
                generic_name: name.into(),
                category: "painkillers".into(),
                price: 2.5,
                stock: 30,
                dosage: Dosage::default(),
                safety_info: SafetyInfo::default(),
                prescription_required: false,
                pharmacy_id: Some(pharmacy.id),
            };
            insert_medicine(&conn, &medicine).unwrap();
            insert_inventory_entry(
                &conn,
                &InventoryEntry {
                    id: Uuid::new_v4(),
                    medicine_id: medicine.id,
                    pharmacy_id: pharmacy.id,
                    price: 2.5,
                    stock: 30,
                    discount: 0,
                    is_available: true,
                    expiry_date: None,
                    batch_number: None,
                },
            )
            .unwrap();
        }

        crate::db::shared(conn)
    }

    struct TestApp {
        router: Router,
        ocr: Arc<MockOcrEngine>,
        services: Arc<MockAiServices>,
    }

    fn test_app_with(ocr_text: &str, api_token: Option<&str>) -> TestApp {
        let ocr = Arc::new(MockOcrEngine::returning(ocr_text));
        let services = Arc::new(MockAiServices::new());
        let processor = Arc::new(PrescriptionProcessor::new(
            ocr.clone(),
            Arc::new(MockInferenceApi::new()),
        ));
        let ctx = ApiContext {
            db: seeded_db(),
            processor,
            services: services.clone(),
            api_token: api_token.map(str::to_string),
        };
        TestApp {
            router: api_router(ctx),
            ocr,
            services,
        }
    }

    fn test_app(ocr_text: &str) -> TestApp {
        test_app_with(ocr_text, None)
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(uri: &str, field: &str, content_type: &str, data: &[u8]) -> Request<Body> {
        let boundary = "testboundary7423";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"rx.png\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn response_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn upload_recognizes_medicines_and_pharmacies() {
        let app = test_app("Take Paracetamol 500mg twice daily");
        let request =
            multipart_request("/api/ai/upload-prescription", "prescription", "image/png", b"img");
        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["text"], "Take Paracetamol 500mg twice daily");
        assert_eq!(body["medicines"][0]["word"], "Paracetamol");
        assert_eq!(body["medicines"][0]["source"], "matched");
        assert_eq!(body["pharmacies"][0]["name"], "City Care Pharmacy");
        assert_eq!(
            body["pharmacies"][0]["medicinesInStock"][0]["name"],
            "Paracetamol"
        );
    }

    #[tokio::test]
    async fn upload_without_file_is_rejected_before_recognition() {
        let app = test_app("anything");
        let request = multipart_request("/api/ai/upload-prescription", "other", "image/png", b"x");
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response_json(response).await;
        assert_eq!(body["message"], "No prescription image file uploaded.");
        assert_eq!(app.ocr.call_count(), 0);
    }

    #[tokio::test]
    async fn upload_rejects_non_image_content_type() {
        let app = test_app("anything");
        let request = multipart_request(
            "/api/ai/upload-prescription",
            "prescription",
            "application/pdf",
            b"%PDF-",
        );
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response_json(response).await;
        assert_eq!(body["message"], "Only image files are allowed.");
        assert_eq!(app.ocr.call_count(), 0);
    }

    #[tokio::test]
    async fn upload_with_blank_recognition_is_bad_request() {
        let app = test_app("   ");
        let request =
            multipart_request("/api/ai/upload-prescription", "prescription", "image/png", b"img");
        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response_json(response).await;
        assert_eq!(body["message"], "Could not extract any text from the image.");
    }

    #[tokio::test]
    async fn drug_safety_requires_medicines() {
        let app = test_app("unused");
        let response = app
            .router
            .clone()
            .oneshot(json_request("/api/ai/drug-safety", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response_json(response).await;
        assert_eq!(body["message"], "Medicines array is required");
        assert_eq!(app.services.safety_calls(), 0);
    }

    #[tokio::test]
    async fn drug_safety_forwards_empty_medicines_list() {
        let app = test_app("unused");
        let request = json_request("/api/ai/drug-safety", json!({ "medicines": [] }));
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app.services.safety_calls(), 1);
    }

    #[tokio::test]
    async fn drug_safety_returns_report() {
        let app = test_app("unused");
        let request = json_request(
            "/api/ai/drug-safety",
            json!({ "medicines": ["Paracetamol", "Ibuprofen"], "patientAge": 42 }),
        );
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["message"], "Drug safety check completed");
        assert_eq!(body["safetyReport"]["overallRisk"], "low");
        assert_eq!(app.services.safety_calls(), 1);
    }

    #[tokio::test]
    async fn translate_requires_text() {
        let app = test_app("unused");
        let response = app
            .router
            .clone()
            .oneshot(json_request("/api/ai/translate", json!({ "targetLanguage": "en" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response_json(response).await;
        assert_eq!(body["message"], "Text is required for translation");
        assert_eq!(app.services.translate_calls(), 0);
    }

    #[tokio::test]
    async fn translate_defaults_languages() {
        let app = test_app("unused");
        let request = json_request("/api/ai/translate", json!({ "text": "hola" }));
        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["message"], "Translation completed");
        assert_eq!(body["originalText"], "hola");
        assert_eq!(body["translatedText"], "[translated] hola");
        assert_eq!(body["sourceLanguage"], "auto");
        assert_eq!(body["targetLanguage"], "en");
    }

    #[tokio::test]
    async fn health_query_requires_query() {
        let app = test_app("unused");
        let response = app
            .router
            .clone()
            .oneshot(json_request("/api/ai/health-query", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response_json(response).await;
        assert_eq!(body["message"], "Health query is required");
        assert_eq!(app.services.query_calls(), 0);
    }

    #[tokio::test]
    async fn health_query_returns_answer() {
        let app = test_app("unused");
        let request = json_request(
            "/api/ai/health-query",
            json!({ "query": "is paracetamol safe with ibuprofen?" }),
        );
        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["message"], "Health query processed");
        assert_eq!(body["query"], "is paracetamol safe with ibuprofen?");
        assert!(body["response"]["answer"].as_str().unwrap().contains("advice"));
    }

    #[tokio::test]
    async fn failing_service_maps_to_internal_error() {
        let services = Arc::new(MockAiServices::failing());
        let ctx = ApiContext {
            db: seeded_db(),
            processor: Arc::new(PrescriptionProcessor::new(
                Arc::new(MockOcrEngine::returning("unused")),
                Arc::new(MockInferenceApi::new()),
            )),
            services: services.clone(),
            api_token: None,
        };
        let router = api_router(ctx);

        let request = json_request(
            "/api/ai/drug-safety",
            json!({ "medicines": ["Paracetamol"] }),
        );
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response_json(response).await;
        assert_eq!(body["message"], "Error checking drug safety");
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn configured_token_rejects_missing_and_wrong_credentials() {
        let app = test_app_with("unused", Some("secret-token"));

        let missing = json_request("/api/ai/health-query", json!({ "query": "q" }));
        let response = app.router.clone().oneshot(missing).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let mut wrong = json_request("/api/ai/health-query", json!({ "query": "q" }));
        wrong
            .headers_mut()
            .insert(header::AUTHORIZATION, "Bearer nope".parse().unwrap());
        let response = app.router.clone().oneshot(wrong).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(app.services.query_calls(), 0);
    }

    #[tokio::test]
    async fn configured_token_accepts_valid_credentials() {
        let app = test_app_with("unused", Some("secret-token"));

        let mut request = json_request("/api/ai/health-query", json!({ "query": "q" }));
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, "Bearer secret-token".parse().unwrap());
        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app.services.query_calls(), 1);
    }
}
