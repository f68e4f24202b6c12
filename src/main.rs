use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pharmalink::api::{api_router, ApiContext};
use pharmalink::config::{AppConfig, APP_NAME, APP_VERSION};
use pharmalink::db;
use pharmalink::pipeline::inference::HuggingFaceClient;
use pharmalink::pipeline::ocr;
use pharmalink::pipeline::PrescriptionProcessor;
use pharmalink::services::RemoteAiServices;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    tracing::info!("{APP_NAME} v{APP_VERSION} starting");
    config.log_startup_warnings();

    let conn = db::open_database(&config.db_path)?;
    tracing::info!(path = %config.db_path.display(), "Catalogue database ready");
    let database = db::shared(conn);

    let inference = Arc::new(HuggingFaceClient::new(
        &config.inference_url,
        config.hf_api_key.clone(),
    ));
    let ocr_engine = build_ocr_engine();
    let processor = Arc::new(
        PrescriptionProcessor::new(ocr_engine, inference)
            .with_preprocessing(config.preprocess_enabled),
    );
    let services = Arc::new(RemoteAiServices::new(
        config.safety_url.clone(),
        config.translate_url.clone(),
        config.query_url.clone(),
    ));

    let ctx = ApiContext {
        db: database,
        processor,
        services,
        api_token: config.api_token.clone(),
    };
    let app = api_router(ctx);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(feature = "ocr")]
fn build_ocr_engine() -> Arc<dyn ocr::OcrEngine> {
    Arc::new(ocr::TesseractOcr::new())
}

#[cfg(not(feature = "ocr"))]
fn build_ocr_engine() -> Arc<dyn ocr::OcrEngine> {
    tracing::warn!("Built without the `ocr` feature; prescription uploads will fail");
    Arc::new(ocr::UnavailableOcr)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Cannot listen for shutdown signal");
    }
}
