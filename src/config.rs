use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Pharmalink";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen address for the HTTP server.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:4000";

/// Default Hugging Face inference API base URL.
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co";

/// Get the application data directory (~/Pharmalink/ on all platforms).
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Pharmalink")
}

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address for the HTTP server.
    pub bind_addr: String,
    /// SQLite database path.
    pub db_path: PathBuf,
    /// Hugging Face inference API key. Absence is logged at startup but not
    /// fatal; inference calls fail at call time without it.
    pub hf_api_key: Option<String>,
    /// Hugging Face inference API base URL.
    pub inference_url: String,
    /// Enable image preprocessing before OCR.
    pub preprocess_enabled: bool,
    /// Bearer token required by the API. When unset the auth check is
    /// disabled (development mode) and a warning is logged.
    pub api_token: Option<String>,
    /// Translation helper endpoint (LibreTranslate-compatible).
    pub translate_url: Option<String>,
    /// Drug-safety evaluation helper endpoint.
    pub safety_url: Option<String>,
    /// Health-query helper endpoint.
    pub query_url: Option<String>,
    /// Pharmacy name targeted by the seed utility.
    pub seed_pharmacy: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let db_path = std::env::var("PHARMALINK_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| app_data_dir().join("pharmalink.db"));

        Self {
            bind_addr: env_or("PHARMALINK_ADDR", DEFAULT_BIND_ADDR),
            db_path,
            hf_api_key: env_opt("HUGGING_FACE_API_KEY"),
            inference_url: env_or("PHARMALINK_INFERENCE_URL", DEFAULT_INFERENCE_URL),
            preprocess_enabled: std::env::var("PHARMALINK_PREPROCESS")
                .map(|v| v == "true")
                .unwrap_or(false),
            api_token: env_opt("PHARMALINK_API_TOKEN"),
            translate_url: env_opt("PHARMALINK_TRANSLATE_URL"),
            safety_url: env_opt("PHARMALINK_SAFETY_URL"),
            query_url: env_opt("PHARMALINK_QUERY_URL"),
            seed_pharmacy: env_opt("PHARMALINK_SEED_PHARMACY"),
        }
    }

    /// Log startup warnings for missing-but-expected configuration.
    pub fn log_startup_warnings(&self) {
        if self.hf_api_key.is_none() {
            tracing::warn!(
                "HUGGING_FACE_API_KEY not set; spell correction and NER fallback will fail at call time"
            );
        } else {
            tracing::info!("Hugging Face API key loaded");
        }
        if self.api_token.is_none() {
            tracing::warn!("PHARMALINK_API_TOKEN not set; API authentication is disabled");
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Pharmalink"));
    }

    #[test]
    fn app_name_is_pharmalink() {
        assert_eq!(APP_NAME, "Pharmalink");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
