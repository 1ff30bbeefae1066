use std::env;

use log::warn;

use crate::scoring::distance::FREE_TEXT_THRESHOLD;

#[derive(Debug, Clone)]
pub struct ScoringSettings {
    pub free_text_threshold: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            free_text_threshold: FREE_TEXT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OcrSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub rate_limit_ms: u64,
    pub user_agent: &'static str,
    pub timeout_secs: u64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8081/v1/process".to_string(),
            api_key: None,
            rate_limit_ms: 500, // paid service, 2 req/sec
            user_agent: "QuizBoard/1.0",
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub database_path: String,
    pub cache_dir: String,
    pub max_upload_bytes: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: "quiz_board.db".to_string(),
            cache_dir: "cache".to_string(),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scoring: ScoringSettings,
    pub ocr: OcrSettings,
    pub storage: StorageSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            scoring: ScoringSettings::default(),
            ocr: OcrSettings::default(),
            storage: StorageSettings::default(),
        }
    }

    /// Defaults overridden by `DATABASE_PATH`, `CACHE_DIR`, `OCR_ENDPOINT`,
    /// `OCR_API_KEY` and `MAX_UPLOAD_BYTES`.
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(path) = env::var("DATABASE_PATH") {
            config.storage.database_path = path;
        }
        if let Ok(dir) = env::var("CACHE_DIR") {
            config.storage.cache_dir = dir;
        }
        if let Ok(endpoint) = env::var("OCR_ENDPOINT") {
            config.ocr.endpoint = endpoint;
        }
        config.ocr.api_key = env::var("OCR_API_KEY").ok().filter(|key| !key.is_empty());

        if let Ok(raw) = env::var("MAX_UPLOAD_BYTES") {
            match raw.parse() {
                Ok(bytes) => config.storage.max_upload_bytes = bytes,
                Err(_) => warn!("Ignoring invalid MAX_UPLOAD_BYTES value: {}", raw),
            }
        }

        config
    }
}
