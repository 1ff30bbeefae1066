use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{info, warn};
use serde_json::{Value, json};

use crate::cache::{Cache, Fingerprint};
use crate::config::settings::OcrSettings;
use crate::domain::answer_sheet::OcrEntity;
use crate::http::RateLimitedClient;

/// Client for the document-extraction processor that reads answer sheets.
pub struct OcrClient {
    client: RateLimitedClient,
    endpoint: String,
    api_key: Option<String>,
}

impl OcrClient {
    pub fn new(settings: &OcrSettings) -> Result<Self> {
        let client = RateLimitedClient::new(settings.user_agent, settings.timeout_secs, settings.rate_limit_ms)?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    /// Send one document for processing and return the raw response
    pub async fn process_raw(&mut self, content: &[u8], mime_type: &str) -> Result<Value> {
        info!("Sending {} bytes ({}) to {}", content.len(), mime_type, self.endpoint);

        let body = Self::build_request(content, mime_type);
        let response = self
            .client
            .post_json(&self.endpoint, self.api_key.as_deref(), &body)
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Extraction service returned status: {}", response.status());
        }

        response
            .json()
            .await
            .context("Failed to parse extraction service response")
    }

    /// Entities for the scan, served from the cache when the fingerprint was
    /// seen before. Only fresh responses are written back.
    pub async fn extract_with_cache(
        &mut self,
        fingerprint: &Fingerprint,
        content: &[u8],
        mime_type: &str,
        cache: &Cache,
    ) -> Result<Vec<OcrEntity>> {
        let key = fingerprint.cache_key();

        if let Some(response) = cache.load_raw(&key)? {
            return Ok(extract_entities(&response));
        }

        let response = self.process_raw(content, mime_type).await?;
        let entities = extract_entities(&response);
        if let Err(e) = cache.save_raw(&key, &response) {
            warn!("Failed to save extraction result {} to cache: {:?}", key, e);
        }
        Ok(entities)
    }

    // --- Helper Methods ---

    fn build_request(content: &[u8], mime_type: &str) -> Value {
        json!({
            "rawDocument": {
                "content": STANDARD.encode(content),
                "mimeType": mime_type,
            }
        })
    }
}

/// Reads `document.entities` from a processor response. A document without
/// entities yields an empty list.
pub fn extract_entities(response: &Value) -> Vec<OcrEntity> {
    match response.get("document").and_then(|doc| doc.get("entities")) {
        Some(entities) => map_entities(entities),
        None => Vec::new(),
    }
}

/// Maps a JSON array of entities one by one. Entries that do not read as an
/// entity are skipped, as is anything that is not an array.
pub fn map_entities(entities: &Value) -> Vec<OcrEntity> {
    let Some(items) = entities.as_array() else {
        warn!("Ignoring extraction entities that are not a list: {}", entities);
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<OcrEntity>(item.clone()) {
            Ok(entity) => Some(entity),
            Err(e) => {
                warn!("Skipping malformed extraction entity {}: {}", item, e);
                None
            }
        })
        .collect()
}
