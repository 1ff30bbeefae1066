use anyhow::Result;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::api::OcrClient;
use crate::api::create_router;
use crate::api::handlers::AppState;
use crate::cache::Cache;
use crate::config::settings::AppConfig;
use crate::database;

pub struct ServerService {
    port: u16,
    config: AppConfig,
}

impl ServerService {
    pub fn new(port: u16, config: AppConfig) -> Self {
        Self { port, config }
    }

    pub async fn run(&self) -> Result<()> {
        let state = Arc::new(self.build_state()?);

        let app = create_router(state).layer(CorsLayer::permissive());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    fn build_state(&self) -> Result<AppState> {
        let storage = &self.config.storage;
        info!("Using database {} and cache {}", storage.database_path, storage.cache_dir);

        let pool = database::create_pool(&storage.database_path)?;
        database::setup::ensure_schema(&mut database::get_connection(&pool)?)?;

        if self.config.ocr.api_key.is_none() {
            info!("OCR_API_KEY not set, sending unauthenticated requests to {}", self.config.ocr.endpoint);
        }

        Ok(AppState {
            pool,
            cache: Cache::new(&storage.cache_dir)?,
            ocr: Mutex::new(OcrClient::new(&self.config.ocr)?),
            config: self.config.clone(),
        })
    }
}
