use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::api::ocr_client::OcrClient;
use crate::cache::Cache;
use crate::config::settings::AppConfig;
use crate::database::{self, DbConn, DbPool};
use crate::domain::models::{Quiz, QuizEditError};

pub mod answer_sheets;
pub mod leaderboard;
pub mod quizzes;
pub mod submissions;

pub struct AppState {
    pub pool: DbPool,
    pub config: AppConfig,
    pub cache: Cache,
    pub ocr: Mutex<OcrClient>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("Extraction service error: {0:#}")]
    Upstream(anyhow::Error),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl From<QuizEditError> for ApiError {
    fn from(err: QuizEditError) -> Self {
        match err {
            QuizEditError::RoundNotFound(_) | QuizEditError::QuestionNotFound { .. } => {
                ApiError::NotFound(err.to_string())
            }
            _ => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            log::error!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}

pub(crate) fn connection(state: &AppState) -> Result<DbConn, ApiError> {
    Ok(database::get_connection(&state.pool)?)
}

pub(crate) fn load_quiz(conn: &Connection, quiz_id: &str) -> Result<Quiz, ApiError> {
    database::quizzes::get_quiz(conn, quiz_id)?
        .ok_or_else(|| ApiError::NotFound(format!("Quiz {} not found", quiz_id)))
}
