use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, header::CONTENT_TYPE},
    response::Json,
};
use log::info;
use std::sync::Arc;

use super::{ApiError, AppState, connection, load_quiz};
use crate::api::models::{AnswerSheetParams, AnswerSheetResponse};
use crate::cache::Fingerprint;
use crate::domain::answer_sheet::parse_answers;

const DEFAULT_MIME_TYPE: &str = "application/pdf";

/// Runs an uploaded answer sheet through the extraction service and returns
/// the numbered answers found on it, as a draft for the submission form.
pub async fn read_answer_sheet(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
    Query(params): Query<AnswerSheetParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AnswerSheetResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("answer sheet is empty".to_string()));
    }
    {
        let conn = connection(&state)?;
        load_quiz(&conn, &quiz_id)?;
    }

    let mime_type = headers
        .get(CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string();
    let fingerprint = Fingerprint::new(params.file_name.clone(), body.len() as u64, params.last_modified);

    let entities = {
        let mut client = state.ocr.lock().await;
        client
            .extract_with_cache(&fingerprint, &body, &mime_type, &state.cache)
            .await
            .map_err(ApiError::Upstream)?
    };

    let answers = parse_answers(&entities);
    info!(
        "Read {} answers from {} for quiz {}",
        answers.len(),
        params.file_name,
        quiz_id
    );

    Ok(Json(AnswerSheetResponse {
        file_name: params.file_name,
        answers,
    }))
}
