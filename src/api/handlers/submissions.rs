use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use log::info;
use std::sync::Arc;

use super::{ApiError, AppState, connection, load_quiz};
use crate::api::models::SubmissionParams;
use crate::database;
use crate::domain::models::Submission;

pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
    Query(params): Query<SubmissionParams>,
) -> Result<Json<Vec<Submission>>, ApiError> {
    let mut conn = connection(&state)?;
    load_quiz(&conn, &quiz_id)?;
    let submissions = database::submissions::list_for_quiz(&mut conn, &quiz_id, params.round_number)?;
    Ok(Json(submissions))
}

/// Saves a team's answers for a round, replacing any earlier submission for
/// the same team and round.
pub async fn put_submission(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
    Json(mut submission): Json<Submission>,
) -> Result<Json<Submission>, ApiError> {
    submission.quiz_id = quiz_id;
    submission.team_name = submission.team_name.trim().to_string();
    if submission.team_name.is_empty() {
        return Err(ApiError::BadRequest("team name must not be blank".to_string()));
    }

    let mut conn = connection(&state)?;
    load_quiz(&conn, &submission.quiz_id)?;
    database::submissions::upsert_submission(&mut conn, &submission)?;

    info!(
        "Stored submission of {} for quiz {} round {} ({} answers)",
        submission.team_name,
        submission.quiz_id,
        submission.round_number,
        submission.answers.len()
    );
    Ok(Json(submission))
}
