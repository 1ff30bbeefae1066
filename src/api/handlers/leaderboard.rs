use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use std::sync::Arc;

use super::{ApiError, AppState, connection};
use crate::api::models::{LeaderboardParams, LeaderboardResponse, LeaderboardRow};
use crate::scoring::Scope;
use crate::services::leaderboard::build_leaderboard;

pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let scope = match params.scope.as_deref() {
        Some(raw) => raw
            .parse::<Scope>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => Scope::All,
    };

    let mut conn = connection(&state)?;
    let entries = build_leaderboard(&mut conn, &quiz_id, scope, &state.config.scoring)?
        .ok_or_else(|| ApiError::NotFound(format!("Quiz {} not found", quiz_id)))?;

    Ok(Json(LeaderboardResponse {
        quiz_id,
        scope: scope.to_string(),
        entries: LeaderboardRow::from_ranked(entries),
    }))
}
