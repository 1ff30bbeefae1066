use anyhow::Context;
use axum::{
    extract::{Path, State},
    response::Json,
};
use log::info;
use rusqlite::{Connection, TransactionBehavior};
use std::sync::Arc;

use super::{ApiError, AppState, connection, load_quiz};
use crate::api::models::{NewTeam, RoundOrder, RulesetChange};
use crate::database;
use crate::domain::models::{QuestionDocument, QuestionNumber, Quiz, QuizSummary, Round, RoundNumber};

type QuizResult = Result<Json<Quiz>, ApiError>;

pub async fn list_quizzes(State(state): State<Arc<AppState>>) -> Result<Json<Vec<QuizSummary>>, ApiError> {
    let conn = connection(&state)?;
    Ok(Json(database::quizzes::list_quizzes(&conn)?))
}

pub async fn get_quiz(State(state): State<Arc<AppState>>, Path(quiz_id): Path<String>) -> QuizResult {
    let conn = connection(&state)?;
    Ok(Json(load_quiz(&conn, &quiz_id)?))
}

pub async fn put_quiz(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
    Json(mut quiz): Json<Quiz>,
) -> QuizResult {
    quiz.id = quiz_id;
    let teams = std::mem::take(&mut quiz.teams);
    quiz.set_teams(teams)?;

    let conn = connection(&state)?;
    save(&conn, quiz)
}

pub async fn add_team(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
    Json(team): Json<NewTeam>,
) -> QuizResult {
    edit(&state, &quiz_id, |quiz| {
        quiz.add_team(&team.team_name)?;
        Ok(())
    })
}

pub async fn remove_team(
    State(state): State<Arc<AppState>>,
    Path((quiz_id, team_name)): Path<(String, String)>,
) -> QuizResult {
    edit(&state, &quiz_id, |quiz| {
        if quiz.remove_team(&team_name) {
            Ok(())
        } else {
            Err(ApiError::NotFound(format!("Team {} is not on the roster", team_name)))
        }
    })
}

pub async fn put_round(
    State(state): State<Arc<AppState>>,
    Path((quiz_id, round_number)): Path<(String, RoundNumber)>,
    Json(mut round): Json<Round>,
) -> QuizResult {
    round.round_number = round_number;
    edit(&state, &quiz_id, |quiz| {
        quiz.upsert_round(round);
        Ok(())
    })
}

pub async fn delete_round(
    State(state): State<Arc<AppState>>,
    Path((quiz_id, round_number)): Path<(String, RoundNumber)>,
) -> QuizResult {
    edit(&state, &quiz_id, |quiz| {
        quiz.remove_round(round_number)?;
        Ok(())
    })
}

pub async fn set_ruleset(
    State(state): State<Arc<AppState>>,
    Path((quiz_id, round_number)): Path<(String, RoundNumber)>,
    Json(change): Json<RulesetChange>,
) -> QuizResult {
    edit(&state, &quiz_id, |quiz| {
        quiz.set_round_ruleset(round_number, change.ruleset)?;
        Ok(())
    })
}

pub async fn reorder_rounds(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
    Json(order): Json<RoundOrder>,
) -> QuizResult {
    edit(&state, &quiz_id, |quiz| {
        quiz.reorder_rounds(&order.order)?;
        Ok(())
    })
}

pub async fn put_question(
    State(state): State<Arc<AppState>>,
    Path((quiz_id, round_number, number)): Path<(String, RoundNumber, QuestionNumber)>,
    Json(mut document): Json<QuestionDocument>,
) -> QuizResult {
    document.number = number;
    edit(&state, &quiz_id, |quiz| {
        let kind = quiz
            .round(round_number)
            .map(|r| r.ruleset.kind())
            .ok_or_else(|| ApiError::NotFound(format!("round {} not found", round_number)))?;
        quiz.upsert_question(round_number, document.into_question(kind))?;
        Ok(())
    })
}

pub async fn delete_question(
    State(state): State<Arc<AppState>>,
    Path((quiz_id, round_number, number)): Path<(String, RoundNumber, QuestionNumber)>,
) -> QuizResult {
    edit(&state, &quiz_id, |quiz| {
        quiz.remove_question(round_number, number)?;
        Ok(())
    })
}

/// Load, apply `change`, save, inside one immediate transaction so concurrent
/// edits of the same quiz are applied one after the other. Nothing is written
/// when `change` fails.
fn edit<F>(state: &AppState, quiz_id: &str, change: F) -> QuizResult
where
    F: FnOnce(&mut Quiz) -> Result<(), ApiError>,
{
    let mut conn = connection(state)?;
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("Failed to start quiz edit")?;

    let mut quiz = load_quiz(&tx, quiz_id)?;
    change(&mut quiz)?;
    let saved = save(&tx, quiz)?;

    tx.commit().context("Failed to commit quiz edit")?;
    Ok(saved)
}

fn save(conn: &Connection, quiz: Quiz) -> QuizResult {
    database::quizzes::save_quiz(conn, &quiz)?;
    info!("Saved quiz {} ({} rounds, {} teams)", quiz.id, quiz.rounds.len(), quiz.teams.len());
    Ok(Json(quiz))
}
