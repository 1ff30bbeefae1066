use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::params;

use super::connection::DbConn;
use crate::domain::models::{RoundNumber, Submission};

/// Stores the submission under `(quiz_id, team_name, round_number)`; a later
/// write for the same key replaces the earlier one.
pub fn upsert_submission(conn: &mut DbConn, submission: &Submission) -> Result<()> {
    let sql = "INSERT INTO submissions (quiz_id, team_name, round_number, document, updated_at) VALUES (?1, ?2, ?3, ?4, ?5) ON CONFLICT(quiz_id, team_name, round_number) DO UPDATE SET document = excluded.document, updated_at = excluded.updated_at";

    let document = serde_json::to_string(submission).context("Failed to serialize submission")?;

    conn.execute(
        sql,
        params![
            submission.quiz_id,
            submission.team_name,
            submission.round_number,
            document,
            Utc::now().naive_utc()
        ],
    )
    .with_context(|| {
        format!(
            "Failed to save submission of {} for round {}",
            submission.team_name, submission.round_number
        )
    })?;

    Ok(())
}

/// Submissions of a quiz, optionally restricted to one round, ordered by
/// round then team.
pub fn list_for_quiz(
    conn: &mut DbConn,
    quiz_id: &str,
    round_number: Option<RoundNumber>,
) -> Result<Vec<Submission>> {
    let sql = "SELECT document FROM submissions WHERE quiz_id = ?1 AND (?2 IS NULL OR round_number = ?2) ORDER BY round_number, team_name";

    let mut stmt = conn.prepare(sql)?;
    let documents = stmt
        .query_map(params![quiz_id, round_number], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    documents
        .iter()
        .map(|doc| serde_json::from_str(doc).context("Failed to parse stored submission"))
        .collect()
}
