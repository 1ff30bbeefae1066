use anyhow::Result;
use log::info;

use crate::config::settings::ScoringSettings;
use crate::database::{self, DbConn};
use crate::scoring::{self, ScoreEntry, Scope};

/// Loads a quiz with its submissions and ranks the teams. `None` when the
/// quiz does not exist.
pub fn build_leaderboard(
    conn: &mut DbConn,
    quiz_id: &str,
    scope: Scope,
    settings: &ScoringSettings,
) -> Result<Option<Vec<ScoreEntry>>> {
    let Some(quiz) = database::quizzes::get_quiz(conn, quiz_id)? else {
        return Ok(None);
    };

    // every submitting team is listed, even outside the scored scope
    let submissions = database::submissions::list_for_quiz(conn, quiz_id, None)?;

    let entries = scoring::score_quiz(&quiz, scope, &submissions, settings);
    info!(
        "Leaderboard for {} (scope {}): {} teams from {} submissions",
        quiz_id,
        scope,
        entries.len(),
        submissions.len()
    );
    Ok(Some(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, get_connection, setup::ensure_schema};
    use crate::domain::models::{Answer, AnswerValue, CorrectAnswer, Question, Quiz, Round, RulesetKind, Submission};

    #[test]
    fn test_leaderboard_from_storage() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        ensure_schema(&mut conn).unwrap();

        let mut quiz = Quiz::new("q");
        quiz.teams = vec!["Owls".to_string(), "Foxes".to_string()];
        let mut round = Round::new(1, RulesetKind::Number);
        round.questions.push(Question {
            number: 1,
            text: "How many?".to_string(),
            options: Vec::new(),
            correct_answer: Some(CorrectAnswer::Number(42.0)),
        });
        quiz.rounds.push(round);
        database::quizzes::save_quiz(&conn, &quiz).unwrap();

        for (team, guess) in [("Owls", 40.0), ("Foxes", 45.0), ("Owls", 41.0)] {
            let submission = Submission {
                quiz_id: "q".to_string(),
                team_name: team.to_string(),
                round_number: 1,
                answers: vec![Answer {
                    number: 1,
                    answer: Some(AnswerValue::Number(guess)),
                }],
            };
            database::submissions::upsert_submission(&mut conn, &submission).unwrap();
        }

        let entries = build_leaderboard(&mut conn, "q", Scope::All, &ScoringSettings::default())
            .unwrap()
            .unwrap();
        assert_eq!(
            entries,
            vec![ScoreEntry::new("Owls", 1.0), ScoreEntry::new("Foxes", 0.0)]
        );

        assert!(
            build_leaderboard(&mut conn, "missing", Scope::All, &ScoringSettings::default())
                .unwrap()
                .is_none()
        );
    }
}
