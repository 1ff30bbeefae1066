use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::models::{Quiz, QuizSummary};

/// Inserts or replaces the quiz document.
pub fn save_quiz(conn: &Connection, quiz: &Quiz) -> Result<()> {
    let sql = "INSERT INTO quizzes (id, title, document, updated_at) VALUES (?1, ?2, ?3, ?4) ON CONFLICT(id) DO UPDATE SET title = excluded.title, document = excluded.document, updated_at = excluded.updated_at";

    let document = serde_json::to_string(quiz)
        .with_context(|| format!("Failed to serialize quiz {}", quiz.id))?;

    conn.execute(sql, params![quiz.id, quiz.title, document, Utc::now().naive_utc()])
        .with_context(|| format!("Failed to save quiz {}", quiz.id))?;

    Ok(())
}

pub fn get_quiz(conn: &Connection, id: &str) -> Result<Option<Quiz>> {
    let sql = "SELECT document FROM quizzes WHERE id = ?1";

    let document: Option<String> = conn
        .query_row(sql, params![id], |row| row.get(0))
        .optional()
        .context("Failed to query quiz by id")?;

    document
        .map(|doc| parse_quiz_document(id, &doc))
        .transpose()
}

fn parse_quiz_document(id: &str, document: &str) -> Result<Quiz> {
    let mut quiz: Quiz = serde_json::from_str(document)
        .with_context(|| format!("Failed to parse stored quiz {}", id))?;
    // the row key is authoritative
    quiz.id = id.to_string();
    Ok(quiz)
}

pub fn list_quizzes(conn: &Connection) -> Result<Vec<QuizSummary>> {
    let sql = "SELECT id, title FROM quizzes ORDER BY id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(QuizSummary {
                id: row.get(0)?,
                title: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DbPool, create_memory_pool, get_connection, setup::ensure_schema};

    fn pool() -> DbPool {
        let pool = create_memory_pool().unwrap();
        ensure_schema(&mut get_connection(&pool).unwrap()).unwrap();
        pool
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let pool = pool();
        let conn = get_connection(&pool).unwrap();

        let mut quiz = Quiz::new("spring");
        quiz.title = Some("Spring cup".to_string());
        quiz.add_team("Owls").unwrap();
        save_quiz(&conn, &quiz).unwrap();

        assert_eq!(get_quiz(&conn, "spring").unwrap(), Some(quiz));
        assert_eq!(get_quiz(&conn, "autumn").unwrap(), None);
    }

    #[test]
    fn test_save_replaces_existing_quiz() {
        let pool = pool();
        let conn = get_connection(&pool).unwrap();

        let mut quiz = Quiz::new("spring");
        save_quiz(&conn, &quiz).unwrap();
        quiz.title = Some("Renamed".to_string());
        save_quiz(&conn, &quiz).unwrap();

        let listed = list_quizzes(&conn).unwrap();
        assert_eq!(listed, vec![quiz.summary()]);
    }

    #[test]
    fn test_list_is_ordered_by_id() {
        let pool = pool();
        let conn = get_connection(&pool).unwrap();
        for id in ["b", "c", "a"] {
            save_quiz(&conn, &Quiz::new(id)).unwrap();
        }

        let ids: Vec<_> = list_quizzes(&conn).unwrap().into_iter().map(|q| q.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
