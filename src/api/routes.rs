use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

use crate::api::handlers::{
    AppState,
    answer_sheets::read_answer_sheet,
    leaderboard::get_leaderboard,
    quizzes::{
        add_team, delete_question, delete_round, get_quiz, list_quizzes, put_question, put_quiz, put_round,
        remove_team, reorder_rounds, set_ruleset,
    },
    submissions::{list_submissions, put_submission},
};

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.storage.max_upload_bytes;

    Router::new()
        .route("/api/quizzes", get(list_quizzes))
        .route("/api/quizzes/:quiz_id", get(get_quiz).put(put_quiz))
        .route("/api/quizzes/:quiz_id/teams", post(add_team))
        .route("/api/quizzes/:quiz_id/teams/:team_name", delete(remove_team))
        .route("/api/quizzes/:quiz_id/rounds/order", post(reorder_rounds))
        .route("/api/quizzes/:quiz_id/rounds/:round_number", put(put_round).delete(delete_round))
        .route("/api/quizzes/:quiz_id/rounds/:round_number/ruleset", put(set_ruleset))
        .route(
            "/api/quizzes/:quiz_id/rounds/:round_number/questions/:number",
            put(put_question).delete(delete_question),
        )
        .route("/api/quizzes/:quiz_id/submissions", get(list_submissions).put(put_submission))
        .route("/api/quizzes/:quiz_id/leaderboard", get(get_leaderboard))
        .route(
            "/api/quizzes/:quiz_id/answer-sheets",
            post(read_answer_sheet).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{Value, json};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    use crate::api::ocr_client::OcrClient;
    use crate::cache::{Cache, Fingerprint};
    use crate::config::settings::AppConfig;
    use crate::database::{create_memory_pool, get_connection, setup::ensure_schema};

    struct TestApp {
        router: Router,
        cache_dir: PathBuf,
    }

    impl Drop for TestApp {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.cache_dir);
        }
    }

    fn app() -> TestApp {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        let cache_dir = std::env::temp_dir().join(format!("quiz_board_routes_{}_{}", std::process::id(), nanos));

        let pool = create_memory_pool().unwrap();
        ensure_schema(&mut get_connection(&pool).unwrap()).unwrap();

        let config = AppConfig::new();
        let state = Arc::new(AppState {
            pool,
            cache: Cache::new(&cache_dir).unwrap(),
            ocr: Mutex::new(OcrClient::new(&config.ocr).unwrap()),
            config,
        });

        TestApp {
            router: create_router(state),
            cache_dir,
        }
    }

    async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn sample_quiz() -> Value {
        json!({
            "title": "Pub night",
            "teams": ["A", "B", "C"],
            "rounds": [
                {
                    "roundNumber": 1,
                    "ruleset": "multiple-choice",
                    "pointsPerCorrectAnswer": 2,
                    "questions": [{"number": 1, "text": "Pick", "options": ["w", "x", "y", "z"], "correctAnswer": "B"}]
                },
                {
                    "roundNumber": 2,
                    "ruleset": "number",
                    "questions": [{"number": 1, "text": "How many?", "correctAnswer": 10}]
                }
            ]
        })
    }

    async fn submit(app: &TestApp, team: &str, round: i64, answer: Value) {
        let body = json!({"teamName": team, "roundNumber": round, "answers": [{"number": 1, "answer": answer}]});
        let (status, _) = send(app, Method::PUT, "/api/quizzes/q/submissions", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_quiz_crud_and_listing() {
        let app = app();

        let (status, _) = send(&app, Method::GET, "/api/quizzes/q", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, quiz) = send(&app, Method::PUT, "/api/quizzes/q", Some(sample_quiz())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quiz["id"], "q");

        let (status, list) = send(&app, Method::GET, "/api/quizzes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list, json!([{"id": "q", "title": "Pub night"}]));
    }

    #[tokio::test]
    async fn test_put_quiz_cleans_roster() {
        let app = app();

        let body = json!({"title": "Pub night", "teams": [" A", "B", "A ", "B"]});
        let (status, quiz) = send(&app, Method::PUT, "/api/quizzes/q", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quiz["teams"], json!(["A", "B"]));

        let body = json!({"teams": ["A", "  "]});
        let (status, _) = send(&app, Method::PUT, "/api/quizzes/q", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, stored) = send(&app, Method::GET, "/api/quizzes/q", None).await;
        assert_eq!(stored["teams"], json!(["A", "B"]));
    }

    #[tokio::test]
    async fn test_leaderboard_zero_fills_roster() {
        let app = app();
        send(&app, Method::PUT, "/api/quizzes/q", Some(sample_quiz())).await;

        let (status, board) = send(&app, Method::GET, "/api/quizzes/q/leaderboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(board["scope"], "all");
        assert_eq!(
            board["entries"],
            json!([
                {"rank": 1, "teamName": "A", "points": 0.0},
                {"rank": 2, "teamName": "B", "points": 0.0},
                {"rank": 3, "teamName": "C", "points": 0.0}
            ])
        );
    }

    #[tokio::test]
    async fn test_leaderboard_scores_submissions_by_scope() {
        let app = app();
        send(&app, Method::PUT, "/api/quizzes/q", Some(sample_quiz())).await;

        submit(&app, "A", 1, json!("B")).await;
        submit(&app, "B", 1, json!("C")).await;
        submit(&app, "B", 1, json!("B")).await;
        submit(&app, "C", 2, json!(10)).await;
        submit(&app, "D", 2, json!("12")).await;

        let (_, board) = send(&app, Method::GET, "/api/quizzes/q/leaderboard?scope=all", None).await;
        let rows: Vec<(String, f64)> = board["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| (row["teamName"].as_str().unwrap().to_string(), row["points"].as_f64().unwrap()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("C".to_string(), 3.0),
                ("A".to_string(), 2.0),
                ("B".to_string(), 2.0),
                ("D".to_string(), 0.0)
            ]
        );

        let (_, board) = send(&app, Method::GET, "/api/quizzes/q/leaderboard?scope=1", None).await;
        assert_eq!(board["scope"], "1");
        assert_eq!(board["entries"][0]["teamName"], "A");
        assert_eq!(board["entries"][3]["teamName"], "D");
        assert_eq!(board["entries"][3]["points"], 0.0);

        let (status, _) = send(&app, Method::GET, "/api/quizzes/q/leaderboard?scope=first", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/api/quizzes/nope/leaderboard", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_submission_listing_and_validation() {
        let app = app();
        send(&app, Method::PUT, "/api/quizzes/q", Some(sample_quiz())).await;
        submit(&app, "A", 1, json!("B")).await;
        submit(&app, "A", 2, json!(3)).await;

        let (_, listed) = send(&app, Method::GET, "/api/quizzes/q/submissions?roundNumber=2", None).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["quizId"], "q");

        let blank = json!({"teamName": "  ", "roundNumber": 1, "answers": []});
        let (status, _) = send(&app, Method::PUT, "/api/quizzes/q/submissions", Some(blank)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let orphan = json!({"teamName": "A", "roundNumber": 1, "answers": []});
        let (status, _) = send(&app, Method::PUT, "/api/quizzes/other/submissions", Some(orphan)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_round_and_question_edits() {
        let app = app();
        send(&app, Method::PUT, "/api/quizzes/q", Some(sample_quiz())).await;

        let (status, quiz) = send(
            &app,
            Method::PUT,
            "/api/quizzes/q/rounds/1/ruleset",
            Some(json!({"ruleset": "free-text"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quiz["rounds"][0]["ruleset"], "free-text");
        assert_eq!(quiz["rounds"][0]["pointsPerCorrectAnswer"], 1.0);
        assert!(quiz["rounds"][0]["questions"][0].get("correctAnswer").is_none());

        let question = json!({"text": "Capital of Bulgaria?", "correctAnswer": {"bg": "София", "en": "Sofia"}});
        let (status, quiz) = send(&app, Method::PUT, "/api/quizzes/q/rounds/1/questions/2", Some(question)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quiz["rounds"][0]["questions"][1]["number"], 2);
        assert_eq!(quiz["rounds"][0]["questions"][1]["correctAnswer"]["en"], "Sofia");

        let (status, _) = send(&app, Method::PUT, "/api/quizzes/q/rounds/9/questions/1", Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, quiz) = send(
            &app,
            Method::PUT,
            "/api/quizzes/q/rounds/5",
            Some(json!({"ruleset": "number", "pointsExactMatch": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quiz["rounds"][2]["roundNumber"], 5);
        assert_eq!(quiz["rounds"][2]["pointsExactMatch"], 5.0);

        let (status, quiz) = send(&app, Method::POST, "/api/quizzes/q/rounds/order", Some(json!({"order": [5, 2]}))).await;
        assert_eq!(status, StatusCode::OK);
        let order: Vec<i64> = quiz["rounds"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["roundNumber"].as_i64().unwrap())
            .collect();
        assert_eq!(order, vec![5, 2, 1]);

        let (status, _) = send(&app, Method::POST, "/api/quizzes/q/rounds/order", Some(json!({"order": [7]}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, quiz) = send(&app, Method::DELETE, "/api/quizzes/q/rounds/1/questions/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quiz["rounds"][2]["questions"].as_array().unwrap().len(), 1);

        let (status, quiz) = send(&app, Method::DELETE, "/api/quizzes/q/rounds/5", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quiz["rounds"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_team_roster_edits() {
        let app = app();
        send(&app, Method::PUT, "/api/quizzes/q", Some(sample_quiz())).await;

        let (status, quiz) = send(&app, Method::POST, "/api/quizzes/q/teams", Some(json!({"teamName": " Owls "}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quiz["teams"], json!(["A", "B", "C", "Owls"]));

        let (status, _) = send(&app, Method::POST, "/api/quizzes/q/teams", Some(json!({"teamName": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, quiz) = send(&app, Method::DELETE, "/api/quizzes/q/teams/Owls", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quiz["teams"], json!(["A", "B", "C"]));

        let (status, _) = send(&app, Method::DELETE, "/api/quizzes/q/teams/Owls", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_answer_sheet_served_from_cache() {
        let app = app();
        send(&app, Method::PUT, "/api/quizzes/q", Some(sample_quiz())).await;

        let scan = b"%PDF-1.4 fake scan";
        let fingerprint = Fingerprint::new("owls.pdf", scan.len() as u64, 1700000000000);
        let cache = Cache::new(&app.cache_dir).unwrap();
        cache
            .save_raw(
                &fingerprint.cache_key(),
                &json!({"document": {"entities": [
                    {"type": "answer", "mentionText": "2. 12"},
                    {"type": "answer", "mentionText": "1. B"},
                    {"type": "answer", "mentionText": 3},
                    {"type": "team", "mentionText": "Owls"}
                ]}}),
            )
            .unwrap();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/quizzes/q/answer-sheets?fileName=owls.pdf&lastModified=1700000000000")
            .header("content-type", "application/pdf")
            .body(Body::from(&scan[..]))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({
                "fileName": "owls.pdf",
                "answers": [{"number": 1, "text": "B"}, {"number": 2, "text": "12"}]
            })
        );
    }
}
