//! End-to-end tests against the axum router with a scripted question source
//! and a temp-dir scoreboard file.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use impact_quiz_backend::cache::{BoxFuture, QuestionCache, QuestionSource};
use impact_quiz_backend::domain::{QuestionPayload, IMPACT_OPTIONS};
use impact_quiz_backend::prompt::PromptSpec;
use impact_quiz_backend::routes::build_router;
use impact_quiz_backend::scoreboard::ScoreboardStore;
use impact_quiz_backend::state::AppState;

struct ScriptedSource {
    results: Mutex<VecDeque<Result<Vec<QuestionPayload>, String>>>,
    calls: AtomicUsize,
    last_count: AtomicUsize,
}

impl ScriptedSource {
    fn new(results: Vec<Result<Vec<QuestionPayload>, String>>) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(results.into()),
            calls: AtomicUsize::new(0),
            last_count: AtomicUsize::new(0),
        })
    }
}

impl QuestionSource for ScriptedSource {
    fn generate(
        &self,
        _spec: &PromptSpec,
        count: usize,
    ) -> BoxFuture<Result<Vec<QuestionPayload>, String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_count.store(count, Ordering::SeqCst);
        let next = self
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("script exhausted".into()));
        Box::pin(async move { next })
    }
}

fn payload(topic: &str) -> QuestionPayload {
    QuestionPayload {
        category: "DevOps".into(),
        topic: topic.into(),
        question: format!("A {} incident hits production. What is the impact?", topic),
        options: IMPACT_OPTIONS.iter().map(|s| s.to_string()).collect(),
        correct_answer: "Critical".into(),
    }
}

fn batch(topic: &str, n: usize) -> Result<Vec<QuestionPayload>, String> {
    Ok(std::iter::repeat_with(|| payload(topic)).take(n).collect())
}

fn app(source: Option<Arc<ScriptedSource>>, dir: &TempDir) -> Router {
    let src: Option<Arc<dyn QuestionSource>> = source.map(|s| s as Arc<dyn QuestionSource>);
    let cache = src
        .clone()
        .map(|s| QuestionCache::new(s, Duration::from_secs(300), 0, 5));
    build_router(Arc::new(AppState {
        source: src,
        cache,
        scoreboard: ScoreboardStore::new(dir.path().join("scoreboard.json")),
    }))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("router should respond");
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.expect("router should respond");
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn role_request_serves_a_well_formed_question() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::new(vec![batch("Kubernetes", 5)]);
    let app = app(Some(source.clone()), &dir);

    let (status, body) = get(app, "/generate-question?role=SRE&difficulty=Hard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topic"], "Kubernetes");
    assert_eq!(
        body["options"],
        json!(["Low", "Medium", "High", "Critical"])
    );
    assert_eq!(body["correctAnswer"], "Critical");
    assert!(body["id"].as_u64().unwrap() < 1_000_000);
    // Batch generation requested 5 questions in one call.
    assert_eq!(source.last_count.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn missing_api_key_is_a_500_configuration_error() {
    let dir = TempDir::new().unwrap();
    let app = app(None, &dir);

    let (status, body) = get(app, "/generate-question?role=DevOps").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn failed_generation_answers_503_and_a_retry_can_succeed() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::new(vec![Err("quota exceeded".into()), batch("DNS", 5)]);
    let app = app(Some(source), &dir);

    let (status, body) = get(app.clone(), "/generate-question?role=DevOps").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().is_some());

    let (status, body) = get(app, "/generate-question?role=DevOps").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topic"], "DNS");
}

#[tokio::test]
async fn category_request_bypasses_the_cache() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::new(vec![batch("Database", 1)]);
    // No cache wired at all: the direct path must still work.
    let router = build_router(Arc::new(AppState {
        source: Some(source.clone() as Arc<dyn QuestionSource>),
        cache: None,
        scoreboard: ScoreboardStore::new(dir.path().join("scoreboard.json")),
    }));

    let (status, body) = get(
        router,
        "/generate-question?category=General&topic=Database&difficulty=easy",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topic"], "Database");
    assert_eq!(source.last_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn save_score_without_required_fields_is_400_and_does_not_write() {
    let dir = TempDir::new().unwrap();
    let app = app(None, &dir);

    let (status, body) = post_json(
        app.clone(),
        "/save-score",
        json!({ "name": "ada" }), // score missing
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Name and score are required");

    let (status, body) = post_json(app.clone(), "/save-score", json!({ "score": 7 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Name and score are required");

    let (status, board) = get(app, "/scoreboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board, json!([]));
}

#[tokio::test]
async fn scores_round_trip_sorted_and_filterable() {
    let dir = TempDir::new().unwrap();
    let app = app(None, &dir);

    let (status, body) = post_json(
        app.clone(),
        "/save-score",
        json!({ "name": "ada", "score": 9, "userId": "u1", "role": "SRE", "difficulty": "Hard" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Score saved successfully");

    let (status, _) = post_json(
        app.clone(),
        "/save-score",
        json!({ "name": "grace", "score": 14, "userId": "u2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, board) = get(app.clone(), "/scoreboard").await;
    assert_eq!(status, StatusCode::OK);
    let board = board.as_array().unwrap().clone();
    assert_eq!(board.len(), 2);
    assert_eq!(board[0]["name"], "grace");
    assert_eq!(board[1]["name"], "ada");
    assert!(board[0]["date"].as_str().unwrap().contains('T'));

    let (status, mine) = get(app, "/scoreboard?userId=u1").await;
    assert_eq!(status, StatusCode::OK);
    let mine = mine.as_array().unwrap().clone();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["name"], "ada");
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let dir = TempDir::new().unwrap();
    let (status, body) = get(app(None, &dir), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}
