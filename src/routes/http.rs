//! HTTP endpoint handlers. Thin wrappers over the cache, the question source
//! and the scoreboard store; each handler is instrumented and logs basic
//! result info.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use rand::Rng;
use tracing::{info, instrument};

use crate::domain::{Question, ScoreEntry, QUESTION_ID_RANGE, DEFAULT_DIFFICULTY, DEFAULT_ROLE};
use crate::error::AppError;
use crate::prompt::PromptSpec;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

/// GET /generate-question
///
/// `?role=&difficulty=` is the cached path: one question popped from the
/// per-process batch. `?category=&topic=&topics=&difficulty=` bypasses the
/// cache and generates a single question on the spot.
#[instrument(level = "info", skip(state, q))]
pub async fn http_generate_question(
  State(state): State<Arc<AppState>>,
  Query(q): Query<QuestionQuery>,
) -> Result<Json<Question>, AppError> {
  if q.is_role_request() {
    let cache = state.cache.as_ref().ok_or(AppError::MissingApiKey)?;
    let role = q.role.as_deref().unwrap_or(DEFAULT_ROLE);
    let difficulty = q.difficulty.as_deref().unwrap_or(DEFAULT_DIFFICULTY);
    let question = cache.take(role, difficulty).await?;
    info!(target: "question", %role, %difficulty, id = question.id, topic = %question.topic, "question served from cache");
    Ok(Json(question))
  } else {
    let source = state.source.as_ref().ok_or(AppError::MissingApiKey)?;
    let spec = PromptSpec::for_category(
      q.category.as_deref(),
      q.topic.as_deref(),
      q.topics.as_deref(),
      q.difficulty.as_deref(),
    );
    let mut payloads = source.generate(&spec, 1).await.map_err(AppError::Generation)?;
    let payload = payloads
      .pop()
      .ok_or_else(|| AppError::Generation("model returned no question".into()))?;
    let question = payload.into_question(rand::thread_rng().gen_range(0..QUESTION_ID_RANGE));
    info!(target: "question", category = %spec.category, id = question.id, "question generated directly");
    Ok(Json(question))
  }
}

/// POST /save-score. 400 when name or score is missing; the store is not
/// touched in that case.
#[instrument(level = "info", skip(state, body))]
pub async fn http_save_score(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SaveScoreIn>,
) -> Result<Json<SavedOut>, AppError> {
  let entry = body.into_entry()?;
  state.scoreboard.record(entry)?;
  Ok(Json(SavedOut { message: "Score saved successfully".into() }))
}

/// GET /scoreboard, optionally filtered by `?userId=`.
#[instrument(level = "info", skip(state))]
pub async fn http_get_scoreboard(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ScoreboardQuery>,
) -> Result<Json<Vec<ScoreEntry>>, AppError> {
  let board = state.scoreboard.list(q.user_id.as_deref())?;
  info!(target: "scoreboard", entries = board.len(), filtered = q.user_id.is_some(), "scoreboard served");
  Ok(Json(board))
}
