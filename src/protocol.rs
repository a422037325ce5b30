//! Public request/response structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! `Question` and `ScoreEntry` from `domain` are already wire-shaped and are
//! serialized directly.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::ScoreEntry;
use crate::error::AppError;

/// Query for GET /generate-question. Either `role` or the
/// category/topic/topics trio; everything optional with server defaults.
#[derive(Debug, Deserialize)]
pub struct QuestionQuery {
  pub role: Option<String>,
  pub category: Option<String>,
  pub topic: Option<String>,
  pub topics: Option<String>,
  pub difficulty: Option<String>,
}

impl QuestionQuery {
  /// The cached role path serves any request that doesn't explicitly steer
  /// by category/topic.
  pub fn is_role_request(&self) -> bool {
    self.role.is_some()
      || (self.category.is_none() && self.topic.is_none() && self.topics.is_none())
  }
}

/// Body for POST /save-score. Name and score are required; the rest tags the
/// entry for filtered scoreboards.
#[derive(Debug, Deserialize)]
pub struct SaveScoreIn {
  pub name: Option<String>,
  pub score: Option<i64>,
  #[serde(rename = "userId")]
  pub user_id: Option<String>,
  pub role: Option<String>,
  pub difficulty: Option<String>,
}

impl SaveScoreIn {
  /// Validate required fields and stamp the server-side date.
  pub fn into_entry(self) -> Result<ScoreEntry, AppError> {
    let name = self.name.filter(|n| !n.trim().is_empty());
    match (name, self.score) {
      (Some(name), Some(score)) => Ok(ScoreEntry {
        name,
        score,
        date: Utc::now().to_rfc3339(),
        user_id: self.user_id,
        role: self.role,
        difficulty: self.difficulty,
      }),
      _ => Err(AppError::Validation("Name and score are required".into())),
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ScoreboardQuery {
  #[serde(rename = "userId")]
  pub user_id: Option<String>,
}

#[derive(Serialize)]
pub struct SavedOut {
  pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}
