//! Request error taxonomy and its HTTP mapping.
//!
//! Five failure classes, none fatal to the process:
//!   configuration (500), upstream generation (500), transient
//!   unavailability (503), request validation (400), storage I/O (500).
//! No automatic retries anywhere; the client re-requests on error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
  #[error("GEMINI_API_KEY environment variable not set.")]
  MissingApiKey,

  /// External call or JSON parse failure on the direct generation path.
  #[error("Failed to generate question: {0}")]
  Generation(String),

  /// Cache empty: generation is in progress or just failed. Retry later.
  #[error("No questions available right now.")]
  NoQuestions,

  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Storage(String),
}

impl AppError {
  pub fn status(&self) -> StatusCode {
    match self {
      AppError::MissingApiKey | AppError::Generation(_) | AppError::Storage(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
      AppError::NoQuestions => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
    }
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status();
    // Question endpoints speak `{error, details}`, scoreboard endpoints
    // `{message}`, matching what the game client parses.
    let body = match &self {
      AppError::MissingApiKey => json!({ "error": self.to_string() }),
      AppError::Generation(details) => {
        json!({ "error": "Failed to generate question.", "details": details })
      }
      AppError::NoQuestions => json!({
        "error": "No questions available.",
        "details": "Question generation is in progress or just failed; retry shortly."
      }),
      AppError::Validation(_) | AppError::Storage(_) => {
        json!({ "message": self.to_string() })
      }
    };
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_mapping_follows_the_taxonomy() {
    assert_eq!(AppError::MissingApiKey.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(AppError::Generation("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(AppError::NoQuestions.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::Storage("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
