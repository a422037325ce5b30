//! Impact Quiz · Trivia Game Backend
//!
//! - Axum HTTP API (question generation, scoreboard)
//! - Gemini integration (via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT            : u16 (default 3000)
//!   GEMINI_API_KEY  : enables question generation if present
//!   GEMINI_BASE_URL : default "https://generativelanguage.googleapis.com/v1beta"
//!   GEMINI_MODEL    : default "gemini-1.5-flash-latest"
//!   QUIZ_CONFIG_PATH    : path to TOML config (prompt templates)
//!   SCOREBOARD_PATH     : default "./data/scoreboard.json"
//!   QUESTION_TTL_SECS   : cache batch lifetime (default 300)
//!   QUESTION_LOW_WATER  : background refill threshold (default 2)
//!   QUESTION_BATCH_SIZE : questions per generation call (default 5)
//!   LOG_LEVEL    : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT   : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use impact_quiz_backend::routes::build_router;
use impact_quiz_backend::state::AppState;
use impact_quiz_backend::telemetry;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (cache, Gemini client, scoreboard store).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "quiz_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
