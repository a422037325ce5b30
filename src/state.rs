//! Application state: question source, per-process question cache, and the
//! scoreboard store.
//!
//! The cache is an explicitly owned object constructed once per process, not
//! ambient global state, so tests can instantiate independent caches with
//! scripted sources. When GEMINI_API_KEY is absent both `source` and `cache`
//! are None and question endpoints answer with a configuration error
//! instead of crashing.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::cache::{QuestionCache, QuestionSource};
use crate::config::{load_quiz_config_from_env, Settings};
use crate::gemini::{Gemini, GeminiQuestionSource};
use crate::scoreboard::ScoreboardStore;

#[derive(Clone)]
pub struct AppState {
  pub source: Option<Arc<dyn QuestionSource>>,
  pub cache: Option<QuestionCache>,
  pub scoreboard: ScoreboardStore,
}

impl AppState {
  /// Build state from env: load prompt config, init the Gemini client, wire
  /// the cache and the scoreboard store.
  #[instrument(level = "info", skip_all)]
  pub fn new() -> Self {
    let prompts = load_quiz_config_from_env()
      .map(|c| c.prompts)
      .unwrap_or_default();
    let settings = Settings::from_env();

    let source: Option<Arc<dyn QuestionSource>> = match Gemini::from_env() {
      Some(gemini) => {
        info!(
          target: "quiz_backend",
          base_url = %gemini.base_url,
          model = %gemini.model,
          "Gemini enabled."
        );
        Some(Arc::new(GeminiQuestionSource { gemini, prompts }))
      }
      None => {
        warn!(
          target: "quiz_backend",
          "Gemini disabled (no GEMINI_API_KEY). Question endpoints will return configuration errors."
        );
        None
      }
    };

    let cache = source.clone().map(|s| {
      QuestionCache::new(s, settings.question_ttl, settings.low_water, settings.batch_size)
    });

    info!(
      target: "quiz_backend",
      scoreboard = %settings.scoreboard_path.display(),
      ttl_secs = settings.question_ttl.as_secs(),
      low_water = settings.low_water,
      batch_size = settings.batch_size,
      "State initialized"
    );

    Self {
      source,
      cache,
      scoreboard: ScoreboardStore::new(settings.scoreboard_path),
    }
  }
}

impl Default for AppState {
  fn default() -> Self {
    Self::new()
  }
}
