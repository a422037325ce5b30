//! Service configuration: prompt templates (TOML-overridable) and env-derived
//! cache/storage settings.
//!
//! See `Prompts` for the expected TOML schema under `[prompts]`.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct QuizConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompt fragments used to build the generation instruction. Defaults match
/// the production prompt; override them in TOML if you need to tune tone or
/// the requested JSON shape.
///
/// Placeholders: `{count}` and `{noun}` ("question"/"questions").
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub question_preamble: String,
  pub question_rules: String,
  pub shape_object: String,
  pub shape_array: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      question_preamble: "You are an expert in software engineering and DevOps. Generate {count} multiple-choice {noun} about realistic software engineering impact scenarios.".into(),
      question_rules: "The {noun} must describe a detailed, real-world software engineering scenario and ask the user to guess its potential impact. Provide four impact levels as options: 'Low', 'Medium', 'High', and 'Critical'. Ensure the scenario is plausible and the correct answer is well-justified (though the justification is not part of the output).".into(),
      shape_object: "The output must be a valid, complete JSON object with the following structure: { \"id\": number, \"category\": string, \"topic\": string, \"question\": string, \"options\": [\"Low\", \"Medium\", \"High\", \"Critical\"], \"correctAnswer\": string }.".into(),
      shape_array: "The output must be a valid, complete JSON array of exactly {count} objects, each with the following structure: { \"id\": number, \"category\": string, \"topic\": string, \"question\": string, \"options\": [\"Low\", \"Medium\", \"High\", \"Critical\"], \"correctAnswer\": string }. Do not include any text outside the JSON array.".into(),
    }
  }
}

/// Attempt to load `QuizConfig` from QUIZ_CONFIG_PATH. On any parsing/IO
/// error, returns None and the compiled-in defaults apply.
pub fn load_quiz_config_from_env() -> Option<QuizConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<QuizConfig>(&s) {
      Ok(cfg) => {
        info!(target: "quiz_backend", %path, "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quiz_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quiz_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// Cache and storage tuning, read from env with defaults.
#[derive(Clone, Debug)]
pub struct Settings {
  pub scoreboard_path: PathBuf,
  pub question_ttl: Duration,
  pub low_water: usize,
  pub batch_size: usize,
}

impl Settings {
  pub fn from_env() -> Self {
    Self {
      scoreboard_path: std::env::var("SCOREBOARD_PATH")
        .unwrap_or_else(|_| "./data/scoreboard.json".into())
        .into(),
      question_ttl: Duration::from_secs(env_parse("QUESTION_TTL_SECS", 300)),
      low_water: env_parse("QUESTION_LOW_WATER", 2),
      batch_size: env_parse("QUESTION_BATCH_SIZE", 5),
    }
  }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
  std::env::var(key)
    .ok()
    .and_then(|v| v.parse::<T>().ok())
    .unwrap_or(default)
}
