//! Minimal Gemini client for our use-case.
//!
//! We only call `models/{model}:generateContent` with a single text part and
//! read back the first candidate's text. Calls are instrumented and log model
//! names, latencies, and token usage (not contents).
//!
//! NOTE: We never log the API key; it travels in the `x-goog-api-key` header,
//! not the URL.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::cache::{BoxFuture, QuestionSource};
use crate::config::Prompts;
use crate::domain::QuestionPayload;
use crate::parser::{extract_json, questions_from_value};
use crate::prompt::{build_question_prompt, PromptSpec};
use crate::util::trunc_for_log;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl Gemini {
  /// Construct the client if we find GEMINI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("GEMINI_API_KEY").ok()?;
    let base_url = std::env::var("GEMINI_BASE_URL")
      .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into());
    let model =
      std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash-latest".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// One-shot text generation. No retry; transport and quota errors surface
  /// as a single error string with the upstream message when parseable.
  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
  pub async fn generate_text(&self, prompt: &str, temperature: f32) -> Result<String, String> {
    let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
    let req = GenerateContentRequest {
      contents: vec![Content { parts: vec![Part { text: prompt.to_string() }] }],
      generation_config: Some(GenerationConfig { temperature }),
    };

    let start = std::time::Instant::now();
    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "impact-quiz-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(API_KEY_HEADER, &self.api_key)
      .json(&req)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_gemini_error(&body).unwrap_or(body);
      return Err(format!("Gemini HTTP {}: {}", status, msg));
    }

    let body: GenerateContentResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage_metadata {
      info!(
        prompt_tokens = ?usage.prompt_token_count,
        candidate_tokens = ?usage.candidates_token_count,
        total_tokens = ?usage.total_token_count,
        "Gemini usage"
      );
    }

    let text = body
      .candidates
      .into_iter()
      .next()
      .and_then(|c| c.content)
      .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
      .unwrap_or_default();

    let elapsed = start.elapsed();
    info!(?elapsed, response_len = text.len(), "Gemini response received");
    if text.trim().is_empty() {
      return Err("Gemini returned an empty response".into());
    }
    Ok(text)
  }
}

/// Production `QuestionSource`: prompt build → Gemini call → JSON extraction
/// → schema validation. Invalid items are dropped with a warning; an all-bad
/// batch counts as a generation failure.
#[derive(Clone)]
pub struct GeminiQuestionSource {
  pub gemini: Gemini,
  pub prompts: Prompts,
}

impl QuestionSource for GeminiQuestionSource {
  fn generate(&self, spec: &PromptSpec, count: usize) -> BoxFuture<Result<Vec<QuestionPayload>, String>> {
    let this = self.clone();
    let spec = spec.clone();
    Box::pin(async move {
      let prompt = build_question_prompt(&this.prompts, &spec, count);
      let raw = this.gemini.generate_text(&prompt, 0.9).await?;
      debug!(target: "question", raw_preview = %trunc_for_log(&raw, 160), "raw model response");

      let value = extract_json(&raw)?;
      let payloads = questions_from_value(value)?;
      let total = payloads.len();
      let valid: Vec<QuestionPayload> = payloads
        .into_iter()
        .filter(|p| match p.validate() {
          Ok(()) => true,
          Err(e) => {
            warn!(target: "question", error = %e, "dropping invalid question from batch");
            false
          }
        })
        .collect();

      if valid.is_empty() {
        return Err(format!("model returned {} question(s), none passed validation", total));
      }
      Ok(valid)
    })
  }
}

// --- Wire DTOs (Gemini generateContent) ---

#[derive(Serialize)]
struct GenerateContentRequest {
  contents: Vec<Content>,
  #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
  generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct Content {
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
  #[serde(default)]
  text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
  temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  #[serde(rename = "usageMetadata", default)]
  usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
  #[serde(default)]
  content: Option<Content>,
}

#[derive(Deserialize)]
struct UsageMetadata {
  #[serde(rename = "promptTokenCount", default)]
  prompt_token_count: Option<u32>,
  #[serde(rename = "candidatesTokenCount", default)]
  candidates_token_count: Option<u32>,
  #[serde(rename = "totalTokenCount", default)]
  total_token_count: Option<u32>,
}

/// Try to extract a clean error message from a Gemini error body.
fn extract_gemini_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}
