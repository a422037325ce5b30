//! Process-wide question cache with TTL, batch identity, and a cooperative
//! single-flight guard.
//!
//! The cache owns a small pool of pre-generated questions for one
//! (role, difficulty) pair. Each request pops one question; dropping to the
//! low-water mark fires a detached background refill whose outcome the
//! caller never sees. The `generating` flag lives inside the mutex, so
//! within one cache at most one fill is in flight; the guard is still
//! cooperative, not a keyed single-flight, and a second cache instance can
//! race it.
//!
//! Generation failure clears the flag and leaves the batch empty; the caller
//! gets `NoQuestions` and is expected to retry.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

use crate::domain::{Question, QuestionPayload, QUESTION_ID_RANGE};
use crate::error::AppError;
use crate::prompt::PromptSpec;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Generation backend: prompt out, validated question payloads back.
/// Implemented by the Gemini adapter in production and by scripted sources
/// in tests.
pub trait QuestionSource: Send + Sync {
  fn generate(&self, spec: &PromptSpec, count: usize) -> BoxFuture<Result<Vec<QuestionPayload>, String>>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheKey {
  pub role: String,
  pub difficulty: String,
}

struct CacheInner {
  pending: Vec<Question>,
  fetched_at: Instant,
  key: Option<CacheKey>,
  generating: bool,
}

impl CacheInner {
  fn new() -> Self {
    Self { pending: Vec::new(), fetched_at: Instant::now(), key: None, generating: false }
  }
}

/// Cheaply clonable handle; all clones share the same pool.
#[derive(Clone)]
pub struct QuestionCache {
  inner: Arc<Mutex<CacheInner>>,
  source: Arc<dyn QuestionSource>,
  ttl: Duration,
  low_water: usize,
  batch_size: usize,
}

impl QuestionCache {
  pub fn new(source: Arc<dyn QuestionSource>, ttl: Duration, low_water: usize, batch_size: usize) -> Self {
    Self {
      inner: Arc::new(Mutex::new(CacheInner::new())),
      source,
      ttl,
      low_water,
      batch_size,
    }
  }

  /// Serve one question for (role, difficulty).
  ///
  /// Expired or mismatched batches are discarded first; an empty pool is
  /// refilled synchronously, and a pool at or below the low-water mark
  /// triggers a background refill after the pop.
  #[instrument(level = "info", skip(self), fields(%role, %difficulty))]
  pub async fn take(&self, role: &str, difficulty: &str) -> Result<Question, AppError> {
    let key = CacheKey { role: role.to_string(), difficulty: difficulty.to_string() };
    let spec = PromptSpec::for_role(Some(role), Some(difficulty));

    let must_fill = {
      let mut inner = self.inner.lock().await;
      if inner.key.as_ref() != Some(&key) || inner.fetched_at.elapsed() > self.ttl {
        if !inner.pending.is_empty() {
          debug!(target: "question", dropped = inner.pending.len(), "discarding stale or mismatched batch");
        }
        inner.pending.clear();
        inner.key = Some(key.clone());
      }
      if inner.pending.is_empty() && !inner.generating {
        inner.generating = true;
        true
      } else {
        false
      }
    };

    if must_fill {
      match self.source.generate(&spec, self.batch_size).await {
        Ok(payloads) => {
          let n = self.install(&key, payloads).await;
          info!(target: "question", %role, %difficulty, batch = n, "cache filled synchronously");
        }
        Err(e) => {
          let mut inner = self.inner.lock().await;
          inner.generating = false;
          error!(target: "question", %role, %difficulty, error = %e, "generation failed; cache left empty");
        }
      }
    }

    let (question, prefetch) = {
      let mut inner = self.inner.lock().await;
      let q = inner.pending.pop();
      let prefetch = q.is_some() && inner.pending.len() <= self.low_water && !inner.generating;
      if prefetch {
        inner.generating = true;
      }
      (q, prefetch)
    };

    if prefetch {
      self.spawn_refill(key, spec);
    }

    question.ok_or(AppError::NoQuestions)
  }

  /// Drop any pending batch and its identity. Used when reconfiguring.
  pub async fn clear(&self) {
    let mut inner = self.inner.lock().await;
    inner.pending.clear();
    inner.key = None;
  }

  /// Replace the batch with freshly id-stamped questions, record fetch time
  /// and identity, clear the guard. Returns the batch size installed.
  async fn install(&self, key: &CacheKey, payloads: Vec<QuestionPayload>) -> usize {
    // Ids are random and independent per question; duplicates are accepted.
    let batch: Vec<Question> = {
      let mut rng = rand::thread_rng();
      payloads
        .into_iter()
        .map(|p| {
          let id = rng.gen_range(0..QUESTION_ID_RANGE);
          p.into_question(id)
        })
        .collect()
    };
    let n = batch.len();
    let mut inner = self.inner.lock().await;
    inner.pending = batch;
    inner.fetched_at = Instant::now();
    inner.key = Some(key.clone());
    inner.generating = false;
    n
  }

  /// Detached low-water refill. Installs the batch tagged with the key it
  /// generated for, even if requests moved on meanwhile.
  fn spawn_refill(&self, key: CacheKey, spec: PromptSpec) {
    let cache = self.clone();
    tokio::spawn(async move {
      match cache.source.generate(&spec, cache.batch_size).await {
        Ok(payloads) => {
          let n = cache.install(&key, payloads).await;
          info!(target: "question", role = %key.role, difficulty = %key.difficulty, batch = n, "background refill complete");
        }
        Err(e) => {
          let mut inner = cache.inner.lock().await;
          inner.generating = false;
          error!(target: "question", role = %key.role, difficulty = %key.difficulty, error = %e, "background refill failed");
        }
      }
    });
  }
}
