//! Flat-file top-10 scoreboard.
//!
//! The whole collection lives in one JSON array on disk. Every update is
//! read-modify-write; writes go to a temp file first and are renamed into
//! place so readers never see a torn file. There is no cross-process
//! locking: concurrent writers are last-writer-wins, a documented limitation
//! of this low-traffic store.

use std::fs;
use std::path::PathBuf;

use tracing::{error, info, instrument};

use crate::domain::ScoreEntry;
use crate::error::AppError;

/// The persisted collection never exceeds this many entries.
pub const MAX_ENTRIES: usize = 10;

#[derive(Clone, Debug)]
pub struct ScoreboardStore {
  path: PathBuf,
}

impl ScoreboardStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Append an entry, keep the top 10 sorted descending by score, persist.
  /// The sort is stable, so an equal score ranks below earlier entries.
  #[instrument(level = "info", skip(self, entry), fields(name = %entry.name, score = entry.score))]
  pub fn record(&self, entry: ScoreEntry) -> Result<(), AppError> {
    let result = (|| -> Result<usize, String> {
      let mut board = self.read_entries()?;
      board.push(entry);
      board.sort_by(|a, b| b.score.cmp(&a.score));
      board.truncate(MAX_ENTRIES);
      self.write_entries(&board)?;
      Ok(board.len())
    })();

    match result {
      Ok(len) => {
        info!(target: "scoreboard", entries = len, path = %self.path.display(), "score recorded");
        Ok(())
      }
      Err(e) => {
        error!(target: "scoreboard", error = %e, path = %self.path.display(), "failed to save score");
        Err(AppError::Storage("Error saving score".into()))
      }
    }
  }

  /// The stored collection as-is, optionally filtered by userId. A missing
  /// file is an empty board, not an error.
  #[instrument(level = "debug", skip(self))]
  pub fn list(&self, user_id: Option<&str>) -> Result<Vec<ScoreEntry>, AppError> {
    let board = self.read_entries().map_err(|e| {
      error!(target: "scoreboard", error = %e, path = %self.path.display(), "failed to read scoreboard");
      AppError::Storage("Error reading scoreboard".into())
    })?;
    Ok(match user_id {
      Some(uid) => board
        .into_iter()
        .filter(|e| e.user_id.as_deref() == Some(uid))
        .collect(),
      None => board,
    })
  }

  fn read_entries(&self) -> Result<Vec<ScoreEntry>, String> {
    if !self.path.exists() {
      return Ok(Vec::new());
    }
    let data = fs::read_to_string(&self.path).map_err(|e| e.to_string())?;
    serde_json::from_str(&data).map_err(|e| e.to_string())
  }

  /// Write-to-temp-then-rename so a crash mid-write cannot corrupt the board.
  fn write_entries(&self, entries: &[ScoreEntry]) -> Result<(), String> {
    if let Some(parent) = self.path.parent() {
      if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
      }
    }
    let json = serde_json::to_string_pretty(entries).map_err(|e| e.to_string())?;
    let tmp = self.path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| e.to_string())?;
    fs::rename(&tmp, &self.path).map_err(|e| e.to_string())
  }
}
