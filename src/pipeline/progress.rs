//! Record-level resume state for one season's collection run.
//!
//! The tracker owns a [`ProgressRecord`] and persists it as JSON. Writes are
//! batched (every `checkpoint_every` outcomes or `checkpoint_interval`) and
//! atomic: the record is written to a sibling temp file and renamed over the
//! checkpoint, so a crash leaves either the old or the new state on disk.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{Result, Season};

/// Run id of a season's collection: one checkpoint per season.
pub fn run_id(season: Season) -> String {
    format!("season-{}", season)
}

/// `<dir>/season-<year>.json`
pub fn checkpoint_file(dir: &Path, season: Season) -> PathBuf {
    dir.join(format!("{}.json", run_id(season)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressPolicy {
    pub checkpoint_every: u32,
    pub checkpoint_interval: Duration,
    /// Failed attempts after which a uid is excluded from further retries.
    pub max_record_retries: u32,
}

impl Default for ProgressPolicy {
    fn default() -> Self {
        Self {
            checkpoint_every: 25,
            checkpoint_interval: Duration::from_secs(60),
            max_record_retries: 3,
        }
    }
}

/// Persisted processed/failed sets; the two sets never share a uid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub run_id: String,
    pub processed: BTreeSet<String>,
    pub failed: BTreeSet<String>,
    /// Failed attempts per uid; cleared on success.
    #[serde(default)]
    pub attempts: BTreeMap<String, u32>,
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            processed: BTreeSet::new(),
            failed: BTreeSet::new(),
            attempts: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }
}

pub struct ProgressTracker {
    path: PathBuf,
    record: ProgressRecord,
    policy: ProgressPolicy,
    unsaved: u32,
    last_checkpoint: Instant,
}

impl ProgressTracker {
    /// Load the checkpoint at `path`, or start empty when it is missing,
    /// belongs to another run, or `reset` is set.
    pub fn load(path: &Path, run_id: &str, reset: bool, policy: ProgressPolicy) -> Result<Self> {
        let record = if reset {
            info!(run_id, "progress reset requested");
            ProgressRecord::new(run_id)
        } else if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let record: ProgressRecord = serde_json::from_str(&contents)?;
            if record.run_id == run_id {
                debug!(
                    run_id,
                    processed = record.processed.len(),
                    failed = record.failed.len(),
                    "resuming from checkpoint"
                );
                record
            } else {
                warn!(
                    expected = run_id,
                    found = %record.run_id,
                    "checkpoint belongs to another run, starting fresh"
                );
                ProgressRecord::new(run_id)
            }
        } else {
            ProgressRecord::new(run_id)
        };

        Ok(Self {
            path: path.to_path_buf(),
            record,
            policy,
            unsaved: 0,
            last_checkpoint: Instant::now(),
        })
    }

    /// Delete a checkpoint; the next run starts from scratch.
    pub fn remove(path: &Path) -> Result<bool> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_processed(&self, uid: &str) -> bool {
        self.record.processed.contains(uid)
    }

    pub fn is_excluded(&self, uid: &str) -> bool {
        self.record.failed.contains(uid) && self.attempts(uid) >= self.policy.max_record_retries
    }

    pub fn attempts(&self, uid: &str) -> u32 {
        self.record.attempts.get(uid).copied().unwrap_or(0)
    }

    /// Unattempted uids and failed uids under the retry ceiling. A refresh
    /// also revisits processed uids; excluded ones stay excluded.
    pub fn should_attempt(&self, uid: &str, refresh: bool) -> bool {
        !self.is_excluded(uid) && (refresh || !self.is_processed(uid))
    }

    pub fn record_success(&mut self, uid: &str) {
        self.record.failed.remove(uid);
        self.record.attempts.remove(uid);
        self.record.processed.insert(uid.to_string());
        self.unsaved += 1;
    }

    /// A failure of a uid that already succeeded leaves it processed; its
    /// stored data are intact.
    pub fn record_failure(&mut self, uid: &str) {
        self.unsaved += 1;
        if self.is_processed(uid) {
            return;
        }
        self.record.failed.insert(uid.to_string());
        let attempts = self.record.attempts.entry(uid.to_string()).or_insert(0);
        *attempts += 1;
        if *attempts == self.policy.max_record_retries {
            warn!(uid, attempts = *attempts, "retry ceiling reached, excluding uid");
        }
    }

    /// Failed uids that will be retried on the next run.
    pub fn pending_failures(&self) -> Vec<String> {
        self.record
            .failed
            .iter()
            .filter(|uid| !self.is_excluded(uid))
            .cloned()
            .collect()
    }

    /// Failed uids that reached the retry ceiling.
    pub fn excluded(&self) -> Vec<String> {
        self.record
            .failed
            .iter()
            .filter(|uid| self.is_excluded(uid))
            .cloned()
            .collect()
    }

    /// Persist when enough outcomes or enough time have accumulated.
    pub fn maybe_checkpoint(&mut self) -> Result<bool> {
        if self.unsaved == 0 {
            return Ok(false);
        }
        if self.unsaved >= self.policy.checkpoint_every
            || self.last_checkpoint.elapsed() >= self.policy.checkpoint_interval
        {
            self.checkpoint()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn checkpoint(&mut self) -> Result<()> {
        self.record.updated_at = Utc::now();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(&self.record)?;
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(
            run_id = %self.record.run_id,
            processed = self.record.processed.len(),
            failed = self.record.failed.len(),
            "checkpoint saved"
        );
        self.unsaved = 0;
        self.last_checkpoint = Instant::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests;
