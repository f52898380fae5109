//! Runtime settings loaded from an optional TOML file.
//!
//! ```toml
//! data_dir = "/var/lib/nfl-collect"
//!
//! [collection]
//! concurrency = 4
//! request_timeout_secs = 45
//! kickoff_utc_offset = "-05:00"
//!
//! [verification]
//! stats_coverage_min = 0.85
//!
//! [supervisor]
//! max_restarts = 100
//!
//! [sources]
//! schedule_url = "https://feeds.example.net/nfl/schedule"
//! stats_url = "https://feeds.example.net/nfl/boxscores"
//!
//! [seasons.2025]
//! regular_games = 272
//! regular_weeks = 18
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use serde::Deserialize;

use crate::core::backoff::RetryPolicy;
use crate::error::CollectError;
use crate::pipeline::progress::{checkpoint_file, ProgressPolicy};
use crate::pipeline::verify::VerifyPolicy;
use crate::season::registry::{SeasonPlanConfig, SeasonRegistry};
use crate::{Result, Season, CONFIG_ENV_VAR};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    /// Concurrent in-flight requests during augmentation.
    pub concurrency: usize,
    pub max_source_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    pub request_timeout_secs: u64,
    /// Checkpoint after this many recorded outcomes...
    pub checkpoint_every: u32,
    /// ...or after this much time, whichever comes first.
    pub checkpoint_interval_secs: u64,
    pub max_record_retries: u32,
    /// Consecutive unavailable stats requests that end the augmentation pass.
    pub augmentation_outage_threshold: u32,
    /// Local offset for kickoffs a feed reports in UTC. Playoff windows are
    /// local game dates, so a late game must not roll over to the next day.
    pub kickoff_utc_offset: String,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_source_attempts: 5,
            backoff_base_ms: 500,
            backoff_max_ms: 30_000,
            request_timeout_secs: 45,
            checkpoint_every: 25,
            checkpoint_interval_secs: 60,
            max_record_retries: 3,
            augmentation_outage_threshold: 10,
            kickoff_utc_offset: "-05:00".to_string(),
        }
    }
}

impl CollectionSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_source_attempts,
            base_delay: Duration::from_millis(self.backoff_base_ms),
            max_delay: Duration::from_millis(self.backoff_max_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn kickoff_offset(&self) -> Result<FixedOffset> {
        self.kickoff_utc_offset.trim().parse().map_err(|_| {
            CollectError::config(format!(
                "collection.kickoff_utc_offset '{}' is not an offset like -05:00",
                self.kickoff_utc_offset
            ))
        })
    }

    pub fn progress_policy(&self) -> ProgressPolicy {
        ProgressPolicy {
            checkpoint_every: self.checkpoint_every,
            checkpoint_interval: Duration::from_secs(self.checkpoint_interval_secs),
            max_record_retries: self.max_record_retries,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VerificationSettings {
    /// Share of stat lines allowed to miss core metrics before it is an issue.
    pub stats_missing_threshold: f64,
    /// Minimum share of games that must have stats.
    pub stats_coverage_min: f64,
}

impl Default for VerificationSettings {
    fn default() -> Self {
        Self {
            stats_missing_threshold: 0.15,
            stats_coverage_min: 0.85,
        }
    }
}

impl VerificationSettings {
    pub fn policy(&self) -> VerifyPolicy {
        VerifyPolicy {
            stats_missing_threshold: self.stats_missing_threshold,
            stats_coverage_min: self.stats_coverage_min,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupervisorSettings {
    pub max_restarts: u32,
    pub cooldown_secs: u64,
    pub max_cooldown_secs: u64,
    /// Kill and restart a collection attempt that runs longer than this.
    pub attempt_timeout_secs: Option<u64>,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            max_restarts: 100,
            cooldown_secs: 2,
            max_cooldown_secs: 60,
            attempt_timeout_secs: None,
        }
    }
}

impl SupervisorSettings {
    /// Restarts plus the first attempt.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_restarts.saturating_add(1),
            base_delay: Duration::from_secs(self.cooldown_secs),
            max_delay: Duration::from_secs(self.max_cooldown_secs.max(self.cooldown_secs)),
        }
    }

    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub schedule_url: Option<String>,
    pub stats_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: Option<PathBuf>,
    pub collection: CollectionSettings,
    pub verification: VerificationSettings,
    pub supervisor: SupervisorSettings,
    pub sources: SourceSettings,
    /// Per-season plans overriding the built-in ones.
    pub seasons: BTreeMap<String, SeasonPlanConfig>,
}

impl Settings {
    /// Load from `path`, else from the `NFL_COLLECT_CONFIG` file, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        match path.map(Path::to_path_buf).or(env_path) {
            Some(path) => {
                let contents = std::fs::read_to_string(&path).map_err(|e| {
                    CollectError::config(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::from_toml(&contents)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        let c = &self.collection;
        if c.concurrency == 0 {
            return Err(CollectError::config("collection.concurrency must be at least 1"));
        }
        if c.max_source_attempts == 0 {
            return Err(CollectError::config(
                "collection.max_source_attempts must be at least 1",
            ));
        }
        if c.request_timeout_secs == 0 {
            return Err(CollectError::config(
                "collection.request_timeout_secs must be at least 1",
            ));
        }
        if c.checkpoint_every == 0 {
            return Err(CollectError::config("collection.checkpoint_every must be at least 1"));
        }
        c.kickoff_offset()?;
        let v = &self.verification;
        for (name, value) in [
            ("stats_missing_threshold", v.stats_missing_threshold),
            ("stats_coverage_min", v.stats_coverage_min),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CollectError::config(format!(
                    "verification.{} must be between 0 and 1",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Built-in season plans with the configured ones layered on top.
    pub fn registry(&self) -> Result<SeasonRegistry> {
        let overrides = SeasonRegistry::from_configs(&self.seasons)?;
        Ok(SeasonRegistry::builtin()?.merge(overrides))
    }

    /// `data_dir` from the file, else `<platform data dir>/nfl-collect`.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
                .unwrap_or_else(|| PathBuf::from("."))
                .join("nfl-collect")
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join("nfl.db")
    }

    pub fn progress_dir(&self) -> PathBuf {
        self.data_dir().join("progress")
    }

    pub fn checkpoint_path(&self, season: Season) -> PathBuf {
        checkpoint_file(&self.progress_dir(), season)
    }
}
