//! NFL Season Collector Library
//!
//! Collects schedules and per-team box-score statistics for NFL seasons
//! from remote feeds into a local SQLite store, then verifies each stored
//! season against its expected shape.
//!
//! ## Features
//!
//! - **Idempotent Collection**: Re-running a season never duplicates or churns stored rows
//! - **Resumable Runs**: Checkpointed progress with bounded per-record retries
//! - **Playoff Classification**: Rounds assigned from registered calendar windows
//! - **Verification**: Per-category completeness plus read-only consistency checks
//! - **Supervision**: Restarts a crashed or stalled collector with a cool-down
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nfl_collect::{pipeline::verify_season, season::SeasonRegistry, storage::GameDatabase, Season};
//!
//! # fn example() -> nfl_collect::Result<()> {
//! let db = GameDatabase::open(std::path::Path::new("nfl.db"))?;
//! let registry = SeasonRegistry::builtin()?;
//! let report = verify_season(&db, &registry, Season::new(2024), &Default::default())?;
//! println!("missing games: {}", report.completeness.missing_total);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! Point the CLI at a settings file instead of passing `--config`:
//! ```bash
//! export NFL_COLLECT_CONFIG=/etc/nfl-collect.toml
//! ```

pub mod cli;
pub mod commands;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod season;
pub mod source;
pub mod storage;

// Re-export commonly used types
pub use cli::types::{GameUid, Season, StatUid, TeamUid, Week};
pub use error::{CollectError, Result};
pub use season::Category;

pub const CONFIG_ENV_VAR: &str = "NFL_COLLECT_CONFIG";
