//! The collection pipeline
//!
//! - `progress`: record-level resume state, checkpointed to JSON
//! - `orchestrator`: per-season state machine driving the sources
//! - `verify`: completeness and consistency report, read-only
//! - `supervisor`: bounded restarts around a whole collection attempt

pub mod orchestrator;
pub mod progress;
pub mod supervisor;
pub mod verify;

pub use orchestrator::{Orchestrator, OrchestratorConfig, RunStats, SeasonReport, SeasonState};
pub use progress::{ProgressPolicy, ProgressRecord, ProgressTracker};
pub use supervisor::{Supervisor, SupervisorOutcome};
pub use verify::{verify_season, Issue, VerificationReport, VerifyPolicy};
