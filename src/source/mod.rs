//! Source adapters: the seam between the pipeline and external data feeds.
//!
//! An adapter answers one [`FetchRequest`] with a batch of raw records. Raw
//! records are normalised into storage models by [`raw`]; transport concerns
//! (timeouts, status codes, rate limits) are mapped onto [`SourceError`] so the
//! orchestrator can decide what to retry.

pub mod http;
pub mod raw;

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::cli::types::{GameUid, Season, Week};
use crate::season::Category;

pub use http::HttpJsonSource;
pub use raw::{RawGame, RawTeam, RawTeamStat, StatValue};

/// Per-request failure reported by an adapter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error("not found")]
    NotFound,

    #[error("rate limited")]
    RateLimited { retry_after: Option<Duration> },

    #[error("{message}")]
    Transient { message: String },
}

impl SourceError {
    pub fn transient(message: impl Into<String>) -> Self {
        SourceError::Transient {
            message: message.into(),
        }
    }

    /// Anything but a definitive "no such record" may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SourceError::NotFound)
    }
}

/// What slice of a season to fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchScope {
    Season,
    Week(Week),
    Round(Category),
    Game(GameUid),
}

/// Short identifier used in progress uids: `week-3`, `wildcard`, `game-401`.
impl fmt::Display for FetchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchScope::Season => f.write_str("season"),
            FetchScope::Week(week) => write!(f, "week-{}", week),
            FetchScope::Round(category) => write!(f, "{}", category),
            FetchScope::Game(uid) => write!(f, "game-{}", uid),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub season: Season,
    pub scope: FetchScope,
}

impl FetchRequest {
    pub fn new(season: Season, scope: FetchScope) -> Self {
        Self { season, scope }
    }
}

/// A feed of raw records for one season slice.
///
/// Implementations perform a single attempt per call; retry and backoff
/// belong to the caller.
#[allow(async_fn_in_trait)]
pub trait SourceAdapter {
    type Record;

    /// Provenance tag written to every row this source produces.
    fn name(&self) -> &str;

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Self::Record>, SourceError>;
}
