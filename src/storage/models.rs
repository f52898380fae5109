//! Data models for the storage layer

use crate::cli::types::{GameUid, Season, StatUid, TeamUid};
use crate::season::Category;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Team information stored in the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub uid: TeamUid,
    pub name: Option<String>,
    pub city: Option<String>,
    pub abbreviation: Option<String>,
    pub stadium: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub conference: Option<String>,
    pub division: Option<String>,
    pub source: String,
}

impl Team {
    /// A team known only by its uid.
    pub fn reference(uid: TeamUid, source: impl Into<String>) -> Self {
        Self {
            uid,
            name: None,
            city: None,
            abbreviation: None,
            stadium: None,
            latitude: None,
            longitude: None,
            conference: None,
            division: None,
            source: source.into(),
        }
    }
}

/// A scheduled or played game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub uid: GameUid,
    pub season: Season,
    /// Regular-season week; absent for playoff games.
    pub week: Option<u8>,
    pub scheduled_at: Option<NaiveDateTime>,
    pub category: Category,
    /// Set when the category was confirmed by hand; the classifier leaves it alone.
    pub category_override: bool,
    pub home_team: Option<TeamUid>,
    pub away_team: Option<TeamUid>,
    pub home_score: Option<u16>,
    pub away_score: Option<u16>,
    pub source: String,
}

/// One team's box-score line for one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamGameStat {
    pub stat_uid: StatUid,
    pub game_uid: GameUid,
    pub team_uid: TeamUid,
    pub season: Season,
    pub is_home: Option<bool>,
    pub total_yards: Option<f64>,
    pub passing_yards: Option<f64>,
    pub rushing_yards: Option<f64>,
    pub first_downs: Option<f64>,
    pub turnovers: Option<f64>,
    pub third_down_conversions: Option<f64>,
    pub third_down_attempts: Option<f64>,
    pub penalties: Option<f64>,
    pub penalty_yards: Option<f64>,
    pub time_of_possession_secs: Option<u32>,
    pub source: String,
}

impl TeamGameStat {
    /// Core metrics every usable stat line must carry.
    pub fn missing_core_fields(&self) -> bool {
        self.total_yards.is_none() || self.passing_yards.is_none() || self.rushing_yards.is_none()
    }
}

/// Result of an upsert keyed by uid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

impl UpsertOutcome {
    pub fn is_write(&self) -> bool {
        !matches!(self, UpsertOutcome::Unchanged)
    }
}

/// Last recorded collection state for a season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRunRecord {
    pub season: Season,
    pub state: String,
    pub cause: Option<String>,
    pub updated_at: i64,
}
