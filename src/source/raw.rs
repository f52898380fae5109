//! Raw record schema shared by all sources, and its normalisation into
//! storage models.
//!
//! Sources disagree on spelling: stat keys arrive as `"total yards"`,
//! `"totalYards"` or `"total_yards"`, values as numbers or display strings
//! such as `"1,234"`, `"45%"`, `"5-12"` or `"31:05"`. Everything is folded
//! into one canonical shape here.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cli::types::{GameUid, Season, StatUid, TeamUid};
use crate::error::CollectError;
use crate::season::Category;
use crate::storage::{Game, Team, TeamGameStat};
use crate::Result;

/// Team reference as embedded in schedule and stats records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTeam {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub stadium: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
}

impl RawTeam {
    /// The source's id, or one derived from the team name.
    pub fn uid(&self) -> Option<TeamUid> {
        match (non_empty(&self.id), non_empty(&self.name)) {
            (Some(id), _) => Some(TeamUid::new(id)),
            (None, Some(name)) => Some(TeamUid::from_name(name)),
            (None, None) => None,
        }
    }

    fn to_team(&self, uid: TeamUid, source: &str) -> Team {
        Team {
            uid,
            name: non_empty(&self.name).map(str::to_string),
            city: non_empty(&self.city).map(str::to_string),
            abbreviation: non_empty(&self.abbreviation).map(str::to_string),
            stadium: non_empty(&self.stadium).map(str::to_string),
            latitude: self.latitude,
            longitude: self.longitude,
            conference: non_empty(&self.conference).map(str::to_string),
            division: non_empty(&self.division).map(str::to_string),
            source: source.to_string(),
        }
    }
}

/// A schedule entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGame {
    pub id: String,
    #[serde(default)]
    pub season: Option<u16>,
    #[serde(default)]
    pub week: Option<u8>,
    /// Kickoff, in any of the formats [`parse_kickoff`] accepts.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub home: Option<RawTeam>,
    #[serde(default)]
    pub away: Option<RawTeam>,
    #[serde(default)]
    pub home_score: Option<u16>,
    #[serde(default)]
    pub away_score: Option<u16>,
}

/// A stat value as sources deliver it: a number or a display string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
}

/// One team's box score for one game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTeamStat {
    #[serde(default)]
    pub id: Option<String>,
    pub game_id: String,
    #[serde(default)]
    pub team: RawTeam,
    #[serde(default)]
    pub season: Option<u16>,
    #[serde(default)]
    pub home: Option<bool>,
    #[serde(default)]
    pub stats: BTreeMap<String, StatValue>,
}

/// Turn a schedule record into a game plus the teams it references.
///
/// The category is left `regular`; the caller classifies. A record claiming a
/// different season than the one requested is malformed. UTC kickoffs are
/// moved to `kickoff_offset` so the stored date is the local game day.
pub fn normalize_game(
    raw: &RawGame,
    season: Season,
    source: &str,
    kickoff_offset: FixedOffset,
) -> Result<(Game, Vec<Team>)> {
    let context = format!("game {}", raw.id);
    if raw.id.trim().is_empty() {
        return Err(CollectError::malformed("game", "missing id"));
    }
    check_season(raw.season, season, &context)?;

    let scheduled_at = match raw.date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(date) => {
            let parsed = parse_kickoff(date, kickoff_offset);
            if parsed.is_none() {
                warn!(game = %raw.id, date, "unparseable kickoff date, storing without one");
            }
            parsed
        }
    };

    let mut teams = Vec::new();
    let mut side = |team: &Option<RawTeam>, label: &str| -> Result<Option<TeamUid>> {
        match team {
            None => Ok(None),
            Some(team) => {
                let uid = team.uid().ok_or_else(|| {
                    CollectError::malformed(&context, format!("{} team has no id or name", label))
                })?;
                teams.push(team.to_team(uid.clone(), source));
                Ok(Some(uid))
            }
        }
    };
    let home_team = side(&raw.home, "home")?;
    let away_team = side(&raw.away, "away")?;

    let game = Game {
        uid: GameUid::new(raw.id.trim()),
        season,
        week: raw.week.filter(|w| *w > 0),
        scheduled_at,
        category: Category::Regular,
        category_override: false,
        home_team,
        away_team,
        home_score: raw.home_score,
        away_score: raw.away_score,
        source: source.to_string(),
    };
    Ok((game, teams))
}

/// Turn a box-score record into a stat line keyed by game and team.
pub fn normalize_stat(raw: &RawTeamStat, season: Season, source: &str) -> Result<TeamGameStat> {
    let context = format!("stats for game {}", raw.game_id);
    if raw.game_id.trim().is_empty() {
        return Err(CollectError::malformed("stats", "missing game id"));
    }
    check_season(raw.season, season, &context)?;

    let game_uid = GameUid::new(raw.game_id.trim());
    let team_uid = raw
        .team
        .uid()
        .ok_or_else(|| CollectError::malformed(&context, "team has no id or name"))?;
    let stat_uid = match non_empty(&raw.id) {
        Some(id) => StatUid::new(id),
        None => StatUid::for_team_game(&game_uid, &team_uid),
    };

    let mut stat = TeamGameStat {
        stat_uid,
        game_uid,
        team_uid,
        season,
        is_home: raw.home,
        total_yards: None,
        passing_yards: None,
        rushing_yards: None,
        first_downs: None,
        turnovers: None,
        third_down_conversions: None,
        third_down_attempts: None,
        penalties: None,
        penalty_yards: None,
        time_of_possession_secs: None,
        source: source.to_string(),
    };

    for (key, value) in &raw.stats {
        apply_stat(&mut stat, &stat_key(key), value);
    }
    Ok(stat)
}

fn apply_stat(stat: &mut TeamGameStat, key: &str, value: &StatValue) {
    match key {
        "totalyards" => stat.total_yards = value.number(),
        "passingyards" | "netpassingyards" => stat.passing_yards = value.number(),
        "rushingyards" => stat.rushing_yards = value.number(),
        "firstdowns" => stat.first_downs = value.number(),
        "turnovers" => stat.turnovers = value.number(),
        "thirddownefficiency" | "thirddowneff" => {
            if let Some((made, attempts)) = value.pair() {
                stat.third_down_conversions = Some(made);
                stat.third_down_attempts = Some(attempts);
            }
        }
        "thirddownconversions" => stat.third_down_conversions = value.number(),
        "thirddownattempts" => stat.third_down_attempts = value.number(),
        "penaltiesyards" | "totalpenaltiesyards" => {
            if let Some((count, yards)) = value.pair() {
                stat.penalties = Some(count);
                stat.penalty_yards = Some(yards);
            }
        }
        "penalties" => stat.penalties = value.number(),
        "penaltyyards" => stat.penalty_yards = value.number(),
        "timeofpossession" | "possessiontime" => {
            stat.time_of_possession_secs = value.clock_seconds()
        }
        _ => {}
    }
}

impl StatValue {
    pub fn number(&self) -> Option<f64> {
        match self {
            StatValue::Number(n) if n.is_finite() => Some(*n),
            StatValue::Number(_) => None,
            StatValue::Text(s) => parse_number(s),
        }
    }

    /// `"5-12"` style pairs.
    pub fn pair(&self) -> Option<(f64, f64)> {
        match self {
            StatValue::Text(s) => parse_pair(s),
            StatValue::Number(_) => None,
        }
    }

    /// `"MM:SS"`, or a plain number of seconds.
    pub fn clock_seconds(&self) -> Option<u32> {
        match self {
            StatValue::Text(s) => parse_clock(s),
            StatValue::Number(n) if n.is_finite() && *n >= 0.0 => Some(n.round() as u32),
            StatValue::Number(_) => None,
        }
    }
}

fn stat_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Parse a display number: strips thousands separators and `%`, evaluates
/// `a/b` fractions. Empty strings and dashes are absent values.
pub fn parse_number(raw: &str) -> Option<f64> {
    let clean: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '%')
        .collect();
    if clean.is_empty() || clean.chars().all(|c| c == '-') {
        return None;
    }
    if let Some((num, den)) = clean.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        return if den == 0.0 { None } else { Some(num / den) };
    }
    clean.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn parse_pair(raw: &str) -> Option<(f64, f64)> {
    let (left, right) = raw.trim().split_once('-')?;
    Some((parse_number(left)?, parse_number(right)?))
}

pub fn parse_clock(raw: &str) -> Option<u32> {
    let (minutes, seconds) = raw.trim().split_once(':')?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    let seconds: u32 = seconds.trim().parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    minutes.checked_mul(60)?.checked_add(seconds)
}

/// Kickoff as local wall-clock time.
///
/// Accepts RFC 3339, the minute-precision `2025-01-12T18:00Z` form, plain
/// `YYYY-MM-DD HH:MM:SS` and bare dates (midnight). A non-zero offset in the
/// input is kept as written; UTC times are shifted to `utc_offset`. Times
/// without any zone are taken as already local.
pub fn parse_kickoff(raw: &str, utc_offset: FixedOffset) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        if dt.offset().local_minus_utc() != 0 {
            return Some(dt.naive_local());
        }
        return Some(dt.with_timezone(&utc_offset).naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ") {
        return Some(dt.and_utc().with_timezone(&utc_offset).naive_local());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn check_season(claimed: Option<u16>, requested: Season, context: &str) -> Result<()> {
    match claimed {
        Some(year) if year != requested.as_u16() => Err(CollectError::malformed(
            context,
            format!("belongs to season {}, not {}", year, requested),
        )),
        _ => Ok(()),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
