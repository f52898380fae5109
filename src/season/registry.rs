//! Season Plan Registry: expected game counts and playoff calendar windows.
//!
//! Windows are never inferred. Every season the collector knows about is
//! described explicitly, either by the built-in `config/seasons.toml` or by a
//! user config file whose `[seasons.<year>]` tables replace the built-in plan
//! for that year.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::{error::CollectError, Result, Season};

const BUILTIN_SEASONS: &str = include_str!("../../config/seasons.toml");

/// Inclusive day-of-month range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub start: u8,
    pub end: u8,
}

impl DayRange {
    pub fn new(start: u8, end: u8) -> Result<Self> {
        if start == 0 || end > 31 || start > end {
            return Err(CollectError::config(format!(
                "invalid day range {}-{}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, day: u32) -> bool {
        (u32::from(self.start)..=u32::from(self.end)).contains(&day)
    }

    fn overlaps(&self, other: &DayRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// One playoff round: when it is played and how many games it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundPlan {
    pub window: DayRange,
    pub expected: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonPlan {
    pub season: Season,
    pub regular_games: u32,
    pub regular_weeks: u8,
    pub rounds: BTreeMap<Category, RoundPlan>,
}

impl SeasonPlan {
    pub fn expected(&self, category: Category) -> u32 {
        match category {
            Category::Regular => self.regular_games,
            round => self.rounds.get(&round).map(|r| r.expected).unwrap_or(0),
        }
    }

    pub fn expected_playoffs(&self) -> u32 {
        self.rounds.values().map(|r| r.expected).sum()
    }

    pub fn expected_total(&self) -> u32 {
        self.regular_games + self.expected_playoffs()
    }

    pub fn window(&self, category: Category) -> Option<DayRange> {
        self.rounds.get(&category).map(|r| r.window)
    }

    /// Map a date to the playoff round whose registered window contains it.
    ///
    /// Only dates in the playoff year (`season + 1`) can match; everything
    /// else, and every date outside the windows, is the regular season.
    pub fn classify(&self, date: NaiveDate) -> Category {
        if date.year() != self.season.playoff_year() {
            return Category::Regular;
        }
        self.rounds
            .iter()
            .find(|(category, round)| {
                category.playoff_month() == Some(date.month()) && round.window.contains(date.day())
            })
            .map(|(category, _)| *category)
            .unwrap_or(Category::Regular)
    }

    fn validate(&self) -> Result<()> {
        if self.regular_weeks == 0 {
            return Err(CollectError::config(format!(
                "season {}: regular_weeks must be at least 1",
                self.season
            )));
        }
        let january: Vec<(Category, DayRange)> = self
            .rounds
            .iter()
            .filter(|(c, _)| c.playoff_month() == Some(1))
            .map(|(c, r)| (*c, r.window))
            .collect();
        for (i, (a, wa)) in january.iter().enumerate() {
            for (b, wb) in &january[i + 1..] {
                if wa.overlaps(wb) {
                    return Err(CollectError::config(format!(
                        "season {}: {} and {} windows overlap",
                        self.season, a, b
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A round as written in TOML: `wildcard = { days = [11, 13], games = 6 }`.
#[derive(Debug, Clone, Deserialize)]
pub struct RoundConfig {
    pub days: [u8; 2],
    pub games: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayoffsConfig {
    pub wildcard: Option<RoundConfig>,
    pub divisional: Option<RoundConfig>,
    pub conference: Option<RoundConfig>,
    pub superbowl: Option<RoundConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonPlanConfig {
    pub regular_games: u32,
    pub regular_weeks: u8,
    #[serde(default)]
    pub playoffs: PlayoffsConfig,
}

#[derive(Debug, Default, Deserialize)]
struct SeasonsFile {
    #[serde(default)]
    seasons: BTreeMap<String, SeasonPlanConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct SeasonRegistry {
    plans: BTreeMap<Season, SeasonPlan>,
}

impl SeasonRegistry {
    /// Plans shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_SEASONS)
    }

    /// Parse a document containing `[seasons.<year>]` tables.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: SeasonsFile = toml::from_str(contents)?;
        Self::from_configs(&file.seasons)
    }

    pub fn from_configs(configs: &BTreeMap<String, SeasonPlanConfig>) -> Result<Self> {
        let mut plans = BTreeMap::new();
        for (year, config) in configs {
            let season: Season = year
                .parse()
                .map_err(|_| CollectError::config(format!("invalid season key '{}'", year)))?;
            let plan = build_plan(season, config)?;
            plans.insert(season, plan);
        }
        Ok(Self { plans })
    }

    /// Replace or add every plan in `other`.
    pub fn merge(mut self, other: SeasonRegistry) -> Self {
        self.plans.extend(other.plans);
        self
    }

    pub fn plan(&self, season: Season) -> Option<&SeasonPlan> {
        self.plans.get(&season)
    }

    /// Like [`plan`](Self::plan) but a missing season is a configuration error.
    pub fn require(&self, season: Season) -> Result<&SeasonPlan> {
        self.plan(season).ok_or_else(|| {
            CollectError::config(format!("no season plan registered for {}", season))
        })
    }

    pub fn seasons(&self) -> Vec<Season> {
        self.plans.keys().copied().collect()
    }
}

fn build_plan(season: Season, config: &SeasonPlanConfig) -> Result<SeasonPlan> {
    let mut rounds = BTreeMap::new();
    let configured = [
        (Category::Wildcard, &config.playoffs.wildcard),
        (Category::Divisional, &config.playoffs.divisional),
        (Category::Conference, &config.playoffs.conference),
        (Category::Superbowl, &config.playoffs.superbowl),
    ];
    for (category, round) in configured {
        if let Some(round) = round {
            let window = DayRange::new(round.days[0], round.days[1]).map_err(|e| match e {
                CollectError::Configuration { message } => {
                    CollectError::config(format!("season {} {}: {}", season, category, message))
                }
                other => other,
            })?;
            rounds.insert(
                category,
                RoundPlan {
                    window,
                    expected: round.games,
                },
            );
        }
    }

    let plan = SeasonPlan {
        season,
        regular_games: config.regular_games,
        regular_weeks: config.regular_weeks,
        rounds,
    };
    plan.validate()?;
    Ok(plan)
}
