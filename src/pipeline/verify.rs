//! Completeness Verifier.
//!
//! Compares stored counts against the season plan and runs the
//! data-quality checks. Only reads from the database.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::cli::types::{GameUid, Season, StatUid, TeamUid};
use crate::error::CollectError;
use crate::season::{Category, SeasonRegistry};
use crate::storage::GameDatabase;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerifyPolicy {
    pub stats_missing_threshold: f64,
    pub stats_coverage_min: f64,
}

impl Default for VerifyPolicy {
    fn default() -> Self {
        Self {
            stats_missing_threshold: 0.15,
            stats_coverage_min: 0.85,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub expected: u32,
    pub actual: u32,
    pub missing: u32,
}

impl CategoryCount {
    fn new(expected: u32, actual: u32) -> Self {
        Self {
            expected,
            actual,
            missing: expected.saturating_sub(actual),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completeness {
    pub by_category: BTreeMap<Category, CategoryCount>,
    /// All rounds together.
    pub playoffs: CategoryCount,
    pub expected_total: u32,
    pub collected_total: u32,
    /// Sum of per-category gaps; a surplus in one round never hides a
    /// shortfall in another.
    pub missing_total: u32,
}

impl Completeness {
    pub fn regular(&self) -> CategoryCount {
        self.by_category
            .get(&Category::Regular)
            .copied()
            .unwrap_or_default()
    }
}

/// A data-quality finding. Reported, never repaired.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    OrphanedStat {
        stat_uid: StatUid,
        game_uid: GameUid,
    },
    UnknownTeam {
        game_uid: GameUid,
    },
    MissingDatetime {
        game_uid: GameUid,
    },
    StatsMissingCoreFields {
        missing: usize,
        total: usize,
        ratio: f64,
    },
    LowStatsCoverage {
        with_stats: usize,
        games: usize,
        ratio: f64,
    },
    DuplicateFixture {
        home_team: TeamUid,
        away_team: TeamUid,
        scheduled_at: String,
        count: u32,
    },
    SelfMatchup {
        game_uid: GameUid,
    },
    CategoryMismatch {
        game_uid: GameUid,
        stored: Category,
        expected: Category,
    },
}

impl Issue {
    /// Broken references between stored rows.
    pub fn is_referential(&self) -> bool {
        matches!(self, Issue::OrphanedStat { .. } | Issue::UnknownTeam { .. })
    }

    pub fn to_violation(&self) -> Option<CollectError> {
        self.is_referential()
            .then(|| CollectError::ReferentialViolation {
                detail: self.to_string(),
            })
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::OrphanedStat { stat_uid, game_uid } => {
                write!(f, "stat {} references unknown game {}", stat_uid, game_uid)
            }
            Issue::UnknownTeam { game_uid } => {
                write!(f, "game {} references an unknown or missing team", game_uid)
            }
            Issue::MissingDatetime { game_uid } => {
                write!(f, "game {} has no scheduled date", game_uid)
            }
            Issue::StatsMissingCoreFields {
                missing,
                total,
                ratio,
            } => write!(
                f,
                "{} of {} stat lines ({:.1}%) lack total/passing/rushing yards",
                missing,
                total,
                ratio * 100.0
            ),
            Issue::LowStatsCoverage {
                with_stats,
                games,
                ratio,
            } => write!(
                f,
                "only {} of {} games ({:.1}%) have stats",
                with_stats,
                games,
                ratio * 100.0
            ),
            Issue::DuplicateFixture {
                home_team,
                away_team,
                scheduled_at,
                count,
            } => write!(
                f,
                "{} vs {} at {} stored {} times",
                home_team, away_team, scheduled_at, count
            ),
            Issue::SelfMatchup { game_uid } => {
                write!(f, "game {} has a team playing itself", game_uid)
            }
            Issue::CategoryMismatch {
                game_uid,
                stored,
                expected,
            } => write!(
                f,
                "game {} is {} but its date falls in the {} window",
                game_uid, stored, expected
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    pub season: Season,
    pub completeness: Completeness,
    pub consistency: Vec<Issue>,
}

impl VerificationReport {
    pub fn is_complete(&self) -> bool {
        self.completeness.missing_total == 0
    }

    pub fn orphan_count(&self) -> usize {
        self.consistency
            .iter()
            .filter(|i| matches!(i, Issue::OrphanedStat { .. }))
            .count()
    }
}

pub fn verify_season(
    db: &GameDatabase,
    registry: &SeasonRegistry,
    season: Season,
    policy: &VerifyPolicy,
) -> Result<VerificationReport> {
    let plan = registry.require(season)?;

    let counts = db.count_games_by_category(season)?;
    let actual = |category: Category| counts.get(&category).copied().unwrap_or(0);

    let mut by_category = BTreeMap::new();
    by_category.insert(
        Category::Regular,
        CategoryCount::new(plan.regular_games, actual(Category::Regular)),
    );
    for round in Category::PLAYOFF_ROUNDS {
        by_category.insert(round, CategoryCount::new(plan.expected(round), actual(round)));
    }
    let playoffs = CategoryCount::new(
        plan.expected_playoffs(),
        Category::PLAYOFF_ROUNDS.iter().map(|r| actual(*r)).sum(),
    );
    let completeness = Completeness {
        expected_total: plan.expected_total(),
        collected_total: counts.values().sum(),
        missing_total: by_category.values().map(|c| c.missing).sum(),
        by_category,
        playoffs,
    };

    let mut consistency = Vec::new();

    for stat in db.orphaned_stats(season)? {
        consistency.push(Issue::OrphanedStat {
            stat_uid: stat.stat_uid,
            game_uid: stat.game_uid,
        });
    }
    for game_uid in db.games_with_unknown_teams(season)? {
        consistency.push(Issue::UnknownTeam { game_uid });
    }
    for game_uid in db.games_missing_datetime(season)? {
        consistency.push(Issue::MissingDatetime { game_uid });
    }

    let stats = db.season_stats(season)?;
    let missing_core = stats.iter().filter(|s| s.missing_core_fields()).count();
    if !stats.is_empty() {
        let ratio = missing_core as f64 / stats.len() as f64;
        if ratio > policy.stats_missing_threshold {
            consistency.push(Issue::StatsMissingCoreFields {
                missing: missing_core,
                total: stats.len(),
                ratio,
            });
        }
    }

    let games = db.season_games(season)?;
    if !games.is_empty() {
        let with_stats = db.games_with_stats(season)?.len();
        let ratio = with_stats as f64 / games.len() as f64;
        if ratio < policy.stats_coverage_min {
            consistency.push(Issue::LowStatsCoverage {
                with_stats,
                games: games.len(),
                ratio,
            });
        }
    }

    for dup in db.duplicate_fixtures(season)? {
        consistency.push(Issue::DuplicateFixture {
            home_team: dup.home_team,
            away_team: dup.away_team,
            scheduled_at: dup.scheduled_at,
            count: dup.count,
        });
    }
    for game_uid in db.self_matchups(season)? {
        consistency.push(Issue::SelfMatchup { game_uid });
    }

    for game in &games {
        if game.category_override {
            continue;
        }
        let Some(scheduled_at) = game.scheduled_at else {
            continue;
        };
        let expected = plan.classify(scheduled_at.date());
        if expected != game.category {
            consistency.push(Issue::CategoryMismatch {
                game_uid: game.uid.clone(),
                stored: game.category,
                expected,
            });
        }
    }

    debug!(
        %season,
        missing = completeness.missing_total,
        issues = consistency.len(),
        "verification finished"
    );

    Ok(VerificationReport {
        season,
        completeness,
        consistency,
    })
}
