//! Shared fixtures for integration tests: scripted sources and a tiny season.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::FixedOffset;
use nfl_collect::core::RetryPolicy;
use nfl_collect::pipeline::{OrchestratorConfig, ProgressPolicy, VerifyPolicy};
use nfl_collect::season::SeasonRegistry;
use nfl_collect::source::{
    FetchRequest, RawGame, RawTeam, RawTeamStat, SourceAdapter, SourceError, StatValue,
};
use nfl_collect::Season;

pub const SEASON: u16 = 2030;

/// Four regular games over two weeks, two wildcard games and a Super Bowl.
pub const PLANS: &str = r#"
[seasons.2030]
regular_games = 4
regular_weeks = 2

[seasons.2030.playoffs]
wildcard = { days = [11, 12], games = 2 }
superbowl = { days = [9, 9], games = 1 }

[seasons.2032]
regular_games = 1
regular_weeks = 1
"#;

pub fn registry() -> SeasonRegistry {
    SeasonRegistry::from_toml(PLANS).unwrap()
}

pub fn season() -> Season {
    Season::new(SEASON)
}

pub fn test_config(progress_dir: &Path) -> OrchestratorConfig {
    OrchestratorConfig {
        retry: RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        },
        request_timeout: Duration::from_secs(5),
        concurrency: 2,
        progress: ProgressPolicy::default(),
        outage_threshold: 2,
        verify: VerifyPolicy::default(),
        progress_dir: progress_dir.to_path_buf(),
        reset_progress: false,
        kickoff_offset: FixedOffset::west_opt(5 * 3600).unwrap(),
    }
}

struct Script<R> {
    responses: HashMap<String, Result<Vec<R>, SourceError>>,
    calls: Vec<String>,
}

/// A source answering from a table keyed by `"<season>:<scope>"`.
/// Unscripted requests return an empty batch. Clones share state.
#[derive(Clone)]
pub struct ScriptedSource<R> {
    name: String,
    script: Arc<Mutex<Script<R>>>,
    down: Arc<AtomicBool>,
}

impl<R: Clone> ScriptedSource<R> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            script: Arc::new(Mutex::new(Script {
                responses: HashMap::new(),
                calls: Vec::new(),
            })),
            down: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn respond(&self, season: u16, scope: &str, records: Vec<R>) {
        self.script
            .lock()
            .unwrap()
            .responses
            .insert(format!("{}:{}", season, scope), Ok(records));
    }

    pub fn fail(&self, season: u16, scope: &str, error: SourceError) {
        self.script
            .lock()
            .unwrap()
            .responses
            .insert(format!("{}:{}", season, scope), Err(error));
    }

    /// Every request fails with a 503 while down.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.script.lock().unwrap().calls.clear();
    }
}

impl<R: Clone> SourceAdapter for ScriptedSource<R> {
    type Record = R;

    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<R>, SourceError> {
        let key = format!("{}:{}", request.season, request.scope);
        let mut script = self.script.lock().unwrap();
        script.calls.push(key.clone());
        if self.down.load(Ordering::SeqCst) {
            return Err(SourceError::transient("HTTP 503"));
        }
        script.responses.get(&key).cloned().unwrap_or(Ok(Vec::new()))
    }
}

pub type ScheduleSource = ScriptedSource<RawGame>;
pub type StatsSource = ScriptedSource<RawTeamStat>;

pub fn team(id: &str) -> RawTeam {
    RawTeam {
        id: Some(id.to_string()),
        name: Some(format!("Team {}", id)),
        ..Default::default()
    }
}

pub fn raw_game(id: &str, season: u16, date: &str, home: &str, away: &str) -> RawGame {
    RawGame {
        id: id.to_string(),
        season: Some(season),
        week: None,
        date: Some(date.to_string()),
        home: Some(team(home)),
        away: Some(team(away)),
        home_score: Some(24),
        away_score: Some(17),
    }
}

pub fn raw_stat(game_id: &str, team_id: &str, home: bool) -> RawTeamStat {
    let mut stats = BTreeMap::new();
    stats.insert("totalYards".to_string(), StatValue::Number(350.0));
    stats.insert("netPassingYards".to_string(), StatValue::Text("1,204".to_string()));
    stats.insert("rushingYards".to_string(), StatValue::Number(110.0));
    stats.insert("thirdDownEff".to_string(), StatValue::Text("5-12".to_string()));
    stats.insert("possessionTime".to_string(), StatValue::Text("31:20".to_string()));
    RawTeamStat {
        id: None,
        game_id: game_id.to_string(),
        team: team(team_id),
        season: Some(SEASON),
        home: Some(home),
        stats,
    }
}

/// Every game of the 2030 plan, keyed by schedule scope.
pub fn season_schedule() -> Vec<(&'static str, Vec<RawGame>)> {
    let mut week1 = vec![
        raw_game("G1", SEASON, "2030-09-08T17:00Z", "T1", "T2"),
        raw_game("G2", SEASON, "2030-09-08T20:25Z", "T3", "T4"),
    ];
    let mut week2 = vec![
        raw_game("G3", SEASON, "2030-09-15T17:00Z", "T1", "T3"),
        raw_game("G4", SEASON, "2030-09-15T20:25Z", "T2", "T4"),
    ];
    for g in &mut week1 {
        g.week = Some(1);
    }
    for g in &mut week2 {
        g.week = Some(2);
    }
    let wildcard = vec![
        raw_game("W1", SEASON, "2031-01-11T21:30Z", "T1", "T4"),
        raw_game("W2", SEASON, "2031-01-12T18:00Z", "T2", "T3"),
    ];
    let superbowl = vec![raw_game("SB", SEASON, "2031-02-09T23:30Z", "T1", "T2")];
    vec![
        ("week-1", week1),
        ("week-2", week2),
        ("wildcard", wildcard),
        ("superbowl", superbowl),
    ]
}

pub const GAME_TEAMS: [(&str, &str, &str); 7] = [
    ("G1", "T1", "T2"),
    ("G2", "T3", "T4"),
    ("G3", "T1", "T3"),
    ("G4", "T2", "T4"),
    ("W1", "T1", "T4"),
    ("W2", "T2", "T3"),
    ("SB", "T1", "T2"),
];

/// Sources scripted with the full 2030 season.
pub fn scripted_sources() -> (ScheduleSource, StatsSource) {
    let schedule = ScheduleSource::new("schedule");
    for (scope, games) in season_schedule() {
        schedule.respond(SEASON, scope, games);
    }
    let stats = StatsSource::new("team_stats");
    for (game, home, away) in GAME_TEAMS {
        stats.respond(
            SEASON,
            &format!("game-{}", game),
            vec![raw_stat(game, home, true), raw_stat(game, away, false)],
        );
    }
    (schedule, stats)
}
