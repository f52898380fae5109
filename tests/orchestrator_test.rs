//! Integration tests for the collection orchestrator

mod common;

use common::*;
use nfl_collect::pipeline::{Orchestrator, SeasonState};
use nfl_collect::source::SourceError;
use nfl_collect::storage::GameDatabase;
use nfl_collect::{Category, CollectError, GameUid, Season};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

type TestOrchestrator = Orchestrator<ScheduleSource, StatsSource>;

fn orchestrator(
    db: GameDatabase,
    dir: &TempDir,
    schedule: &ScheduleSource,
    stats: &StatsSource,
) -> TestOrchestrator {
    Orchestrator::new(
        db,
        registry(),
        schedule.clone(),
        stats.clone(),
        test_config(dir.path()),
        CancellationToken::new(),
    )
}

fn fresh_db() -> GameDatabase {
    GameDatabase::new_in_memory().unwrap()
}

#[tokio::test]
async fn test_full_season_collects_and_classifies() {
    let dir = TempDir::new().unwrap();
    let (schedule, stats) = scripted_sources();
    let mut orch = orchestrator(fresh_db(), &dir, &schedule, &stats);

    let report = orch.collect_season(season(), false).await.unwrap();

    assert_eq!(report.state, SeasonState::Complete, "cause: {:?}", report.cause);
    assert!(!report.skipped);
    assert_eq!(report.expected, 7);
    assert_eq!(report.collected, 7);
    assert_eq!(report.missing, 0);
    assert_eq!(report.stats.games_inserted, 7);
    assert_eq!(report.stats.stats_inserted, 14);
    assert!(report.pending_failures.is_empty());

    let db = orch.database();
    // 7 games, 4 teams, 14 stat lines.
    assert_eq!(db.write_count(), 25);

    let wildcard = db.get_game(&GameUid::from("W1")).unwrap().unwrap();
    assert_eq!(wildcard.category, Category::Wildcard);
    assert_eq!(wildcard.week, None);
    let superbowl = db.get_game(&GameUid::from("SB")).unwrap().unwrap();
    assert_eq!(superbowl.category, Category::Superbowl);
    let regular = db.get_game(&GameUid::from("G3")).unwrap().unwrap();
    assert_eq!(regular.category, Category::Regular);
    assert_eq!(regular.week, Some(2));

    let stored = db.season_stats(season()).unwrap();
    let line = stored
        .iter()
        .find(|s| s.game_uid.as_str() == "G1" && s.team_uid.as_str() == "T1")
        .unwrap();
    assert_eq!(line.passing_yards, Some(1204.0));
    assert_eq!(line.third_down_conversions, Some(5.0));
    assert_eq!(line.third_down_attempts, Some(12.0));
    assert_eq!(line.time_of_possession_secs, Some(1880));

    let state = db.season_state(season()).unwrap().unwrap();
    assert_eq!(state.state, "complete");
}

#[tokio::test]
async fn test_late_utc_kickoff_keeps_local_playoff_day() {
    let dir = TempDir::new().unwrap();
    let (schedule, stats) = scripted_sources();
    // Sunday 20:15 Eastern on the last wildcard day is already Monday in UTC.
    schedule.respond(
        SEASON,
        "wildcard",
        vec![
            raw_game("W1", SEASON, "2031-01-11T21:30Z", "T1", "T4"),
            raw_game("W2", SEASON, "2031-01-13T01:15Z", "T2", "T3"),
        ],
    );
    let mut orch = orchestrator(fresh_db(), &dir, &schedule, &stats);

    let report = orch.collect_season(season(), false).await.unwrap();

    assert_eq!(report.state, SeasonState::Complete, "cause: {:?}", report.cause);
    let late = orch.database().get_game(&GameUid::from("W2")).unwrap().unwrap();
    assert_eq!(late.category, Category::Wildcard);
    assert_eq!(
        late.scheduled_at.map(|at| at.to_string()),
        Some("2031-01-12 20:15:00".to_string())
    );
}

#[tokio::test]
async fn test_rerun_of_complete_season_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let (schedule, stats) = scripted_sources();
    let mut orch = orchestrator(fresh_db(), &dir, &schedule, &stats);
    orch.collect_season(season(), false).await.unwrap();
    let writes = orch.database().write_count();
    schedule.clear_calls();
    stats.clear_calls();

    let report = orch.collect_season(season(), false).await.unwrap();

    assert_eq!(report.state, SeasonState::Complete);
    assert!(report.skipped);
    assert_eq!(report.collected, 7);
    assert_eq!(orch.database().write_count(), writes);
    assert!(schedule.calls().is_empty());
    assert!(stats.calls().is_empty());
}

#[tokio::test]
async fn test_forced_refresh_refetches_without_changing_rows() {
    let dir = TempDir::new().unwrap();
    let (schedule, stats) = scripted_sources();
    let mut orch = orchestrator(fresh_db(), &dir, &schedule, &stats);
    orch.collect_season(season(), false).await.unwrap();
    let writes = orch.database().write_count();
    schedule.clear_calls();

    let report = orch.collect_season(season(), true).await.unwrap();

    assert_eq!(report.state, SeasonState::Complete);
    assert!(!report.skipped);
    assert_eq!(schedule.calls().len(), 4);
    assert_eq!(report.stats.games_unchanged, 7);
    assert_eq!(report.stats.stats_unchanged, 14);
    assert_eq!(report.stats.games_inserted + report.stats.games_updated, 0);
    assert_eq!(orch.database().write_count(), writes);
}

#[tokio::test]
async fn test_missing_stats_fail_season_but_keep_games() {
    let dir = TempDir::new().unwrap();
    let (schedule, stats) = scripted_sources();
    stats.fail(SEASON, "game-G3", SourceError::NotFound);
    let mut orch = orchestrator(fresh_db(), &dir, &schedule, &stats);

    let report = orch.collect_season(season(), false).await.unwrap();

    assert_eq!(report.state, SeasonState::Failed);
    assert_eq!(
        report.cause.as_deref(),
        Some("1 records failed and will be retried")
    );
    assert_eq!(report.pending_failures, vec!["G3".to_string()]);
    assert_eq!(report.collected, 7);
    assert_eq!(report.stats.stats_inserted, 12);

    let db = orch.database();
    assert!(db.get_game(&GameUid::from("G3")).unwrap().is_some());
    assert_eq!(db.season_stats(season()).unwrap().len(), 12);
}

#[tokio::test]
async fn test_resume_retries_only_failed_records() {
    let dir = TempDir::new().unwrap();
    let (schedule, stats) = scripted_sources();
    stats.fail(SEASON, "game-G3", SourceError::NotFound);
    let mut orch = orchestrator(fresh_db(), &dir, &schedule, &stats);
    let first = orch.collect_season(season(), false).await.unwrap();
    assert!(first.is_failed());

    // The feed recovers; a new process picks up from the checkpoint.
    stats.respond(
        SEASON,
        "game-G3",
        vec![raw_stat("G3", "T1", true), raw_stat("G3", "T3", false)],
    );
    schedule.clear_calls();
    stats.clear_calls();
    let db = orch.into_database();
    let mut orch = orchestrator(db, &dir, &schedule, &stats);

    let second = orch.collect_season(season(), false).await.unwrap();

    assert_eq!(second.state, SeasonState::Complete, "cause: {:?}", second.cause);
    assert!(schedule.calls().is_empty());
    assert_eq!(stats.calls(), vec!["2030:game-G3".to_string()]);
    assert_eq!(second.stats.stats_inserted, 2);
    assert_eq!(orch.database().season_stats(season()).unwrap().len(), 14);
}

#[tokio::test]
async fn test_record_excluded_after_retry_ceiling() {
    let dir = TempDir::new().unwrap();
    let (schedule, stats) = scripted_sources();
    stats.fail(SEASON, "game-G3", SourceError::NotFound);
    let mut orch = orchestrator(fresh_db(), &dir, &schedule, &stats);

    let mut last = None;
    for _ in 0..3 {
        last = Some(orch.collect_season(season(), false).await.unwrap());
    }
    let third = last.unwrap();
    assert_eq!(third.excluded, vec!["G3".to_string()]);
    assert!(third.pending_failures.is_empty());
    assert_eq!(third.state, SeasonState::Complete);

    let g3_calls = stats
        .calls()
        .iter()
        .filter(|c| c.as_str() == "2030:game-G3")
        .count();
    assert_eq!(g3_calls, 3);

    stats.clear_calls();
    let fourth = orch.collect_season(season(), false).await.unwrap();
    assert!(fourth.skipped);
    assert!(stats.calls().is_empty());
}

#[tokio::test]
async fn test_primary_outage_fails_season() {
    let dir = TempDir::new().unwrap();
    let (schedule, stats) = scripted_sources();
    schedule.set_down(true);
    let mut orch = orchestrator(fresh_db(), &dir, &schedule, &stats);

    let report = orch.collect_season(season(), false).await.unwrap();

    assert_eq!(report.state, SeasonState::Failed);
    let cause = report.cause.unwrap();
    assert!(cause.contains("'schedule' unavailable after 2 attempts"), "{}", cause);
    assert_eq!(schedule.calls(), vec!["2030:week-1".to_string(); 2]);
    assert!(stats.calls().is_empty());
    assert_eq!(report.expected, 7);
    assert_eq!(report.missing, 7);

    let state = orch.database().season_state(season()).unwrap().unwrap();
    assert_eq!(state.state, "failed");
}

#[tokio::test]
async fn test_stats_outage_ends_augmentation_without_rollback() {
    let dir = TempDir::new().unwrap();
    let (schedule, stats) = scripted_sources();
    stats.set_down(true);
    let mut orch = orchestrator(fresh_db(), &dir, &schedule, &stats);

    let report = orch.collect_season(season(), false).await.unwrap();

    assert_eq!(report.state, SeasonState::Failed);
    assert!(report.cause.unwrap().contains("team_stats"));
    assert_eq!(report.collected, 7);
    assert!(orch.database().season_stats(season()).unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_records_are_skipped() {
    let dir = TempDir::new().unwrap();
    let (schedule, stats) = scripted_sources();
    let mut week1 = season_schedule().remove(0).1;
    week1.push(raw_game("X1", 2029, "2030-09-08T17:00Z", "T1", "T2"));
    schedule.respond(SEASON, "week-1", week1);
    let mut orch = orchestrator(fresh_db(), &dir, &schedule, &stats);

    let report = orch.collect_season(season(), false).await.unwrap();

    assert_eq!(report.state, SeasonState::Complete);
    assert_eq!(report.stats.malformed, 1);
    assert!(orch
        .database()
        .get_game(&GameUid::from("X1"))
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_unregistered_season_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let (schedule, stats) = scripted_sources();
    let mut orch = orchestrator(fresh_db(), &dir, &schedule, &stats);

    let result = orch
        .collect_seasons(&[season(), Season::new(1990)], false)
        .await;

    assert!(matches!(result, Err(CollectError::Configuration { .. })));
    assert!(schedule.calls().is_empty());
}

#[tokio::test]
async fn test_failing_season_does_not_affect_another() {
    let dir = TempDir::new().unwrap();
    let (schedule, stats) = scripted_sources();
    schedule.fail(2032, "week-1", SourceError::transient("HTTP 502"));
    let mut orch = orchestrator(fresh_db(), &dir, &schedule, &stats);

    let reports = orch
        .collect_seasons(&[Season::new(2032), season()], false)
        .await
        .unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].state, SeasonState::Failed);
    assert_eq!(reports[1].state, SeasonState::Complete);
    assert_eq!(reports[1].collected, 7);
    assert!(orch.database().season_games(Season::new(2032)).unwrap().is_empty());
}

#[tokio::test]
async fn test_cancellation_checkpoints_and_marks_failed() {
    let dir = TempDir::new().unwrap();
    let (schedule, stats) = scripted_sources();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut orch = Orchestrator::new(
        fresh_db(),
        registry(),
        schedule.clone(),
        stats.clone(),
        test_config(dir.path()),
        cancel,
    );

    let reports = orch.collect_seasons(&[season()], false).await.unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].cause.as_deref(), Some("collection cancelled"));
    assert!(schedule.calls().is_empty());
    let state = orch.database().season_state(season()).unwrap().unwrap();
    assert_eq!(state.state, "failed");
    assert!(dir.path().join("season-2030.json").exists());
}
