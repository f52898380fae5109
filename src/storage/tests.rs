//! Unit tests for storage functionality

use super::*;
use crate::cli::types::{GameUid, Season, StatUid, TeamUid};
use crate::season::Category;
use chrono::NaiveDate;

fn create_test_db() -> GameDatabase {
    GameDatabase::new_in_memory().unwrap()
}

fn kickoff(y: i32, m: u32, d: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap()
}

fn test_game(uid: &str, home: &str, away: &str) -> Game {
    Game {
        uid: GameUid::from(uid),
        season: Season::new(2024),
        week: Some(1),
        scheduled_at: Some(kickoff(2024, 9, 8)),
        category: Category::Regular,
        category_override: false,
        home_team: Some(TeamUid::from(home)),
        away_team: Some(TeamUid::from(away)),
        home_score: None,
        away_score: None,
        source: "schedule".to_string(),
    }
}

fn refs(game: &Game) -> Vec<Team> {
    [&game.home_team, &game.away_team]
        .into_iter()
        .flatten()
        .map(|uid| Team::reference(uid.clone(), "schedule"))
        .collect()
}

fn test_stat(game: &str, team: &str, total: Option<f64>) -> TeamGameStat {
    let game_uid = GameUid::from(game);
    let team_uid = TeamUid::from(team);
    TeamGameStat {
        stat_uid: StatUid::for_team_game(&game_uid, &team_uid),
        game_uid,
        team_uid,
        season: Season::new(2024),
        is_home: Some(true),
        total_yards: total,
        passing_yards: Some(250.0),
        rushing_yards: Some(120.0),
        first_downs: Some(21.0),
        turnovers: Some(1.0),
        third_down_conversions: Some(5.0),
        third_down_attempts: Some(12.0),
        penalties: Some(6.0),
        penalty_yards: Some(45.0),
        time_of_possession_secs: Some(1865),
        source: "stats".to_string(),
    }
}

#[test]
fn test_database_creation() {
    let db = create_test_db();
    assert_eq!(db.write_count(), 0);
}

#[test]
fn test_upsert_game_insert_then_unchanged() {
    let mut db = create_test_db();
    let game = test_game("G1", "NFL_KC", "NFL_BAL");

    assert_eq!(
        db.upsert_game(&game, &refs(&game)).unwrap(),
        UpsertOutcome::Inserted
    );
    // Game plus two team references.
    assert_eq!(db.write_count(), 3);

    assert_eq!(
        db.upsert_game(&game, &refs(&game)).unwrap(),
        UpsertOutcome::Unchanged
    );
    assert_eq!(db.write_count(), 3);

    let stored = db.get_game(&GameUid::from("G1")).unwrap().unwrap();
    assert_eq!(stored, game);
}

#[test]
fn test_upsert_game_update_keeps_known_fields() {
    let mut db = create_test_db();
    let game = test_game("G1", "NFL_KC", "NFL_BAL");
    db.upsert_game(&game, &refs(&game)).unwrap();

    let mut scored = game.clone();
    scored.home_score = Some(27);
    scored.away_score = Some(20);
    scored.scheduled_at = None;

    assert_eq!(db.upsert_game(&scored, &[]).unwrap(), UpsertOutcome::Updated);

    let stored = db.get_game(&GameUid::from("G1")).unwrap().unwrap();
    assert_eq!(stored.home_score, Some(27));
    assert_eq!(stored.scheduled_at, game.scheduled_at);
}

#[test]
fn test_overridden_category_survives_upsert() {
    let mut db = create_test_db();
    let mut game = test_game("G1", "NFL_KC", "NFL_BAL");
    game.week = None;
    db.upsert_game(&game, &refs(&game)).unwrap();

    assert!(db
        .override_category(&game.uid, Category::Divisional)
        .unwrap());
    // Re-collection carries the computed category; the override wins.
    assert_eq!(db.upsert_game(&game, &[]).unwrap(), UpsertOutcome::Unchanged);

    let stored = db.get_game(&game.uid).unwrap().unwrap();
    assert_eq!(stored.category, Category::Divisional);
    assert!(stored.category_override);

    // Classifier rewrites are refused for overridden games.
    assert!(!db.set_category(&game.uid, Category::Wildcard).unwrap());
}

#[test]
fn test_set_category_only_writes_changes() {
    let mut db = create_test_db();
    let game = test_game("G1", "NFL_KC", "NFL_BAL");
    db.upsert_game(&game, &refs(&game)).unwrap();
    let before = db.write_count();

    assert!(!db.set_category(&game.uid, Category::Regular).unwrap());
    assert_eq!(db.write_count(), before);

    assert!(db.set_category(&game.uid, Category::Wildcard).unwrap());
    assert_eq!(db.write_count(), before + 1);
}

#[test]
fn test_team_metadata_merges() {
    let mut db = create_test_db();
    let mut full = Team::reference(TeamUid::from("NFL_KC"), "teams");
    full.name = Some("Kansas City Chiefs".to_string());
    full.abbreviation = Some("KC".to_string());
    assert_eq!(db.upsert_team(&full).unwrap(), UpsertOutcome::Inserted);

    // A bare reference from the same source changes nothing.
    let bare = Team::reference(TeamUid::from("NFL_KC"), "teams");
    assert_eq!(db.upsert_team(&bare).unwrap(), UpsertOutcome::Unchanged);

    let stored = db.get_team(&TeamUid::from("NFL_KC")).unwrap().unwrap();
    assert_eq!(stored.name.as_deref(), Some("Kansas City Chiefs"));
    assert_eq!(stored.abbreviation.as_deref(), Some("KC"));
}

#[test]
fn test_upsert_team_stats_outcomes() {
    let mut db = create_test_db();
    let game = test_game("G1", "NFL_KC", "NFL_BAL");
    db.upsert_game(&game, &refs(&game)).unwrap();

    let batch = vec![
        test_stat("G1", "NFL_KC", Some(400.0)),
        test_stat("G1", "NFL_BAL", Some(350.0)),
    ];
    let outcomes = db.upsert_team_stats(&batch).unwrap();
    assert_eq!(outcomes, vec![UpsertOutcome::Inserted, UpsertOutcome::Inserted]);

    let mut changed = batch.clone();
    changed[1].total_yards = Some(351.0);
    let outcomes = db.upsert_team_stats(&changed).unwrap();
    assert_eq!(outcomes, vec![UpsertOutcome::Unchanged, UpsertOutcome::Updated]);

    let stats = db.season_stats(Season::new(2024)).unwrap();
    assert_eq!(stats.len(), 2);
    assert!(stats.iter().any(|s| s.total_yards == Some(351.0)));
}

#[test]
fn test_count_games_by_category() {
    let mut db = create_test_db();
    for (uid, category) in [
        ("G1", Category::Regular),
        ("G2", Category::Regular),
        ("G3", Category::Wildcard),
    ] {
        let mut game = test_game(uid, "NFL_KC", "NFL_BAL");
        game.scheduled_at = None;
        game.category = category;
        db.upsert_game(&game, &refs(&game)).unwrap();
    }
    // A legacy row with an empty category counts as regular.
    db.conn
        .execute(
            "INSERT INTO games (game_uid, season, category, source, created_at, updated_at)
             VALUES ('G4', 2024, '', 'legacy', 0, 0)",
            [],
        )
        .unwrap();

    let counts = db.count_games_by_category(Season::new(2024)).unwrap();
    assert_eq!(counts.get(&Category::Regular), Some(&3));
    assert_eq!(counts.get(&Category::Wildcard), Some(&1));
    assert_eq!(counts.get(&Category::Superbowl), None);
}

#[test]
fn test_orphaned_stats_and_unknown_teams() {
    let mut db = create_test_db();
    let game = test_game("G1", "NFL_KC", "NFL_BAL");
    db.upsert_game(&game, &refs(&game)).unwrap();
    db.upsert_team_stats(&[test_stat("G1", "NFL_KC", Some(300.0))])
        .unwrap();
    db.upsert_team_stats(&[test_stat("GHOST", "NFL_KC", Some(300.0))])
        .unwrap();

    let orphans = db.orphaned_stats(Season::new(2024)).unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].game_uid, GameUid::from("GHOST"));

    // A game whose away team was never stored.
    let lonely = test_game("G2", "NFL_KC", "NFL_NYJ");
    db.upsert_game(&lonely, &[]).unwrap();
    assert_eq!(
        db.games_with_unknown_teams(Season::new(2024)).unwrap(),
        vec![GameUid::from("G2")]
    );
}

#[test]
fn test_duplicate_fixtures_and_self_matchups() {
    let mut db = create_test_db();
    let a = test_game("G1", "NFL_KC", "NFL_BAL");
    let b = test_game("G1-dup", "NFL_KC", "NFL_BAL");
    let c = test_game("G3", "NFL_KC", "NFL_KC");
    for game in [&a, &b, &c] {
        db.upsert_game(game, &refs(game)).unwrap();
    }

    let duplicates = db.duplicate_fixtures(Season::new(2024)).unwrap();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].count, 2);
    assert_eq!(duplicates[0].scheduled_at, "2024-09-08 18:00:00");

    assert_eq!(
        db.self_matchups(Season::new(2024)).unwrap(),
        vec![GameUid::from("G3")]
    );
}

#[test]
fn test_unclassified_games_excludes_weeks_and_overrides() {
    let mut db = create_test_db();
    let with_week = test_game("G1", "NFL_KC", "NFL_BAL");
    let mut playoff = test_game("G2", "NFL_KC", "NFL_BAL");
    playoff.week = None;
    playoff.scheduled_at = Some(kickoff(2025, 1, 12));
    let mut confirmed = playoff.clone();
    confirmed.uid = GameUid::from("G3");
    for game in [&with_week, &playoff, &confirmed] {
        db.upsert_game(game, &refs(game)).unwrap();
    }
    db.override_category(&confirmed.uid, Category::Regular)
        .unwrap();

    let pending = db.unclassified_games(Season::new(2024)).unwrap();
    assert_eq!(pending, vec![(GameUid::from("G2"), kickoff(2025, 1, 12))]);
}

#[test]
fn test_season_state_only_written_on_change() {
    let mut db = create_test_db();
    let season = Season::new(2024);
    assert!(db.season_state(season).unwrap().is_none());

    assert!(db.record_season_state(season, "fetching", None).unwrap());
    assert!(!db.record_season_state(season, "fetching", None).unwrap());
    assert!(db
        .record_season_state(season, "failed", Some("3 games missing"))
        .unwrap());

    let record = db.season_state(season).unwrap().unwrap();
    assert_eq!(record.state, "failed");
    assert_eq!(record.cause.as_deref(), Some("3 games missing"));
}

#[test]
fn test_open_creates_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("games.db");
    let db = GameDatabase::open(&path).unwrap();
    assert_eq!(db.write_count(), 0);
    assert!(path.exists());
}
