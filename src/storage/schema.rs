//! Database schema and connection management

use rusqlite::Connection;
use std::path::Path;

use crate::Result;

/// Database connection manager for games, teams and statistics
pub struct GameDatabase {
    pub(crate) conn: Connection,
    pub(crate) writes: u64,
}

impl GameDatabase {
    /// Open (or create) the database file and ensure tables exist
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let mut db = Self { conn, writes: 0 };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Game, team and stat rows this handle has inserted or changed since it
    /// was opened.
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Initialize the database schema
    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        // No FOREIGN KEY clauses: references are checked by the verifier so
        // that violations can be reported instead of rejected.
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS teams (
                team_uid TEXT PRIMARY KEY,
                name TEXT,
                city TEXT,
                abbreviation TEXT,
                stadium TEXT,
                latitude REAL,
                longitude REAL,
                conference TEXT,
                division TEXT,
                source TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS games (
                game_uid TEXT PRIMARY KEY,
                season INTEGER NOT NULL,
                week INTEGER,
                scheduled_at TEXT,
                category TEXT NOT NULL DEFAULT 'regular',
                category_override INTEGER NOT NULL DEFAULT 0,
                home_team_uid TEXT,
                away_team_uid TEXT,
                home_score INTEGER,
                away_score INTEGER,
                source TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS team_game_stats (
                stat_uid TEXT PRIMARY KEY,
                game_uid TEXT NOT NULL,
                team_uid TEXT NOT NULL,
                season INTEGER NOT NULL,
                is_home INTEGER,
                total_yards REAL,
                passing_yards REAL,
                rushing_yards REAL,
                first_downs REAL,
                turnovers REAL,
                third_down_conversions REAL,
                third_down_attempts REAL,
                penalties REAL,
                penalty_yards REAL,
                time_of_possession_secs INTEGER,
                source TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS season_runs (
                season INTEGER PRIMARY KEY,
                state TEXT NOT NULL,
                cause TEXT,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_games_season_category
                ON games(season, category);

            CREATE INDEX IF NOT EXISTS idx_stats_season ON team_game_stats(season);

            CREATE INDEX IF NOT EXISTS idx_stats_game ON team_game_stats(game_uid);",
        )?;

        Ok(())
    }
}
