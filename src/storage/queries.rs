//! Upserts and read queries

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};

use super::{models::*, schema::GameDatabase};
use crate::cli::types::{GameUid, Season, StatUid, TeamUid};
use crate::season::Category;
use crate::Result;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const GAME_COLUMNS: &str = "game_uid, season, week, scheduled_at, category, category_override,
                            home_team_uid, away_team_uid, home_score, away_score, source";

const STAT_COLUMNS: &str = "stat_uid, game_uid, team_uid, season, is_home, total_yards,
                            passing_yards, rushing_yards, first_downs, turnovers,
                            third_down_conversions, third_down_attempts, penalties,
                            penalty_yards, time_of_possession_secs, source";

/// A fixture stored more than once under different uids
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateFixture {
    pub home_team: TeamUid,
    pub away_team: TeamUid,
    pub scheduled_at: String,
    pub count: u32,
}

impl GameDatabase {
    /// Insert or update a team, keeping known metadata the new record lacks
    pub fn upsert_team(&mut self, team: &Team) -> Result<UpsertOutcome> {
        let outcome = upsert_team_in(&self.conn, team, now())?;
        self.note(outcome);
        Ok(outcome)
    }

    /// Upsert a game together with the teams it references, in one transaction.
    ///
    /// Returns the outcome for the game row; team rows are counted in the
    /// handle's write counter.
    pub fn upsert_game(&mut self, game: &Game, teams: &[Team]) -> Result<UpsertOutcome> {
        let now = now();
        let tx = self.conn.transaction()?;
        let mut team_writes = 0;
        for team in teams {
            if upsert_team_in(&tx, team, now)?.is_write() {
                team_writes += 1;
            }
        }
        let outcome = upsert_game_in(&tx, game, now)?;
        tx.commit()?;

        self.writes += team_writes;
        self.note(outcome);
        Ok(outcome)
    }

    /// Upsert one game's stat lines as a single batch
    pub fn upsert_team_stats(&mut self, stats: &[TeamGameStat]) -> Result<Vec<UpsertOutcome>> {
        let now = now();
        let tx = self.conn.transaction()?;
        let mut outcomes = Vec::with_capacity(stats.len());
        for stat in stats {
            outcomes.push(upsert_stat_in(&tx, stat, now)?);
        }
        tx.commit()?;

        for outcome in &outcomes {
            self.note(*outcome);
        }
        Ok(outcomes)
    }

    pub fn get_game(&self, uid: &GameUid) -> Result<Option<Game>> {
        let sql = format!("SELECT {} FROM games WHERE game_uid = ?", GAME_COLUMNS);
        let game = self
            .conn
            .query_row(&sql, params![uid.as_str()], row_to_game)
            .optional()?;
        Ok(game)
    }

    pub fn get_team(&self, uid: &TeamUid) -> Result<Option<Team>> {
        let team = self
            .conn
            .query_row(
                "SELECT team_uid, name, city, abbreviation, stadium, latitude, longitude,
                        conference, division, source
                 FROM teams WHERE team_uid = ?",
                params![uid.as_str()],
                |row| {
                    Ok(Team {
                        uid: TeamUid::new(row.get::<_, String>(0)?),
                        name: row.get(1)?,
                        city: row.get(2)?,
                        abbreviation: row.get(3)?,
                        stadium: row.get(4)?,
                        latitude: row.get(5)?,
                        longitude: row.get(6)?,
                        conference: row.get(7)?,
                        division: row.get(8)?,
                        source: row.get(9)?,
                    })
                },
            )
            .optional()?;
        Ok(team)
    }

    /// All games of a season, ordered by kickoff then uid
    pub fn season_games(&self, season: Season) -> Result<Vec<Game>> {
        let sql = format!(
            "SELECT {} FROM games WHERE season = ? ORDER BY scheduled_at, game_uid",
            GAME_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![season.as_u16()], row_to_game)?;

        let mut games = Vec::new();
        for row in rows {
            games.push(row?);
        }
        Ok(games)
    }

    pub fn season_game_uids(&self, season: Season) -> Result<Vec<GameUid>> {
        let mut stmt = self.conn.prepare(
            "SELECT game_uid FROM games WHERE season = ? ORDER BY scheduled_at, game_uid",
        )?;
        let rows = stmt.query_map(params![season.as_u16()], |row| {
            Ok(GameUid::new(row.get::<_, String>(0)?))
        })?;

        let mut uids = Vec::new();
        for row in rows {
            uids.push(row?);
        }
        Ok(uids)
    }

    pub fn season_stats(&self, season: Season) -> Result<Vec<TeamGameStat>> {
        let sql = format!(
            "SELECT {} FROM team_game_stats WHERE season = ? ORDER BY stat_uid",
            STAT_COLUMNS
        );
        self.query_stats(&sql, season)
    }

    /// Stat lines of the season whose game does not exist
    pub fn orphaned_stats(&self, season: Season) -> Result<Vec<TeamGameStat>> {
        let columns = STAT_COLUMNS
            .split(',')
            .map(|c| format!("s.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {} FROM team_game_stats s
             LEFT JOIN games g ON g.game_uid = s.game_uid
             WHERE s.season = ? AND g.game_uid IS NULL
             ORDER BY s.stat_uid",
            columns
        );
        self.query_stats(&sql, season)
    }

    fn query_stats(&self, sql: &str, season: Season) -> Result<Vec<TeamGameStat>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![season.as_u16()], row_to_stat)?;

        let mut stats = Vec::new();
        for row in rows {
            stats.push(row?);
        }
        Ok(stats)
    }

    /// Game counts per category; NULL or empty categories count as regular
    pub fn count_games_by_category(&self, season: Season) -> Result<BTreeMap<Category, u32>> {
        let mut stmt = self.conn.prepare(
            "SELECT NULLIF(TRIM(category), ''), COUNT(*) FROM games
             WHERE season = ? GROUP BY 1",
        )?;
        let rows = stmt.query_map(params![season.as_u16()], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, u32>(1)?))
        })?;

        let mut counts = BTreeMap::new();
        for row in rows {
            let (category, count) = row?;
            let category = Category::from_stored(category.as_deref())?;
            *counts.entry(category).or_insert(0) += count;
        }
        Ok(counts)
    }

    pub fn team_uids(&self) -> Result<BTreeSet<TeamUid>> {
        let mut stmt = self.conn.prepare("SELECT team_uid FROM teams")?;
        let rows = stmt.query_map([], |row| Ok(TeamUid::new(row.get::<_, String>(0)?)))?;

        let mut uids = BTreeSet::new();
        for row in rows {
            uids.insert(row?);
        }
        Ok(uids)
    }

    /// Games whose home or away team is missing or not in the teams table
    pub fn games_with_unknown_teams(&self, season: Season) -> Result<Vec<GameUid>> {
        self.query_game_uids(
            "SELECT g.game_uid FROM games g
             LEFT JOIN teams h ON h.team_uid = g.home_team_uid
             LEFT JOIN teams a ON a.team_uid = g.away_team_uid
             WHERE g.season = ? AND (h.team_uid IS NULL OR a.team_uid IS NULL)
             ORDER BY g.game_uid",
            season,
        )
    }

    pub fn games_missing_datetime(&self, season: Season) -> Result<Vec<GameUid>> {
        self.query_game_uids(
            "SELECT game_uid FROM games
             WHERE season = ? AND (scheduled_at IS NULL OR scheduled_at = '')
             ORDER BY game_uid",
            season,
        )
    }

    pub fn self_matchups(&self, season: Season) -> Result<Vec<GameUid>> {
        self.query_game_uids(
            "SELECT game_uid FROM games
             WHERE season = ? AND home_team_uid IS NOT NULL AND home_team_uid = away_team_uid
             ORDER BY game_uid",
            season,
        )
    }

    /// Games that have at least one stat line
    pub fn games_with_stats(&self, season: Season) -> Result<BTreeSet<GameUid>> {
        Ok(self
            .query_game_uids(
                "SELECT DISTINCT s.game_uid FROM team_game_stats s
                 JOIN games g ON g.game_uid = s.game_uid
                 WHERE g.season = ?",
                season,
            )?
            .into_iter()
            .collect())
    }

    fn query_game_uids(&self, sql: &str, season: Season) -> Result<Vec<GameUid>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![season.as_u16()], |row| {
            Ok(GameUid::new(row.get::<_, String>(0)?))
        })?;

        let mut uids = Vec::new();
        for row in rows {
            uids.push(row?);
        }
        Ok(uids)
    }

    pub fn duplicate_fixtures(&self, season: Season) -> Result<Vec<DuplicateFixture>> {
        let mut stmt = self.conn.prepare(
            "SELECT home_team_uid, away_team_uid, scheduled_at, COUNT(*) FROM games
             WHERE season = ? AND home_team_uid IS NOT NULL AND away_team_uid IS NOT NULL
               AND scheduled_at IS NOT NULL
             GROUP BY home_team_uid, away_team_uid, scheduled_at
             HAVING COUNT(*) > 1
             ORDER BY scheduled_at",
        )?;
        let rows = stmt.query_map(params![season.as_u16()], |row| {
            Ok(DuplicateFixture {
                home_team: TeamUid::new(row.get::<_, String>(0)?),
                away_team: TeamUid::new(row.get::<_, String>(1)?),
                scheduled_at: row.get(2)?,
                count: row.get(3)?,
            })
        })?;

        let mut fixtures = Vec::new();
        for row in rows {
            fixtures.push(row?);
        }
        Ok(fixtures)
    }

    /// Games nothing has ever classified: regular or empty category, no
    /// week, not overridden, and with a kickoff date to classify by
    pub fn unclassified_games(&self, season: Season) -> Result<Vec<(GameUid, NaiveDateTime)>> {
        let mut stmt = self.conn.prepare(
            "SELECT game_uid, scheduled_at FROM games
             WHERE season = ?
               AND (category IS NULL OR TRIM(category) IN ('', 'regular'))
               AND week IS NULL
               AND category_override = 0
               AND scheduled_at IS NOT NULL AND scheduled_at != ''
             ORDER BY scheduled_at, game_uid",
        )?;
        let rows = stmt.query_map(params![season.as_u16()], |row| {
            let uid = GameUid::new(row.get::<_, String>(0)?);
            let raw: String = row.get(1)?;
            Ok((uid, parse_datetime(1, &raw)?))
        })?;

        let mut games = Vec::new();
        for row in rows {
            games.push(row?);
        }
        Ok(games)
    }

    /// Rewrite a game's category unless it is overridden or already equal
    pub fn set_category(&mut self, uid: &GameUid, category: Category) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE games SET category = ?1, updated_at = ?2
             WHERE game_uid = ?3 AND category_override = 0 AND category IS NOT ?1",
            params![category.as_str(), now(), uid.as_str()],
        )?;
        self.writes += changed as u64;
        Ok(changed > 0)
    }

    /// Confirm a category by hand; the classifier will not touch it again
    pub fn override_category(&mut self, uid: &GameUid, category: Category) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE games SET category = ?1, category_override = 1, updated_at = ?2
             WHERE game_uid = ?3 AND (category IS NOT ?1 OR category_override = 0)",
            params![category.as_str(), now(), uid.as_str()],
        )?;
        self.writes += changed as u64;
        Ok(changed > 0)
    }

    pub fn season_state(&self, season: Season) -> Result<Option<SeasonRunRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT season, state, cause, updated_at FROM season_runs WHERE season = ?",
                params![season.as_u16()],
                |row| {
                    Ok(SeasonRunRecord {
                        season: Season::new(row.get(0)?),
                        state: row.get(1)?,
                        cause: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Persist a season's state; returns false when it was already recorded.
    ///
    /// Run bookkeeping, not collected data: not counted in `write_count`.
    pub fn record_season_state(
        &mut self,
        season: Season,
        state: &str,
        cause: Option<&str>,
    ) -> Result<bool> {
        let changed = self.conn.execute(
            "INSERT INTO season_runs (season, state, cause, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(season) DO UPDATE SET
                 state = excluded.state,
                 cause = excluded.cause,
                 updated_at = excluded.updated_at
             WHERE season_runs.state IS NOT excluded.state
                OR season_runs.cause IS NOT excluded.cause",
            params![season.as_u16(), state, cause, now()],
        )?;
        Ok(changed > 0)
    }

    fn note(&mut self, outcome: UpsertOutcome) {
        if outcome.is_write() {
            self.writes += 1;
        }
    }
}

fn now() -> i64 {
    Utc::now().timestamp()
}

fn exists(conn: &Connection, sql: &str, uid: &str) -> Result<bool> {
    Ok(conn
        .query_row(sql, params![uid], |_| Ok(()))
        .optional()?
        .is_some())
}

fn outcome(existed: bool, changed: usize) -> UpsertOutcome {
    match (existed, changed) {
        (_, 0) => UpsertOutcome::Unchanged,
        (true, _) => UpsertOutcome::Updated,
        (false, _) => UpsertOutcome::Inserted,
    }
}

fn upsert_team_in(conn: &Connection, team: &Team, now: i64) -> Result<UpsertOutcome> {
    let existed = exists(
        conn,
        "SELECT 1 FROM teams WHERE team_uid = ?",
        team.uid.as_str(),
    )?;

    // Metadata the new record omits is kept; the WHERE clause turns an
    // identical write into a no-op so unchanged rows are not touched.
    let changed = conn.execute(
        "INSERT INTO teams (team_uid, name, city, abbreviation, stadium, latitude, longitude,
                            conference, division, source, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
         ON CONFLICT(team_uid) DO UPDATE SET
             name = COALESCE(excluded.name, teams.name),
             city = COALESCE(excluded.city, teams.city),
             abbreviation = COALESCE(excluded.abbreviation, teams.abbreviation),
             stadium = COALESCE(excluded.stadium, teams.stadium),
             latitude = COALESCE(excluded.latitude, teams.latitude),
             longitude = COALESCE(excluded.longitude, teams.longitude),
             conference = COALESCE(excluded.conference, teams.conference),
             division = COALESCE(excluded.division, teams.division),
             source = excluded.source,
             updated_at = excluded.updated_at
         WHERE COALESCE(excluded.name, teams.name) IS NOT teams.name
            OR COALESCE(excluded.city, teams.city) IS NOT teams.city
            OR COALESCE(excluded.abbreviation, teams.abbreviation) IS NOT teams.abbreviation
            OR COALESCE(excluded.stadium, teams.stadium) IS NOT teams.stadium
            OR COALESCE(excluded.latitude, teams.latitude) IS NOT teams.latitude
            OR COALESCE(excluded.longitude, teams.longitude) IS NOT teams.longitude
            OR COALESCE(excluded.conference, teams.conference) IS NOT teams.conference
            OR COALESCE(excluded.division, teams.division) IS NOT teams.division
            OR excluded.source IS NOT teams.source",
        params![
            team.uid.as_str(),
            team.name,
            team.city,
            team.abbreviation,
            team.stadium,
            team.latitude,
            team.longitude,
            team.conference,
            team.division,
            team.source,
            now
        ],
    )?;

    Ok(outcome(existed, changed))
}

fn upsert_game_in(conn: &Connection, game: &Game, now: i64) -> Result<UpsertOutcome> {
    let existed = exists(
        conn,
        "SELECT 1 FROM games WHERE game_uid = ?",
        game.uid.as_str(),
    )?;

    // Last write wins, except that an overridden category is kept and fields
    // the new record lacks keep their stored value.
    let changed = conn.execute(
        "INSERT INTO games (game_uid, season, week, scheduled_at, category, category_override,
                            home_team_uid, away_team_uid, home_score, away_score, source,
                            created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
         ON CONFLICT(game_uid) DO UPDATE SET
             season = excluded.season,
             week = COALESCE(excluded.week, games.week),
             scheduled_at = COALESCE(excluded.scheduled_at, games.scheduled_at),
             category = CASE WHEN games.category_override = 1
                             THEN games.category ELSE excluded.category END,
             home_team_uid = COALESCE(excluded.home_team_uid, games.home_team_uid),
             away_team_uid = COALESCE(excluded.away_team_uid, games.away_team_uid),
             home_score = COALESCE(excluded.home_score, games.home_score),
             away_score = COALESCE(excluded.away_score, games.away_score),
             source = excluded.source,
             updated_at = excluded.updated_at
         WHERE games.season IS NOT excluded.season
            OR COALESCE(excluded.week, games.week) IS NOT games.week
            OR COALESCE(excluded.scheduled_at, games.scheduled_at) IS NOT games.scheduled_at
            OR (games.category_override = 0 AND games.category IS NOT excluded.category)
            OR COALESCE(excluded.home_team_uid, games.home_team_uid) IS NOT games.home_team_uid
            OR COALESCE(excluded.away_team_uid, games.away_team_uid) IS NOT games.away_team_uid
            OR COALESCE(excluded.home_score, games.home_score) IS NOT games.home_score
            OR COALESCE(excluded.away_score, games.away_score) IS NOT games.away_score
            OR excluded.source IS NOT games.source",
        params![
            game.uid.as_str(),
            game.season.as_u16(),
            game.week,
            game.scheduled_at.map(format_datetime),
            game.category.as_str(),
            game.category_override,
            game.home_team.as_ref().map(TeamUid::as_str),
            game.away_team.as_ref().map(TeamUid::as_str),
            game.home_score,
            game.away_score,
            game.source,
            now
        ],
    )?;

    Ok(outcome(existed, changed))
}

fn upsert_stat_in(conn: &Connection, stat: &TeamGameStat, now: i64) -> Result<UpsertOutcome> {
    let existed = exists(
        conn,
        "SELECT 1 FROM team_game_stats WHERE stat_uid = ?",
        stat.stat_uid.as_str(),
    )?;

    let changed = conn.execute(
        "INSERT INTO team_game_stats (stat_uid, game_uid, team_uid, season, is_home,
                                      total_yards, passing_yards, rushing_yards, first_downs,
                                      turnovers, third_down_conversions, third_down_attempts,
                                      penalties, penalty_yards, time_of_possession_secs,
                                      source, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?17)
         ON CONFLICT(stat_uid) DO UPDATE SET
             game_uid = excluded.game_uid,
             team_uid = excluded.team_uid,
             season = excluded.season,
             is_home = COALESCE(excluded.is_home, team_game_stats.is_home),
             total_yards = COALESCE(excluded.total_yards, team_game_stats.total_yards),
             passing_yards = COALESCE(excluded.passing_yards, team_game_stats.passing_yards),
             rushing_yards = COALESCE(excluded.rushing_yards, team_game_stats.rushing_yards),
             first_downs = COALESCE(excluded.first_downs, team_game_stats.first_downs),
             turnovers = COALESCE(excluded.turnovers, team_game_stats.turnovers),
             third_down_conversions = COALESCE(excluded.third_down_conversions,
                                               team_game_stats.third_down_conversions),
             third_down_attempts = COALESCE(excluded.third_down_attempts,
                                            team_game_stats.third_down_attempts),
             penalties = COALESCE(excluded.penalties, team_game_stats.penalties),
             penalty_yards = COALESCE(excluded.penalty_yards, team_game_stats.penalty_yards),
             time_of_possession_secs = COALESCE(excluded.time_of_possession_secs,
                                                team_game_stats.time_of_possession_secs),
             source = excluded.source,
             updated_at = excluded.updated_at
         WHERE team_game_stats.game_uid IS NOT excluded.game_uid
            OR team_game_stats.team_uid IS NOT excluded.team_uid
            OR team_game_stats.season IS NOT excluded.season
            OR COALESCE(excluded.is_home, team_game_stats.is_home)
                   IS NOT team_game_stats.is_home
            OR COALESCE(excluded.total_yards, team_game_stats.total_yards)
                   IS NOT team_game_stats.total_yards
            OR COALESCE(excluded.passing_yards, team_game_stats.passing_yards)
                   IS NOT team_game_stats.passing_yards
            OR COALESCE(excluded.rushing_yards, team_game_stats.rushing_yards)
                   IS NOT team_game_stats.rushing_yards
            OR COALESCE(excluded.first_downs, team_game_stats.first_downs)
                   IS NOT team_game_stats.first_downs
            OR COALESCE(excluded.turnovers, team_game_stats.turnovers)
                   IS NOT team_game_stats.turnovers
            OR COALESCE(excluded.third_down_conversions, team_game_stats.third_down_conversions)
                   IS NOT team_game_stats.third_down_conversions
            OR COALESCE(excluded.third_down_attempts, team_game_stats.third_down_attempts)
                   IS NOT team_game_stats.third_down_attempts
            OR COALESCE(excluded.penalties, team_game_stats.penalties)
                   IS NOT team_game_stats.penalties
            OR COALESCE(excluded.penalty_yards, team_game_stats.penalty_yards)
                   IS NOT team_game_stats.penalty_yards
            OR COALESCE(excluded.time_of_possession_secs, team_game_stats.time_of_possession_secs)
                   IS NOT team_game_stats.time_of_possession_secs
            OR excluded.source IS NOT team_game_stats.source",
        params![
            stat.stat_uid.as_str(),
            stat.game_uid.as_str(),
            stat.team_uid.as_str(),
            stat.season.as_u16(),
            stat.is_home,
            stat.total_yards,
            stat.passing_yards,
            stat.rushing_yards,
            stat.first_downs,
            stat.turnovers,
            stat.third_down_conversions,
            stat.third_down_attempts,
            stat.penalties,
            stat.penalty_yards,
            stat.time_of_possession_secs,
            stat.source,
            now
        ],
    )?;

    Ok(outcome(existed, changed))
}

fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

fn parse_datetime(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_game(row: &Row) -> rusqlite::Result<Game> {
    let category: Option<String> = row.get(4)?;
    let category = Category::from_stored(category.as_deref())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    let scheduled_at = match row.get::<_, Option<String>>(3)? {
        Some(raw) if !raw.is_empty() => Some(parse_datetime(3, &raw)?),
        _ => None,
    };

    Ok(Game {
        uid: GameUid::new(row.get::<_, String>(0)?),
        season: Season::new(row.get(1)?),
        week: row.get(2)?,
        scheduled_at,
        category,
        category_override: row.get(5)?,
        home_team: row.get::<_, Option<String>>(6)?.map(TeamUid::new),
        away_team: row.get::<_, Option<String>>(7)?.map(TeamUid::new),
        home_score: row.get(8)?,
        away_score: row.get(9)?,
        source: row.get(10)?,
    })
}

fn row_to_stat(row: &Row) -> rusqlite::Result<TeamGameStat> {
    Ok(TeamGameStat {
        stat_uid: StatUid::new(row.get::<_, String>(0)?),
        game_uid: GameUid::new(row.get::<_, String>(1)?),
        team_uid: TeamUid::new(row.get::<_, String>(2)?),
        season: Season::new(row.get(3)?),
        is_home: row.get(4)?,
        total_yards: row.get(5)?,
        passing_yards: row.get(6)?,
        rushing_yards: row.get(7)?,
        first_downs: row.get(8)?,
        turnovers: row.get(9)?,
        third_down_conversions: row.get(10)?,
        third_down_attempts: row.get(11)?,
        penalties: row.get(12)?,
        penalty_yards: row.get(13)?,
        time_of_possession_secs: row.get(14)?,
        source: row.get(15)?,
    })
}
