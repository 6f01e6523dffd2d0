use chrono::{DateTime, Local, SecondsFormat, Utc};
use itertools::Itertools;
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::config::SecretMode;

/// A finished game as stored in the history database
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub target: u8,
    pub guesses: Vec<u8>,
    pub secret_mode: SecretMode,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl GameRecord {
    pub fn guess_count(&self) -> usize {
        self.guesses.len()
    }
}

/// Aggregate view over every recorded game
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub games: i64,
    pub best: i64,
    pub average: f64,
    pub last: Option<DateTime<Local>>,
}

/// SQLite-backed store of finished games
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Open the database at the default location, creating it if needed
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("guessr_history.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                target INTEGER NOT NULL,
                guess_count INTEGER NOT NULL,
                guesses TEXT NOT NULL,
                secret_mode TEXT NOT NULL,
                started_at TEXT NOT NULL,
                finished_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_games_finished_at ON games(finished_at)",
            [],
        )?;

        Ok(HistoryDb { conn })
    }

    pub fn record_game(&self, record: &GameRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO games
            (target, guess_count, guesses, secret_mode, started_at, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.target,
                record.guess_count() as i64,
                record.guesses.iter().join(","),
                record.secret_mode.to_string(),
                format_timestamp(&record.started_at),
                format_timestamp(&record.finished_at),
            ],
        )?;

        Ok(())
    }

    /// Most recently finished games first
    pub fn recent_games(&self, limit: usize) -> Result<Vec<GameRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT target, guesses, secret_mode, started_at, finished_at
            FROM games
            ORDER BY finished_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let guesses: String = row.get(1)?;
            let mode: String = row.get(2)?;
            Ok(GameRecord {
                target: row.get(0)?,
                guesses: parse_guess_list(&guesses),
                secret_mode: mode.parse().unwrap_or_default(),
                started_at: parse_timestamp(row.get(3)?, 3)?,
                finished_at: parse_timestamp(row.get(4)?, 4)?,
            })
        })?;

        rows.collect()
    }

    /// `None` until at least one game has been recorded
    pub fn summary(&self) -> Result<Option<HistorySummary>> {
        let (games, best, average, last): (i64, Option<i64>, Option<f64>, Option<String>) =
            self.conn.query_row(
                "SELECT COUNT(*), MIN(guess_count), AVG(guess_count), MAX(finished_at) FROM games",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;

        if games == 0 {
            return Ok(None);
        }

        let last = match last {
            Some(ts) => Some(parse_timestamp(ts, 3)?),
            None => None,
        };

        Ok(Some(HistorySummary {
            games,
            best: best.unwrap_or(0),
            average: average.unwrap_or(0.0),
            last,
        }))
    }

    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM games", [])?;
        Ok(())
    }
}

// Fixed-width UTC text so that SQL ordering follows real time across offset changes
fn format_timestamp(ts: &DateTime<Local>) -> String {
    ts.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: String, column: usize) -> Result<DateTime<Local>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Local))
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(
                column,
                "timestamp".to_string(),
                rusqlite::types::Type::Text,
            )
        })
}

fn parse_guess_list(raw: &str) -> Vec<u8> {
    raw.split(',').filter_map(|g| g.trim().parse().ok()).collect()
}
