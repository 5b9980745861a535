use crate::app_dirs::AppDirs;
use crate::session::{ResultSink, SessionRecord};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

/// One stored session result
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Local>,
    pub score: u32,
    pub words_typed: u32,
    pub accuracy: u32,
    pub max_combo: u32,
    pub difficulty: String,
    pub time_spent: u64,
    pub kind: String,
    pub title: String,
}

/// Aggregates across the whole history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryTotals {
    pub sessions: i64,
    pub words_typed: i64,
    pub avg_accuracy: f64,
}

/// Database manager for completed-session history
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Initialize the database connection and create tables if needed
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("keyfall_history.db"));
        Self::open(&db_path)
    }

    pub fn with_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path.as_ref())
    }

    fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(db_path)?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS session_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                score INTEGER NOT NULL,
                words_typed INTEGER NOT NULL,
                accuracy INTEGER NOT NULL,
                max_combo INTEGER NOT NULL,
                difficulty TEXT NOT NULL,
                time_spent INTEGER NOT NULL,
                kind TEXT NOT NULL,
                title TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_session_results_kind ON session_results(kind)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_session_results_timestamp ON session_results(timestamp)",
            [],
        )?;

        Ok(HistoryDb { conn })
    }

    /// Store one completed session
    pub fn record_session(&self, record: &SessionRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO session_results
            (timestamp, score, words_typed, accuracy, max_combo, difficulty, time_spent, kind, title)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                Local::now().to_rfc3339(),
                record.score,
                record.words_typed,
                record.accuracy,
                record.max_combo,
                record.difficulty,
                record.time_spent,
                record.kind,
                record.title,
            ],
        )?;

        Ok(())
    }

    /// Most recent sessions, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        self.recent_with_limit(limit as i64)
    }

    fn recent_with_limit(&self, limit: i64) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT timestamp, score, words_typed, accuracy, max_combo, difficulty, time_spent, kind, title
            FROM session_results
            ORDER BY timestamp DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit], |row| {
            let timestamp_str: String = row.get(0)?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        0,
                        "timestamp".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(HistoryEntry {
                timestamp,
                score: row.get(1)?,
                words_typed: row.get(2)?,
                accuracy: row.get(3)?,
                max_combo: row.get(4)?,
                difficulty: row.get(5)?,
                time_spent: row.get(6)?,
                kind: row.get(7)?,
                title: row.get(8)?,
            })
        })?;

        rows.collect()
    }

    /// Best score for one game/difficulty combination
    pub fn best_score(&self, kind: &str, difficulty: &str) -> Result<Option<u32>> {
        self.conn.query_row(
            "SELECT MAX(score) FROM session_results WHERE kind = ?1 AND difficulty = ?2",
            params![kind, difficulty],
            |row| row.get(0),
        )
    }

    /// Session count, words typed, and mean accuracy across all history
    pub fn totals(&self) -> Result<HistoryTotals> {
        self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(words_typed), 0), COALESCE(AVG(accuracy), 0.0) FROM session_results",
            [],
            |row| {
                Ok(HistoryTotals {
                    sessions: row.get(0)?,
                    words_typed: row.get(1)?,
                    avg_accuracy: row.get(2)?,
                })
            },
        )
    }

    /// Dump the full history to a CSV file
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        // sqlite treats a negative limit as unlimited
        let entries = self.recent_with_limit(-1)?;

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([
            "date",
            "game",
            "difficulty",
            "score",
            "words",
            "accuracy",
            "max_combo",
            "seconds",
        ])?;

        for e in &entries {
            writer.write_record([
                e.timestamp.to_rfc3339(),
                e.kind.clone(),
                e.difficulty.clone(),
                e.score.to_string(),
                e.words_typed.to_string(),
                e.accuracy.to_string(),
                e.max_combo.to_string(),
                e.time_spent.to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl ResultSink for HistoryDb {
    fn record(&mut self, result: &SessionRecord) {
        // a broken history store never blocks play
        let _ = self.record_session(result);
    }
}
