//! Database operations for local memorization records
//!
//! Handles SQLite database initialization, CRUD operations for memorizations,
//! revision scheduling data and the practice clock.

use crate::models::{
    MemorizationRecord, MemorizationStatus, MemorizationStore, NewMemorization,
};
use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Memorization not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

const RECORD_COLUMNS: &str = "id, user_id, verse_id, surah_number, verse_number, status,
    mastery_level, exercises_total, exercises_succeeded, consecutive_success_count,
    last_revision, next_revision, created_at, updated_at";

/// Opens (creating if needed) the database file and its tables.
pub fn init_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    log::debug!("Opened database {}", path.display());
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Creates tables for memorizations and app state.
/// Sets the practice clock to now if not already initialized.
fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS memorizations (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            verse_id TEXT NOT NULL,
            surah_number INTEGER NOT NULL,
            verse_number INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'en_cours',
            mastery_level INTEGER NOT NULL DEFAULT 0,
            exercises_total INTEGER NOT NULL DEFAULT 0,
            exercises_succeeded INTEGER NOT NULL DEFAULT 0,
            consecutive_success_count INTEGER NOT NULL DEFAULT 0,
            last_revision INTEGER,
            next_revision INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE(user_id, surah_number, verse_number)
        );
        CREATE INDEX IF NOT EXISTS memorizations_due
            ON memorizations(user_id, next_revision);
        CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![Utc::now().timestamp().to_string()],
    )?;

    Ok(())
}

fn timestamp_to_date(idx: usize, secs: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp {} out of range", secs).into(),
        )
    })
}

fn optional_date(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    row.get::<_, Option<i64>>(idx)?
        .map(|secs| timestamp_to_date(idx, secs))
        .transpose()
}

fn row_to_record(row: &Row) -> rusqlite::Result<MemorizationRecord> {
    let status: String = row.get(5)?;
    let status = status.parse::<MemorizationStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, Type::Text, e.into())
    })?;

    Ok(MemorizationRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        verse_id: row.get(2)?,
        surah_number: row.get(3)?,
        verse_number: row.get(4)?,
        status,
        mastery_level: row.get(6)?,
        exercises_total: row.get(7)?,
        exercises_succeeded: row.get(8)?,
        consecutive_success_count: row.get(9)?,
        last_revision: optional_date(row, 10)?,
        next_revision: optional_date(row, 11)?,
        created_at: timestamp_to_date(12, row.get(12)?)?,
        updated_at: timestamp_to_date(13, row.get(13)?)?,
    })
}

/// Retrieves the practice date from the database
pub fn get_current_date(conn: &Connection) -> Result<DateTime<Utc>> {
    let timestamp: String = conn.query_row(
        "SELECT value FROM app_state WHERE key = 'current_date'",
        [],
        |row| row.get(0),
    )?;

    let secs = timestamp.parse::<i64>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
    })?;
    Ok(timestamp_to_date(0, secs)?)
}

/// Advances the practice date by 24 hours (for trying out revision schedules)
pub fn advance_day(conn: &Connection) -> Result<DateTime<Utc>> {
    let next_day = get_current_date(conn)? + Duration::days(1);

    conn.execute(
        "UPDATE app_state SET value = ?1 WHERE key = 'current_date'",
        params![next_day.timestamp().to_string()],
    )?;

    log::info!("Practice date advanced to {}", next_day.format("%Y-%m-%d"));
    Ok(next_day)
}

/// Starts memorizing a verse and returns its record.
///
/// If the user already memorizes that verse, the existing record is returned
/// unchanged due to the UNIQUE constraint.
pub fn start_memorization(
    user_id: &str,
    verse: &NewMemorization,
    conn: &Connection,
) -> Result<MemorizationRecord> {
    let now = get_current_date(conn)?;
    let record = MemorizationRecord::new(
        uuid::Uuid::new_v4().to_string(),
        user_id.to_string(),
        verse,
        now,
    );

    let inserted = conn.execute(
        "INSERT OR IGNORE INTO memorizations
            (id, user_id, verse_id, surah_number, verse_number, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            record.id,
            record.user_id,
            record.verse_id,
            record.surah_number,
            record.verse_number,
            record.status.as_str(),
            now.timestamp()
        ],
    )?;
    if inserted > 0 {
        log::info!("Started memorizing verse {}", record.reference());
    }

    let record = conn.query_row(
        &format!(
            "SELECT {} FROM memorizations
             WHERE user_id = ?1 AND surah_number = ?2 AND verse_number = ?3",
            RECORD_COLUMNS
        ),
        params![user_id, verse.surah_number, verse.verse_number],
        row_to_record,
    )?;

    Ok(record)
}

pub fn get_memorization(id: &str, conn: &Connection) -> Result<MemorizationRecord> {
    conn.query_row(
        &format!("SELECT {} FROM memorizations WHERE id = ?1", RECORD_COLUMNS),
        params![id],
        row_to_record,
    )
    .optional()?
    .ok_or_else(|| StoreError::NotFound(id.to_string()))
}

/// Retrieves all memorizations of a user, in Quran order
pub fn list_memorizations(user_id: &str, conn: &Connection) -> Result<Vec<MemorizationRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM memorizations WHERE user_id = ?1
         ORDER BY surah_number ASC, verse_number ASC",
        RECORD_COLUMNS
    ))?;

    let records = stmt
        .query_map(params![user_id], row_to_record)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

/// Retrieves memorizations due for revision
///
/// Returns records never scheduled or with next_revision <= now,
/// ordered by next_revision (never scheduled first, then oldest).
pub fn get_due_for_revision(
    user_id: &str,
    now: DateTime<Utc>,
    conn: &Connection,
) -> Result<Vec<MemorizationRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM memorizations
         WHERE user_id = ?1 AND (next_revision IS NULL OR next_revision <= ?2)
         ORDER BY next_revision ASC, surah_number ASC, verse_number ASC",
        RECORD_COLUMNS
    ))?;

    let records = stmt
        .query_map(params![user_id, now.timestamp()], row_to_record)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

/// Updates progress and schedule of a memorization after a revision.
///
/// Runs in a transaction so the next revision date is stored together with
/// the streak and mastery it was computed from.
pub fn update_memorization(record: &MemorizationRecord, conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    let updated = tx.execute(
        "UPDATE memorizations
         SET status = ?1, mastery_level = ?2, exercises_total = ?3, exercises_succeeded = ?4,
             consecutive_success_count = ?5, last_revision = ?6, next_revision = ?7,
             updated_at = ?8
         WHERE id = ?9",
        params![
            record.status.as_str(),
            record.mastery_level,
            record.exercises_total,
            record.exercises_succeeded,
            record.consecutive_success_count,
            record.last_revision.map(|d| d.timestamp()),
            record.next_revision.map(|d| d.timestamp()),
            record.updated_at.timestamp(),
            record.id
        ],
    )?;

    if updated == 0 {
        return Err(StoreError::NotFound(record.id.clone()));
    }

    tx.commit()?;
    Ok(())
}

/// Inserts or replaces a full record, used when restoring a backup.
pub fn upsert_memorization(record: &MemorizationRecord, conn: &Connection) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO memorizations ({})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            RECORD_COLUMNS
        ),
        params![
            record.id,
            record.user_id,
            record.verse_id,
            record.surah_number,
            record.verse_number,
            record.status.as_str(),
            record.mastery_level,
            record.exercises_total,
            record.exercises_succeeded,
            record.consecutive_success_count,
            record.last_revision.map(|d| d.timestamp()),
            record.next_revision.map(|d| d.timestamp()),
            record.created_at.timestamp(),
            record.updated_at.timestamp()
        ],
    )?;
    Ok(())
}

/// Restores backed up records under `user_id`, whoever exported them.
/// All records are written or none.
pub fn import_memorizations(
    user_id: &str,
    records: &[MemorizationRecord],
    conn: &Connection,
) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    for record in records {
        let mut record = record.clone();
        record.user_id = user_id.to_string();
        upsert_memorization(&record, &tx)?;
    }
    tx.commit()?;

    log::info!("Imported {} memorizations for {}", records.len(), user_id);
    Ok(records.len())
}

/// Deletes a memorization of `user_id`. Records of other users count as missing.
pub fn delete_memorization(user_id: &str, id: &str, conn: &Connection) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM memorizations WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    if deleted == 0 {
        return Err(StoreError::NotFound(id.to_string()));
    }
    log::info!("Deleted memorization {}", id);
    Ok(())
}

/// Revision session store backed by the local database for one user.
#[derive(Clone)]
pub struct LocalStore {
    conn: Arc<Mutex<Connection>>,
    user_id: String,
}

impl LocalStore {
    pub fn new(conn: Arc<Mutex<Connection>>, user_id: impl Into<String>) -> Self {
        Self {
            conn,
            user_id: user_id.into(),
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T>,
    ) -> anyhow::Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))?;
        Ok(f(&conn)?)
    }
}

impl MemorizationStore for LocalStore {
    fn due_for_revision(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<MemorizationRecord>> {
        self.with_conn(|conn| get_due_for_revision(&self.user_id, now, conn))
    }

    fn save_revision(&self, record: &MemorizationRecord) -> anyhow::Result<()> {
        self.with_conn(|conn| update_memorization(record, conn))
    }
}
