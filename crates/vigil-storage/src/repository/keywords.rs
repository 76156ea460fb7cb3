//! Keyword corpus repository.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use vigil_core::models::{KeywordCategory, KeywordRecord, NewKeyword, Severity};

use super::parse_datetime;
use crate::error::{Result, StorageError};

/// Repository for keyword corpus operations.
pub struct KeywordsRepo;

impl KeywordsRepo {
    /// Insert a new keyword.
    pub fn insert(conn: &Connection, keyword: NewKeyword) -> Result<i64> {
        conn.execute(
            "INSERT INTO keywords (phrase, category, severity, active, created_at)
             VALUES (?1, ?2, ?3, 1, ?4)",
            params![
                keyword.phrase,
                keyword.category.as_str(),
                keyword.severity.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get a keyword by ID.
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<KeywordRecord>> {
        let mut stmt = conn.prepare(
            "SELECT id, phrase, category, severity, active, created_at
             FROM keywords WHERE id = ?1",
        )?;

        let record = stmt.query_row([id], map_keyword).ok();
        Ok(record)
    }

    /// List all active keywords, oldest first.
    pub fn list_active(conn: &Connection) -> Result<Vec<KeywordRecord>> {
        let mut stmt = conn.prepare(
            "SELECT id, phrase, category, severity, active, created_at
             FROM keywords WHERE active = 1 ORDER BY id",
        )?;

        let records = stmt
            .query_map([], map_keyword)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(records)
    }

    /// List all keywords including soft-deleted ones.
    pub fn list_all(conn: &Connection) -> Result<Vec<KeywordRecord>> {
        let mut stmt = conn.prepare(
            "SELECT id, phrase, category, severity, active, created_at
             FROM keywords ORDER BY id",
        )?;

        let records = stmt
            .query_map([], map_keyword)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(records)
    }

    /// Update phrase, category, and severity of a keyword.
    pub fn update(
        conn: &Connection,
        id: i64,
        phrase: &str,
        category: KeywordCategory,
        severity: Severity,
    ) -> Result<()> {
        let changed = conn.execute(
            "UPDATE keywords SET phrase = ?1, category = ?2, severity = ?3 WHERE id = ?4",
            params![phrase, category.as_str(), severity.as_str(), id],
        )?;

        if changed == 0 {
            return Err(StorageError::NotFound(format!("keyword {id}")));
        }
        Ok(())
    }

    /// Soft-delete a keyword. Detection history referencing it survives.
    pub fn soft_delete(conn: &Connection, id: i64) -> Result<()> {
        let changed = conn.execute("UPDATE keywords SET active = 0 WHERE id = ?1", [id])?;

        if changed == 0 {
            return Err(StorageError::NotFound(format!("keyword {id}")));
        }
        Ok(())
    }

    /// Count active keywords.
    pub fn count_active(conn: &Connection) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM keywords WHERE active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Count keywords created at or after the given instant.
    pub fn count_created_since(conn: &Connection, since: DateTime<Utc>) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM keywords WHERE created_at >= ?1",
            [since.to_rfc3339()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn map_keyword(row: &Row<'_>) -> rusqlite::Result<KeywordRecord> {
    Ok(KeywordRecord {
        id: row.get(0)?,
        phrase: row.get(1)?,
        category: KeywordCategory::parse(&row.get::<_, String>(2)?)
            .unwrap_or(KeywordCategory::InappropriateContent),
        severity: Severity::parse(&row.get::<_, String>(3)?).unwrap_or(Severity::Low),
        active: row.get::<_, i64>(4)? != 0,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}
