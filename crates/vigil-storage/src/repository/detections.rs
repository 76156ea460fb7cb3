//! Detection log repository. Append-only; rows are never updated or
//! deleted, preserving the audit trail.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use vigil_core::models::{KeywordDetection, NewDetection};

use super::parse_datetime;
use crate::error::Result;

/// Repository for the keyword detection log.
pub struct DetectionsRepo;

impl DetectionsRepo {
    /// Append a detection.
    pub fn insert(conn: &Connection, detection: NewDetection) -> Result<i64> {
        conn.execute(
            "INSERT INTO keyword_detections (keyword_id, message_id, context_snippet, detected_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                detection.keyword_id,
                detection.message_id,
                detection.context_snippet,
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Count detections logged at or after the given instant.
    pub fn count_since(conn: &Connection, since: DateTime<Utc>) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM keyword_detections WHERE detected_at >= ?1",
            [since.to_rfc3339()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Detection history for one keyword, newest first.
    pub fn list_by_keyword(conn: &Connection, keyword_id: i64) -> Result<Vec<KeywordDetection>> {
        let mut stmt = conn.prepare(
            "SELECT id, keyword_id, message_id, context_snippet, detected_at
             FROM keyword_detections WHERE keyword_id = ?1 ORDER BY detected_at DESC",
        )?;

        let detections = stmt
            .query_map([keyword_id], map_detection)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(detections)
    }

    /// Most recent detections, newest first.
    pub fn list_recent(conn: &Connection, limit: i64) -> Result<Vec<KeywordDetection>> {
        let mut stmt = conn.prepare(
            "SELECT id, keyword_id, message_id, context_snippet, detected_at
             FROM keyword_detections ORDER BY detected_at DESC, id DESC LIMIT ?1",
        )?;

        let detections = stmt
            .query_map([limit], map_detection)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(detections)
    }
}

fn map_detection(row: &Row<'_>) -> rusqlite::Result<KeywordDetection> {
    Ok(KeywordDetection {
        id: row.get(0)?,
        keyword_id: row.get(1)?,
        message_id: row.get(2)?,
        context_snippet: row.get(3)?,
        detected_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}
