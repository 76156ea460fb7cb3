//! Message corpus repository. Read-mostly: the platform writes messages as
//! they are delivered, and mining reads a date window back out.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use vigil_core::models::StoredMessage;

use super::parse_datetime;
use crate::error::Result;

/// Repository for the persisted message corpus.
pub struct MessagesRepo;

impl MessagesRepo {
    /// Insert a message. Re-inserting the same id replaces the row.
    pub fn insert(conn: &Connection, id: &str, body: &str, sent_at: DateTime<Utc>) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO messages (id, body, sent_at) VALUES (?1, ?2, ?3)",
            params![id, body, sent_at.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Messages sent at or after the given instant, oldest first.
    pub fn list_since(conn: &Connection, since: DateTime<Utc>) -> Result<Vec<StoredMessage>> {
        let mut stmt = conn.prepare(
            "SELECT id, body, sent_at FROM messages WHERE sent_at >= ?1 ORDER BY sent_at",
        )?;

        let messages = stmt
            .query_map([since.to_rfc3339()], map_message)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(messages)
    }
}

fn map_message(row: &Row<'_>) -> rusqlite::Result<StoredMessage> {
    Ok(StoredMessage {
        id: row.get(0)?,
        text: row.get(1)?,
        sent_at: parse_datetime(&row.get::<_, String>(2)?),
    })
}
