//! Database schema and migrations.

use rusqlite::Connection;
use tracing::info;

use crate::error::Result;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version < SCHEMA_VERSION {
        info!(
            "Running migrations from version {} to {}",
            current_version, SCHEMA_VERSION
        );

        if current_version < 1 {
            migrate_v1(conn)?;
        }

        if current_version < 2 {
            migrate_v2(conn)?;
        }

        set_schema_version(conn, SCHEMA_VERSION)?;
        info!("Migrations complete");
    }

    Ok(())
}

/// Get the current schema version.
fn get_schema_version(conn: &Connection) -> Result<i32> {
    // Create schema_version table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

/// Set the schema version.
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration to version 1: Keyword corpus and detection log.
fn migrate_v1(conn: &Connection) -> Result<()> {
    info!("Applying migration v1: Keyword corpus and detection log");

    // Keywords table - the active detection corpus. Rows are soft-deleted
    // (active = 0) so the detection log stays referentially intact.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS keywords (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            phrase TEXT NOT NULL,
            category TEXT NOT NULL,
            severity TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // Index for fetching the active set
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_keywords_active ON keywords (active)",
        [],
    )?;

    // Detection log - append-only audit trail of keyword hits
    conn.execute(
        "CREATE TABLE IF NOT EXISTS keyword_detections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            keyword_id INTEGER NOT NULL,
            message_id TEXT NOT NULL,
            context_snippet TEXT NOT NULL,
            detected_at TEXT NOT NULL,
            FOREIGN KEY (keyword_id) REFERENCES keywords(id)
        )",
        [],
    )?;

    // Index for per-keyword history
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_detections_keyword ON keyword_detections (keyword_id)",
        [],
    )?;

    // Index for time-window counts
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_detections_detected_at ON keyword_detections (detected_at)",
        [],
    )?;

    Ok(())
}

/// Migration to version 2: Suggestion mining support.
fn migrate_v2(conn: &Connection) -> Result<()> {
    info!("Applying migration v2: Suggestion mining support");

    // Suggestions table - mined phrases awaiting review. Category is stored
    // as the human-readable name, per the current admin schema.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS keyword_suggestions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            phrase TEXT NOT NULL,
            category TEXT NOT NULL,
            severity TEXT NOT NULL,
            detection_count INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // Index for the pending review queue
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_suggestions_status ON keyword_suggestions (status)",
        [],
    )?;

    // Message corpus - read model mined for new suggestions
    conn.execute(
        "CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            body TEXT NOT NULL,
            sent_at TEXT NOT NULL
        )",
        [],
    )?;

    // Index for the mining window
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_messages_sent_at ON messages (sent_at)",
        [],
    )?;

    Ok(())
}
