//! Suggestion review queue repository.

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use vigil_core::models::{
    KeywordCategory, KeywordSuggestion, NewSuggestion, Severity, SuggestionStatus,
};

use super::parse_datetime;
use crate::error::{Result, StorageError};

/// Repository for mined keyword suggestions.
pub struct SuggestionsRepo;

impl SuggestionsRepo {
    /// Insert a new pending suggestion. The category is stored as its
    /// human-readable name, per the current admin schema.
    pub fn insert(conn: &Connection, suggestion: NewSuggestion) -> Result<i64> {
        conn.execute(
            "INSERT INTO keyword_suggestions (phrase, category, severity, detection_count, status, created_at)
             VALUES (?1, ?2, ?3, ?4, 'pending', ?5)",
            params![
                suggestion.phrase,
                suggestion.category.name(),
                suggestion.severity.as_str(),
                suggestion.detection_count,
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get a suggestion by ID.
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<KeywordSuggestion>> {
        let mut stmt = conn.prepare(
            "SELECT id, phrase, category, severity, detection_count, status, created_at
             FROM keyword_suggestions WHERE id = ?1",
        )?;

        let suggestion = stmt.query_row([id], map_suggestion).ok();
        Ok(suggestion)
    }

    /// List suggestions awaiting review, highest frequency first.
    pub fn list_pending(conn: &Connection) -> Result<Vec<KeywordSuggestion>> {
        let mut stmt = conn.prepare(
            "SELECT id, phrase, category, severity, detection_count, status, created_at
             FROM keyword_suggestions WHERE status = 'pending'
             ORDER BY detection_count DESC, id",
        )?;

        let suggestions = stmt
            .query_map([], map_suggestion)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(suggestions)
    }

    /// Count pending suggestions.
    pub fn count_pending(conn: &Connection) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM keyword_suggestions WHERE status = 'pending'",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Resolve a pending suggestion. Accepted and rejected are terminal:
    /// resolving an already-resolved suggestion fails.
    pub fn update_status(conn: &Connection, id: i64, status: SuggestionStatus) -> Result<()> {
        let changed = conn.execute(
            "UPDATE keyword_suggestions SET status = ?1 WHERE id = ?2 AND status = 'pending'",
            params![status.as_str(), id],
        )?;

        if changed == 0 {
            return match Self::get_by_id(conn, id)? {
                Some(existing) => Err(StorageError::InvalidState(format!(
                    "suggestion {id} already {}",
                    existing.status.as_str()
                ))),
                None => Err(StorageError::NotFound(format!("suggestion {id}"))),
            };
        }
        Ok(())
    }
}

fn map_suggestion(row: &Row<'_>) -> rusqlite::Result<KeywordSuggestion> {
    Ok(KeywordSuggestion {
        id: row.get(0)?,
        phrase: row.get(1)?,
        category: KeywordCategory::parse(&row.get::<_, String>(2)?)
            .unwrap_or(KeywordCategory::InappropriateContent),
        severity: Severity::parse(&row.get::<_, String>(3)?).unwrap_or(Severity::Low),
        detection_count: row.get(4)?,
        status: SuggestionStatus::parse(&row.get::<_, String>(5)?)
            .unwrap_or(SuggestionStatus::Pending),
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::run_migrations;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn new_suggestion(phrase: &str, count: i64) -> NewSuggestion {
        NewSuggestion {
            phrase: phrase.to_string(),
            category: KeywordCategory::FinancialExploitation,
            severity: Severity::High,
            detection_count: count,
        }
    }

    #[test]
    fn insert_and_read_back() {
        let conn = setup_db();

        let id = SuggestionsRepo::insert(&conn, new_suggestion("wire me", 4)).unwrap();
        let suggestion = SuggestionsRepo::get_by_id(&conn, id).unwrap().unwrap();

        assert_eq!(suggestion.phrase, "wire me");
        assert_eq!(suggestion.category, KeywordCategory::FinancialExploitation);
        assert_eq!(suggestion.detection_count, 4);
        assert_eq!(suggestion.status, SuggestionStatus::Pending);
    }

    #[test]
    fn category_round_trips_through_display_name() {
        let conn = setup_db();

        let id = SuggestionsRepo::insert(&conn, new_suggestion("wire me", 1)).unwrap();

        // Stored as the human-readable name
        let stored: String = conn
            .query_row(
                "SELECT category FROM keyword_suggestions WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stored, "Financial Exploitation");

        let suggestion = SuggestionsRepo::get_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(suggestion.category, KeywordCategory::FinancialExploitation);
    }

    #[test]
    fn list_pending_orders_by_frequency() {
        let conn = setup_db();

        SuggestionsRepo::insert(&conn, new_suggestion("low freq", 2)).unwrap();
        SuggestionsRepo::insert(&conn, new_suggestion("high freq", 9)).unwrap();

        let pending = SuggestionsRepo::list_pending(&conn).unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].phrase, "high freq");
    }

    #[test]
    fn resolution_is_terminal() {
        let conn = setup_db();

        let id = SuggestionsRepo::insert(&conn, new_suggestion("wire me", 1)).unwrap();
        SuggestionsRepo::update_status(&conn, id, SuggestionStatus::Accepted).unwrap();

        // Resolved suggestions leave the pending queue
        assert_eq!(SuggestionsRepo::count_pending(&conn).unwrap(), 0);

        // And cannot be re-resolved
        let result = SuggestionsRepo::update_status(&conn, id, SuggestionStatus::Rejected);
        assert!(matches!(result, Err(StorageError::InvalidState(_))));

        let suggestion = SuggestionsRepo::get_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(suggestion.status, SuggestionStatus::Accepted);
    }

    #[test]
    fn resolving_missing_suggestion_is_not_found() {
        let conn = setup_db();
        let result = SuggestionsRepo::update_status(&conn, 42, SuggestionStatus::Rejected);
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }
}
