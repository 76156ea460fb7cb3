//! High-level database interface.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::info;
use vigil_core::models::{
    KeywordCategory, KeywordDetection, KeywordRecord, KeywordSuggestion, NewDetection, NewKeyword,
    NewSuggestion, Severity, StoredMessage, SuggestionStatus,
};

use crate::error::{Result, StorageError};
use crate::pool::ConnectionPool;
use crate::repository::{DetectionsRepo, KeywordsRepo, MessagesRepo, SuggestionsRepo};

/// Aggregate dashboard statistics for the keyword corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Keywords currently active.
    pub active_keywords: i64,
    /// Keywords added in the last seven days.
    pub added_this_week: i64,
    /// Suggestions awaiting review.
    pub pending_suggestions: i64,
    /// Detections logged since midnight UTC.
    pub detections_today: i64,
}

/// High-level database interface for Vigil.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    /// Create a new database in the default app data directory.
    pub fn new() -> Result<Self> {
        let path = Self::default_db_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening database at: {:?}", path);
        let pool = ConnectionPool::new(&path)?;

        Ok(Self { pool })
    }

    /// Create a new database at a specific path.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening database at: {:?}", path);
        let pool = ConnectionPool::new(&path)?;

        Ok(Self { pool })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let pool = ConnectionPool::in_memory()?;
        Ok(Self { pool })
    }

    /// Get the default database path.
    pub fn default_db_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "vigil", "vigil")
            .ok_or_else(|| StorageError::Config("Could not determine app data directory".into()))?;

        Ok(proj_dirs.data_dir().join("vigil.db"))
    }

    // === Keywords ===

    /// Add a keyword to the corpus.
    pub fn add_keyword(&self, keyword: NewKeyword) -> Result<i64> {
        let conn = self.pool.get()?;
        KeywordsRepo::insert(&conn, keyword)
    }

    /// Get a keyword by ID.
    pub fn keyword(&self, id: i64) -> Result<Option<KeywordRecord>> {
        let conn = self.pool.get()?;
        KeywordsRepo::get_by_id(&conn, id)
    }

    /// All active keywords.
    pub fn active_keywords(&self) -> Result<Vec<KeywordRecord>> {
        let conn = self.pool.get()?;
        KeywordsRepo::list_active(&conn)
    }

    /// All keywords including soft-deleted ones.
    pub fn all_keywords(&self) -> Result<Vec<KeywordRecord>> {
        let conn = self.pool.get()?;
        KeywordsRepo::list_all(&conn)
    }

    /// Edit a keyword's phrase, category, and severity.
    pub fn update_keyword(
        &self,
        id: i64,
        phrase: &str,
        category: KeywordCategory,
        severity: Severity,
    ) -> Result<()> {
        let conn = self.pool.get()?;
        KeywordsRepo::update(&conn, id, phrase, category, severity)
    }

    /// Soft-delete a keyword, keeping its detection history.
    pub fn deactivate_keyword(&self, id: i64) -> Result<()> {
        let conn = self.pool.get()?;
        KeywordsRepo::soft_delete(&conn, id)
    }

    // === Detections ===

    /// Append a detection to the audit log.
    pub fn log_detection(&self, detection: NewDetection) -> Result<i64> {
        let conn = self.pool.get()?;
        DetectionsRepo::insert(&conn, detection)
    }

    /// Detections logged since midnight UTC.
    pub fn detections_today(&self) -> Result<i64> {
        self.detections_since(today_start())
    }

    /// Detections logged at or after the given instant.
    pub fn detections_since(&self, since: DateTime<Utc>) -> Result<i64> {
        let conn = self.pool.get()?;
        DetectionsRepo::count_since(&conn, since)
    }

    /// Detection history for one keyword.
    pub fn keyword_history(&self, keyword_id: i64) -> Result<Vec<KeywordDetection>> {
        let conn = self.pool.get()?;
        DetectionsRepo::list_by_keyword(&conn, keyword_id)
    }

    /// Most recent detections across all keywords.
    pub fn recent_detections(&self, limit: i64) -> Result<Vec<KeywordDetection>> {
        let conn = self.pool.get()?;
        DetectionsRepo::list_recent(&conn, limit)
    }

    // === Suggestions ===

    /// Suggestions awaiting review.
    pub fn pending_suggestions(&self) -> Result<Vec<KeywordSuggestion>> {
        let conn = self.pool.get()?;
        SuggestionsRepo::list_pending(&conn)
    }

    /// Persist a mined suggestion as pending.
    pub fn save_suggestion(&self, suggestion: NewSuggestion) -> Result<i64> {
        let conn = self.pool.get()?;
        SuggestionsRepo::insert(&conn, suggestion)
    }

    /// Accept a pending suggestion. With `promote`, a new keyword is created
    /// from it and its id returned. Accepting a resolved suggestion fails.
    pub fn accept_suggestion(&self, id: i64, promote: bool) -> Result<Option<i64>> {
        let conn = self.pool.get()?;

        let suggestion = SuggestionsRepo::get_by_id(&conn, id)?
            .ok_or_else(|| StorageError::NotFound(format!("suggestion {id}")))?;

        SuggestionsRepo::update_status(&conn, id, SuggestionStatus::Accepted)?;

        if !promote {
            return Ok(None);
        }

        let keyword_id = KeywordsRepo::insert(
            &conn,
            NewKeyword {
                phrase: suggestion.phrase,
                category: suggestion.category,
                severity: suggestion.severity,
            },
        )?;
        info!(suggestion_id = id, keyword_id, "promoted suggestion to keyword");

        Ok(Some(keyword_id))
    }

    /// Reject a pending suggestion. Rejecting a resolved suggestion fails.
    pub fn reject_suggestion(&self, id: i64) -> Result<()> {
        let conn = self.pool.get()?;
        SuggestionsRepo::update_status(&conn, id, SuggestionStatus::Rejected)
    }

    // === Messages ===

    /// Record a delivered message into the mining corpus.
    pub fn record_message(&self, id: &str, text: &str, sent_at: DateTime<Utc>) -> Result<()> {
        let conn = self.pool.get()?;
        MessagesRepo::insert(&conn, id, text, sent_at)
    }

    /// Messages sent at or after the given instant.
    pub fn messages_since(&self, since: DateTime<Utc>) -> Result<Vec<StoredMessage>> {
        let conn = self.pool.get()?;
        MessagesRepo::list_since(&conn, since)
    }

    // === Stats ===

    /// Aggregate dashboard statistics.
    pub fn corpus_stats(&self) -> Result<CorpusStats> {
        let conn = self.pool.get()?;

        Ok(CorpusStats {
            active_keywords: KeywordsRepo::count_active(&conn)?,
            added_this_week: KeywordsRepo::count_created_since(
                &conn,
                Utc::now() - Duration::days(7),
            )?,
            pending_suggestions: SuggestionsRepo::count_pending(&conn)?,
            detections_today: DetectionsRepo::count_since(&conn, today_start())?,
        })
    }
}

/// Midnight UTC of the current day.
fn today_start() -> DateTime<Utc> {
    Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time")
        .and_utc()
}
