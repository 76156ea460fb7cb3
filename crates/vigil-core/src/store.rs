//! Store traits consumed by the pipeline.
//!
//! The scanner and miner never reach into ambient state; their backing
//! stores are injected through these traits. `vigil-storage` provides the
//! SQLite implementations, and tests use small in-memory fakes.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    KeywordCategory, KeywordDetection, KeywordRecord, KeywordSuggestion, NewDetection, NewKeyword,
    NewSuggestion, Severity, StoredMessage, SuggestionStatus,
};

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store failed.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The requested record does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// The operation conflicts with the record's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Access to the keyword corpus.
pub trait KeywordStore: Send + Sync {
    /// Returns all active keyword records.
    fn list_active(&self) -> StoreResult<Vec<KeywordRecord>>;

    /// Inserts a new keyword and returns its id.
    fn insert(&self, keyword: NewKeyword) -> StoreResult<i64>;

    /// Updates phrase, category, and severity of an existing keyword.
    fn update(
        &self,
        id: i64,
        phrase: &str,
        category: KeywordCategory,
        severity: Severity,
    ) -> StoreResult<()>;

    /// Soft-deletes a keyword (active = false). Detection history referencing
    /// the keyword is preserved.
    fn soft_delete(&self, id: i64) -> StoreResult<()>;
}

/// Append-only detection log.
pub trait DetectionStore: Send + Sync {
    /// Appends a detection and returns its id.
    fn append(&self, detection: NewDetection) -> StoreResult<i64>;

    /// Counts detections logged at or after the given instant.
    fn count_since(&self, since: DateTime<Utc>) -> StoreResult<i64>;

    /// Returns the detection history for one keyword, newest first.
    fn list_by_keyword(&self, keyword_id: i64) -> StoreResult<Vec<KeywordDetection>>;

    /// Returns the most recent detections, newest first.
    fn list_recent(&self, limit: i64) -> StoreResult<Vec<KeywordDetection>>;
}

/// Persistence for mined suggestions.
pub trait SuggestionStore: Send + Sync {
    /// Returns suggestions awaiting review.
    fn list_pending(&self) -> StoreResult<Vec<KeywordSuggestion>>;

    /// Inserts a pending suggestion and returns its id.
    fn insert(&self, suggestion: NewSuggestion) -> StoreResult<i64>;

    /// Resolves a pending suggestion. Accepted and rejected suggestions are
    /// terminal; resolving a non-pending suggestion is an error.
    fn update_status(&self, id: i64, status: SuggestionStatus) -> StoreResult<()>;
}

/// Read-only access to the persisted message corpus, used by mining.
pub trait MessageStore: Send + Sync {
    /// Returns messages sent at or after the given instant.
    fn list_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<StoredMessage>>;
}
