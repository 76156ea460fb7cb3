//! Core store-trait implementations backed by SQLite.
//!
//! These make [`Database`] usable wherever the pipeline expects its
//! injected repositories.

use chrono::{DateTime, Utc};
use vigil_core::models::{
    KeywordCategory, KeywordDetection, KeywordRecord, KeywordSuggestion, NewDetection, NewKeyword,
    NewSuggestion, Severity, StoredMessage, SuggestionStatus,
};
use vigil_core::store::{
    DetectionStore, KeywordStore, MessageStore, StoreResult, SuggestionStore,
};

use crate::database::Database;

impl KeywordStore for Database {
    fn list_active(&self) -> StoreResult<Vec<KeywordRecord>> {
        Ok(self.active_keywords()?)
    }

    fn insert(&self, keyword: NewKeyword) -> StoreResult<i64> {
        Ok(self.add_keyword(keyword)?)
    }

    fn update(
        &self,
        id: i64,
        phrase: &str,
        category: KeywordCategory,
        severity: Severity,
    ) -> StoreResult<()> {
        Ok(self.update_keyword(id, phrase, category, severity)?)
    }

    fn soft_delete(&self, id: i64) -> StoreResult<()> {
        Ok(self.deactivate_keyword(id)?)
    }
}

impl DetectionStore for Database {
    fn append(&self, detection: NewDetection) -> StoreResult<i64> {
        Ok(self.log_detection(detection)?)
    }

    fn count_since(&self, since: DateTime<Utc>) -> StoreResult<i64> {
        Ok(self.detections_since(since)?)
    }

    fn list_by_keyword(&self, keyword_id: i64) -> StoreResult<Vec<KeywordDetection>> {
        Ok(self.keyword_history(keyword_id)?)
    }

    fn list_recent(&self, limit: i64) -> StoreResult<Vec<KeywordDetection>> {
        Ok(self.recent_detections(limit)?)
    }
}

impl SuggestionStore for Database {
    fn list_pending(&self) -> StoreResult<Vec<KeywordSuggestion>> {
        Ok(self.pending_suggestions()?)
    }

    fn insert(&self, suggestion: NewSuggestion) -> StoreResult<i64> {
        Ok(self.save_suggestion(suggestion)?)
    }

    fn update_status(&self, id: i64, status: SuggestionStatus) -> StoreResult<()> {
        match status {
            SuggestionStatus::Accepted => self.accept_suggestion(id, false).map(|_| ())?,
            SuggestionStatus::Rejected => self.reject_suggestion(id)?,
            SuggestionStatus::Pending => {
                return Err(vigil_core::store::StoreError::InvalidState(
                    "suggestions cannot be re-opened".to_string(),
                ))
            }
        }
        Ok(())
    }
}

impl MessageStore for Database {
    fn list_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<StoredMessage>> {
        Ok(self.messages_since(since)?)
    }
}
