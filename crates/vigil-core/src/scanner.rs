//! Store-backed keyword detection over persisted messages.
//!
//! The scanner fetches the active keyword corpus, finds case-insensitive
//! substring hits in a message, and logs every hit to the detection store.
//! Detection logging is best-effort side work: a failed append is reported
//! and skipped, never aborting the scan.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{KeywordRecord, NewDetection, Severity};
use crate::store::{DetectionStore, KeywordStore, StoreResult};

/// Characters of surrounding text kept on each side of a match.
pub const CONTEXT_RADIUS: usize = 30;

/// A single keyword hit within a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordMatch {
    /// The keyword record that matched.
    pub keyword: KeywordRecord,
    /// Context excerpt around the match, "..."-prefixed when left-truncated.
    pub context: String,
}

/// Result of scanning one message against the corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// Whether any keyword matched.
    pub detected: bool,
    /// All matches found, in corpus order.
    pub matches: Vec<KeywordMatch>,
}

impl ScanOutcome {
    /// An outcome with no matches.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if any match carries Critical severity. Callers use
    /// this as the hook point for alerting.
    pub fn has_critical(&self) -> bool {
        self.matches
            .iter()
            .any(|m| m.keyword.severity >= Severity::Critical)
    }
}

/// Scans messages against the active keyword corpus.
pub struct KeywordScanner {
    keywords: Arc<dyn KeywordStore>,
    detections: Arc<dyn DetectionStore>,
}

impl KeywordScanner {
    /// Creates a scanner over the given stores.
    pub fn new(keywords: Arc<dyn KeywordStore>, detections: Arc<dyn DetectionStore>) -> Self {
        Self {
            keywords,
            detections,
        }
    }

    /// Scans a message, logging each hit to the detection store.
    ///
    /// Fetching the active corpus is the primary operation and its failure
    /// propagates. Appending a detection is not: failures are logged and
    /// the match is still returned. Empty or whitespace-only text returns
    /// an empty outcome without touching the stores.
    pub fn scan_message(&self, message_id: &str, text: &str) -> StoreResult<ScanOutcome> {
        if text.trim().is_empty() {
            return Ok(ScanOutcome::empty());
        }

        let records = self.keywords.list_active()?;
        let lower = text.to_lowercase();
        let mut matches = Vec::new();

        for record in records {
            let phrase = record.phrase.to_lowercase();
            if phrase.is_empty() {
                continue;
            }

            if let Some(byte_index) = lower.find(&phrase) {
                let start = lower[..byte_index].chars().count();
                let context = context_snippet(text, start, phrase.chars().count());

                let detection = NewDetection {
                    keyword_id: record.id,
                    message_id: message_id.to_string(),
                    context_snippet: context.clone(),
                };
                if let Err(err) = self.detections.append(detection) {
                    warn!(
                        keyword_id = record.id,
                        message_id,
                        error = %err,
                        "failed to log keyword detection"
                    );
                }

                matches.push(KeywordMatch {
                    keyword: record,
                    context,
                });
            }
        }

        Ok(ScanOutcome {
            detected: !matches.is_empty(),
            matches,
        })
    }
}

/// Builds the context excerpt for a match: the phrase plus up to
/// [`CONTEXT_RADIUS`] characters on each side, "..."-prefixed when the
/// window does not start at the beginning of the message.
fn context_snippet(text: &str, match_start: usize, phrase_len: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let start = match_start.saturating_sub(CONTEXT_RADIUS);
    let end = (match_start + phrase_len + CONTEXT_RADIUS).min(chars.len());

    let window: String = chars[start..end].iter().collect();
    if start > 0 {
        format!("...{window}")
    } else {
        window
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::models::{KeywordCategory, NewKeyword};
    use crate::store::StoreError;

    struct FakeKeywords(Vec<KeywordRecord>);

    impl KeywordStore for FakeKeywords {
        fn list_active(&self) -> StoreResult<Vec<KeywordRecord>> {
            Ok(self.0.clone())
        }

        fn insert(&self, _keyword: NewKeyword) -> StoreResult<i64> {
            Ok(0)
        }

        fn update(
            &self,
            _id: i64,
            _phrase: &str,
            _category: KeywordCategory,
            _severity: Severity,
        ) -> StoreResult<()> {
            Ok(())
        }

        fn soft_delete(&self, _id: i64) -> StoreResult<()> {
            Ok(())
        }
    }

    struct FailingKeywords;

    impl KeywordStore for FailingKeywords {
        fn list_active(&self) -> StoreResult<Vec<KeywordRecord>> {
            Err(StoreError::Backend("keyword store down".into()))
        }

        fn insert(&self, _keyword: NewKeyword) -> StoreResult<i64> {
            Err(StoreError::Backend("keyword store down".into()))
        }

        fn update(
            &self,
            _id: i64,
            _phrase: &str,
            _category: KeywordCategory,
            _severity: Severity,
        ) -> StoreResult<()> {
            Err(StoreError::Backend("keyword store down".into()))
        }

        fn soft_delete(&self, _id: i64) -> StoreResult<()> {
            Err(StoreError::Backend("keyword store down".into()))
        }
    }

    #[derive(Default)]
    struct FakeDetections {
        rows: Mutex<Vec<NewDetection>>,
        fail: bool,
    }

    impl DetectionStore for FakeDetections {
        fn append(&self, detection: NewDetection) -> StoreResult<i64> {
            if self.fail {
                return Err(StoreError::Backend("detection log down".into()));
            }
            let mut rows = self.rows.lock().unwrap();
            rows.push(detection);
            Ok(rows.len() as i64)
        }

        fn count_since(&self, _since: chrono::DateTime<Utc>) -> StoreResult<i64> {
            Ok(self.rows.lock().unwrap().len() as i64)
        }

        fn list_by_keyword(&self, _keyword_id: i64) -> StoreResult<Vec<crate::models::KeywordDetection>> {
            Ok(Vec::new())
        }

        fn list_recent(&self, _limit: i64) -> StoreResult<Vec<crate::models::KeywordDetection>> {
            Ok(Vec::new())
        }
    }

    fn keyword(id: i64, phrase: &str, severity: Severity) -> KeywordRecord {
        KeywordRecord {
            id,
            phrase: phrase.to_string(),
            category: KeywordCategory::FinancialExploitation,
            severity,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn scanner(
        records: Vec<KeywordRecord>,
        detections: Arc<FakeDetections>,
    ) -> KeywordScanner {
        KeywordScanner::new(Arc::new(FakeKeywords(records)), detections)
    }

    #[test]
    fn detects_and_logs_keyword() {
        let detections = Arc::new(FakeDetections::default());
        let scanner = scanner(
            vec![keyword(1, "bank account", Severity::High)],
            detections.clone(),
        );

        let outcome = scanner
            .scan_message("msg-1", "Please send me your bank account number now")
            .unwrap();

        assert!(outcome.detected);
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].keyword.id, 1);

        let rows = detections.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].message_id, "msg-1");
    }

    #[test]
    fn context_contains_phrase_without_ellipsis_near_start() {
        let detections = Arc::new(FakeDetections::default());
        let scanner = scanner(
            vec![keyword(1, "bank account", Severity::High)],
            detections,
        );

        let outcome = scanner
            .scan_message("msg-1", "Please send me your bank account number now")
            .unwrap();

        let context = &outcome.matches[0].context;
        assert!(context.to_lowercase().contains("bank account"));
        assert!(!context.starts_with("..."));
    }

    #[test]
    fn context_is_ellipsis_prefixed_when_left_truncated() {
        let detections = Arc::new(FakeDetections::default());
        let scanner = scanner(
            vec![keyword(1, "bank account", Severity::High)],
            detections,
        );

        let prefix = "a".repeat(60);
        let text = format!("{prefix} give me your bank account details");
        let outcome = scanner.scan_message("msg-2", &text).unwrap();

        let context = &outcome.matches[0].context;
        assert!(context.starts_with("..."));
        assert!(context.contains("bank account"));
        // "..." plus at most radius + phrase + radius characters.
        let phrase_len = "bank account".chars().count();
        assert!(context.chars().count() <= 3 + CONTEXT_RADIUS * 2 + phrase_len);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let detections = Arc::new(FakeDetections::default());
        let scanner = scanner(
            vec![keyword(1, "Bank Account", Severity::High)],
            detections,
        );

        let outcome = scanner
            .scan_message("msg-3", "BANK ACCOUNT details please")
            .unwrap();
        assert!(outcome.detected);
    }

    #[test]
    fn empty_text_short_circuits_without_store_access() {
        let detections = Arc::new(FakeDetections::default());
        let scanner = KeywordScanner::new(Arc::new(FailingKeywords), detections);

        // The keyword store errors on every call, so an empty outcome proves
        // the store was never touched.
        let outcome = scanner.scan_message("msg-4", "   ").unwrap();
        assert!(!outcome.detected);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn keyword_store_failure_propagates() {
        let detections = Arc::new(FakeDetections::default());
        let scanner = KeywordScanner::new(Arc::new(FailingKeywords), detections);

        let result = scanner.scan_message("msg-5", "some real text");
        assert!(result.is_err());
    }

    #[test]
    fn detection_log_failure_does_not_abort_scan() {
        let detections = Arc::new(FakeDetections {
            rows: Mutex::new(Vec::new()),
            fail: true,
        });
        let scanner = scanner(
            vec![keyword(1, "bank account", Severity::High)],
            detections,
        );

        let outcome = scanner
            .scan_message("msg-6", "my bank account is empty")
            .unwrap();
        assert!(outcome.detected);
        assert_eq!(outcome.matches.len(), 1);
    }

    #[test]
    fn critical_hook_reflects_severity() {
        let detections = Arc::new(FakeDetections::default());
        let critical_scanner = scanner(
            vec![
                keyword(1, "bank account", Severity::High),
                keyword(2, "meet me alone", Severity::Critical),
            ],
            detections,
        );

        let outcome = critical_scanner
            .scan_message("msg-7", "meet me alone by the bank account office")
            .unwrap();
        assert!(outcome.has_critical());

        let detections = Arc::new(FakeDetections::default());
        let scanner = scanner(
            vec![keyword(1, "bank account", Severity::High)],
            detections,
        );
        let outcome = scanner
            .scan_message("msg-8", "my bank account")
            .unwrap();
        assert!(!outcome.has_critical());
    }

    #[test]
    fn multiple_keywords_all_reported() {
        let detections = Arc::new(FakeDetections::default());
        let scanner = scanner(
            vec![
                keyword(1, "wire transfer", Severity::High),
                keyword(2, "gift card", Severity::Medium),
            ],
            detections.clone(),
        );

        let outcome = scanner
            .scan_message("msg-9", "do a wire transfer or buy a gift card")
            .unwrap();
        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(detections.rows.lock().unwrap().len(), 2);
    }

    #[test]
    fn context_snippet_windows() {
        let text = "Please send me your bank account number now";
        let start = text.find("bank").unwrap(); // ASCII, char == byte index
        let snippet = context_snippet(text, start, "bank account".chars().count());
        assert_eq!(snippet, text); // whole message fits in the window
    }
}
