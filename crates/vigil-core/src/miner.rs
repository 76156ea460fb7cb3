//! Phrase-frequency mining over the message history.
//!
//! The miner extracts 2..4-token n-grams from recent messages, keeps those
//! matching a bank of dangerous-pattern regexes and not already in the
//! active corpus, aggregates them by frequency with example excerpts,
//! classifies each surviving phrase, and proposes the top candidates as
//! pending keyword suggestions.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use regex::RegexSet;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::{KeywordCategory, NewSuggestion, Severity};
use crate::store::{KeywordStore, MessageStore, StoreResult, SuggestionStore};

/// Default mining window in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Maximum number of candidates returned per run.
pub const MAX_SUGGESTIONS: usize = 20;

/// Example excerpts kept per distinct phrase.
const EXAMPLE_LIMIT: usize = 3;

/// Length of each example excerpt in characters.
const EXCERPT_LEN: usize = 100;

/// N-gram sizes considered as candidate phrases.
const NGRAM_SIZES: [usize; 3] = [2, 3, 4];

/// A mined phrase proposed for review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionCandidate {
    /// The candidate phrase (lowercased, single-space joined).
    pub phrase: String,
    /// Category assigned by the mining ruleset.
    pub category: KeywordCategory,
    /// Severity assigned by the mining ruleset.
    pub severity: Severity,
    /// How often the phrase appeared in the window.
    pub count: i64,
    /// Up to three source-message excerpts containing the phrase.
    pub examples: Vec<String>,
    /// Human-readable summary embedding count, category, and window.
    pub reason: String,
}

#[derive(Default)]
struct PhraseAggregate {
    count: i64,
    examples: Vec<String>,
}

/// Mines the message corpus for new keyword suggestions.
pub struct SuggestionMiner {
    messages: Arc<dyn MessageStore>,
    keywords: Arc<dyn KeywordStore>,
    suggestions: Arc<dyn SuggestionStore>,
    danger_patterns: RegexSet,
}

impl SuggestionMiner {
    /// Creates a miner over the given stores.
    pub fn new(
        messages: Arc<dyn MessageStore>,
        keywords: Arc<dyn KeywordStore>,
        suggestions: Arc<dyn SuggestionStore>,
    ) -> Self {
        let danger_patterns = RegexSet::new([
            // financial
            r"\b(?:bank|account|money|cash|wire|transfer|payment|bitcoin|crypto|paypal|venmo|zelle)\b",
            // personal information
            r"\b(?:address|phone|password|passport|ssn|social security|credit card|date of birth)\b",
            // inappropriate content
            r"\b(?:nude|nudes|naked|sexy|sext|explicit|private pics?)\b",
            // threats and abuse
            r"\b(?:hurt you|kill you|threat|threaten|scared|afraid|force you|abuse|secret)\b",
            // scam indicators
            r"\b(?:urgent|emergency|act now|gift ?card|western union|wire me|send me|prize|winner|inheritance)\b",
        ])
        .expect("dangerous pattern regexes are valid");

        Self {
            messages,
            keywords,
            suggestions,
            danger_patterns,
        }
    }

    /// Extracts, filters, aggregates, classifies, and ranks candidate
    /// phrases from messages in the last `days_back` days.
    pub fn generate_suggestions(&self, days_back: i64) -> StoreResult<Vec<SuggestionCandidate>> {
        let since = Utc::now() - Duration::days(days_back);
        let messages = self.messages.list_since(since)?;

        let known: HashSet<String> = self
            .keywords
            .list_active()?
            .into_iter()
            .map(|record| record.phrase.to_lowercase())
            .collect();

        let mut aggregates: HashMap<String, PhraseAggregate> = HashMap::new();

        for message in &messages {
            let lower = message.text.to_lowercase();
            let tokens: Vec<&str> = lower.split_whitespace().collect();

            for n in NGRAM_SIZES {
                if tokens.len() < n {
                    continue;
                }
                for window in tokens.windows(n) {
                    let candidate = window.join(" ");
                    if known.contains(&candidate) || !self.danger_patterns.is_match(&candidate) {
                        continue;
                    }

                    let aggregate = aggregates.entry(candidate).or_default();
                    aggregate.count += 1;
                    if aggregate.examples.len() < EXAMPLE_LIMIT {
                        let excerpt: String = message.text.chars().take(EXCERPT_LEN).collect();
                        if !aggregate.examples.contains(&excerpt) {
                            aggregate.examples.push(excerpt);
                        }
                    }
                }
            }
        }

        let mut candidates: Vec<SuggestionCandidate> = aggregates
            .into_iter()
            .map(|(phrase, aggregate)| {
                let (category, severity) = classify_phrase(&phrase);
                let reason = format!(
                    "\"{}\" appeared {} time(s) in messages from the last {} days ({})",
                    phrase,
                    aggregate.count,
                    days_back,
                    category.name(),
                );
                SuggestionCandidate {
                    phrase,
                    category,
                    severity,
                    count: aggregate.count,
                    examples: aggregate.examples,
                    reason,
                }
            })
            .collect();

        candidates.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.phrase.cmp(&b.phrase)));
        candidates.truncate(MAX_SUGGESTIONS);

        Ok(candidates)
    }

    /// Persists candidates as pending suggestions. One failed insert is
    /// logged and skipped; the rest of the batch still goes through.
    /// Returns the number actually saved.
    pub fn save_suggestions(&self, candidates: &[SuggestionCandidate]) -> usize {
        let mut saved = 0;
        for candidate in candidates {
            let suggestion = NewSuggestion {
                phrase: candidate.phrase.clone(),
                category: candidate.category,
                severity: candidate.severity,
                detection_count: candidate.count,
            };
            match self.suggestions.insert(suggestion) {
                Ok(_) => saved += 1,
                Err(err) => {
                    warn!(phrase = %candidate.phrase, error = %err, "failed to save suggestion");
                }
            }
        }
        saved
    }

    /// Runs a full mining pass: generate, persist, and report the number of
    /// candidates generated.
    pub fn run_suggestion_generation(&self, days_back: i64) -> StoreResult<usize> {
        let candidates = self.generate_suggestions(days_back)?;
        let saved = self.save_suggestions(&candidates);
        info!(
            generated = candidates.len(),
            saved, days_back, "suggestion mining pass complete"
        );
        Ok(candidates.len())
    }
}

/// Classifies a surviving phrase into (category, severity).
///
/// This ruleset is intentionally separate from the report classifier: it
/// works per category with a critical-vs-high sub-rule rather than ordered
/// severity buckets.
fn classify_phrase(phrase: &str) -> (KeywordCategory, Severity) {
    const FINANCIAL: &[&str] = &[
        "bank", "account", "money", "cash", "wire", "transfer", "payment", "bitcoin", "crypto",
        "paypal", "venmo", "zelle",
    ];
    const FINANCIAL_CRITICAL: &[&str] = &["bank", "account", "wire"];
    const PERSONAL: &[&str] = &[
        "address",
        "phone",
        "password",
        "passport",
        "ssn",
        "social security",
        "credit card",
        "date of birth",
    ];
    const PERSONAL_CRITICAL: &[&str] = &["password", "ssn", "social security", "credit card"];
    const INAPPROPRIATE: &[&str] = &["nude", "naked", "sexy", "sext", "explicit"];
    const ABUSE: &[&str] = &[
        "hurt", "kill", "threat", "scared", "afraid", "force", "abuse", "secret",
    ];
    const ABUSE_CRITICAL: &[&str] = &["hurt", "kill", "threat"];

    let contains_any = |terms: &[&str]| terms.iter().any(|term| phrase.contains(term));

    if contains_any(FINANCIAL) {
        let severity = if contains_any(FINANCIAL_CRITICAL) {
            Severity::Critical
        } else {
            Severity::High
        };
        (KeywordCategory::FinancialExploitation, severity)
    } else if contains_any(PERSONAL) {
        let severity = if contains_any(PERSONAL_CRITICAL) {
            Severity::Critical
        } else {
            Severity::High
        };
        (KeywordCategory::PersonalInformation, severity)
    } else if contains_any(INAPPROPRIATE) {
        (KeywordCategory::InappropriateContent, Severity::High)
    } else if contains_any(ABUSE) {
        let severity = if contains_any(ABUSE_CRITICAL) {
            Severity::Critical
        } else {
            Severity::High
        };
        (KeywordCategory::AbuseHarassment, severity)
    } else {
        (KeywordCategory::InappropriateContent, Severity::Medium)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{DateTime, Utc};

    use super::*;
    use crate::models::{
        KeywordDetection, KeywordRecord, KeywordSuggestion, NewKeyword, StoredMessage,
        SuggestionStatus,
    };
    use crate::store::StoreError;

    struct FakeMessages(Vec<StoredMessage>);

    impl MessageStore for FakeMessages {
        fn list_since(&self, _since: DateTime<Utc>) -> StoreResult<Vec<StoredMessage>> {
            Ok(self.0.clone())
        }
    }

    struct FakeKeywords(Vec<String>);

    impl KeywordStore for FakeKeywords {
        fn list_active(&self) -> StoreResult<Vec<KeywordRecord>> {
            Ok(self
                .0
                .iter()
                .enumerate()
                .map(|(i, phrase)| KeywordRecord {
                    id: i as i64 + 1,
                    phrase: phrase.clone(),
                    category: KeywordCategory::FinancialExploitation,
                    severity: Severity::High,
                    active: true,
                    created_at: Utc::now(),
                })
                .collect())
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

    #[derive(Default)]
    struct FakeSuggestions {
        rows: Mutex<Vec<NewSuggestion>>,
        fail_on_phrase: Option<String>,
    }

    impl SuggestionStore for FakeSuggestions {
        fn list_pending(&self) -> StoreResult<Vec<KeywordSuggestion>> {
            Ok(Vec::new())
        }

        fn insert(&self, suggestion: NewSuggestion) -> StoreResult<i64> {
            if self.fail_on_phrase.as_deref() == Some(suggestion.phrase.as_str()) {
                return Err(StoreError::Backend("suggestion store down".into()));
            }
            let mut rows = self.rows.lock().unwrap();
            rows.push(suggestion);
            Ok(rows.len() as i64)
        }

        fn update_status(&self, _id: i64, _status: SuggestionStatus) -> StoreResult<()> {
            Ok(())
        }
    }

    fn message(id: &str, text: &str) -> StoredMessage {
        StoredMessage {
            id: id.to_string(),
            text: text.to_string(),
            sent_at: Utc::now(),
        }
    }

    fn miner(
        messages: Vec<StoredMessage>,
        known: Vec<String>,
        suggestions: Arc<FakeSuggestions>,
    ) -> SuggestionMiner {
        SuggestionMiner::new(
            Arc::new(FakeMessages(messages)),
            Arc::new(FakeKeywords(known)),
            suggestions,
        )
    }

    #[test]
    fn ranks_candidates_by_frequency() {
        let mut messages: Vec<StoredMessage> = (0..5)
            .map(|i| message(&format!("m{i}"), "bitcoin payment"))
            .collect();
        messages.push(message("m5", "gift card"));
        messages.push(message("m6", "gift card"));

        let miner = miner(messages, vec![], Arc::new(FakeSuggestions::default()));
        let candidates = miner.generate_suggestions(7).unwrap();

        assert_eq!(candidates[0].phrase, "bitcoin payment");
        assert_eq!(candidates[0].count, 5);
        assert!(candidates.iter().any(|c| c.phrase == "gift card" && c.count == 2));
    }

    #[test]
    fn excludes_known_active_phrases() {
        let messages = vec![message("m1", "bitcoin payment")];
        let miner = miner(
            messages,
            vec!["bitcoin payment".to_string()],
            Arc::new(FakeSuggestions::default()),
        );

        let candidates = miner.generate_suggestions(7).unwrap();
        assert!(candidates.iter().all(|c| c.phrase != "bitcoin payment"));
    }

    #[test]
    fn skips_benign_ngrams() {
        let messages = vec![message("m1", "see you at the park tomorrow")];
        let miner = miner(messages, vec![], Arc::new(FakeSuggestions::default()));

        let candidates = miner.generate_suggestions(7).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn collects_example_excerpts() {
        let long_tail = "x".repeat(200);
        let text = format!("send me bitcoin {long_tail}");
        let messages = vec![message("m1", &text)];
        let miner = miner(messages, vec![], Arc::new(FakeSuggestions::default()));

        let candidates = miner.generate_suggestions(7).unwrap();
        let candidate = candidates
            .iter()
            .find(|c| c.phrase == "send me bitcoin")
            .unwrap();

        assert_eq!(candidate.examples.len(), 1);
        assert_eq!(candidate.examples[0].chars().count(), EXCERPT_LEN);
    }

    #[test]
    fn caps_examples_at_three() {
        let messages = vec![
            message("m1", "wire transfer one"),
            message("m2", "wire transfer two"),
            message("m3", "wire transfer three"),
            message("m4", "wire transfer four"),
        ];
        let miner = miner(messages, vec![], Arc::new(FakeSuggestions::default()));

        let candidates = miner.generate_suggestions(7).unwrap();
        let candidate = candidates
            .iter()
            .find(|c| c.phrase == "wire transfer")
            .unwrap();

        assert_eq!(candidate.count, 4);
        assert_eq!(candidate.examples.len(), EXAMPLE_LIMIT);
    }

    #[test]
    fn truncates_to_top_twenty() {
        // 25 distinct surviving bigrams, one occurrence each.
        let messages: Vec<StoredMessage> = (0..25)
            .map(|i| message(&format!("m{i}"), &format!("wire shipment{i}")))
            .collect();
        let miner = miner(messages, vec![], Arc::new(FakeSuggestions::default()));

        let candidates = miner.generate_suggestions(7).unwrap();
        assert_eq!(candidates.len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn reason_embeds_count_and_window() {
        let messages = vec![message("m1", "bitcoin payment")];
        let miner = miner(messages, vec![], Arc::new(FakeSuggestions::default()));

        let candidates = miner.generate_suggestions(14).unwrap();
        let candidate = &candidates[0];
        assert!(candidate.reason.contains("14 days"));
        assert!(candidate.reason.contains(&candidate.phrase));
        assert!(candidate.reason.contains(candidate.category.name()));
    }

    #[test]
    fn save_continues_past_individual_failures() {
        let suggestions = Arc::new(FakeSuggestions {
            rows: Mutex::new(Vec::new()),
            fail_on_phrase: Some("bitcoin payment".to_string()),
        });
        let messages = vec![
            message("m1", "bitcoin payment"),
            message("m2", "gift card"),
        ];
        let miner = miner(messages, vec![], suggestions.clone());

        let candidates = miner.generate_suggestions(7).unwrap();
        let saved = miner.save_suggestions(&candidates);

        assert_eq!(saved, candidates.len() - 1);
        let rows = suggestions.rows.lock().unwrap();
        assert!(rows.iter().all(|s| s.phrase != "bitcoin payment"));
    }

    #[test]
    fn run_reports_generated_count() {
        let suggestions = Arc::new(FakeSuggestions::default());
        let messages = vec![message("m1", "bitcoin payment")];
        let miner = miner(messages, vec![], suggestions.clone());

        let generated = miner.run_suggestion_generation(7).unwrap();
        assert_eq!(generated, 1);
        assert_eq!(suggestions.rows.lock().unwrap().len(), 1);
    }

    #[test]
    fn classify_phrase_financial() {
        assert_eq!(
            classify_phrase("bitcoin payment"),
            (KeywordCategory::FinancialExploitation, Severity::High)
        );
        assert_eq!(
            classify_phrase("your bank account"),
            (KeywordCategory::FinancialExploitation, Severity::Critical)
        );
    }

    #[test]
    fn classify_phrase_personal() {
        assert_eq!(
            classify_phrase("your password now"),
            (KeywordCategory::PersonalInformation, Severity::Critical)
        );
        assert_eq!(
            classify_phrase("home address please"),
            (KeywordCategory::PersonalInformation, Severity::High)
        );
    }

    #[test]
    fn classify_phrase_abuse() {
        assert_eq!(
            classify_phrase("will hurt you"),
            (KeywordCategory::AbuseHarassment, Severity::Critical)
        );
        assert_eq!(
            classify_phrase("keep it secret"),
            (KeywordCategory::AbuseHarassment, Severity::High)
        );
    }

    #[test]
    fn classify_phrase_inappropriate_default() {
        assert_eq!(
            classify_phrase("send nudes"),
            (KeywordCategory::InappropriateContent, Severity::High)
        );
    }
}
