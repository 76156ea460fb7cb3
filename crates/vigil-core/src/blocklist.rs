//! Static blocked-phrase matching for outgoing messages.
//!
//! The blocklist is an in-process list spanning several harm categories.
//! Matching runs over normalized text first (so spaced-out and leetspeak
//! evasion is caught), then over the raw lowercased text (so exact
//! multi-word phrases that normalization would fragment still match).

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::normalizer::normalize;

/// Outcome of checking one message against the blocklist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterDecision {
    /// Whether the message should be blocked.
    pub is_blocked: bool,
    /// The blocklist entry that matched, if any.
    pub blocked_word: Option<String>,
    /// Human-readable reason for the block, if any.
    pub reason: Option<String>,
}

impl FilterDecision {
    /// A clean (not blocked) decision.
    pub fn clean() -> Self {
        Self::default()
    }

    /// A blocked decision for the given entry.
    fn blocked(entry: &str) -> Self {
        Self {
            is_blocked: true,
            blocked_word: Some(entry.to_string()),
            reason: Some(format!("message contains blocked term \"{entry}\"")),
        }
    }
}

/// In-process blocklist matcher.
///
/// The entry list lives for the process lifetime. `add_blocked_word` is not
/// synchronized internally; concurrent extenders need external locking and
/// get last-writer-wins semantics otherwise.
pub struct BlocklistFilter {
    entries: Vec<String>,
}

impl BlocklistFilter {
    /// Creates a filter with the default entries across all categories.
    pub fn new() -> Self {
        Self {
            entries: Self::default_entries(),
        }
    }

    /// Creates a filter with a custom entry list (lowercased).
    pub fn with_entries(entries: impl IntoIterator<Item = String>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    /// Checks a message against the blocklist. First match in list order
    /// wins; empty or whitespace-only input is never blocked.
    pub fn filter_message(&self, text: &str) -> FilterDecision {
        if text.trim().is_empty() {
            return FilterDecision::clean();
        }

        let normalized = normalize(text);
        for entry in &self.entries {
            let normalized_entry = normalize(entry);
            if !normalized_entry.is_empty() && normalized.contains(&normalized_entry) {
                return FilterDecision::blocked(entry);
            }
        }

        // Second pass over the raw lowercased text catches exact multi-word
        // phrases that normalization would otherwise fragment.
        let raw = text.to_lowercase();
        for entry in &self.entries {
            if raw.contains(entry.as_str()) {
                return FilterDecision::blocked(entry);
            }
        }

        FilterDecision::clean()
    }

    /// Appends a word to the blocklist, deduplicated case-insensitively.
    /// Process-lifetime only; no persistence.
    pub fn add_blocked_word(&mut self, word: &str) {
        let word = word.trim();
        if word.is_empty() {
            return;
        }
        if self.entries.iter().any(|e| e.eq_ignore_ascii_case(word)) {
            return;
        }
        info!(word, "extending blocklist");
        self.entries.push(word.to_lowercase());
    }

    /// Number of entries currently in the list.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn default_entries() -> Vec<String> {
        [
            Self::violence_terms(),
            Self::sexual_terms(),
            Self::profanity_terms(),
            Self::hate_terms(),
            Self::self_harm_terms(),
            Self::harassment_terms(),
            Self::abuse_indicator_terms(),
        ]
        .concat()
        .into_iter()
        .map(str::to_string)
        .collect()
    }

    fn violence_terms() -> Vec<&'static str> {
        vec![
            "kill you",
            "hurt you",
            "beat you up",
            "shoot you",
            "stab you",
            "make you pay",
            "you will regret",
            "watch your back",
        ]
    }

    fn sexual_terms() -> Vec<&'static str> {
        vec![
            "send nudes",
            "nude pics",
            "naked pics",
            "sext me",
            "strip for me",
        ]
    }

    fn profanity_terms() -> Vec<&'static str> {
        vec!["fuck", "cunt", "bitch", "asshole", "slut", "whore"]
    }

    fn hate_terms() -> Vec<&'static str> {
        vec![
            "white power",
            "racial purity",
            "go back to your country",
            "subhuman",
        ]
    }

    fn self_harm_terms() -> Vec<&'static str> {
        vec![
            "kill yourself",
            "kys",
            "end your life",
            "cut yourself",
            "better off dead",
        ]
    }

    fn harassment_terms() -> Vec<&'static str> {
        vec![
            "nobody likes you",
            "everyone hates you",
            "you should die",
            "worthless piece",
        ]
    }

    fn abuse_indicator_terms() -> Vec<&'static str> {
        vec![
            "keep this secret",
            "our little secret",
            "delete this chat",
            "if you tell anyone",
        ]
    }
}

impl Default for BlocklistFilter {
    fn default() -> Self {
        Self::new()
    }
}
