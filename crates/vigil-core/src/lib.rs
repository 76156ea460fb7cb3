//! Vigil Core - content-analysis pipeline for message safety.
//!
//! This crate implements the deterministic safety pipeline:
//!
//! - Evasion-resistant text normalization ([`normalizer`])
//! - Static blocked-phrase matching ([`blocklist`])
//! - Store-backed keyword detection with audit logging ([`scanner`])
//! - Rule-based severity classification with an optional, swappable
//!   external model ([`classifier`])
//! - Phrase-frequency mining of the message history ([`miner`])
//! - The pre-send moderation gate ([`moderation`])
//!
//! Persistence is abstracted behind the [`store`] traits; `vigil-storage`
//! provides the SQLite implementations.

pub mod blocklist;
pub mod classifier;
pub mod miner;
pub mod models;
pub mod moderation;
pub mod normalizer;
pub mod scanner;
pub mod store;

pub use blocklist::{BlocklistFilter, FilterDecision};
pub use classifier::{
    ExternalClassifierConfig, ExternalSeverityClassifier, FallbackSeverityClassifier,
    RuleSeverityClassifier, SeverityModel,
};
pub use miner::{SuggestionCandidate, SuggestionMiner};
pub use models::{
    KeywordCategory, KeywordDetection, KeywordRecord, KeywordSuggestion, NewDetection, NewKeyword,
    NewSuggestion, Severity, StoredMessage, SuggestionStatus,
};
pub use moderation::{ModerationGate, ModerationResult, ModerationSeverity, SuggestedAction};
pub use normalizer::normalize;
pub use scanner::{KeywordMatch, KeywordScanner, ScanOutcome};
pub use store::{
    DetectionStore, KeywordStore, MessageStore, StoreError, StoreResult, SuggestionStore,
};
