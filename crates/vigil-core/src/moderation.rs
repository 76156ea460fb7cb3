//! Pre-send moderation gate for outgoing messages.
//!
//! A fixed BLOCKED list (financial-account and credential-sharing phrases)
//! is scanned first; any hit blocks the message outright and flags it for
//! admin attention. A softer WARNING list is scanned only when nothing was
//! blocked, collecting every hit. The result is a transient value object;
//! persisting it is the caller's business.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Severity of a moderation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationSeverity {
    /// Nothing concerning found.
    Safe,
    /// Allowed, but the sender should see a caution.
    Warning,
    /// The message must not be sent.
    Blocked,
}

/// What the caller should do with the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Deliver normally.
    Allow,
    /// Deliver, but show the sender a warning.
    WarnUser,
    /// Do not deliver.
    BlockMessage,
}

/// Outcome of moderating a single message or media item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationResult {
    /// Whether the message may be delivered.
    pub is_allowed: bool,
    /// Decision severity.
    pub severity: ModerationSeverity,
    /// Human-readable explanation, when not safe.
    pub reason: Option<String>,
    /// Issue tags and matched terms.
    pub detected_issues: Vec<String>,
    /// Recommended handling.
    pub suggested_action: SuggestedAction,
    /// Whether an admin should be notified.
    pub admin_notification_required: bool,
}

impl ModerationResult {
    /// A clean pass-through result.
    pub fn safe() -> Self {
        Self {
            is_allowed: true,
            severity: ModerationSeverity::Safe,
            reason: None,
            detected_issues: Vec::new(),
            suggested_action: SuggestedAction::Allow,
            admin_notification_required: false,
        }
    }

    fn blocked(term: &str) -> Self {
        Self {
            is_allowed: false,
            severity: ModerationSeverity::Blocked,
            reason: Some("message requests financial or account details".to_string()),
            detected_issues: vec!["financial_request".to_string(), term.to_string()],
            suggested_action: SuggestedAction::BlockMessage,
            admin_notification_required: true,
        }
    }

    fn warning(issues: Vec<String>) -> Self {
        Self {
            is_allowed: true,
            severity: ModerationSeverity::Warning,
            reason: Some("message contains terms often used in financial solicitation".to_string()),
            detected_issues: issues,
            suggested_action: SuggestedAction::WarnUser,
            admin_notification_required: false,
        }
    }
}

/// Phrases that block a message outright.
const BLOCKED_TERMS: &[&str] = &[
    "bank account",
    "wire transfer",
    "routing number",
    "account number",
    "credit card number",
    "card number",
    "social security",
    "password",
    "gift card",
    "western union",
    "moneygram",
    "bitcoin wallet",
    "crypto wallet",
    "venmo me",
    "cash app",
];

/// Softer financial-intent terms that warrant a warning.
const WARNING_TERMS: &[&str] = &[
    "loan", "invest", "urgent", "send", "transfer", "money", "crypto", "payment", "fee",
];

/// Pre-send moderation gate.
#[derive(Debug, Clone, Default)]
pub struct ModerationGate;

impl ModerationGate {
    /// Creates a new gate.
    pub fn new() -> Self {
        Self
    }

    /// Moderates an outgoing text message. BLOCKED terms are checked first
    /// and win over WARNING terms; warning hits are collected exhaustively.
    /// Blank text is safe without any matching.
    pub fn moderate_message(
        &self,
        text: &str,
        sender_id: &str,
        receiver_id: &str,
        session_id: &str,
    ) -> ModerationResult {
        if text.trim().is_empty() {
            return ModerationResult::safe();
        }

        let lower = text.to_lowercase();

        for term in BLOCKED_TERMS.iter().copied() {
            if lower.contains(term) {
                warn!(
                    sender_id,
                    receiver_id, session_id, term, "blocked outgoing message"
                );
                return ModerationResult::blocked(term);
            }
        }

        let hits: Vec<String> = WARNING_TERMS
            .iter()
            .copied()
            .filter(|term| lower.contains(term))
            .map(str::to_string)
            .collect();

        if !hits.is_empty() {
            debug!(
                sender_id,
                receiver_id,
                session_id,
                terms = ?hits,
                "outgoing message flagged with warning"
            );
            return ModerationResult::warning(hits);
        }

        ModerationResult::safe()
    }

    /// Moderates a media item. Currently a pass-through: the seam exists for
    /// a future binary-content classifier.
    pub fn moderate_media(&self, url: &str, media_type: &str, sender_id: &str) -> ModerationResult {
        debug!(url, media_type, sender_id, "media moderation pass-through");
        ModerationResult::safe()
    }
}
