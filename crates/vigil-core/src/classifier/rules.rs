//! Deterministic keyword-bucket severity classifier.

use crate::models::Severity;

/// Terms indicating immediate danger, violence, or self-harm.
const CRITICAL_TERMS: &[&str] = &[
    "abuse",
    "assault",
    "afraid",
    "danger",
    "emergency",
    "hurt me",
    "kill me",
    "kill you",
    "rape",
    "scared",
    "stalking",
    "suicide",
    "threaten",
    "violence",
    "violent",
    "weapon",
];

/// Serious but not immediately dangerous.
const HIGH_TERMS: &[&str] = &[
    "bully",
    "coerce",
    "concern",
    "exploit",
    "harass",
    "inappropriate",
    "pressure",
    "threat",
    "uncomfortable",
    "unsafe",
];

/// Interpersonal friction.
const MEDIUM_TERMS: &[&str] = &[
    "annoy",
    "argument",
    "conflict",
    "disagreement",
    "frustrat",
    "issue",
    "rude",
    "upset",
];

/// Rule-based severity classifier over free text.
///
/// Buckets are evaluated Critical, then High, then Medium; the first bucket
/// with any case-insensitive substring hit wins, and nothing matching means
/// Low. Classification is not cumulative: text hitting both the Critical
/// and Medium buckets is Critical only. The ordering biases ambiguous text
/// toward the more urgent tier.
#[derive(Debug, Clone, Default)]
pub struct RuleSeverityClassifier;

impl RuleSeverityClassifier {
    /// Creates a new rule classifier.
    pub fn new() -> Self {
        Self
    }

    /// Classifies free text into a severity tier. Empty or whitespace-only
    /// input is Low without any matching.
    pub fn classify(&self, text: &str) -> Severity {
        if text.trim().is_empty() {
            return Severity::Low;
        }

        let lower = text.to_lowercase();
        let buckets: [(&[&str], Severity); 3] = [
            (CRITICAL_TERMS, Severity::Critical),
            (HIGH_TERMS, Severity::High),
            (MEDIUM_TERMS, Severity::Medium),
        ];

        for (terms, severity) in buckets {
            if terms.iter().any(|term| lower.contains(term)) {
                return severity;
            }
        }

        Severity::Low
    }
}
