//! Domain models for the safety pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity tiers for keywords, detections, and classified reports.
///
/// Ordered from least to most urgent, so `Severity::Critical` compares
/// greater than every other tier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// No concerning content identified.
    Low,
    /// Interpersonal friction, worth a look but not urgent.
    Medium,
    /// Serious but not immediately dangerous.
    High,
    /// Danger, violence, or self-harm indicators.
    Critical,
}

impl Severity {
    /// Returns all severity tiers in ascending order.
    pub fn all() -> &'static [Severity] {
        &[
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ]
    }

    /// Returns a human-readable name for this tier.
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Parse from a database string or an external model label.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

/// Categories a keyword or suggestion can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    /// Requests for money, account details, or payment rails.
    FinancialExploitation,
    /// Attempts to extract addresses, credentials, or identifiers.
    PersonalInformation,
    /// Sexual or otherwise inappropriate content.
    InappropriateContent,
    /// Threats, coercion, or harassment.
    AbuseHarassment,
}

impl KeywordCategory {
    /// Returns all available categories.
    pub fn all() -> &'static [KeywordCategory] {
        &[
            KeywordCategory::FinancialExploitation,
            KeywordCategory::PersonalInformation,
            KeywordCategory::InappropriateContent,
            KeywordCategory::AbuseHarassment,
        ]
    }

    /// Returns a human-readable name for this category.
    pub fn name(&self) -> &'static str {
        match self {
            KeywordCategory::FinancialExploitation => "Financial Exploitation",
            KeywordCategory::PersonalInformation => "Personal Information",
            KeywordCategory::InappropriateContent => "Inappropriate Content",
            KeywordCategory::AbuseHarassment => "Abuse & Harassment",
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordCategory::FinancialExploitation => "financial_exploitation",
            KeywordCategory::PersonalInformation => "personal_information",
            KeywordCategory::InappropriateContent => "inappropriate_content",
            KeywordCategory::AbuseHarassment => "abuse_harassment",
        }
    }

    /// Parse from a database string or a human-readable name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "financial_exploitation" | "Financial Exploitation" => {
                Some(KeywordCategory::FinancialExploitation)
            }
            "personal_information" | "Personal Information" => {
                Some(KeywordCategory::PersonalInformation)
            }
            "inappropriate_content" | "Inappropriate Content" => {
                Some(KeywordCategory::InappropriateContent)
            }
            "abuse_harassment" | "Abuse & Harassment" => Some(KeywordCategory::AbuseHarassment),
            _ => None,
        }
    }
}

/// An active or retired keyword in the detection corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRecord {
    /// Unique identifier.
    pub id: i64,
    /// The phrase matched against message text (case-insensitively).
    pub phrase: String,
    /// Category this keyword belongs to.
    pub category: KeywordCategory,
    /// Severity assigned to detections of this keyword.
    pub severity: Severity,
    /// Whether the keyword is currently matched. Keywords are soft-deleted
    /// (active = false) so detection history stays referentially intact.
    pub active: bool,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating a new keyword.
#[derive(Debug, Clone)]
pub struct NewKeyword {
    /// The phrase to match.
    pub phrase: String,
    /// Category for the keyword.
    pub category: KeywordCategory,
    /// Severity for detections of the keyword.
    pub severity: Severity,
}

/// A logged keyword hit. Append-only audit trail, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordDetection {
    /// Unique identifier.
    pub id: i64,
    /// The keyword that matched.
    pub keyword_id: i64,
    /// The message the keyword was found in.
    pub message_id: String,
    /// Excerpt of the message surrounding the match. Always contains the
    /// matched phrase plus up to 30 characters on each side, prefixed with
    /// "..." when truncated on the left.
    pub context_snippet: String,
    /// When the detection was logged.
    pub detected_at: DateTime<Utc>,
}

/// Parameters for logging a new detection.
#[derive(Debug, Clone)]
pub struct NewDetection {
    /// The keyword that matched.
    pub keyword_id: i64,
    /// The message the keyword was found in.
    pub message_id: String,
    /// Context excerpt around the match.
    pub context_snippet: String,
}

/// Review state of a mined suggestion. Accepted and rejected are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    /// Awaiting admin review.
    Pending,
    /// Promoted (or eligible for promotion) into the keyword corpus.
    Accepted,
    /// Dismissed by an admin.
    Rejected,
}

impl SuggestionStatus {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionStatus::Pending => "pending",
            SuggestionStatus::Accepted => "accepted",
            SuggestionStatus::Rejected => "rejected",
        }
    }

    /// Parse from database string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SuggestionStatus::Pending),
            "accepted" => Some(SuggestionStatus::Accepted),
            "rejected" => Some(SuggestionStatus::Rejected),
            _ => None,
        }
    }
}

/// A mined phrase proposed for addition to the keyword corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordSuggestion {
    /// Unique identifier.
    pub id: i64,
    /// The proposed phrase.
    pub phrase: String,
    /// Category assigned by the mining ruleset.
    pub category: KeywordCategory,
    /// Severity assigned by the mining ruleset.
    pub severity: Severity,
    /// How often the phrase appeared in the mining window.
    pub detection_count: i64,
    /// Review state.
    pub status: SuggestionStatus,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
}

/// Parameters for persisting a new suggestion.
#[derive(Debug, Clone)]
pub struct NewSuggestion {
    /// The proposed phrase.
    pub phrase: String,
    /// Category assigned by the mining ruleset.
    pub category: KeywordCategory,
    /// Severity assigned by the mining ruleset.
    pub severity: Severity,
    /// Frequency within the mining window at generation time.
    pub detection_count: i64,
}

/// A persisted message, as read back for mining.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Message identifier in the surrounding platform.
    pub id: String,
    /// Full message text.
    pub text: String,
    /// When the message was sent.
    pub sent_at: DateTime<Utc>,
}
