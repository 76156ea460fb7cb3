//! External severity model with transparent fallback.
//!
//! The external classifier is a strategy behind [`SeverityModel`]; the
//! [`FallbackSeverityClassifier`] decorator composes it with the rule path
//! so callers never observe a classifier failure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::rules::RuleSeverityClassifier;
use crate::models::Severity;

/// Errors from the external severity model path.
///
/// These never escape the fallback decorator; they exist so model
/// implementations and tests can describe what went wrong.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// No API key was configured.
    #[error("no API key configured for external classifier")]
    MissingCredentials,

    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("unexpected response status: {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    /// The response did not carry a recognized severity label.
    #[error("unrecognized severity label: {0:?}")]
    UnrecognizedLabel(String),

    /// Every configured model identifier failed.
    #[error("all external severity models failed")]
    Exhausted,
}

/// Strategy interface for an external severity classifier.
#[async_trait]
pub trait SeverityModel: Send + Sync {
    /// Classifies free text into one of the four severity tiers.
    async fn classify(&self, text: &str) -> Result<Severity, ClassifierError>;

    /// Returns the name of this model for logging.
    fn name(&self) -> &'static str;
}

/// Configuration for the HTTP-backed external classifier.
#[derive(Debug, Clone)]
pub struct ExternalClassifierConfig {
    /// Bearer token for the endpoint. `None` fails over immediately.
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible chat-completions API.
    pub base_url: String,
    /// Model identifiers tried in order until one returns a recognized label.
    pub models: Vec<String>,
    /// Per-attempt request timeout.
    pub timeout: Duration,
}

impl Default for ExternalClassifierConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            models: vec!["gpt-4o-mini".to_string(), "gpt-4o".to_string()],
            timeout: Duration::from_secs(5),
        }
    }
}

const CLASSIFY_PROMPT: &str = "You are a safety triage assistant. Classify the severity of the \
following user safety report. Respond with exactly one word: low, medium, high, or critical.";

/// Severity classifier backed by an OpenAI-compatible HTTP endpoint.
pub struct ExternalSeverityClassifier {
    config: ExternalClassifierConfig,
    client: Client,
}

impl ExternalSeverityClassifier {
    /// Creates a classifier from the given configuration.
    pub fn new(config: ExternalClassifierConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("default TLS backend is available");

        Self { config, client }
    }

    async fn attempt(
        &self,
        api_key: &str,
        model: &str,
        text: &str,
    ) -> Result<Severity, ClassifierError> {
        let body = json!({
            "model": model,
            "messages": [
                {"role": "system", "content": CLASSIFY_PROMPT},
                {"role": "user", "content": text},
            ],
            "max_tokens": 4,
            "temperature": 0,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::UnexpectedStatus(status));
        }

        let payload: Value = response.json().await?;
        let label = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default();

        parse_label(label).ok_or_else(|| ClassifierError::UnrecognizedLabel(label.to_string()))
    }
}

#[async_trait]
impl SeverityModel for ExternalSeverityClassifier {
    async fn classify(&self, text: &str) -> Result<Severity, ClassifierError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ClassifierError::MissingCredentials)?;

        for model in &self.config.models {
            match self.attempt(api_key, model, text).await {
                Ok(severity) => return Ok(severity),
                Err(err) => {
                    warn!(model = %model, error = %err, "external severity model attempt failed");
                }
            }
        }

        Err(ClassifierError::Exhausted)
    }

    fn name(&self) -> &'static str {
        "external-http"
    }
}

/// Parses a model response into a severity tier, tolerating surrounding
/// whitespace, quotes, and punctuation.
fn parse_label(label: &str) -> Option<Severity> {
    let cleaned: String = label
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();
    Severity::parse(&cleaned)
}

/// Severity classifier that prefers an external model and falls back to the
/// deterministic rule path on any failure. The combined path never errors.
pub struct FallbackSeverityClassifier {
    external: Option<Arc<dyn SeverityModel>>,
    rules: RuleSeverityClassifier,
}

impl FallbackSeverityClassifier {
    /// Rule-path-only classifier (external slot empty).
    pub fn rule_only() -> Self {
        Self {
            external: None,
            rules: RuleSeverityClassifier::new(),
        }
    }

    /// Classifier preferring the given external model.
    pub fn with_external(model: Arc<dyn SeverityModel>) -> Self {
        Self {
            external: Some(model),
            rules: RuleSeverityClassifier::new(),
        }
    }

    /// Returns true if an external model is configured.
    pub fn has_external(&self) -> bool {
        self.external.is_some()
    }

    /// Classifies free text. Any external failure (credentials, transport,
    /// malformed or unrecognized response) falls back to the rule path
    /// invisibly.
    pub async fn classify(&self, text: &str) -> Severity {
        if text.trim().is_empty() {
            return Severity::Low;
        }

        if let Some(model) = &self.external {
            match model.classify(text).await {
                Ok(severity) => return severity,
                Err(err) => {
                    debug!(model = model.name(), error = %err, "falling back to rule classifier");
                }
            }
        }

        self.rules.classify(text)
    }
}
