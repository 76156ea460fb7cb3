//! Severity classification for safety-report text.
//!
//! The deterministic rule path is always available; an external model can be
//! plugged in as a strategy and is transparently backed by the rule path on
//! any failure.

mod external;
mod rules;

pub use external::{
    ClassifierError, ExternalClassifierConfig, ExternalSeverityClassifier,
    FallbackSeverityClassifier, SeverityModel,
};
pub use rules::RuleSeverityClassifier;
