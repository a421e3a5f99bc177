//! Buyer-intent extraction from interaction text
//!
//! Matches content (plus an optional subject line) against case-insensitive
//! regex patterns and reports one signal per intent that matched.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SignalError};

/// Source tag attached to signals found in message content
const CONTENT_SOURCE: &str = "content";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentStrength {
    High,
    Medium,
    Low,
}

impl IntentStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Contribution to `intentNorm`
    pub fn weight(&self) -> f64 {
        match self {
            Self::High => 1.0,
            Self::Medium => 0.5,
            Self::Low => 0.0,
        }
    }
}

/// A detected buyer-intent signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSignal {
    pub intent: String,
    pub strength: IntentStrength,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

/// Pattern definition for one intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentPattern {
    pub intent: String,
    pub strength: IntentStrength,
    pub patterns: Vec<String>,
}

impl IntentPattern {
    fn new(intent: &str, strength: IntentStrength, patterns: &[&str]) -> Self {
        Self {
            intent: intent.to_string(),
            strength,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// The built-in intent set
    pub fn defaults() -> Vec<IntentPattern> {
        use IntentStrength::*;
        vec![
            Self::new(
                "demo_request",
                High,
                &[r"request.*demo", r"schedule.*demo", r"interested in.*demo"],
            ),
            Self::new("trial_signup", High, &[r"trial", r"try.*free"]),
            Self::new(
                "pricing_view",
                Medium,
                &[r"pricing", r"how much", r"cost", r"price", r"budget"],
            ),
            Self::new(
                "case_study",
                Medium,
                &[r"case study", r"success story", r"similar.*company"],
            ),
            Self::new(
                "feature_inquiry",
                Medium,
                &[r"tell me more", r"how does.*work", r"features"],
            ),
            Self::new(
                "postpone",
                Low,
                &[r"postpone", r"next quarter", r"budget.*constraint"],
            ),
        ]
    }
}

/// One intent with its compiled regexes
struct CompiledIntent {
    intent: String,
    strength: IntentStrength,
    regexes: Vec<Regex>,
}

/// Regex-driven intent detector
pub struct IntentDetector {
    intents: Vec<CompiledIntent>,
}

impl Default for IntentDetector {
    fn default() -> Self {
        Self::from_patterns(&IntentPattern::defaults())
            .expect("built-in intent patterns are valid regexes")
    }
}

impl IntentDetector {
    /// Compile a detector; every pattern is matched case-insensitively
    pub fn from_patterns(patterns: &[IntentPattern]) -> Result<Self> {
        let mut intents = Vec::with_capacity(patterns.len());
        for def in patterns {
            let mut regexes = Vec::with_capacity(def.patterns.len());
            for pattern in &def.patterns {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| SignalError::InvalidPattern {
                        intent: def.intent.clone(),
                        source,
                    })?;
                regexes.push(regex);
            }
            intents.push(CompiledIntent {
                intent: def.intent.clone(),
                strength: def.strength,
                regexes,
            });
        }
        Ok(Self { intents })
    }

    pub fn intent_count(&self) -> usize {
        self.intents.len()
    }

    /// Detect intents in content and an optional subject line
    pub fn extract(&self, content: &str, subject: Option<&str>) -> Vec<IntentSignal> {
        let combined = [Some(content), subject]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let signals: Vec<IntentSignal> = self
            .intents
            .iter()
            .filter(|def| def.regexes.iter().any(|r| r.is_match(&combined)))
            .map(|def| IntentSignal {
                intent: def.intent.clone(),
                strength: def.strength,
                source: Some(CONTENT_SOURCE.to_string()),
                count: None,
            })
            .collect();

        debug!(signals = signals.len(), "extracted intent signals");
        signals
    }
}

/// Detect intents with the built-in patterns
pub fn extract_intent(content: &str, subject: Option<&str>) -> Vec<IntentSignal> {
    IntentDetector::default().extract(content, subject)
}

/// Collapse signals to a single value in [0, 1] for `intentNorm`:
/// the strongest signal's weight, or 0 when there are none.
pub fn intent_norm(signals: &[IntentSignal]) -> f64 {
    signals
        .iter()
        .map(|s| s.strength.weight())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intents(signals: &[IntentSignal]) -> Vec<&str> {
        signals.iter().map(|s| s.intent.as_str()).collect()
    }

    #[test]
    fn test_default_detector_compiles_all() {
        let detector = IntentDetector::from_patterns(&IntentPattern::defaults()).unwrap();
        assert_eq!(detector.intent_count(), 6);
        assert_eq!(IntentDetector::default().intent_count(), 6);
    }

    #[test]
    fn test_demo_request() {
        let signals = extract_intent("Could we Schedule a quick DEMO next week?", None);
        assert_eq!(intents(&signals), vec!["demo_request"]);
        assert_eq!(signals[0].strength, IntentStrength::High);
        assert_eq!(signals[0].source.as_deref(), Some("content"));
    }

    #[test]
    fn test_multiple_intents_in_pattern_order() {
        let signals = extract_intent(
            "What does it cost? Also tell me more about the free trial",
            None,
        );
        assert_eq!(
            intents(&signals),
            vec!["trial_signup", "pricing_view", "feature_inquiry"]
        );
    }

    #[test]
    fn test_subject_is_searched() {
        let signals = extract_intent("See attached", Some("Case study request"));
        assert_eq!(intents(&signals), vec!["case_study"]);
    }

    #[test]
    fn test_budget_constraint_is_pricing_and_postpone() {
        let signals = extract_intent("We have budget constraints until next quarter", None);
        assert_eq!(intents(&signals), vec!["pricing_view", "postpone"]);
    }

    #[test]
    fn test_no_intent() {
        assert!(extract_intent("Thanks for the call", None).is_empty());
    }

    #[test]
    fn test_invalid_custom_pattern() {
        let patterns = vec![IntentPattern {
            intent: "broken".into(),
            strength: IntentStrength::Low,
            patterns: vec!["(unclosed".into()],
        }];
        let err = IntentDetector::from_patterns(&patterns).err().unwrap();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_intent_norm_takes_strongest() {
        assert_eq!(intent_norm(&[]), 0.0);
        let signals = extract_intent("pricing and a request for a demo", None);
        assert_eq!(intent_norm(&signals), 1.0);
        let signals = extract_intent("what is the price", None);
        assert_eq!(intent_norm(&signals), 0.5);
    }
}
