//! Configuration for the learners.
//!
//! Defaults reproduce the tuned constants the scoring pipeline was calibrated
//! against; change them only when re-calibrating downstream ranking.

use serde::{Deserialize, Serialize};

use crate::error::{LearnError, Result};
use crate::types::MlWeights;

/// Full learner configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnerConfig {
    #[serde(default)]
    pub categorical: CategoricalConfig,
    #[serde(default)]
    pub regression: RegressionConfig,
}

/// Settings for the stage/source weight learner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoricalConfig {
    /// Scale applied to the smoothed pos/neg delta (default: 0.15)
    pub learning_rate: f64,
    /// Additive term in the count denominator (default: 2.0)
    pub smoothing: f64,
    /// Lower clamp for learned weights (default: 0.5)
    pub min_weight: f64,
    /// Upper clamp for learned weights (default: 1.5)
    pub max_weight: f64,
}

impl Default for CategoricalConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.15,
            smoothing: 2.0,
            min_weight: 0.5,
            max_weight: 1.5,
        }
    }
}

/// Settings for the logistic-regression trainer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    /// Minimum qualifying records before fitting (default: 3)
    pub min_samples: usize,
    /// Gradient-descent iterations, no early stopping (default: 80)
    pub iterations: usize,
    /// Step size (default: 0.3)
    pub learning_rate: f64,
    /// Logit is clipped to [-clip, clip] before the exponential (default: 500)
    pub logit_clip: f64,
    /// Weights every fit starts from
    pub initial_weights: MlWeights,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            min_samples: 3,
            iterations: 80,
            learning_rate: 0.3,
            logit_clip: crate::regression::DEFAULT_LOGIT_CLIP,
            initial_weights: MlWeights::prior(),
        }
    }
}

impl LearnerConfig {
    /// Parse from TOML and validate
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<()> {
        let c = &self.categorical;
        for (name, value) in [
            ("categorical.learning_rate", c.learning_rate),
            ("categorical.smoothing", c.smoothing),
            ("categorical.min_weight", c.min_weight),
            ("categorical.max_weight", c.max_weight),
        ] {
            ensure_finite(name, value)?;
        }
        if c.smoothing < 0.0 {
            return Err(LearnError::InvalidConfig(format!(
                "categorical.smoothing must be >= 0, got {}",
                c.smoothing
            )));
        }
        if c.min_weight > c.max_weight {
            return Err(LearnError::InvalidConfig(format!(
                "categorical.min_weight ({}) exceeds max_weight ({})",
                c.min_weight, c.max_weight
            )));
        }

        let r = &self.regression;
        ensure_finite("regression.learning_rate", r.learning_rate)?;
        ensure_finite("regression.logit_clip", r.logit_clip)?;
        if r.iterations == 0 {
            return Err(LearnError::InvalidConfig(
                "regression.iterations must be > 0".into(),
            ));
        }
        if r.min_samples == 0 {
            return Err(LearnError::InvalidConfig(
                "regression.min_samples must be > 0".into(),
            ));
        }
        if r.logit_clip <= 0.0 {
            return Err(LearnError::InvalidConfig(format!(
                "regression.logit_clip must be > 0, got {}",
                r.logit_clip
            )));
        }
        if !r.initial_weights.is_finite() {
            return Err(LearnError::InvalidConfig(
                "regression.initial_weights must be finite".into(),
            ));
        }
        Ok(())
    }
}

fn ensure_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LearnError::InvalidConfig(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = LearnerConfig::default();
        assert_eq!(config.categorical.learning_rate, 0.15);
        assert_eq!(config.categorical.smoothing, 2.0);
        assert_eq!(config.categorical.min_weight, 0.5);
        assert_eq!(config.categorical.max_weight, 1.5);
        assert_eq!(config.regression.min_samples, 3);
        assert_eq!(config.regression.iterations, 80);
        assert_eq!(config.regression.learning_rate, 0.3);
        assert_eq!(config.regression.logit_clip, 500.0);
        assert_eq!(config.regression.initial_weights, MlWeights::prior());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = LearnerConfig::from_toml_str(
            r#"
            [categorical]
            learning_rate = 0.2

            [regression]
            iterations = 40
            "#,
        )
        .unwrap();
        assert_eq!(config.categorical.learning_rate, 0.2);
        assert_eq!(config.categorical.smoothing, 2.0);
        assert_eq!(config.regression.iterations, 40);
        assert_eq!(config.regression.learning_rate, 0.3);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = LearnerConfig::from_toml_str("").unwrap();
        assert_eq!(config, LearnerConfig::default());
    }

    #[test]
    fn test_rejects_inverted_clamp() {
        let mut config = LearnerConfig::default();
        config.categorical.min_weight = 2.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds max_weight"));
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let mut config = LearnerConfig::default();
        config.regression.iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_rate() {
        let mut config = LearnerConfig::default();
        config.regression.learning_rate = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(LearnError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_toml_reports_parse_error() {
        let err = LearnerConfig::from_toml_str("[categorical\n").unwrap_err();
        assert!(matches!(err, LearnError::ConfigParse(_)));
    }
}
