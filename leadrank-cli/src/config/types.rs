use leadrank_learn::{CategoricalConfig, LearnerConfig, MlWeights, RegressionConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default feedback window for `learn` and `feedback list`
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLeadrankConfig {
    #[serde(default)]
    pub learning: RawLearningConfig,

    #[serde(default)]
    pub feedback: RawFeedbackConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLearningConfig {
    #[serde(default)]
    pub categorical: RawCategoricalConfig,

    #[serde(default)]
    pub regression: RawRegressionConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCategoricalConfig {
    pub learning_rate: Option<f64>,
    pub smoothing: Option<f64>,
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRegressionConfig {
    pub min_samples: Option<usize>,
    pub iterations: Option<usize>,
    pub learning_rate: Option<f64>,
    pub logit_clip: Option<f64>,
    pub initial_weights: Option<MlWeights>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawFeedbackConfig {
    /// Days of feedback a learning run considers
    pub window_days: Option<u32>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LeadrankConfig {
    #[serde(default)]
    pub learning: LearnerConfig,

    #[serde(default)]
    pub feedback: FeedbackConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl LeadrankConfig {
    /// Where feedback history and config versions live
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(leadrank_paths::data_dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    pub window_days: u32,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Data directory; XDG data dir when unset
    pub data_dir: Option<PathBuf>,
}

impl RawLearningConfig {
    pub fn merge(self, overlay: Self) -> Self {
        let (base_c, over_c) = (self.categorical, overlay.categorical);
        let (base_r, over_r) = (self.regression, overlay.regression);
        Self {
            categorical: RawCategoricalConfig {
                learning_rate: over_c.learning_rate.or(base_c.learning_rate),
                smoothing: over_c.smoothing.or(base_c.smoothing),
                min_weight: over_c.min_weight.or(base_c.min_weight),
                max_weight: over_c.max_weight.or(base_c.max_weight),
            },
            regression: RawRegressionConfig {
                min_samples: over_r.min_samples.or(base_r.min_samples),
                iterations: over_r.iterations.or(base_r.iterations),
                learning_rate: over_r.learning_rate.or(base_r.learning_rate),
                logit_clip: over_r.logit_clip.or(base_r.logit_clip),
                initial_weights: over_r.initial_weights.or(base_r.initial_weights),
            },
        }
    }

    pub fn finalize(self) -> LearnerConfig {
        let c = self.categorical;
        let r = self.regression;
        let categorical_defaults = CategoricalConfig::default();
        let regression_defaults = RegressionConfig::default();
        LearnerConfig {
            categorical: CategoricalConfig {
                learning_rate: c.learning_rate.unwrap_or(categorical_defaults.learning_rate),
                smoothing: c.smoothing.unwrap_or(categorical_defaults.smoothing),
                min_weight: c.min_weight.unwrap_or(categorical_defaults.min_weight),
                max_weight: c.max_weight.unwrap_or(categorical_defaults.max_weight),
            },
            regression: RegressionConfig {
                min_samples: r.min_samples.unwrap_or(regression_defaults.min_samples),
                iterations: r.iterations.unwrap_or(regression_defaults.iterations),
                learning_rate: r.learning_rate.unwrap_or(regression_defaults.learning_rate),
                logit_clip: r.logit_clip.unwrap_or(regression_defaults.logit_clip),
                initial_weights: r
                    .initial_weights
                    .unwrap_or(regression_defaults.initial_weights),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = LeadrankConfig::default();
        assert_eq!(config.feedback.window_days, DEFAULT_WINDOW_DAYS);
        assert!(config.storage.data_dir.is_none());
        assert_eq!(config.learning, LearnerConfig::default());
    }

    #[test]
    fn test_data_dir_override() {
        let config = LeadrankConfig {
            storage: StorageConfig {
                data_dir: Some(PathBuf::from("/var/lib/leadrank")),
            },
            ..Default::default()
        };
        assert_eq!(config.data_dir(), PathBuf::from("/var/lib/leadrank"));
        assert!(LeadrankConfig::default().data_dir().ends_with("leadrank"));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = LeadrankConfig::default();
        config.feedback.window_days = 30;
        config.learning.categorical.learning_rate = 0.2;

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: LeadrankConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.feedback.window_days, 30);
        assert_eq!(parsed.learning.categorical.learning_rate, 0.2);
        assert_eq!(parsed.learning.regression.iterations, 80);
    }

    #[test]
    fn test_raw_config_partial_parsing() {
        let toml_str = r#"
[learning.regression]
iterations = 120

[feedback]
window_days = 14
"#;
        let raw: RawLeadrankConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(raw.learning.regression.iterations, Some(120));
        assert!(raw.learning.regression.learning_rate.is_none());
        assert!(raw.learning.categorical.smoothing.is_none());
        assert_eq!(raw.feedback.window_days, Some(14));
        assert!(raw.storage.data_dir.is_none());
    }

    #[test]
    fn test_learning_finalize_fills_defaults() {
        let raw = RawLearningConfig {
            categorical: RawCategoricalConfig {
                max_weight: Some(2.0),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = raw.finalize();
        assert_eq!(config.categorical.max_weight, 2.0);
        assert_eq!(config.categorical.min_weight, 0.5);
        assert_eq!(config.regression.initial_weights, MlWeights::prior());
    }
}
