//! leadrank-learn - Preference learning for lead prioritization
//!
//! Turns binary feedback ("helpful" / "not helpful") on lead recommendations
//! into scoring adjustments. Two independent paths read the same feedback:
//!
//! - categorical: smoothed multiplicative weights per pipeline stage and lead
//!   source, merged over the caller's prior weights
//! - regression: a logistic model over one-hot stage and normalized
//!   continuous features, fit by fixed-schedule batch gradient descent
//!
//! Nothing here persists state. Every call rebuilds its accumulators from the
//! input list, and "not enough data" is reported as `None`.

pub mod categorical;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod merge;
pub mod regression;
pub mod types;

pub use categorical::{CategoricalLearner, CountAccumulator, compute_learned_weights};
pub use config::{CategoricalConfig, LearnerConfig, RegressionConfig};
pub use engine::{LearningOutcome, PreferenceEngine};
pub use error::{LearnError, Result};
pub use features::{
    DEFAULT_COUNT, DEFAULT_INTENT, DEFAULT_RECENCY, DEFAULT_SENTIMENT, DEFAULT_STAGE, FEATURE_DIM,
    FEATURE_KEYS, FeatureVector, build_feature_vector,
};
pub use merge::merge_weights;
pub use regression::{LogisticTrainer, fit_ml_weights, fit_ml_weights_from, sigmoid};
pub use types::*;
