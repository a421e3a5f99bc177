//! Feature vectors for the logistic model
//!
//! Layout is fixed: four one-hot stage slots followed by the four normalized
//! continuous signals. Missing or non-numeric fields fall back to defaults,
//! so building a vector never fails.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{FeedbackMetadata, Stage};

/// Number of features (bias excluded)
pub const FEATURE_DIM: usize = 8;

/// Feature names in vector order
pub const FEATURE_KEYS: [&str; FEATURE_DIM] = [
    "stage_prospect",
    "stage_qualified",
    "stage_opportunity",
    "stage_customer",
    "recency",
    "count",
    "sentiment",
    "intent",
];

/// Stage assumed when metadata carries none
pub const DEFAULT_STAGE: Stage = Stage::Prospect;
pub const DEFAULT_RECENCY: f64 = 0.5;
pub const DEFAULT_COUNT: f64 = 0.2;
pub const DEFAULT_SENTIMENT: f64 = 0.5;
pub const DEFAULT_INTENT: f64 = 0.0;

const RECENCY: usize = 4;
const COUNT: usize = 5;
const SENTIMENT: usize = 6;
const INTENT: usize = 7;

/// Fixed-length numeric encoding of one feedback record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_DIM]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_DIM]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; FEATURE_DIM] {
        &self.0
    }

    /// The one-hot stage block
    pub fn stage_one_hot(&self) -> &[f64] {
        &self.0[..Stage::ALL.len()]
    }

    pub fn recency(&self) -> f64 {
        self.0[RECENCY]
    }

    pub fn count(&self) -> f64 {
        self.0[COUNT]
    }

    pub fn sentiment(&self) -> f64 {
        self.0[SENTIMENT]
    }

    pub fn intent(&self) -> f64 {
        self.0[INTENT]
    }
}

impl From<FeatureVector> for [f64; FEATURE_DIM] {
    fn from(fv: FeatureVector) -> Self {
        fv.0
    }
}

/// Encode metadata as a feature vector.
///
/// A missing stage is looked up as `prospect`, so "no stage" and an explicit
/// prospect encode the same way. A stage string outside the four known values,
/// or a stage that was not a string at all, leaves the one-hot block at zero.
pub fn build_feature_vector(metadata: &FeedbackMetadata) -> FeatureVector {
    let mut values = [0.0; FEATURE_DIM];

    let stage = match metadata.stage_key() {
        Some(s) => Stage::from_str(s).ok(),
        None if metadata.stage_malformed => None,
        None => Some(DEFAULT_STAGE),
    };
    if let Some(stage) = stage {
        values[stage.index()] = 1.0;
    }

    values[RECENCY] = metadata.recency_norm.unwrap_or(DEFAULT_RECENCY);
    values[COUNT] = metadata.count_norm.unwrap_or(DEFAULT_COUNT);
    values[SENTIMENT] = metadata.sentiment_norm.unwrap_or(DEFAULT_SENTIMENT);
    values[INTENT] = metadata.intent_norm.unwrap_or(DEFAULT_INTENT);

    FeatureVector(values)
}
