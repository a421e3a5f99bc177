//! Weight maps and fitted model weights

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::features::{FEATURE_DIM, FEATURE_KEYS, FeatureVector};
use crate::regression::{DEFAULT_LOGIT_CLIP, sigmoid};

/// Categorical key (stage or source name) to multiplicative weight
pub type WeightMap = BTreeMap<String, f64>;

/// Output of the categorical learner
///
/// A `None` map means no feedback touched that dimension, which callers must
/// keep distinct from an update to an empty map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnedWeights {
    pub stage_weights: Option<WeightMap>,
    pub source_weights: Option<WeightMap>,
}

/// Prior weights with learned values laid over them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedWeights {
    pub stage_weights: WeightMap,
    pub source_weights: WeightMap,
}

/// Logistic-regression weights: one per feature plus a bias
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MlWeights {
    pub bias: f64,
    pub stage_prospect: f64,
    pub stage_qualified: f64,
    pub stage_opportunity: f64,
    pub stage_customer: f64,
    pub recency: f64,
    pub count: f64,
    pub sentiment: f64,
    pub intent: f64,
}

impl Default for MlWeights {
    fn default() -> Self {
        Self::prior()
    }
}

impl MlWeights {
    /// Starting point for every fit.
    ///
    /// Later stages and higher recency/intent lean towards "helpful", and the
    /// negative bias keeps small-sample predictions from starting near 0.5.
    pub fn prior() -> Self {
        Self {
            bias: -0.5,
            stage_prospect: 0.0,
            stage_qualified: 0.1,
            stage_opportunity: 0.3,
            stage_customer: 0.4,
            recency: 0.3,
            count: 0.2,
            sentiment: 0.3,
            intent: 0.4,
        }
    }

    /// Build from a bias and feature weights in `FEATURE_KEYS` order
    pub fn from_parts(bias: f64, weights: [f64; FEATURE_DIM]) -> Self {
        let [
            stage_prospect,
            stage_qualified,
            stage_opportunity,
            stage_customer,
            recency,
            count,
            sentiment,
            intent,
        ] = weights;
        Self {
            bias,
            stage_prospect,
            stage_qualified,
            stage_opportunity,
            stage_customer,
            recency,
            count,
            sentiment,
            intent,
        }
    }

    /// Feature weights in `FEATURE_KEYS` order (bias excluded)
    pub fn feature_weights(&self) -> [f64; FEATURE_DIM] {
        [
            self.stage_prospect,
            self.stage_qualified,
            self.stage_opportunity,
            self.stage_customer,
            self.recency,
            self.count,
            self.sentiment,
            self.intent,
        ]
    }

    /// Look up a weight by name; `"bias"` or one of `FEATURE_KEYS`
    pub fn get(&self, key: &str) -> Option<f64> {
        if key == "bias" {
            return Some(self.bias);
        }
        FEATURE_KEYS
            .iter()
            .position(|k| *k == key)
            .map(|i| self.feature_weights()[i])
    }

    /// All nine named weights, bias first
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        std::iter::once(("bias", self.bias))
            .chain(FEATURE_KEYS.iter().copied().zip(self.feature_weights()))
            .collect()
    }

    pub fn is_finite(&self) -> bool {
        self.bias.is_finite() && self.feature_weights().iter().all(|w| w.is_finite())
    }

    /// Linear score `bias + w · x`, accumulated in feature order
    pub fn logit(&self, features: &FeatureVector) -> f64 {
        let mut z = self.bias;
        for (w, x) in self.feature_weights().iter().zip(features.values()) {
            z += w * x;
        }
        z
    }

    /// Probability that a recommendation with these features is helpful
    pub fn score(&self, features: &FeatureVector) -> f64 {
        sigmoid(self.logit(features), DEFAULT_LOGIT_CLIP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FeedbackMetadata;
    use crate::features::build_feature_vector;

    #[test]
    fn test_prior_values() {
        let w = MlWeights::prior();
        assert_eq!(w.bias, -0.5);
        assert_eq!(w.stage_customer, 0.4);
        assert_eq!(w.intent, 0.4);
    }

    #[test]
    fn test_parts_roundtrip() {
        let parts = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8];
        let w = MlWeights::from_parts(-1.0, parts);
        assert_eq!(w.feature_weights(), parts);
        assert_eq!(w.bias, -1.0);
    }

    #[test]
    fn test_get_by_name() {
        let w = MlWeights::prior();
        assert_eq!(w.get("bias"), Some(-0.5));
        assert_eq!(w.get("stage_opportunity"), Some(0.3));
        assert_eq!(w.get("sentiment"), Some(0.3));
        assert_eq!(w.get("unknown"), None);
    }

    #[test]
    fn test_entries_has_nine_keys() {
        let entries = MlWeights::prior().entries();
        assert_eq!(entries.len(), 9);
        assert_eq!(entries[0].0, "bias");
        assert_eq!(entries[8].0, "intent");
    }

    #[test]
    fn test_serializes_with_named_keys() {
        let json = serde_json::to_value(MlWeights::prior()).unwrap();
        assert_eq!(json["bias"], -0.5);
        assert_eq!(json["stage_qualified"], 0.1);
    }

    #[test]
    fn test_prior_score_on_default_features() {
        // bias -0.5 + recency 0.3*0.5 + count 0.2*0.2 + sentiment 0.3*0.5 = -0.16
        let fv = build_feature_vector(&FeedbackMetadata::EMPTY);
        let w = MlWeights::prior();
        assert!((w.logit(&fv) - -0.16).abs() < 1e-12);
        let p = w.score(&fv);
        assert!(p > 0.45 && p < 0.5);
    }

    #[test]
    fn test_learned_weights_none_vs_empty() {
        let learned = LearnedWeights::default();
        let json = serde_json::to_value(&learned).unwrap();
        assert!(json["stageWeights"].is_null());
    }
}
