//! Stage and source weights from feedback counts
//!
//! Bandit-style update: each categorical key gets a multiplicative weight
//! nudged up by helpful feedback and down by unhelpful feedback. The additive
//! smoothing keeps low-count keys close to 1.0, and the clamp bounds drift.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::CategoricalConfig;
use crate::types::{FeedbackRecord, LearnedWeights, WeightMap};

/// Positive / negative tallies for one categorical key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountAccumulator {
    pub pos: u64,
    pub neg: u64,
}

impl CountAccumulator {
    fn record(&mut self, helpful: bool) {
        if helpful {
            self.pos += 1;
        } else {
            self.neg += 1;
        }
    }

    /// `clamp(1 + rate * (pos - neg) / (pos + neg + smoothing))`
    pub fn weight(&self, config: &CategoricalConfig) -> f64 {
        let pos = self.pos as f64;
        let neg = self.neg as f64;
        let total = pos + neg + config.smoothing;
        let delta = (pos - neg) / total;
        let adjustment = config.learning_rate * delta;
        (1.0 + adjustment).clamp(config.min_weight, config.max_weight)
    }
}

/// Learns per-stage and per-source weights
#[derive(Debug, Clone, Default)]
pub struct CategoricalLearner {
    config: CategoricalConfig,
}

impl CategoricalLearner {
    pub fn new(config: CategoricalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CategoricalConfig {
        &self.config
    }

    /// Compute learned weights from a batch of feedback.
    ///
    /// Returns `None` when the batch has no helpful and no not-helpful
    /// records. Otherwise each dimension is `None` if no record in the batch
    /// named a key for it.
    pub fn learn(&self, feedback: &[FeedbackRecord]) -> Option<LearnedWeights> {
        let mut stage_counts: BTreeMap<&str, CountAccumulator> = BTreeMap::new();
        let mut source_counts: BTreeMap<&str, CountAccumulator> = BTreeMap::new();
        let mut helpful = 0usize;
        let mut not_helpful = 0usize;

        for record in feedback {
            let Some(label) = record.outcome_type.label() else {
                continue;
            };
            if label {
                helpful += 1;
            } else {
                not_helpful += 1;
            }

            let meta = record.metadata();
            if let Some(stage) = meta.stage_key() {
                stage_counts.entry(stage).or_default().record(label);
            }
            if let Some(source) = meta.source_key() {
                source_counts.entry(source).or_default().record(label);
            }
        }

        if helpful == 0 && not_helpful == 0 {
            debug!(records = feedback.len(), "no helpful/not_helpful feedback");
            return None;
        }

        let stage_weights = self.weights_for(&stage_counts);
        let source_weights = self.weights_for(&source_counts);

        debug!(
            helpful,
            not_helpful,
            stages = stage_counts.len(),
            sources = source_counts.len(),
            "computed categorical weights"
        );

        Some(LearnedWeights {
            stage_weights,
            source_weights,
        })
    }

    fn weights_for(&self, counts: &BTreeMap<&str, CountAccumulator>) -> Option<WeightMap> {
        if counts.is_empty() {
            return None;
        }
        Some(
            counts
                .iter()
                .map(|(key, acc)| (key.to_string(), acc.weight(&self.config)))
                .collect(),
        )
    }
}

/// [`CategoricalLearner::learn`] with the default configuration
pub fn compute_learned_weights(feedback: &[FeedbackRecord]) -> Option<LearnedWeights> {
    CategoricalLearner::default().learn(feedback)
}
