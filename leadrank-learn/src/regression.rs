//! Logistic regression over feedback feature vectors
//!
//! Full-batch gradient descent on a fixed schedule: no early stopping, no
//! regularization, no randomness. Identical input gives bit-identical output.

use tracing::{debug, warn};

use crate::config::RegressionConfig;
use crate::features::{FEATURE_DIM, FeatureVector, build_feature_vector};
use crate::types::{FeedbackRecord, MlWeights};

/// Default bound on the logit before exponentiating
pub const DEFAULT_LOGIT_CLIP: f64 = 500.0;

/// Logistic function with the logit clipped to `[-clip, clip]`
pub fn sigmoid(z: f64, clip: f64) -> f64 {
    1.0 / (1.0 + (-z.clamp(-clip, clip)).exp())
}

/// Fits [`MlWeights`] from labelled feedback
#[derive(Debug, Clone, Default)]
pub struct LogisticTrainer {
    config: RegressionConfig,
}

impl LogisticTrainer {
    pub fn new(config: RegressionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RegressionConfig {
        &self.config
    }

    /// Fit starting from the configured initial weights
    pub fn fit(&self, feedback: &[FeedbackRecord]) -> Option<MlWeights> {
        self.fit_from(feedback, &self.config.initial_weights)
    }

    /// Fit starting from caller-supplied weights (warm start).
    ///
    /// Only helpful / not-helpful records with numeric `recencyNorm` and
    /// `countNorm` qualify. Returns `None` below `min_samples` qualifying
    /// records, or when feature magnitudes push the weights out of the
    /// finite range.
    pub fn fit_from(&self, feedback: &[FeedbackRecord], initial: &MlWeights) -> Option<MlWeights> {
        let (features, labels) = training_set(feedback);
        if features.len() < self.config.min_samples {
            debug!(
                qualifying = features.len(),
                required = self.config.min_samples,
                "insufficient data for ml weights"
            );
            return None;
        }

        let n = features.len() as f64;
        let lr = self.config.learning_rate;
        let clip = self.config.logit_clip;
        let mut bias = initial.bias;
        let mut weights = initial.feature_weights();

        for _ in 0..self.config.iterations {
            let mut grad_bias = 0.0;
            let mut grad = [0.0; FEATURE_DIM];

            for (x, y) in features.iter().zip(&labels) {
                let x = x.values();
                let mut z = bias;
                for j in 0..FEATURE_DIM {
                    z += weights[j] * x[j];
                }
                let err = sigmoid(z, clip) - y;
                grad_bias += err;
                for j in 0..FEATURE_DIM {
                    grad[j] += err * x[j];
                }
            }

            bias -= lr * (grad_bias / n);
            for j in 0..FEATURE_DIM {
                weights[j] -= lr * (grad[j] / n);
            }
        }

        let fitted = MlWeights::from_parts(bias, weights);
        if !fitted.is_finite() {
            warn!(
                samples = features.len(),
                "ml weights diverged to non-finite values, discarding fit"
            );
            return None;
        }
        debug!(
            samples = features.len(),
            iterations = self.config.iterations,
            bias = fitted.bias,
            "fitted ml weights"
        );
        Some(fitted)
    }
}

/// Feature vectors and 1/0 labels for the qualifying records
fn training_set(feedback: &[FeedbackRecord]) -> (Vec<FeatureVector>, Vec<f64>) {
    feedback
        .iter()
        .filter_map(|record| {
            let label = record.outcome_type.label()?;
            let meta = record.metadata();
            if meta.recency_norm.is_none() || meta.count_norm.is_none() {
                return None;
            }
            Some((build_feature_vector(meta), if label { 1.0 } else { 0.0 }))
        })
        .unzip()
}

/// [`LogisticTrainer::fit`] with the default configuration
pub fn fit_ml_weights(feedback: &[FeedbackRecord]) -> Option<MlWeights> {
    LogisticTrainer::default().fit(feedback)
}

/// [`LogisticTrainer::fit_from`] with the default configuration
pub fn fit_ml_weights_from(feedback: &[FeedbackRecord], initial: &MlWeights) -> Option<MlWeights> {
    LogisticTrainer::default().fit_from(feedback, initial)
}
