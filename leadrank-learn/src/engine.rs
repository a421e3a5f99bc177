//! PreferenceEngine: runs both learning paths over one feedback batch

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::categorical::CategoricalLearner;
use crate::config::LearnerConfig;
use crate::error::Result;
use crate::features::{FeatureVector, build_feature_vector};
use crate::merge;
use crate::regression::LogisticTrainer;
use crate::types::{FeedbackMetadata, FeedbackRecord, LearnedWeights, MergedWeights, MlWeights, WeightMap};

/// Everything one learning pass produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningOutcome {
    /// Prior weights with any learned values applied
    pub weights: MergedWeights,
    /// Raw learner output; `None` when there was no signal
    pub learned: Option<LearnedWeights>,
    /// Fitted model; `None` when too few records carried ML metadata
    pub ml_weights: Option<MlWeights>,
}

impl LearningOutcome {
    /// True when at least one path produced an update
    pub fn has_updates(&self) -> bool {
        self.learned.is_some() || self.ml_weights.is_some()
    }
}

/// Preference-learning engine
///
/// Stateless between calls apart from its configuration, so one engine can
/// be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct PreferenceEngine {
    categorical: CategoricalLearner,
    trainer: LogisticTrainer,
}

impl PreferenceEngine {
    /// Create an engine after validating the configuration
    pub fn new(config: LearnerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            categorical: CategoricalLearner::new(config.categorical),
            trainer: LogisticTrainer::new(config.regression),
        })
    }

    pub fn compute_learned_weights(&self, feedback: &[FeedbackRecord]) -> Option<LearnedWeights> {
        self.categorical.learn(feedback)
    }

    pub fn merge_weights(
        &self,
        existing_stage: Option<&WeightMap>,
        existing_source: Option<&WeightMap>,
        learned: Option<&LearnedWeights>,
    ) -> MergedWeights {
        merge::merge_weights(existing_stage, existing_source, learned)
    }

    pub fn build_feature_vector(&self, metadata: &FeedbackMetadata) -> FeatureVector {
        build_feature_vector(metadata)
    }

    pub fn fit_ml_weights(&self, feedback: &[FeedbackRecord]) -> Option<MlWeights> {
        self.trainer.fit(feedback)
    }

    pub fn fit_ml_weights_from(
        &self,
        feedback: &[FeedbackRecord],
        initial: &MlWeights,
    ) -> Option<MlWeights> {
        self.trainer.fit_from(feedback, initial)
    }

    /// Run both paths and merge the categorical result over the priors.
    ///
    /// The regression path always starts from the configured initial weights;
    /// use [`Self::fit_ml_weights_from`] to continue from a stored model.
    pub fn learn(
        &self,
        feedback: &[FeedbackRecord],
        existing_stage: Option<&WeightMap>,
        existing_source: Option<&WeightMap>,
    ) -> LearningOutcome {
        let learned = self.compute_learned_weights(feedback);
        let weights = self.merge_weights(existing_stage, existing_source, learned.as_ref());
        let ml_weights = self.fit_ml_weights(feedback);

        info!(
            records = feedback.len(),
            learned = learned.is_some(),
            ml_fitted = ml_weights.is_some(),
            stage_keys = weights.stage_weights.len(),
            source_keys = weights.source_weights.len(),
            "preference learning pass complete"
        );

        LearningOutcome {
            weights,
            learned,
            ml_weights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutcomeType;

    fn ml_record(outcome: OutcomeType, stage: &str) -> FeedbackRecord {
        FeedbackRecord::new("lead", outcome).with_metadata(
            FeedbackMetadata::default()
                .with_stage(stage)
                .with_source("webinar")
                .with_recency(0.6)
                .with_count(0.3),
        )
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = LearnerConfig::default();
        config.categorical.smoothing = -1.0;
        assert!(PreferenceEngine::new(config).is_err());
    }

    #[test]
    fn test_learn_without_signal_keeps_priors() {
        let engine = PreferenceEngine::default();
        let prior: WeightMap = [("customer".to_string(), 1.3)].into_iter().collect();
        let outcome = engine.learn(&[], Some(&prior), None);
        assert!(!outcome.has_updates());
        assert_eq!(outcome.weights.stage_weights, prior);
        assert!(outcome.weights.source_weights.is_empty());
    }

    #[test]
    fn test_learn_runs_both_paths() {
        let engine = PreferenceEngine::default();
        let feedback = vec![
            ml_record(OutcomeType::Helpful, "customer"),
            ml_record(OutcomeType::NotHelpful, "prospect"),
            ml_record(OutcomeType::Helpful, "customer"),
        ];
        let outcome = engine.learn(&feedback, None, None);
        assert!(outcome.has_updates());
        assert!(outcome.ml_weights.is_some());
        assert!(outcome.weights.stage_weights.contains_key("customer"));
        assert!(outcome.weights.stage_weights.contains_key("prospect"));
        assert!((outcome.weights.source_weights["webinar"] - 1.03).abs() < 1e-12);
    }

    #[test]
    fn test_categorical_only_when_ml_metadata_missing() {
        let engine = PreferenceEngine::default();
        let feedback = vec![
            FeedbackRecord::new("a", OutcomeType::Helpful)
                .with_metadata(FeedbackMetadata::default().with_stage("qualified")),
        ];
        let outcome = engine.learn(&feedback, None, None);
        assert!(outcome.learned.is_some());
        assert!(outcome.ml_weights.is_none());
    }
}
