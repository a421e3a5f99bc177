//! Property tests for the learning core invariants

use leadrank_learn::{
    FEATURE_DIM, FeedbackMetadata, FeedbackRecord, OutcomeType, WeightMap, build_feature_vector,
    compute_learned_weights, fit_ml_weights, merge_weights,
};
use proptest::prelude::*;

fn arb_outcome() -> impl Strategy<Value = OutcomeType> {
    prop_oneof![
        Just(OutcomeType::Helpful),
        Just(OutcomeType::NotHelpful),
        Just(OutcomeType::Contacted),
        Just(OutcomeType::Other("snoozed".into())),
    ]
}

fn arb_stage() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("prospect".to_string())),
        Just(Some("qualified".to_string())),
        Just(Some("opportunity".to_string())),
        Just(Some("customer".to_string())),
        Just(Some("churned".to_string())),
    ]
}

fn arb_record() -> impl Strategy<Value = FeedbackRecord> {
    (
        arb_outcome(),
        arb_stage(),
        proptest::option::of("[a-z]{1,6}"),
        proptest::option::of(-2.0f64..2.0),
        proptest::option::of(-2.0f64..2.0),
        proptest::option::of(0.0f64..1.0),
        proptest::option::of(0.0f64..1.0),
    )
        .prop_map(|(outcome, stage, source, recency, count, sentiment, intent)| {
            FeedbackRecord::new("lead", outcome).with_metadata(FeedbackMetadata {
                stage,
                stage_malformed: false,
                source,
                recency_norm: recency,
                count_norm: count,
                sentiment_norm: sentiment,
                intent_norm: intent,
            })
        })
}

proptest! {
    #[test]
    fn learned_weights_stay_in_bounds(feedback in prop::collection::vec(arb_record(), 0..60)) {
        if let Some(learned) = compute_learned_weights(&feedback) {
            for map in [learned.stage_weights, learned.source_weights].into_iter().flatten() {
                prop_assert!(!map.is_empty());
                for w in map.values() {
                    prop_assert!((0.5..=1.5).contains(w));
                }
            }
        }
    }

    #[test]
    fn none_iff_no_binary_feedback(feedback in prop::collection::vec(arb_record(), 0..30)) {
        let has_signal = feedback.iter().any(|r| r.outcome_type.label().is_some());
        prop_assert_eq!(compute_learned_weights(&feedback).is_some(), has_signal);
    }

    #[test]
    fn merge_without_learning_is_identity(
        stage in prop::collection::btree_map("[a-z]{1,5}", 0.5f64..1.5, 0..8),
        source in prop::collection::btree_map("[a-z]{1,5}", 0.5f64..1.5, 0..8),
    ) {
        let stage: WeightMap = stage;
        let source: WeightMap = source;
        let merged = merge_weights(Some(&stage), Some(&source), None);
        prop_assert_eq!(merged.stage_weights, stage);
        prop_assert_eq!(merged.source_weights, source);
    }

    #[test]
    fn feature_vector_one_hot_has_at_most_one(record in arb_record()) {
        let fv = build_feature_vector(record.metadata());
        prop_assert_eq!(fv.values().len(), FEATURE_DIM);
        let hot = fv.stage_one_hot().iter().filter(|v| **v == 1.0).count();
        prop_assert!(hot <= 1);
        prop_assert!(fv.stage_one_hot().iter().all(|v| *v == 0.0 || *v == 1.0));
    }

    #[test]
    fn fit_is_finite_and_deterministic(feedback in prop::collection::vec(arb_record(), 0..40)) {
        let first = fit_ml_weights(&feedback);
        let second = fit_ml_weights(&feedback);
        prop_assert_eq!(first, second);
        if let Some(w) = first {
            prop_assert!(w.is_finite());
        }
    }
}
