//! Overlay learned weights on prior weights

use crate::types::{LearnedWeights, MergedWeights, WeightMap};

/// Merge learned weights into existing ones.
///
/// Starts from copies of the existing maps (empty when absent) and overwrites
/// every key the learner produced. Keys the learner did not touch keep their
/// prior value.
pub fn merge_weights(
    existing_stage: Option<&WeightMap>,
    existing_source: Option<&WeightMap>,
    learned: Option<&LearnedWeights>,
) -> MergedWeights {
    let mut stage_weights = existing_stage.cloned().unwrap_or_default();
    let mut source_weights = existing_source.cloned().unwrap_or_default();

    if let Some(learned) = learned {
        if let Some(stages) = &learned.stage_weights {
            stage_weights.extend(stages.iter().map(|(k, v)| (k.clone(), *v)));
        }
        if let Some(sources) = &learned.source_weights {
            source_weights.extend(sources.iter().map(|(k, v)| (k.clone(), *v)));
        }
    }

    MergedWeights {
        stage_weights,
        source_weights,
    }
}
