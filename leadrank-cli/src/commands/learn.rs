//! Learning command
//!
//! Reads the feedback window, runs both learning paths against the stored
//! weights, and installs the result as a new scoring config version.

use anyhow::{Context, Result};
use clap::Args;
use leadrank_learn::{FeedbackRecord, LearningOutcome, PreferenceEngine};
use leadrank_store::{ConfigPatch, FeedbackRepository, ScoringConfigStore};
use serde_json::json;
use tracing::info;

use super::{open_config_store, open_feedback};
use crate::config::ConfigLoader;

#[derive(Args)]
pub struct LearnArgs {
    /// Window in days (defaults to the configured window)
    #[arg(long)]
    pub days: Option<u32>,
    /// Print the outcome without updating the scoring config
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(args: LearnArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let engine =
        PreferenceEngine::new(config.learning.clone()).context("invalid learning config")?;
    let repo = open_feedback(&config).await?;
    let store = open_config_store(&config).await?;

    let days = args.days.unwrap_or(config.feedback.window_days);
    let records: Vec<FeedbackRecord> = repo
        .get_recent(days)
        .await?
        .iter()
        .map(|entry| entry.to_record())
        .collect();

    let current = store.current().await?;
    let outcome = engine.learn(
        &records,
        Some(&current.stage_weights),
        Some(&current.source_weights),
    );

    println!("{}", serde_json::to_string_pretty(&report(days, &records, &outcome))?);

    let patch = ConfigPatch::from_outcome(&outcome);
    if args.dry_run {
        info!("dry run, scoring config unchanged");
    } else if patch.is_empty() {
        info!(records = records.len(), "not enough feedback to update weights");
    } else {
        let updated = store.apply_patch(patch).await?;
        info!(version = updated.version, "scoring config updated");
    }
    Ok(())
}

fn report(days: u32, records: &[FeedbackRecord], outcome: &LearningOutcome) -> serde_json::Value {
    json!({
        "windowDays": days,
        "records": records.len(),
        "learned": outcome.learned,
        "weights": outcome.weights,
        "mlWeights": outcome.ml_weights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadrank_learn::OutcomeType;

    #[test]
    fn test_report_for_empty_window() {
        let outcome = PreferenceEngine::default().learn(&[], None, None);
        let value = report(7, &[], &outcome);
        assert_eq!(value["windowDays"], 7);
        assert_eq!(value["records"], 0);
        assert!(value["learned"].is_null());
        assert!(value["mlWeights"].is_null());
        assert!(ConfigPatch::from_outcome(&outcome).is_empty());
    }

    #[test]
    fn test_report_includes_learned_weights() {
        let records = vec![
            FeedbackRecord::new("a", OutcomeType::Helpful).with_metadata(
                leadrank_learn::FeedbackMetadata::default().with_stage("customer"),
            ),
        ];
        let outcome = PreferenceEngine::default().learn(&records, None, None);
        let value = report(3, &records, &outcome);
        assert!(value["learned"]["stageWeights"]["customer"].as_f64().unwrap() > 1.0);
        assert!(value["mlWeights"].is_null());
    }
}
