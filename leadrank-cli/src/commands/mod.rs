pub mod analyze;
pub mod config;
pub mod feedback;
pub mod learn;

use anyhow::{Context, Result};
use leadrank_store::{JsonConfigStore, JsonFeedbackRepository};

use crate::config::LeadrankConfig;

/// Open the feedback history in the configured data directory
pub async fn open_feedback(config: &LeadrankConfig) -> Result<JsonFeedbackRepository> {
    let dir = config.data_dir();
    JsonFeedbackRepository::open(&dir)
        .await
        .with_context(|| format!("failed to open feedback history in {}", dir.display()))
}

/// Open the scoring config store in the configured data directory
pub async fn open_config_store(config: &LeadrankConfig) -> Result<JsonConfigStore> {
    let dir = config.data_dir();
    JsonConfigStore::open(&dir)
        .await
        .with_context(|| format!("failed to open scoring config in {}", dir.display()))
}
