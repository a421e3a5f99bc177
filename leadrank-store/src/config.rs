//! Versioned scoring configuration
//!
//! Every accepted patch produces a new version. A bounded history of past
//! versions is kept so the active configuration can be rolled back.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadrank_learn::{LearningOutcome, MlWeights, WeightMap};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};

/// Number of versions retained in history
pub const MAX_VERSIONS: usize = 5;

/// Longest system prompt a patch may install, in characters
pub const MAX_SYSTEM_PROMPT_LEN: usize = 2000;

/// Config file name inside a data directory
const CONFIG_FILE: &str = "scoring_config.json";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a lead prioritization assistant. Given a list of leads \
with scores and context, suggest the top leads to contact and a brief recommended action for each.";

/// Numeric weights used by the heuristic lead scorer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringWeights {
    pub recency_decay: f64,
    pub email_weight: f64,
    pub chat_weight: f64,
    pub support_weight: f64,
    pub engagement_bonus_cap: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            recency_decay: 0.1,
            email_weight: 1.2,
            chat_weight: 1.0,
            support_weight: 0.8,
            engagement_bonus_cap: 20.0,
        }
    }
}

impl ScoringWeights {
    fn apply(&mut self, patch: &ScoringWeightsPatch) {
        let fields = [
            (&mut self.recency_decay, patch.recency_decay),
            (&mut self.email_weight, patch.email_weight),
            (&mut self.chat_weight, patch.chat_weight),
            (&mut self.support_weight, patch.support_weight),
            (&mut self.engagement_bonus_cap, patch.engagement_bonus_cap),
        ];
        for (slot, value) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

/// A complete scoring configuration at one version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    pub version: u32,
    pub scoring_weights: ScoringWeights,
    pub system_prompt: String,
    #[serde(default)]
    pub stage_weights: WeightMap,
    #[serde(default)]
    pub source_weights: WeightMap,
    #[serde(default)]
    pub ml_weights: Option<MlWeights>,
    pub updated_at: DateTime<Utc>,
}

impl ScoringConfig {
    /// Version 1 with built-in defaults
    pub fn initial(updated_at: DateTime<Utc>) -> Self {
        Self {
            version: 1,
            scoring_weights: ScoringWeights::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            stage_weights: WeightMap::new(),
            source_weights: WeightMap::new(),
            ml_weights: None,
            updated_at,
        }
    }

    pub fn summary(&self) -> ConfigVersion {
        ConfigVersion {
            version: self.version,
            updated_at: self.updated_at,
        }
    }
}

/// Version number and timestamp of a historical config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigVersion {
    pub version: u32,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of [`ScoringWeights`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringWeightsPatch {
    pub recency_decay: Option<f64>,
    pub email_weight: Option<f64>,
    pub chat_weight: Option<f64>,
    pub support_weight: Option<f64>,
    pub engagement_bonus_cap: Option<f64>,
}

impl ScoringWeightsPatch {
    fn validate(&self) -> Result<()> {
        let fields = [
            ("recencyDecay", self.recency_decay),
            ("emailWeight", self.email_weight),
            ("chatWeight", self.chat_weight),
            ("supportWeight", self.support_weight),
            ("engagementBonusCap", self.engagement_bonus_cap),
        ];
        for (name, value) in fields {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(StoreError::InvalidPatch(format!("{name} must be finite")));
            }
        }
        Ok(())
    }
}

/// Changes to apply on top of the current config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default)]
    pub scoring_weights: Option<ScoringWeightsPatch>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub stage_weights: Option<WeightMap>,
    #[serde(default)]
    pub source_weights: Option<WeightMap>,
    #[serde(default)]
    pub ml_weights: Option<MlWeights>,
}

impl ConfigPatch {
    /// Patch installing the results of a learning run.
    ///
    /// Merged categorical weights are included only when the run learned any.
    /// Non-finite ML weights are left out so they cannot sink the whole patch.
    pub fn from_outcome(outcome: &LearningOutcome) -> Self {
        let learned = outcome.learned.is_some();
        Self {
            stage_weights: learned.then(|| outcome.weights.stage_weights.clone()),
            source_weights: learned.then(|| outcome.weights.source_weights.clone()),
            ml_weights: outcome.ml_weights.filter(MlWeights::is_finite),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn validate(&self) -> Result<()> {
        if let Some(weights) = &self.scoring_weights {
            weights.validate()?;
        }
        for (name, map) in [
            ("stageWeights", &self.stage_weights),
            ("sourceWeights", &self.source_weights),
        ] {
            if let Some((key, _)) = map
                .iter()
                .flat_map(|m| m.iter())
                .find(|(_, v)| !v.is_finite())
            {
                return Err(StoreError::InvalidPatch(format!(
                    "{name}.{key} must be finite"
                )));
            }
        }
        if self.ml_weights.is_some_and(|w| !w.is_finite()) {
            return Err(StoreError::InvalidPatch("mlWeights must be finite".into()));
        }
        Ok(())
    }
}

/// Current config plus retained history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigState {
    current: ScoringConfig,
    history: VecDeque<ScoringConfig>,
    latest_version: u32,
}

impl ConfigState {
    fn new(now: DateTime<Utc>) -> Self {
        let initial = ScoringConfig::initial(now);
        Self {
            latest_version: initial.version,
            history: VecDeque::from([initial.clone()]),
            current: initial,
        }
    }

    fn history(&self) -> Vec<ConfigVersion> {
        self.history.iter().map(ScoringConfig::summary).collect()
    }

    fn apply(&mut self, patch: &ConfigPatch, now: DateTime<Utc>) -> Result<ScoringConfig> {
        patch.validate()?;

        let mut next = self.current.clone();
        next.version = self.latest_version + 1;
        next.updated_at = now;

        if let Some(weights) = &patch.scoring_weights {
            next.scoring_weights.apply(weights);
        }
        match patch.system_prompt.as_deref() {
            Some("") | None => {}
            Some(prompt) if prompt.chars().count() > MAX_SYSTEM_PROMPT_LEN => {
                warn!(
                    len = prompt.chars().count(),
                    max = MAX_SYSTEM_PROMPT_LEN,
                    "system prompt too long, keeping current"
                );
            }
            Some(prompt) => next.system_prompt = prompt.to_string(),
        }
        if let Some(stage) = &patch.stage_weights {
            next.stage_weights = stage.clone();
        }
        if let Some(source) = &patch.source_weights {
            next.source_weights = source.clone();
        }
        if patch.ml_weights.is_some() {
            next.ml_weights = patch.ml_weights;
        }

        self.latest_version = next.version;
        self.history.push_back(next.clone());
        while self.history.len() > MAX_VERSIONS {
            self.history.pop_front();
        }
        self.current = next.clone();
        info!(version = next.version, "scoring config updated");
        Ok(next)
    }

    fn rollback(&mut self, version: u32) -> Option<ScoringConfig> {
        let found = self.history.iter().find(|c| c.version == version)?.clone();
        self.current = found.clone();
        info!(version, "scoring config rolled back");
        Some(found)
    }
}

/// Versioned scoring config storage
#[async_trait]
pub trait ScoringConfigStore: Send + Sync {
    /// The active config
    async fn current(&self) -> Result<ScoringConfig>;

    /// Retained versions, oldest first
    async fn history(&self) -> Result<Vec<ConfigVersion>>;

    /// Apply a patch, producing and activating a new version
    async fn apply_patch(&self, patch: ConfigPatch) -> Result<ScoringConfig>;

    /// Reactivate a retained version; `None` if it is not in history
    async fn rollback(&self, version: u32) -> Result<Option<ScoringConfig>>;
}

/// In-memory config store
pub struct MemoryConfigStore {
    state: RwLock<ConfigState>,
}

impl Default for MemoryConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ConfigState::new(Utc::now())),
        }
    }
}

#[async_trait]
impl ScoringConfigStore for MemoryConfigStore {
    async fn current(&self) -> Result<ScoringConfig> {
        Ok(self.state.read().await.current.clone())
    }

    async fn history(&self) -> Result<Vec<ConfigVersion>> {
        Ok(self.state.read().await.history())
    }

    async fn apply_patch(&self, patch: ConfigPatch) -> Result<ScoringConfig> {
        self.state.write().await.apply(&patch, Utc::now())
    }

    async fn rollback(&self, version: u32) -> Result<Option<ScoringConfig>> {
        Ok(self.state.write().await.rollback(version))
    }
}

/// File-backed config store
pub struct JsonConfigStore {
    state: RwLock<ConfigState>,
    file_path: PathBuf,
}

impl JsonConfigStore {
    /// Load state from `data_dir`, or start at version 1
    pub async fn open(data_dir: &Path) -> Result<Self> {
        let file_path = data_dir.join(CONFIG_FILE);

        let state = if file_path.exists() {
            let content = fs::read_to_string(&file_path).await?;
            serde_json::from_str(&content)?
        } else {
            debug!(path = %file_path.display(), "no stored config, using defaults");
            ConfigState::new(Utc::now())
        };

        Ok(Self {
            state: RwLock::new(state),
            file_path,
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    async fn persist(&self, state: &ConfigState) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(state)?;
        fs::write(&self.file_path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl ScoringConfigStore for JsonConfigStore {
    async fn current(&self) -> Result<ScoringConfig> {
        Ok(self.state.read().await.current.clone())
    }

    async fn history(&self) -> Result<Vec<ConfigVersion>> {
        Ok(self.state.read().await.history())
    }

    async fn apply_patch(&self, patch: ConfigPatch) -> Result<ScoringConfig> {
        let mut state = self.state.write().await;
        let mut next_state = state.clone();
        let config = next_state.apply(&patch, Utc::now())?;
        self.persist(&next_state).await?;
        *state = next_state;
        Ok(config)
    }

    async fn rollback(&self, version: u32) -> Result<Option<ScoringConfig>> {
        let mut state = self.state.write().await;
        let mut next_state = state.clone();
        let Some(config) = next_state.rollback(version) else {
            return Ok(None);
        };
        self.persist(&next_state).await?;
        *state = next_state;
        Ok(Some(config))
    }
}
