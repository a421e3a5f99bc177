use super::types::{
    DEFAULT_WINDOW_DAYS, FeedbackConfig, LeadrankConfig, RawFeedbackConfig, RawLeadrankConfig,
    StorageConfig,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<LeadrankConfig> {
        Self::load_from(&Self::user_config_path(), &Self::project_config_path())
    }

    /// Load and merge the given user and project files; missing files are skipped
    pub fn load_from(user_path: &Path, project_path: &Path) -> Result<LeadrankConfig> {
        let mut raw = RawLeadrankConfig::default();

        // Layer 1: User config
        if let Some(user_config) = Self::read_raw(user_path)? {
            raw = Self::merge_raw(raw, user_config);
        }

        // Layer 2: Project config
        if let Some(project_config) = Self::read_raw(project_path)? {
            raw = Self::merge_raw(raw, project_config);
        }

        let config = Self::finalize(raw);
        config
            .learning
            .validate()
            .context("invalid [learning] configuration")?;
        Ok(config)
    }

    /// User config path (`$XDG_CONFIG_HOME/leadrank/config.toml`)
    pub fn user_config_path() -> PathBuf {
        leadrank_paths::user_config_file()
    }

    /// Project config path
    /// Can be overridden with LEADRANK_PROJECT_CONFIG_DIR
    pub fn project_config_path() -> PathBuf {
        leadrank_paths::project_config_file()
    }

    fn read_raw(path: &Path) -> Result<Option<RawLeadrankConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let raw = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        debug!(path = %path.display(), "loaded config layer");
        Ok(Some(raw))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawLeadrankConfig, overlay: RawLeadrankConfig) -> RawLeadrankConfig {
        RawLeadrankConfig {
            learning: base.learning.merge(overlay.learning),
            feedback: RawFeedbackConfig {
                window_days: overlay.feedback.window_days.or(base.feedback.window_days),
            },
            storage: StorageConfig {
                data_dir: overlay.storage.data_dir.or(base.storage.data_dir),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawLeadrankConfig) -> LeadrankConfig {
        LeadrankConfig {
            learning: raw.learning.finalize(),
            feedback: FeedbackConfig {
                window_days: raw.feedback.window_days.unwrap_or(DEFAULT_WINDOW_DAYS),
            },
            storage: raw.storage,
        }
    }
}
