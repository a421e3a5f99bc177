//! XDG Base Directory paths for leadrank.
//!
//! User-level config and data follow XDG on every platform. Project-level
//! config lives in a `.leadrank` directory next to the working tree.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "leadrank";

/// Config file name used at both user and project level
pub const CONFIG_FILE: &str = "config.toml";

/// Overrides the project config directory
pub const PROJECT_CONFIG_DIR_ENV: &str = "LEADRANK_PROJECT_CONFIG_DIR";

/// Project config directory name, relative to the working directory
pub const PROJECT_DIR_NAME: &str = ".leadrank";

fn resolve(xdg: Option<String>, home: Option<PathBuf>, home_relative: &str) -> PathBuf {
    match (xdg.filter(|v| !v.is_empty()), home) {
        (Some(base), _) => PathBuf::from(base).join(APP_DIR),
        (None, Some(home)) => home.join(home_relative).join(APP_DIR),
        (None, None) => Path::new(home_relative).join(APP_DIR),
    }
}

/// Get the leadrank config directory.
///
/// Returns `$XDG_CONFIG_HOME/leadrank` if set, otherwise `~/.config/leadrank`.
///
/// # Examples
///
/// ```
/// use leadrank_paths::config_dir;
///
/// let config = config_dir().join("config.toml");
/// ```
pub fn config_dir() -> PathBuf {
    resolve(
        std::env::var("XDG_CONFIG_HOME").ok(),
        dirs::home_dir(),
        ".config",
    )
}

/// Get the leadrank data directory.
///
/// Returns `$XDG_DATA_HOME/leadrank` if set, otherwise
/// `~/.local/share/leadrank`. Feedback history and scoring config versions
/// are stored here unless the config names another directory.
pub fn data_dir() -> PathBuf {
    resolve(
        std::env::var("XDG_DATA_HOME").ok(),
        dirs::home_dir(),
        ".local/share",
    )
}

/// User-level config file
pub fn user_config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Project-level config directory.
///
/// `$LEADRANK_PROJECT_CONFIG_DIR` if set, otherwise `./.leadrank`.
pub fn project_config_dir() -> PathBuf {
    match std::env::var(PROJECT_CONFIG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(PROJECT_DIR_NAME),
    }
}

/// Project-level config file
pub fn project_config_file() -> PathBuf {
    project_config_dir().join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_ends_with_leadrank() {
        assert!(config_dir().ends_with("leadrank"));
    }

    #[test]
    fn test_data_dir_ends_with_leadrank() {
        assert!(data_dir().ends_with("leadrank"));
    }

    #[test]
    fn test_resolve_prefers_xdg() {
        let path = resolve(
            Some("/tmp/test-config".into()),
            Some(PathBuf::from("/home/ana")),
            ".config",
        );
        assert_eq!(path, PathBuf::from("/tmp/test-config/leadrank"));
    }

    #[test]
    fn test_resolve_falls_back_to_home() {
        let path = resolve(None, Some(PathBuf::from("/home/ana")), ".local/share");
        assert_eq!(path, PathBuf::from("/home/ana/.local/share/leadrank"));
    }

    #[test]
    fn test_resolve_ignores_empty_xdg() {
        let path = resolve(Some(String::new()), Some(PathBuf::from("/h")), ".config");
        assert_eq!(path, PathBuf::from("/h/.config/leadrank"));
    }

    #[test]
    fn test_resolve_without_home_is_relative() {
        assert_eq!(
            resolve(None, None, ".config"),
            PathBuf::from(".config/leadrank")
        );
    }

    #[test]
    fn test_config_files_named_config_toml() {
        assert!(user_config_file().ends_with("leadrank/config.toml"));
        assert!(project_config_file().ends_with(CONFIG_FILE));
    }
}
