//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Branchwright has two configuration scopes:
//! - **Global**: User-level settings (interactivity, merge failure policy)
//! - **Repo**: Repository-level settings (remote, naming convention)
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$BRANCHWRIGHT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/branchwright/config.toml`
//! 3. `~/.branchwright/config.toml`
//!
//! When `$BRANCHWRIGHT_CONFIG` is set it is the only location considered.
//! Writes go to the file that was loaded, else to the first location in the
//! order above that applies (`$BRANCHWRIGHT_CONFIG`, else the home location).
//!
//! # Example
//!
//! ```no_run
//! use branchwright::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo/.git"))).unwrap();
//! println!("Remote: {}", config.remote());
//! println!("Branch prefix: {}", config.branch_prefix());
//! ```

pub mod schema;

pub use schema::{
    validate_remote, FailureMode, GlobalConfig, MergeDefaults, NamingConfig, RepoConfig,
};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default remote name.
pub const DEFAULT_REMOTE: &str = "origin";
/// Default branch name prefix.
pub const DEFAULT_BRANCH_PREFIX: &str = "branch";
/// Default branch date suffix format.
pub const DEFAULT_BRANCH_DATE_FORMAT: &str = "%Y%m%d";
/// Default tag name prefix.
pub const DEFAULT_TAG_PREFIX: &str = "tag";
/// Default tag date suffix format.
pub const DEFAULT_TAG_DATE_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Merged configuration from all sources.
///
/// Accessor methods apply defaults; repo config overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if in a repo)
    pub repo: Option<RepoConfig>,
    /// Global file the values came from, if one existed
    pub(crate) global_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// `git_dir` is the repository's `.git` directory; when provided the
    /// repo-scope file inside it is loaded as well.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or hold
    /// invalid values. Missing config files are not an error.
    pub fn load(git_dir: Option<&Path>) -> Result<Config, ConfigError> {
        let global_path = Self::find_global();
        Self::load_from(global_path.as_deref(), git_dir)
    }

    /// Load configuration from an explicit global file and git directory.
    pub fn load_from(
        global_path: Option<&Path>,
        git_dir: Option<&Path>,
    ) -> Result<Config, ConfigError> {
        let (global, global_path) = match global_path {
            Some(path) if path.exists() => (read_toml::<GlobalConfig>(path)?, Some(path)),
            _ => (GlobalConfig::default(), None),
        };

        let repo = match git_dir.map(Self::repo_config_path) {
            Some(path) if path.exists() => Some(read_toml::<RepoConfig>(&path)?),
            _ => None,
        };

        if let Some(ref r) = repo {
            r.validate()?;
        }

        Ok(Config {
            global,
            repo,
            global_path: global_path.map(Path::to_path_buf),
        })
    }

    /// Locate the global config file.
    ///
    /// `$BRANCHWRIGHT_CONFIG` is returned even when the file is missing so
    /// that nothing else is read in its place.
    fn find_global() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("BRANCHWRIGHT_CONFIG") {
            return Some(PathBuf::from(path));
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("branchwright/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".branchwright/config.toml"))
            .filter(|path| path.exists())
    }

    /// Default global config location when no file was loaded.
    ///
    /// Returns `$BRANCHWRIGHT_CONFIG` when set, else `~/.branchwright/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var("BRANCHWRIGHT_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".branchwright/config.toml"))
    }

    /// Get the path for repo config inside a `.git` directory.
    pub fn repo_config_path(git_dir: &Path) -> PathBuf {
        git_dir.join("branchwright/config.toml")
    }

    /// Write global config atomically.
    ///
    /// Goes to the file this config was loaded from, so the next load sees
    /// the new values.
    pub fn write_global(&self, global: &GlobalConfig) -> Result<PathBuf, ConfigError> {
        let path = match &self.global_path {
            Some(path) => path.clone(),
            None => Self::global_config_path()?,
        };
        write_config_atomic(&path, global)?;
        Ok(path)
    }

    /// Write repo config atomically.
    pub fn write_repo(git_dir: &Path, config: &RepoConfig) -> Result<PathBuf, ConfigError> {
        let path = Self::repo_config_path(git_dir);
        write_config_atomic(&path, config)?;
        Ok(path)
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn naming(&self) -> Option<&NamingConfig> {
        self.repo.as_ref().and_then(|r| r.naming.as_ref())
    }

    /// Get the remote name.
    ///
    /// Defaults to "origin" if not configured.
    pub fn remote(&self) -> &str {
        self.repo
            .as_ref()
            .and_then(|r| r.remote.as_deref())
            .unwrap_or(DEFAULT_REMOTE)
    }

    /// Check if interactive mode is enabled by default.
    ///
    /// Defaults to `true` if not configured.
    pub fn interactive(&self) -> bool {
        self.global.interactive.unwrap_or(true)
    }

    /// Failure policy used when the merge command gets no explicit flag.
    pub fn on_failure(&self) -> FailureMode {
        self.global
            .merge
            .as_ref()
            .and_then(|m| m.on_failure)
            .unwrap_or_default()
    }

    pub fn branch_prefix(&self) -> &str {
        self.naming()
            .and_then(|n| n.branch_prefix.as_deref())
            .unwrap_or(DEFAULT_BRANCH_PREFIX)
    }

    pub fn branch_date_format(&self) -> &str {
        self.naming()
            .and_then(|n| n.branch_date_format.as_deref())
            .unwrap_or(DEFAULT_BRANCH_DATE_FORMAT)
    }

    pub fn tag_prefix(&self) -> &str {
        self.naming()
            .and_then(|n| n.tag_prefix.as_deref())
            .unwrap_or(DEFAULT_TAG_PREFIX)
    }

    pub fn tag_date_format(&self) -> &str {
        self.naming()
            .and_then(|n| n.tag_date_format.as_deref())
            .unwrap_or(DEFAULT_TAG_DATE_FORMAT)
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Write a config file atomically (temp file in the same directory, then rename).
fn write_config_atomic<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let contents =
        toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

    let temp_path = path.with_extension("toml.tmp");
    let write_err = |e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    };
    let mut file = fs::File::create(&temp_path).map_err(write_err)?;
    file.write_all(contents.as_bytes()).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;

    fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_empty_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(None, Some(temp.path())).unwrap();

        assert_eq!(config.remote(), "origin");
        assert!(config.interactive());
        assert_eq!(config.on_failure(), FailureMode::Ask);
        assert_eq!(config.branch_prefix(), "branch");
        assert_eq!(config.branch_date_format(), "%Y%m%d");
        assert_eq!(config.tag_prefix(), "tag");
        assert_eq!(config.tag_date_format(), "%Y%m%d_%H%M%S");
        assert!(config.global_path.is_none());
    }

    #[test]
    fn load_global_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
            interactive = false

            [merge]
            on_failure = "stop"
            "#,
        )
        .unwrap();

        let config = Config::load_from(Some(config_path.as_path()), None).unwrap();

        assert!(!config.interactive());
        assert_eq!(config.on_failure(), FailureMode::Stop);
        assert_eq!(config.global_path.as_deref(), Some(config_path.as_path()));
    }

    #[test]
    fn global_write_goes_to_loaded_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("xdg/branchwright/config.toml");
        fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        fs::write(&config_path, "[merge]\non_failure = \"stop\"\n").unwrap();

        let config = Config::load_from(Some(config_path.as_path()), None).unwrap();
        let mut global = config.global.clone();
        global.merge = Some(MergeDefaults {
            on_failure: Some(FailureMode::Continue),
        });
        let written = config.write_global(&global).unwrap();

        assert_eq!(written, config_path);
        let reloaded = Config::load_from(Some(config_path.as_path()), None).unwrap();
        assert_eq!(reloaded.on_failure(), FailureMode::Continue);
    }

    #[test]
    fn missing_global_file_is_not_loaded() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("absent.toml");

        let config = Config::load_from(Some(config_path.as_path()), None).unwrap();
        assert!(config.global_path.is_none());
        assert_eq!(config.on_failure(), FailureMode::Ask);
    }

    #[test]
    fn load_repo_config() {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join("branchwright");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("config.toml"),
            r#"
            remote = "upstream"

            [naming]
            branch_prefix = "release"
            "#,
        )
        .unwrap();

        let config = Config::load_from(None, Some(temp.path())).unwrap();

        assert_eq!(config.remote(), "upstream");
        assert_eq!(config.branch_prefix(), "release");
        assert_eq!(config.tag_prefix(), "tag");
    }

    #[test]
    fn write_repo_config_atomic() {
        let temp = TempDir::new().unwrap();

        let config = RepoConfig {
            remote: Some("mirror".to_string()),
            ..Default::default()
        };

        let path = Config::write_repo(temp.path(), &config).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());
        let loaded = Config::load_from(None, Some(temp.path())).unwrap();
        assert_eq!(loaded.remote(), "mirror");
    }

    #[test]
    fn invalid_values_rejected() {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join("branchwright");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("config.toml"),
            "[naming]\nbranch_prefix = \"bad..prefix\"\n",
        )
        .unwrap();

        let result = Config::load_from(None, Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn unparseable_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "interactive = [").unwrap();

        let err = Config::load_from(Some(config_path.as_path()), None).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
