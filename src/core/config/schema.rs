//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$BRANCHWRIGHT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/branchwright/config.toml`
//! 3. `~/.branchwright/config.toml`
//!
//! # Repo Config
//!
//! Located at `.git/branchwright/config.toml`.
//!
//! # Validation
//!
//! Config values are validated after parsing: prefixes must form valid ref
//! names and date formats must be renderable by `chrono`.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::RefName;

/// What to do when a merge item fails, absent a CLI flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Ask the operator at each failure.
    #[default]
    Ask,
    /// Skip the failing item and keep going.
    Continue,
    /// Stop the plan at the first failure.
    Stop,
}

impl FailureMode {
    pub const VALID: &'static [&'static str] = &["ask", "continue", "stop"];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureMode::Ask => "ask",
            FailureMode::Continue => "continue",
            FailureMode::Stop => "stop",
        }
    }
}

impl std::str::FromStr for FailureMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ask" => Ok(FailureMode::Ask),
            "continue" => Ok(FailureMode::Continue),
            "stop" => Ok(FailureMode::Stop),
            other => Err(ConfigError::InvalidValue(format!(
                "invalid on_failure '{}', must be one of: {}",
                other,
                Self::VALID.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for FailureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// interactive = true
///
/// [merge]
/// on_failure = "ask"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default interactive mode
    pub interactive: Option<bool>,

    /// Merge defaults
    pub merge: Option<MergeDefaults>,
}

/// Repository configuration.
///
/// # Example
///
/// ```toml
/// remote = "origin"
///
/// [naming]
/// branch_prefix = "release"
/// branch_date_format = "%Y%m%d"
/// tag_prefix = "tag"
/// tag_date_format = "%Y%m%d_%H%M%S"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Remote name (default: "origin")
    pub remote: Option<String>,

    /// Naming convention
    pub naming: Option<NamingConfig>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(remote) = &self.remote {
            validate_remote(remote)?;
        }

        if let Some(naming) = &self.naming {
            naming.validate()?;
        }

        Ok(())
    }
}

/// Merge command defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MergeDefaults {
    /// Failure policy when no flag is given
    pub on_failure: Option<FailureMode>,
}

/// Naming convention settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    pub branch_prefix: Option<String>,
    pub branch_date_format: Option<String>,
    pub tag_prefix: Option<String>,
    pub tag_date_format: Option<String>,
}

impl NamingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for prefix in [&self.branch_prefix, &self.tag_prefix].into_iter().flatten() {
            validate_prefix(prefix)?;
        }
        for format in [&self.branch_date_format, &self.tag_date_format]
            .into_iter()
            .flatten()
        {
            validate_date_format(format)?;
        }
        Ok(())
    }
}

/// A remote name is handed to `git fetch` and `git push` as an argument and
/// becomes part of `refs/remotes/<remote>/`, so it must be a valid ref name
/// (which also rules out a leading `-`).
pub fn validate_remote(remote: &str) -> Result<(), ConfigError> {
    if remote.trim().is_empty() {
        return Err(ConfigError::InvalidValue("remote cannot be empty".to_string()));
    }
    RefName::new(remote)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidValue(format!("invalid remote '{}': {}", remote, e)))
}

/// A prefix must be usable as the leading part of a ref name.
pub fn validate_prefix(prefix: &str) -> Result<(), ConfigError> {
    RefName::new(prefix)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidValue(format!("invalid prefix '{}': {}", prefix, e)))
}

/// A date format must be a non-empty strftime pattern `chrono` understands.
pub fn validate_date_format(format: &str) -> Result<(), ConfigError> {
    if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidValue(format!(
            "invalid date format '{}'",
            format
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod global_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = GlobalConfig::default();
            assert!(config.interactive.is_none());
            assert!(config.merge.is_none());
        }

        #[test]
        fn parse_on_failure() {
            let config: GlobalConfig = toml::from_str(
                r#"
                [merge]
                on_failure = "continue"
                "#,
            )
            .unwrap();
            assert_eq!(
                config.merge.unwrap().on_failure,
                Some(FailureMode::Continue)
            );
        }

        #[test]
        fn invalid_on_failure_rejected() {
            let result: Result<GlobalConfig, _> = toml::from_str(
                r#"
                [merge]
                on_failure = "retry"
                "#,
            );
            assert!(result.is_err());
        }

        #[test]
        fn roundtrip() {
            let config = GlobalConfig {
                interactive: Some(false),
                merge: Some(MergeDefaults {
                    on_failure: Some(FailureMode::Stop),
                }),
            };

            let toml = toml::to_string_pretty(&config).unwrap();
            let parsed: GlobalConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config, parsed);
        }
    }

    mod repo_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = RepoConfig::default();
            assert!(config.remote.is_none());
            assert!(config.naming.is_none());
        }

        #[test]
        fn empty_remote_rejected() {
            let config = RepoConfig {
                remote: Some("".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn option_like_remote_rejected() {
            for remote in ["-upload-pack=evil", "--all", "has space", "a..b"] {
                let config = RepoConfig {
                    remote: Some(remote.to_string()),
                    ..Default::default()
                };
                assert!(config.validate().is_err(), "{}", remote);
            }
            assert!(validate_remote("upstream").is_ok());
            assert!(validate_remote("team/fork").is_ok());
        }

        #[test]
        fn invalid_prefix_rejected() {
            let config = RepoConfig {
                naming: Some(NamingConfig {
                    branch_prefix: Some("has space".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn invalid_date_format_rejected() {
            let config = RepoConfig {
                naming: Some(NamingConfig {
                    tag_date_format: Some("%Q".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn valid_naming() {
            let config = RepoConfig {
                remote: Some("upstream".to_string()),
                naming: Some(NamingConfig {
                    branch_prefix: Some("release".to_string()),
                    branch_date_format: Some("%Y-%m-%d".to_string()),
                    tag_prefix: Some("v".to_string()),
                    tag_date_format: Some("%Y%m%d_%H%M%S".to_string()),
                }),
            };
            assert!(config.validate().is_ok());
        }

        #[test]
        fn reject_unknown_fields() {
            let toml = r#"
                remote = "origin"
                unknown_field = true
            "#;

            let result: Result<RepoConfig, _> = toml::from_str(toml);
            assert!(result.is_err());
        }
    }

    mod failure_mode {
        use super::*;

        #[test]
        fn parse_and_display() {
            for name in FailureMode::VALID {
                let mode: FailureMode = name.parse().unwrap();
                assert_eq!(mode.to_string(), *name);
            }
            assert!("sometimes".parse::<FailureMode>().is_err());
        }
    }
}
