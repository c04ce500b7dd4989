//! config command - Get, set, or list configuration values
//!
//! Keys are dotted paths into the TOML files. `remote` and `naming.*` live in
//! the repository scope; `interactive` and `merge.on_failure` in the global
//! scope.

use anyhow::{bail, Context as _, Result};

use super::{verbosity, Session};
use crate::core::config::schema::{validate_date_format, validate_prefix, validate_remote};
use crate::core::config::{Config, FailureMode};
use crate::engine::Context;
use crate::ui::output;

/// Where a key is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Global,
    Repo,
}

const KEYS: &[(&str, Scope)] = &[
    ("interactive", Scope::Global),
    ("merge.on_failure", Scope::Global),
    ("remote", Scope::Repo),
    ("naming.branch_prefix", Scope::Repo),
    ("naming.branch_date_format", Scope::Repo),
    ("naming.tag_prefix", Scope::Repo),
    ("naming.tag_date_format", Scope::Repo),
];

fn scope_of(key: &str) -> Result<Scope> {
    KEYS.iter()
        .find(|(k, _)| *k == key)
        .map(|(_, scope)| *scope)
        .ok_or_else(|| {
            let known: Vec<_> = KEYS.iter().map(|(k, _)| *k).collect();
            anyhow::anyhow!(
                "Unknown configuration key: {} (known keys: {})",
                key,
                known.join(", ")
            )
        })
}

/// Effective value of `key`, defaults applied.
fn effective(config: &Config, key: &str) -> Option<String> {
    let value = match key {
        "interactive" => config.interactive().to_string(),
        "merge.on_failure" => config.on_failure().to_string(),
        "remote" => config.remote().to_string(),
        "naming.branch_prefix" => config.branch_prefix().to_string(),
        "naming.branch_date_format" => config.branch_date_format().to_string(),
        "naming.tag_prefix" => config.tag_prefix().to_string(),
        "naming.tag_date_format" => config.tag_date_format().to_string(),
        _ => return None,
    };
    Some(value)
}

/// Global keys work outside a repository; repo keys need one.
fn load(ctx: &Context, scope: Scope) -> Result<(Config, Option<Session>)> {
    match scope {
        Scope::Global => {
            let config = Config::load(None).context("Failed to load config")?;
            Ok((config, None))
        }
        Scope::Repo => {
            let session = Session::open(ctx)?;
            Ok((session.config.clone(), Some(session)))
        }
    }
}

/// Get a configuration value.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let (config, _) = load(ctx, scope_of(key)?)?;
    if let Some(value) = effective(&config, key) {
        println!("{}", value);
    }
    Ok(())
}

/// Set a configuration value.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let scope = scope_of(key)?;
    let (config, session) = load(ctx, scope)?;

    let path = match (scope, session) {
        (Scope::Global, _) => {
            let mut global = config.global.clone();
            match key {
                "interactive" => {
                    let parsed = value
                        .parse::<bool>()
                        .with_context(|| format!("Invalid boolean '{}'", value))?;
                    global.interactive = Some(parsed);
                }
                "merge.on_failure" => {
                    let mode: FailureMode = value.parse()?;
                    global.merge.get_or_insert_with(Default::default).on_failure = Some(mode);
                }
                _ => bail!("Unknown configuration key: {}", key),
            }
            config.write_global(&global).context("Failed to write config")?
        }
        (Scope::Repo, Some(session)) => {
            let mut repo = config.repo.unwrap_or_default();
            if key == "remote" {
                validate_remote(value)?;
                repo.remote = Some(value.to_string());
            } else {
                let naming = repo.naming.get_or_insert_with(Default::default);
                match key {
                    "naming.branch_prefix" => {
                        validate_prefix(value)?;
                        naming.branch_prefix = Some(value.to_string());
                    }
                    "naming.tag_prefix" => {
                        validate_prefix(value)?;
                        naming.tag_prefix = Some(value.to_string());
                    }
                    "naming.branch_date_format" => {
                        validate_date_format(value)?;
                        naming.branch_date_format = Some(value.to_string());
                    }
                    "naming.tag_date_format" => {
                        validate_date_format(value)?;
                        naming.tag_date_format = Some(value.to_string());
                    }
                    _ => bail!("Unknown configuration key: {}", key),
                }
            }
            repo.validate()?;
            Config::write_repo(session.git.git_dir(), &repo).context("Failed to write config")?
        }
        (Scope::Repo, None) => bail!("Repository config requires a repository"),
    };

    output::print(
        format!("Set {} = {} ({})", key, value, path.display()),
        verbosity(ctx),
    );
    Ok(())
}

/// List all configuration values.
///
/// Outside a repository only global keys are listed.
pub fn list(ctx: &Context) -> Result<()> {
    let (config, in_repo) = match Session::open(ctx) {
        Ok(session) => (session.config, true),
        Err(_) => (Config::load(None).context("Failed to load config")?, false),
    };

    for (key, scope) in KEYS {
        if *scope == Scope::Repo && !in_repo {
            continue;
        }
        if let Some(value) = effective(&config, key) {
            println!("{} = {}", key, value);
        }
    }
    Ok(())
}
