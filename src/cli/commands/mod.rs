//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Captures a snapshot and calls the engine
//! 3. Formats and displays output
//!
//! Handlers do NOT perform repository mutations directly.

mod branch;
mod completion;
mod config_cmd;
mod merge;
mod name;
mod push;
mod refs;
mod tag;

// Re-export command functions for testing and direct invocation
pub use branch::branch;
pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use merge::{merge, MergeOptions};
pub use name::name;
pub use push::push;
pub use refs::refs;
pub use tag::tag;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use chrono::Local;

use super::args::{Command, ConfigAction, NamingArgs};
use crate::core::config::{validate_remote, Config};
use crate::core::naming::{NameMode, NameSpec};
use crate::core::types::RefKind;
use crate::engine::{Context, RefSnapshot};
use crate::git::Git;
use crate::ui::output::Verbosity;

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Refs { json } => refs::refs(ctx, json),
        Command::Name { tag, naming } => name::name(ctx, tag, &naming),
        Command::Branch { base, naming, push } => branch::branch(ctx, &base, &naming, push),
        Command::Tag { naming, push } => tag::tag(ctx, &naming, push),
        Command::Merge {
            branches,
            tags,
            continue_on_failure,
            stop_on_failure,
            ask_once,
            json,
        } => merge::merge(
            ctx,
            MergeOptions {
                branches,
                tags,
                continue_on_failure,
                stop_on_failure,
                ask_once,
                json,
            },
        ),
        Command::Push { name, tag, all } => push::push(ctx, name.as_deref(), tag, all),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// An opened repository with its merged configuration.
pub(crate) struct Session {
    pub git: Git,
    pub config: Config,
    pub remote: String,
}

impl Session {
    /// Open the repository at `--cwd` (or the current directory).
    pub fn open(ctx: &Context) -> Result<Self> {
        let cwd = working_dir(ctx)?;
        let git = Git::open(&cwd).context("Failed to open repository")?;
        let config = Config::load(Some(git.git_dir())).context("Failed to load config")?;
        let remote = match &ctx.remote {
            Some(remote) => {
                validate_remote(remote).context("Invalid --remote")?;
                remote.clone()
            }
            None => config.remote().to_string(),
        };

        Ok(Self {
            git: git.with_remote(remote.clone()),
            config,
            remote,
        })
    }

    /// Capture a fresh snapshot, fetching unless `--offline`.
    pub fn snapshot(&self, ctx: &Context) -> Result<RefSnapshot> {
        let snapshot = if ctx.offline {
            RefSnapshot::capture_offline(&self.git, &self.remote)
        } else {
            RefSnapshot::capture(&self.git, &self.remote)
        };
        snapshot.with_context(|| {
            if ctx.offline {
                "Failed to read refs".to_string()
            } else {
                format!(
                    "Failed to refresh refs from '{}' (use --offline to skip fetching)",
                    self.remote
                )
            }
        })
    }
}

pub(crate) fn working_dir(ctx: &Context) -> Result<PathBuf> {
    match &ctx.cwd {
        Some(cwd) => Ok(cwd.clone()),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}

pub(crate) fn verbosity(ctx: &Context) -> Verbosity {
    Verbosity::from_flags(ctx.quiet, ctx.debug)
}

/// Build the name spec for `kind` from flags, falling back to config.
pub(crate) fn name_spec(naming: &NamingArgs, kind: RefKind, config: &Config) -> NameSpec {
    let (default_prefix, date_format) = match kind {
        RefKind::Branch => (config.branch_prefix(), config.branch_date_format()),
        RefKind::Tag => (config.tag_prefix(), config.tag_date_format()),
    };
    let prefix = naming
        .prefix
        .clone()
        .unwrap_or_else(|| default_prefix.to_string());
    let mode = if naming.custom {
        NameMode::Custom
    } else {
        NameMode::PrefixDate
    };

    match &naming.date {
        Some(date) => NameSpec {
            prefix,
            custom_suffix: naming.suffix.clone(),
            date_suffix: date.clone(),
            mode,
        },
        None => NameSpec::dated(
            prefix,
            naming.suffix.clone(),
            mode,
            date_format,
            &Local::now(),
        ),
    }
}
