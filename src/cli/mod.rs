//! cli
//!
//! Command-line interface layer for Branchwright.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the tracing subscriber
//! - Delegate to command handlers
//! - Does NOT perform repository mutations directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to the
//! [`crate::engine`] for execution. All repository state changes flow through
//! the engine and the [`crate::git::Backend`] trait.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::engine;

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "BRANCHWRIGHT_LOG";

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    // Only the global scope matters for interactivity; the repo scope is
    // loaded per command once the repository is known.
    let config = Config::load(None).context("Failed to load config")?;

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(config.interactive()),
        remote: cli.remote.clone(),
        offline: cli.offline,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Route structured events to stderr.
///
/// `--debug` wins; otherwise `BRANCHWRIGHT_LOG`, then `RUST_LOG`, then `warn`.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        std::env::var(LOG_ENV)
            .ok()
            .and_then(|directive| EnvFilter::try_new(directive).ok())
            .or_else(|| EnvFilter::try_from_default_env().ok())
            .unwrap_or_else(|| EnvFilter::new("warn"))
    };

    // A subscriber may already be set when embedded; that is not an error.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
