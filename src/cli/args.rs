//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--interactive` / `--no-interactive`: Control prompts
//! - `--quiet` / `-q`: Minimal output
//! - `--remote <name>`: Remote to fetch from and push to
//! - `--offline`: Do not fetch before reading refs

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Branchwright - collision-free dated branch and tag names, batch merges
#[derive(Parser, Debug)]
#[command(name = "bw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if bw was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable interactive prompts
    #[arg(long = "interactive", global = true, conflicts_with = "no_interactive")]
    pub interactive_flag: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    /// Remote to fetch from and push to (default: repo config, then origin)
    #[arg(long, global = true, value_name = "NAME")]
    pub remote: Option<String>,

    /// Use locally known refs without fetching first
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns true if:
    /// - `--interactive` was explicitly set, OR
    /// - Neither `--no-interactive` nor `--quiet` was set, the config
    ///   default allows it, AND stdin is a TTY
    pub fn interactive(&self, config_default: bool) -> bool {
        if self.interactive_flag {
            true
        } else if self.no_interactive || self.quiet {
            false
        } else {
            config_default && std::io::stdin().is_terminal()
        }
    }
}

/// Name derivation options shared by `name`, `branch`, and `tag`.
#[derive(Args, Debug, Clone, Default)]
pub struct NamingArgs {
    /// Name prefix (default: from repo config)
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Extra text appended after the date, or the whole name with --custom
    #[arg(short, long, value_name = "TEXT")]
    pub suffix: Option<String>,

    /// Use --suffix as the entire name instead of prefix_date_suffix
    #[arg(long)]
    pub custom: bool,

    /// Date text to use instead of rendering the current time
    #[arg(long, value_name = "TEXT")]
    pub date: Option<String>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show local branches, remote-only branches, and tags
    #[command(
        name = "refs",
        long_about = "Show the ref names a naming or merge decision would be made against.\n\n\
            Fetches branches and tags from the remote (unless --offline), then lists the \
            current branch, local branches, branches that exist only on the remote, and tags.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Refresh and show refs
    bw refs

    # Without touching the network
    bw --offline refs

    # Machine-readable
    bw refs --json"
    )]
    Refs {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the next free branch or tag name without creating it
    #[command(
        name = "name",
        long_about = "Resolve a collision-free name without creating anything.\n\n\
            The base name is prefix_date (plus _suffix when given), or just the suffix \
            with --custom. If the base is taken by any local branch, remote branch, or tag, \
            the next numeric suffix after the highest existing one is appended: base.1, \
            base.2, and so on. Gaps are never filled.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Next branch name for today
    bw name

    # Next tag name
    bw name --tag

    # Custom base
    bw name --custom -s release"
    )]
    Name {
        /// Resolve a tag name instead of a branch name
        #[arg(long)]
        tag: bool,

        #[command(flatten)]
        naming: NamingArgs,
    },

    /// Create a new branch with a resolved name and switch to it
    #[command(
        name = "branch",
        long_about = "Create a branch at a base branch or tag and check it out.\n\n\
            Refs are refreshed first, so the name is checked against the remote too.",
        after_help = "\
WORKFLOW EXAMPLES:
    # branch_<today> from main
    bw branch --base main

    # release_<today>_hotfix from a tag, then publish it
    bw branch --base v1.2 --prefix release -s hotfix --push"
    )]
    Branch {
        /// Branch or tag to start from
        #[arg(short, long, value_name = "REF")]
        base: String,

        #[command(flatten)]
        naming: NamingArgs,

        /// Push the new branch to the remote
        #[arg(long)]
        push: bool,
    },

    /// Create a tag at HEAD with a resolved name
    #[command(
        name = "tag",
        after_help = "\
WORKFLOW EXAMPLES:
    # tag_<now>
    bw tag

    # Custom tag, published
    bw tag --custom -s v2.0 --push"
    )]
    Tag {
        #[command(flatten)]
        naming: NamingArgs,

        /// Push the new tag to the remote
        #[arg(long)]
        push: bool,
    },

    /// Merge branches and tags into the current branch
    #[command(
        name = "merge",
        long_about = "Merge a batch of branches and tags into the current branch.\n\n\
            Every merge records a merge commit, even when a fast-forward would do. \
            Branches are merged first, in the order given, then tags. When an item fails, \
            its merge is aborted so the working tree is clean, and the rest of the batch \
            either continues or stops depending on --continue-on-failure / \
            --stop-on-failure, the merge.on_failure config, or an interactive prompt.\n\n\
            With no targets, candidates are listed for interactive selection.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Merge two branches and a tag
    bw merge feature-a feature-b --tag v1.0

    # Keep going past conflicts
    bw merge feature-a feature-b --continue-on-failure

    # Pick interactively
    bw merge

EXIT STATUS:
    Non-zero when any item was not merged."
    )]
    Merge {
        /// Branches to merge
        #[arg(value_name = "BRANCH")]
        branches: Vec<String>,

        /// Tags to merge (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Skip failing items and keep going
        #[arg(long, conflicts_with = "stop_on_failure")]
        continue_on_failure: bool,

        /// Stop at the first failing item
        #[arg(long)]
        stop_on_failure: bool,

        /// When prompting, apply the first answer to all later failures
        #[arg(long)]
        ask_once: bool,

        /// Output the merge report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Push a branch or tag, or everything, to the remote
    #[command(
        name = "push",
        after_help = "\
WORKFLOW EXAMPLES:
    # Push the current branch
    bw push

    # Push a tag
    bw push tag_20240101_120000 --tag

    # Push all branches, then all tags
    bw push --all"
    )]
    Push {
        /// Ref to push (default: current branch)
        #[arg(value_name = "REF", conflicts_with = "all")]
        name: Option<String>,

        /// Treat REF as a tag
        #[arg(long, requires = "name")]
        tag: bool,

        /// Push all branches, then all tags
        #[arg(long)]
        all: bool,
    },

    /// Get, set, or list configuration values
    #[command(
        name = "config",
        long_about = "Get, set, or list configuration values.\n\n\
            Repository settings live in .git/branchwright/config.toml; user settings in \
            ~/.branchwright/config.toml.",
        after_help = "\
WORKFLOW EXAMPLES:
    # List all configuration values
    bw config list

    # Change the branch prefix for this repository
    bw config set naming.branch_prefix release

    # Never prompt on merge failures
    bw config set merge.on_failure continue"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    bw completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    bw completion zsh >> ~/.zshrc

    # Fish
    bw completion fish > ~/.config/fish/completions/bw.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
