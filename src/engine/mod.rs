//! engine
//!
//! Orchestrates the command lifecycle: Snapshot -> Resolve/Plan -> Execute.
//!
//! # Architecture
//!
//! Every mutating command follows the same shape:
//!
//! 1. **Snapshot**: capture the ref names the decision depends on
//! 2. **Resolve / Plan**: derive a collision-free name, or build and validate
//!    a merge plan, purely from the snapshot
//! 3. **Execute**: apply the result through the [`Backend`](crate::git::Backend)
//!
//! ```text
//! RefSnapshot -> resolve(NameSpec) -> create_branch / create_tag -> push
//! RefSnapshot -> MergePlan::validate -> execute(plan, policy) -> MergeReport
//! ```
//!
//! # Invariants
//!
//! - Decisions are made against an explicit snapshot, never ambient queries
//! - The engine never re-captures a snapshot on its own
//! - After `execute` returns, no merge is left in progress

pub mod exec;
pub mod ops;
pub mod plan;
pub mod snapshot;

pub use exec::{
    execute, ExecError, FailurePolicy, MergeOutcome, MergeReport, MergeResult, OnFailure,
    ScriptedPolicy,
};
pub use ops::{create_branch, create_tag, push_all, push_ref, OpsError};
pub use plan::{MergePlan, PlanError};
pub use snapshot::{RefSnapshot, SnapshotError};

use std::path::PathBuf;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
    /// Remote override; falls back to the repo config.
    pub remote: Option<String>,
    /// Skip fetching when capturing snapshots.
    pub offline: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            interactive: true,
            remote: None,
            offline: false,
        }
    }
}
