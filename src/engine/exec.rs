//! engine::exec
//!
//! The batch merge executor.
//!
//! # Architecture
//!
//! [`execute`] walks a [`MergePlan`] strictly in order, attempting one
//! non-fast-forward merge per item. Failures are isolated per item: the
//! in-progress merge is aborted, then a [`FailurePolicy`] decides whether
//! the rest of the plan runs.
//!
//! # Executor Contract
//!
//! The executor MUST:
//! 1. Refuse to start while another operation is in progress
//! 2. Call `merge_abort` exactly once per failing item, before asking the policy
//! 3. Never call `merge_abort` after a successful item
//! 4. On `StopOnFailure`, mark the failing item `AbortedPlan` and every
//!    remaining item `Skipped` without attempting it
//!
//! # Invariants
//!
//! - The working tree is never left mid-merge on return, unless the abort
//!   itself failed, which is reported as [`ExecError::AbortFailed`]
//! - Outcomes are returned in plan order, one per item
//! - The executor does not refresh any snapshot; callers re-capture
//!
//! # Example
//!
//! ```
//! use branchwright::core::types::{MergeItem, RefName};
//! use branchwright::engine::exec::{execute, MergeResult, OnFailure};
//! use branchwright::engine::plan::MergePlan;
//! use branchwright::git::mock::MockBackend;
//!
//! let backend = MockBackend::new().conflict_on("b");
//! let plan = MergePlan::new(
//!     ["a", "b", "c"].map(|n| MergeItem::branch(RefName::new(n).unwrap())),
//! );
//!
//! let report = execute(&plan, &backend, &mut OnFailure::ContinueOnFailure).unwrap();
//! let results: Vec<_> = report.outcomes().iter().map(|o| o.result).collect();
//! assert_eq!(
//!     results,
//!     [MergeResult::Merged, MergeResult::Skipped, MergeResult::Merged]
//! );
//! ```

use std::collections::VecDeque;

use serde::Serialize;
use thiserror::Error;

use super::plan::MergePlan;
use crate::core::types::MergeItem;
use crate::git::{Backend, GitError, GitState};

/// Errors that end execution early.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The repository is already mid-operation.
    #[error("{0} in progress; finish or abort it before merging")]
    OperationInProgress(GitState),

    /// Aborting a failed merge failed; the working tree may be conflicted.
    #[error("failed to abort merge of {item}: {source}")]
    AbortFailed {
        item: MergeItem,
        #[source]
        source: GitError,
        /// Outcomes of the items before `item`.
        outcomes: Vec<MergeOutcome>,
    },

    /// Reading repository state failed.
    #[error("git error: {0}")]
    Backend(#[from] GitError),
}

/// Decision taken when a merge item fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnFailure {
    /// Skip the failing item and keep going.
    ContinueOnFailure,
    /// Stop the plan; remaining items are skipped.
    StopOnFailure,
}

/// Supplies a decision at each failing item.
///
/// Called after the failed merge has been aborted, so implementations may
/// block (e.g. waiting on the operator) without holding a conflicted tree.
pub trait FailurePolicy {
    fn decide(&mut self, item: &MergeItem, error: &GitError) -> OnFailure;
}

impl FailurePolicy for OnFailure {
    fn decide(&mut self, _item: &MergeItem, _error: &GitError) -> OnFailure {
        *self
    }
}

impl<F> FailurePolicy for F
where
    F: FnMut(&MergeItem, &GitError) -> OnFailure,
{
    fn decide(&mut self, item: &MergeItem, error: &GitError) -> OnFailure {
        self(item, error)
    }
}

/// A fixed sequence of decisions, consumed one per failure.
///
/// Once exhausted every further failure stops the plan.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPolicy {
    decisions: VecDeque<OnFailure>,
    asked: Vec<MergeItem>,
}

impl ScriptedPolicy {
    pub fn new(decisions: impl IntoIterator<Item = OnFailure>) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Items a decision was requested for, in order.
    pub fn asked(&self) -> &[MergeItem] {
        &self.asked
    }
}

impl FailurePolicy for ScriptedPolicy {
    fn decide(&mut self, item: &MergeItem, _error: &GitError) -> OnFailure {
        self.asked.push(item.clone());
        self.decisions
            .pop_front()
            .unwrap_or(OnFailure::StopOnFailure)
    }
}

/// Per-item result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeResult {
    Merged,
    Skipped,
    AbortedPlan,
}

impl std::fmt::Display for MergeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MergeResult::Merged => "merged",
            MergeResult::Skipped => "skipped",
            MergeResult::AbortedPlan => "aborted plan",
        })
    }
}

/// What happened to one plan item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub item: MergeItem,
    pub result: MergeResult,
    /// The failure message, for items whose merge was attempted and failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MergeOutcome {
    fn new(item: &MergeItem, result: MergeResult, error: Option<&GitError>) -> Self {
        Self {
            item: item.clone(),
            result,
            error: error.map(|e| e.to_string()),
        }
    }
}

/// Outcomes of a completed (or stopped) plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    merged: usize,
    skipped: usize,
    stopped: bool,
    outcomes: Vec<MergeOutcome>,
}

impl MergeReport {
    pub fn from_outcomes(outcomes: Vec<MergeOutcome>) -> Self {
        let count = |r: MergeResult| outcomes.iter().filter(|o| o.result == r).count();
        Self {
            merged: count(MergeResult::Merged),
            skipped: count(MergeResult::Skipped),
            stopped: count(MergeResult::AbortedPlan) > 0,
            outcomes,
        }
    }

    pub fn outcomes(&self) -> &[MergeOutcome] {
        &self.outcomes
    }

    pub fn merged(&self) -> usize {
        self.merged
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Whether a failure stopped the plan.
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    /// Whether every item merged.
    pub fn all_merged(&self) -> bool {
        self.merged == self.outcomes.len()
    }
}

/// Apply `plan` against `backend`, consulting `policy` at each failure.
///
/// # Errors
///
/// - [`ExecError::OperationInProgress`] if the repository is mid-operation
///   before the first item
/// - [`ExecError::AbortFailed`] if restoring the tree after a failure fails
pub fn execute<B, P>(
    plan: &MergePlan,
    backend: &B,
    policy: &mut P,
) -> Result<MergeReport, ExecError>
where
    B: Backend + ?Sized,
    P: FailurePolicy + ?Sized,
{
    let state = backend.state()?;
    if state.is_in_progress() {
        return Err(ExecError::OperationInProgress(state));
    }

    let mut outcomes = Vec::with_capacity(plan.len());
    let mut items = plan.items().iter();

    while let Some(item) = items.next() {
        let err = match backend.merge_no_ff(item) {
            Ok(()) => {
                tracing::info!(
                    item = %item.name,
                    kind = %item.kind,
                    outcome = "merged",
                    "merge item merged"
                );
                outcomes.push(MergeOutcome::new(item, MergeResult::Merged, None));
                continue;
            }
            Err(err) => err,
        };

        tracing::warn!(item = %item.name, kind = %item.kind, error = %err, "merge item failed");

        if let Err(source) = backend.merge_abort() {
            tracing::error!(item = %item.name, error = %source, "merge abort failed");
            return Err(ExecError::AbortFailed {
                item: item.clone(),
                source,
                outcomes,
            });
        }

        match policy.decide(item, &err) {
            OnFailure::ContinueOnFailure => {
                tracing::info!(
                    item = %item.name,
                    kind = %item.kind,
                    outcome = "skipped",
                    "merge item skipped"
                );
                outcomes.push(MergeOutcome::new(item, MergeResult::Skipped, Some(&err)));
            }
            OnFailure::StopOnFailure => {
                outcomes.push(MergeOutcome::new(item, MergeResult::AbortedPlan, Some(&err)));
                let remaining = items.len();
                outcomes.extend(
                    items
                        .by_ref()
                        .map(|rest| MergeOutcome::new(rest, MergeResult::Skipped, None)),
                );
                tracing::info!(item = %item.name, remaining, "plan aborted");
                break;
            }
        }
    }

    Ok(MergeReport::from_outcomes(outcomes))
}
