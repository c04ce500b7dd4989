//! git::backend
//!
//! The version-control primitives the engine consumes.
//!
//! # Design
//!
//! Each method is one blocking, atomic primitive whose success or failure
//! the engine reacts to. The engine never assumes anything about how a
//! primitive is carried out; [`Git`](super::Git) binds them to a real
//! repository and [`MockBackend`](super::mock::MockBackend) scripts them
//! for tests.
//!
//! Failures use the [`GitError`] taxonomy:
//! - `Unavailable`: remote unreachable or authentication failed
//! - `RefNotFound`: the named ref does not exist
//! - `NameCollision`: the name to create is taken
//! - `RefRejected`: the remote refused a push
//! - `MergeConflict`: a merge stopped on conflicting content

use std::collections::BTreeSet;

use super::{GitError, GitState};
use crate::core::types::{MergeItem, RefKind, RefName};

/// What a push sends to the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushTarget {
    /// A single local branch.
    Branch(RefName),
    /// A single tag.
    Tag(RefName),
    /// Every local branch.
    AllBranches,
    /// Every tag.
    AllTags,
}

impl std::fmt::Display for PushTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushTarget::Branch(name) => write!(f, "branch {}", name),
            PushTarget::Tag(name) => write!(f, "tag {}", name),
            PushTarget::AllBranches => f.write_str("all branches"),
            PushTarget::AllTags => f.write_str("all tags"),
        }
    }
}

/// Version-control backend primitives.
pub trait Backend {
    /// Local branch names.
    fn list_local_branches(&self) -> Result<BTreeSet<RefName>, GitError>;

    /// Remote-tracking branch names of `remote`, fully qualified as
    /// `<remote>/<short>`, including the synthetic `<remote>/HEAD` pointer.
    fn list_remote_branches(&self, remote: &str) -> Result<BTreeSet<String>, GitError>;

    /// Tag names.
    fn list_tags(&self) -> Result<BTreeSet<RefName>, GitError>;

    /// The checked-out branch, or `None` when HEAD is detached or unborn.
    fn current_branch(&self) -> Result<Option<RefName>, GitError>;

    /// Fetch branch refs from `remote`.
    fn fetch(&self, remote: &str) -> Result<(), GitError>;

    /// Fetch tags from `remote`.
    fn fetch_tags(&self, remote: &str) -> Result<(), GitError>;

    /// Switch the working tree to `name`.
    fn checkout(&self, name: &RefName) -> Result<(), GitError>;

    /// Create branch `name` at `base` and switch to it in one step.
    fn create_branch(&self, name: &RefName, base: &RefName, base_kind: RefKind)
        -> Result<(), GitError>;

    /// Create tag `name` at HEAD.
    fn create_tag(&self, name: &RefName) -> Result<(), GitError>;

    /// Merge `item` into HEAD, always recording a merge commit.
    fn merge_no_ff(&self, item: &MergeItem) -> Result<(), GitError>;

    /// Abort an in-progress merge. A no-op when no merge is in progress.
    fn merge_abort(&self) -> Result<(), GitError>;

    /// Push `target` to `remote`.
    fn push(&self, remote: &str, target: &PushTarget) -> Result<(), GitError>;

    /// The repository's in-progress operation state.
    fn state(&self) -> Result<GitState, GitError>;

    /// Whether a merge is currently in progress.
    fn merge_in_progress(&self) -> Result<bool, GitError> {
        Ok(self.state()? == GitState::Merge)
    }
}
