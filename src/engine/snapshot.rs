//! engine::snapshot
//!
//! Point-in-time capture of the repository's branch and tag names.
//!
//! # Architecture
//!
//! A [`RefSnapshot`] is the only view of ref names the rest of the engine
//! consults. Naming decisions and merge plans take one explicitly, so
//! staleness is a visible precondition instead of an ambient query.
//!
//! # Invariants
//!
//! - A snapshot is immutable once captured
//! - Remote names are stored in short form (`<remote>/` stripped)
//! - The remote `HEAD` pointer is never part of a snapshot
//! - Capture either returns a complete snapshot or an error, never a partial one

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::core::types::{MergeItem, RefKind, RefName};
use crate::git::{Backend, GitError};

/// Errors from capturing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Fetching from the remote failed.
    #[error("failed to fetch from '{remote}': {source}")]
    Fetch {
        remote: String,
        #[source]
        source: GitError,
    },

    /// Enumerating refs failed.
    #[error("failed to enumerate refs: {0}")]
    Enumerate(#[from] GitError),
}

impl SnapshotError {
    /// Whether the failure was the remote being unreachable.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            SnapshotError::Fetch {
                source: GitError::Unavailable { .. },
                ..
            }
        )
    }
}

/// Known branch and tag names at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefSnapshot {
    remote: String,
    current_branch: Option<RefName>,
    local: BTreeSet<RefName>,
    remote_branches: BTreeSet<RefName>,
    tags: BTreeSet<RefName>,
    captured_at: DateTime<Utc>,
    fetched: bool,
}

impl RefSnapshot {
    /// Fetch branches and tags from `remote`, then enumerate.
    pub fn capture<B: Backend + ?Sized>(backend: &B, remote: &str) -> Result<Self, SnapshotError> {
        let fetch_err = |source| SnapshotError::Fetch {
            remote: remote.to_string(),
            source,
        };
        backend.fetch(remote).map_err(fetch_err)?;
        backend.fetch_tags(remote).map_err(fetch_err)?;
        Self::enumerate(backend, remote, true)
    }

    /// Enumerate refs as they are locally known, without fetching.
    pub fn capture_offline<B: Backend + ?Sized>(
        backend: &B,
        remote: &str,
    ) -> Result<Self, SnapshotError> {
        Self::enumerate(backend, remote, false)
    }

    fn enumerate<B: Backend + ?Sized>(
        backend: &B,
        remote: &str,
        fetched: bool,
    ) -> Result<Self, SnapshotError> {
        let local = backend.list_local_branches()?;
        let remote_branches = backend
            .list_remote_branches(remote)?
            .iter()
            .filter_map(|qualified| RefName::from_remote(remote, qualified))
            .collect();
        let tags = backend.list_tags()?;
        let current_branch = backend.current_branch()?;

        let snapshot = Self {
            remote: remote.to_string(),
            current_branch,
            local,
            remote_branches,
            tags,
            captured_at: Utc::now(),
            fetched,
        };

        tracing::info!(
            remote = %snapshot.remote,
            fetched,
            local = snapshot.local.len(),
            remote_branches = snapshot.remote_branches.len(),
            tags = snapshot.tags.len(),
            "snapshot captured"
        );
        Ok(snapshot)
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// The checked-out branch, `None` when HEAD is detached.
    pub fn current_branch(&self) -> Option<&RefName> {
        self.current_branch.as_ref()
    }

    pub fn local_branches(&self) -> &BTreeSet<RefName> {
        &self.local
    }

    /// Remote branches in short form, including those also present locally.
    pub fn remote_branches(&self) -> &BTreeSet<RefName> {
        &self.remote_branches
    }

    pub fn tags(&self) -> &BTreeSet<RefName> {
        &self.tags
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Whether the remote was fetched before enumerating.
    pub fn fetched(&self) -> bool {
        self.fetched
    }

    /// Every name a new branch or tag must not collide with.
    pub fn existing_names(&self) -> BTreeSet<RefName> {
        self.local
            .iter()
            .chain(&self.remote_branches)
            .chain(&self.tags)
            .cloned()
            .collect()
    }

    /// Remote branches with no local branch of the same name.
    pub fn remote_only(&self) -> BTreeSet<RefName> {
        self.remote_branches
            .difference(&self.local)
            .cloned()
            .collect()
    }

    /// Branches that may be merged into the current branch, sorted.
    pub fn branch_candidates(&self) -> Vec<RefName> {
        self.local
            .union(&self.remote_branches)
            .filter(|name| Some(*name) != self.current_branch.as_ref())
            .cloned()
            .collect()
    }

    /// Tags that may be merged, sorted.
    pub fn tag_candidates(&self) -> Vec<RefName> {
        self.tags.iter().cloned().collect()
    }

    /// Whether `name` exists as a local or remote branch.
    pub fn has_branch(&self, name: &str) -> bool {
        self.local.contains(name) || self.remote_branches.contains(name)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains(name)
    }

    /// Whether the snapshot knows `item` under its kind.
    pub fn contains(&self, item: &MergeItem) -> bool {
        match item.kind {
            RefKind::Branch => self.has_branch(item.name.as_str()),
            RefKind::Tag => self.has_tag(item.name.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::{MockBackend, MockOperation};

    fn names(list: &[&str]) -> Vec<RefName> {
        list.iter().map(|n| RefName::new(*n).unwrap()).collect()
    }

    fn backend() -> MockBackend {
        MockBackend::new()
            .with_local_branches(["main", "feature"])
            .with_remote_branches([
                "origin/HEAD",
                "origin/main",
                "origin/hotfix",
                "upstream/other",
            ])
            .with_tags(["v1"])
            .on_branch("main")
    }

    #[test]
    fn capture_fetches_then_enumerates() {
        let backend = backend();
        let snapshot = RefSnapshot::capture(&backend, "origin").unwrap();

        assert!(snapshot.fetched());
        assert_eq!(
            backend.operations(),
            vec![
                MockOperation::Fetch {
                    remote: "origin".into()
                },
                MockOperation::FetchTags {
                    remote: "origin".into()
                },
            ]
        );
    }

    #[test]
    fn capture_offline_does_not_fetch() {
        let backend = backend();
        let snapshot = RefSnapshot::capture_offline(&backend, "origin").unwrap();

        assert!(!snapshot.fetched());
        assert!(backend.operations().is_empty());
    }

    #[test]
    fn remote_names_are_shortened_and_head_dropped() {
        let snapshot = RefSnapshot::capture_offline(&backend(), "origin").unwrap();

        assert_eq!(
            snapshot.remote_branches().iter().cloned().collect::<Vec<_>>(),
            names(&["hotfix", "main"])
        );
        assert!(!snapshot.has_branch("HEAD"));
        assert!(!snapshot.has_branch("other"));
    }

    #[test]
    fn remote_only_excludes_local_names() {
        let snapshot = RefSnapshot::capture_offline(&backend(), "origin").unwrap();
        assert_eq!(
            snapshot.remote_only().into_iter().collect::<Vec<_>>(),
            names(&["hotfix"])
        );
    }

    #[test]
    fn existing_names_is_union() {
        let snapshot = RefSnapshot::capture_offline(&backend(), "origin").unwrap();
        assert_eq!(
            snapshot.existing_names().into_iter().collect::<Vec<_>>(),
            names(&["feature", "hotfix", "main", "v1"])
        );
    }

    #[test]
    fn candidates_exclude_current_branch() {
        let snapshot = RefSnapshot::capture_offline(&backend(), "origin").unwrap();

        assert_eq!(snapshot.current_branch().unwrap().as_str(), "main");
        assert_eq!(snapshot.branch_candidates(), names(&["feature", "hotfix"]));
        assert_eq!(snapshot.tag_candidates(), names(&["v1"]));
    }

    #[test]
    fn detached_head_keeps_all_candidates() {
        let backend = MockBackend::new().with_local_branches(["main", "feature"]);
        let snapshot = RefSnapshot::capture_offline(&backend, "origin").unwrap();

        assert!(snapshot.current_branch().is_none());
        assert_eq!(snapshot.branch_candidates(), names(&["feature", "main"]));
    }

    #[test]
    fn contains_respects_kind() {
        let snapshot = RefSnapshot::capture_offline(&backend(), "origin").unwrap();
        let v1 = RefName::new("v1").unwrap();

        assert!(snapshot.contains(&MergeItem::tag(v1.clone())));
        assert!(!snapshot.contains(&MergeItem::branch(v1)));
    }

    #[test]
    fn fetch_failure_is_reported() {
        let backend = backend().fail_fetch(GitError::Unavailable {
            operation: "fetch".into(),
            message: "Could not read from remote repository".into(),
        });

        let err = RefSnapshot::capture(&backend, "origin").unwrap_err();
        assert!(err.is_unavailable());
        assert!(err.to_string().contains("origin"));
    }
}
