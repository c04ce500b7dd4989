//! git::mock
//!
//! In-memory backend for deterministic testing.
//!
//! # Design
//!
//! `MockBackend` implements [`Backend`] over in-memory ref sets. Merges can
//! be scripted to conflict per item, remote operations can be made to fail,
//! and every primitive call is recorded so tests can assert ordering and
//! abort counts.
//!
//! # Example
//!
//! ```
//! use branchwright::core::types::{MergeItem, RefName};
//! use branchwright::git::mock::{MockBackend, MockOperation};
//! use branchwright::git::Backend;
//!
//! let backend = MockBackend::new()
//!     .with_local_branches(["main", "feature"])
//!     .on_branch("main")
//!     .conflict_on("feature");
//!
//! let item = MergeItem::branch(RefName::new("feature").unwrap());
//! assert!(backend.merge_no_ff(&item).is_err());
//! assert!(backend.merge_in_progress().unwrap());
//!
//! backend.merge_abort().unwrap();
//! assert!(!backend.merge_in_progress().unwrap());
//! assert_eq!(backend.count(|op| matches!(op, MockOperation::MergeAbort)), 1);
//! ```

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use super::backend::{Backend, PushTarget};
use super::{GitError, GitState};
use crate::core::types::{MergeItem, RefKind, RefName};

/// Mock backend for testing.
///
/// Clones share state, so a test can keep a handle for inspection while
/// the code under test borrows another.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<MockBackendInner>>,
}

#[derive(Debug, Default)]
struct MockBackendInner {
    local: BTreeSet<RefName>,
    remote: BTreeSet<String>,
    tags: BTreeSet<RefName>,
    current: Option<RefName>,
    state: Option<GitState>,
    conflicts: BTreeSet<(RefName, RefKind)>,
    fail_fetch: Option<GitError>,
    fail_push: Option<GitError>,
    fail_abort: Option<GitError>,
    operations: Vec<MockOperation>,
}

/// Recorded primitive call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Fetch { remote: String },
    FetchTags { remote: String },
    Checkout { name: String },
    CreateBranch { name: String, base: String },
    CreateTag { name: String },
    Merge { item: MergeItem },
    MergeAbort,
    Push { remote: String, target: PushTarget },
}

fn names<I, S>(list: I) -> impl Iterator<Item = RefName>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    list.into_iter().filter_map(|n| RefName::new(n.as_ref()).ok())
}

impl MockBackend {
    /// Create an empty mock backend with a clean working tree.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockBackendInner> {
        // A poisoned lock only happens after a test already panicked.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn with_local_branches<I, S>(self, list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.lock().local.extend(names(list));
        self
    }

    /// Add remote-tracking branches, given fully qualified (`origin/x`).
    pub fn with_remote_branches<I, S>(self, list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.lock()
            .remote
            .extend(list.into_iter().map(|n| n.as_ref().to_string()));
        self
    }

    pub fn with_tags<I, S>(self, list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.lock().tags.extend(names(list));
        self
    }

    pub fn on_branch(self, name: &str) -> Self {
        self.lock().current = RefName::new(name).ok();
        self
    }

    /// Start in the given repository state.
    pub fn in_state(self, state: GitState) -> Self {
        self.lock().state = Some(state);
        self
    }

    /// Make merging the branch `name` conflict.
    pub fn conflict_on(self, name: &str) -> Self {
        self.conflict_on_kind(name, RefKind::Branch)
    }

    /// Make merging the tag `name` conflict.
    pub fn conflict_on_tag(self, name: &str) -> Self {
        self.conflict_on_kind(name, RefKind::Tag)
    }

    fn conflict_on_kind(self, name: &str, kind: RefKind) -> Self {
        if let Ok(name) = RefName::new(name) {
            self.lock().conflicts.insert((name, kind));
        }
        self
    }

    pub fn fail_fetch(self, err: GitError) -> Self {
        self.lock().fail_fetch = Some(err);
        self
    }

    pub fn fail_push(self, err: GitError) -> Self {
        self.lock().fail_push = Some(err);
        self
    }

    pub fn fail_abort(self, err: GitError) -> Self {
        self.lock().fail_abort = Some(err);
        self
    }

    /// All recorded operations, in call order.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Number of recorded operations matching `pred`.
    pub fn count(&self, pred: impl Fn(&MockOperation) -> bool) -> usize {
        self.lock().operations.iter().filter(|op| pred(op)).count()
    }

    /// Items passed to `merge_no_ff`, in call order.
    pub fn merge_attempts(&self) -> Vec<MergeItem> {
        self.lock()
            .operations
            .iter()
            .filter_map(|op| match op {
                MockOperation::Merge { item } => Some(item.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }
}

impl Backend for MockBackend {
    fn list_local_branches(&self) -> Result<BTreeSet<RefName>, GitError> {
        Ok(self.lock().local.clone())
    }

    fn list_remote_branches(&self, remote: &str) -> Result<BTreeSet<String>, GitError> {
        let prefix = format!("{}/", remote);
        Ok(self
            .lock()
            .remote
            .iter()
            .filter(|n| n.starts_with(&prefix))
            .cloned()
            .collect())
    }

    fn list_tags(&self) -> Result<BTreeSet<RefName>, GitError> {
        Ok(self.lock().tags.clone())
    }

    fn current_branch(&self) -> Result<Option<RefName>, GitError> {
        Ok(self.lock().current.clone())
    }

    fn fetch(&self, remote: &str) -> Result<(), GitError> {
        self.record(MockOperation::Fetch {
            remote: remote.to_string(),
        });
        match self.lock().fail_fetch.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fetch_tags(&self, remote: &str) -> Result<(), GitError> {
        self.record(MockOperation::FetchTags {
            remote: remote.to_string(),
        });
        match self.lock().fail_fetch.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn checkout(&self, name: &RefName) -> Result<(), GitError> {
        self.record(MockOperation::Checkout {
            name: name.to_string(),
        });
        let mut inner = self.lock();
        if !inner.local.contains(name) && !inner.tags.contains(name) {
            return Err(GitError::RefNotFound {
                refname: name.to_string(),
            });
        }
        inner.current = inner.local.contains(name).then(|| name.clone());
        Ok(())
    }

    fn create_branch(
        &self,
        name: &RefName,
        base: &RefName,
        base_kind: RefKind,
    ) -> Result<(), GitError> {
        self.record(MockOperation::CreateBranch {
            name: name.to_string(),
            base: base.to_string(),
        });
        let mut inner = self.lock();
        if inner.local.contains(name) {
            return Err(GitError::NameCollision {
                refname: name.to_string(),
            });
        }
        let base_exists = match base_kind {
            RefKind::Branch => {
                inner.local.contains(base)
                    || inner.remote.iter().any(|r| r.ends_with(&format!("/{}", base)))
            }
            RefKind::Tag => inner.tags.contains(base),
        };
        if !base_exists {
            return Err(GitError::RefNotFound {
                refname: base.to_string(),
            });
        }
        inner.local.insert(name.clone());
        inner.current = Some(name.clone());
        Ok(())
    }

    fn create_tag(&self, name: &RefName) -> Result<(), GitError> {
        self.record(MockOperation::CreateTag {
            name: name.to_string(),
        });
        let mut inner = self.lock();
        if !inner.tags.insert(name.clone()) {
            return Err(GitError::NameCollision {
                refname: name.to_string(),
            });
        }
        Ok(())
    }

    fn merge_no_ff(&self, item: &MergeItem) -> Result<(), GitError> {
        self.record(MockOperation::Merge { item: item.clone() });
        let mut inner = self.lock();
        if inner.conflicts.contains(&(item.name.clone(), item.kind)) {
            inner.state = Some(GitState::Merge);
            return Err(GitError::MergeConflict {
                refname: item.name.to_string(),
                message: "CONFLICT (content): scripted".to_string(),
            });
        }
        Ok(())
    }

    fn merge_abort(&self) -> Result<(), GitError> {
        self.record(MockOperation::MergeAbort);
        let mut inner = self.lock();
        if let Some(err) = inner.fail_abort.clone() {
            return Err(err);
        }
        if inner.state == Some(GitState::Merge) {
            inner.state = None;
        }
        Ok(())
    }

    fn push(&self, remote: &str, target: &PushTarget) -> Result<(), GitError> {
        self.record(MockOperation::Push {
            remote: remote.to_string(),
            target: target.clone(),
        });
        match self.lock().fail_push.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn state(&self) -> Result<GitState, GitError> {
        Ok(self.lock().state.unwrap_or(GitState::Clean))
    }
}
