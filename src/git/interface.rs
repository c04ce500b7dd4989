//! git::interface
//!
//! Git backend implementation.
//!
//! This module provides the **single doorway** to Git. Reads (branch and tag
//! enumeration, HEAD, repository state) go through `git2`. Network
//! operations and working-tree mutations (fetch, checkout, merge, tag, push)
//! run the `git` CLI inside the work tree, so credentials, hooks and merge
//! drivers behave exactly as they do for the operator.
//!
//! # Error Handling
//!
//! Failures are normalized into typed [`GitError`] variants:
//! - [`GitError::Unavailable`]: remote unreachable or authentication failed
//! - [`GitError::RefNotFound`]: requested ref does not exist
//! - [`GitError::NameCollision`]: a ref with that name already exists
//! - [`GitError::RefRejected`]: the remote refused a push
//! - [`GitError::MergeConflict`]: a merge stopped on conflicting content
//!
//! # Example
//!
//! ```ignore
//! use branchwright::git::{Backend, Git};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?.with_remote("origin");
//! let branches = git.list_local_branches()?;
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use super::backend::{Backend, PushTarget};
use crate::core::types::{MergeItem, RefKind, RefName, TypeError};

/// Errors from Git operations.
///
/// Every variant carries the offending name or operation so that callers
/// can report it without extra context.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo { path: PathBuf },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// The remote could not be reached (network, auth, unknown remote).
    #[error("{operation} failed, remote unavailable: {message}")]
    Unavailable { operation: String, message: String },

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound { refname: String },

    /// A ref with the requested name already exists.
    #[error("name already exists: {refname}")]
    NameCollision { refname: String },

    /// The remote rejected an update.
    #[error("remote rejected {refname}: {message}")]
    RefRejected { refname: String, message: String },

    /// Merge stopped on conflicting content.
    #[error("merge of {refname} conflicted: {message}")]
    MergeConflict { refname: String, message: String },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName { message: String },

    /// Any other git failure.
    #[error("git error: {message}")]
    Internal { message: String },
}

impl GitError {
    /// Create a GitError from a git2::Error with context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::RefNotFound {
                refname: context.to_string(),
            },
            git2::ErrorCode::Exists => GitError::NameCollision {
                refname: context.to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidRefName {
                message: format!("{}: {}", context, err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidRefName(message) => GitError::InvalidRefName { message },
        }
    }
}

/// State of in-progress Git operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitState {
    /// No operation in progress.
    Clean,
    Rebase,
    Merge,
    CherryPick,
    Revert,
    Bisect,
    ApplyMailbox,
}

impl GitState {
    /// Check if any operation is in progress.
    ///
    /// # Example
    ///
    /// ```
    /// use branchwright::git::GitState;
    ///
    /// assert!(!GitState::Clean.is_in_progress());
    /// assert!(GitState::Merge.is_in_progress());
    /// ```
    pub fn is_in_progress(&self) -> bool {
        !matches!(self, GitState::Clean)
    }

    /// Get a human-readable description of the state.
    pub fn description(&self) -> &'static str {
        match self {
            GitState::Clean => "clean",
            GitState::Rebase => "rebase",
            GitState::Merge => "merge",
            GitState::CherryPick => "cherry-pick",
            GitState::Revert => "revert",
            GitState::Bisect => "bisect",
            GitState::ApplyMailbox => "apply-mailbox",
        }
    }
}

impl std::fmt::Display for GitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Captured result of one `git` CLI invocation.
#[derive(Debug)]
struct CliOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

impl CliOutput {
    /// stderr, falling back to stdout, trimmed for messages.
    fn message(&self) -> String {
        let text = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        text.trim().to_string()
    }

    fn mentions(&self, needle: &str) -> bool {
        self.stdout.contains(needle) || self.stderr.contains(needle)
    }
}

const UNAVAILABLE_MARKERS: &[&str] = &[
    "Could not read from remote repository",
    "does not appear to be a git repository",
    "unable to access",
    "Authentication failed",
    "Could not resolve host",
    "Connection refused",
    "Permission denied",
];

const REJECTION_MARKERS: &[&str] = &[
    "[rejected]",
    "[remote rejected]",
    "non-fast-forward",
    "pre-receive hook declined",
];

/// The Git backend.
///
/// Holds the repository and the name of the remote that remote-only
/// branches resolve against when merging.
pub struct Git {
    repo: git2::Repository,
    work_dir: PathBuf,
    remote: String,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .field("remote", &self.remote)
            .finish()
    }
}

impl Git {
    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// within the repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        let work_dir = repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();

        Ok(Self {
            repo,
            work_dir,
            remote: crate::core::config::DEFAULT_REMOTE.to_string(),
        })
    }

    /// Use `remote` when resolving remote-only branches.
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    /// The `.git` directory.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// The working directory.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// The remote remote-only branches resolve against.
    pub fn remote(&self) -> &str {
        &self.remote
    }

    fn ref_exists(&self, refname: &str) -> bool {
        self.repo.find_reference(refname).is_ok()
    }

    /// Fully qualified revision for a branch or tag.
    ///
    /// A branch resolves to the local branch when one exists, otherwise to
    /// the remote-tracking branch of the configured remote.
    pub fn revision(&self, kind: RefKind, name: &RefName) -> Result<String, GitError> {
        let candidates = match kind {
            RefKind::Branch => vec![
                format!("refs/heads/{}", name),
                format!("refs/remotes/{}/{}", self.remote, name),
            ],
            RefKind::Tag => vec![format!("refs/tags/{}", name)],
        };

        candidates
            .into_iter()
            .find(|candidate| self.ref_exists(candidate))
            .ok_or_else(|| GitError::RefNotFound {
                refname: name.to_string(),
            })
    }

    /// Run `git <args>` in the work tree.
    fn run(&self, args: &[&str]) -> Result<CliOutput, GitError> {
        let op = args.first().copied().unwrap_or_default();
        let target = args.get(1..).map(|rest| rest.join(" ")).unwrap_or_default();
        tracing::debug!(op, target = %target, "git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .output()
            .map_err(|e| GitError::Internal {
                message: format!("failed to run git {}: {}", args.join(" "), e),
            })?;

        Ok(CliOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Classify a failed remote operation.
    fn remote_failure(operation: &str, refname: &str, output: &CliOutput) -> GitError {
        let message = output.message();
        let unavailable = UNAVAILABLE_MARKERS.iter().any(|m| output.mentions(m));
        if !unavailable && REJECTION_MARKERS.iter().any(|m| output.mentions(m)) {
            GitError::RefRejected {
                refname: refname.to_string(),
                message,
            }
        } else {
            GitError::Unavailable {
                operation: operation.to_string(),
                message,
            }
        }
    }
}

impl Backend for Git {
    fn list_local_branches(&self) -> Result<BTreeSet<RefName>, GitError> {
        let branches = self
            .repo
            .branches(Some(git2::BranchType::Local))
            .map_err(|e| GitError::from_git2(e, "local branches"))?;

        let mut names = BTreeSet::new();
        for entry in branches {
            let (branch, _) = entry.map_err(|e| GitError::from_git2(e, "local branches"))?;
            // Skip non-UTF8 and invalid names
            if let Ok(Some(name)) = branch.name() {
                if let Ok(name) = RefName::new(name) {
                    names.insert(name);
                }
            }
        }
        Ok(names)
    }

    fn list_remote_branches(&self, remote: &str) -> Result<BTreeSet<String>, GitError> {
        let branches = self
            .repo
            .branches(Some(git2::BranchType::Remote))
            .map_err(|e| GitError::from_git2(e, "remote branches"))?;

        let prefix = format!("{}/", remote);
        let mut names = BTreeSet::new();
        for entry in branches {
            let (branch, _) = entry.map_err(|e| GitError::from_git2(e, "remote branches"))?;
            if let Ok(Some(name)) = branch.name() {
                if name.starts_with(&prefix) {
                    names.insert(name.to_string());
                }
            }
        }
        Ok(names)
    }

    fn list_tags(&self) -> Result<BTreeSet<RefName>, GitError> {
        let tags = self
            .repo
            .tag_names(None)
            .map_err(|e| GitError::from_git2(e, "tags"))?;

        Ok(tags
            .iter()
            .flatten()
            .filter_map(|name| RefName::new(name).ok())
            .collect())
    }

    fn current_branch(&self) -> Result<Option<RefName>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(GitError::from_git2(e, "HEAD")),
        };

        if head.is_branch() {
            if let Some(name) = head.shorthand() {
                return Ok(Some(RefName::new(name)?));
            }
        }

        Ok(None) // Detached HEAD
    }

    fn fetch(&self, remote: &str) -> Result<(), GitError> {
        let output = self.run(&["fetch", remote])?;
        if !output.success {
            return Err(Self::remote_failure("fetch", remote, &output));
        }
        Ok(())
    }

    fn fetch_tags(&self, remote: &str) -> Result<(), GitError> {
        let output = self.run(&["fetch", remote, "--tags"])?;
        if !output.success {
            return Err(Self::remote_failure("fetch tags", remote, &output));
        }
        Ok(())
    }

    fn checkout(&self, name: &RefName) -> Result<(), GitError> {
        if self.repo.revparse_single(name.as_str()).is_err() {
            return Err(GitError::RefNotFound {
                refname: name.to_string(),
            });
        }

        let output = self.run(&["checkout", name.as_str()])?;
        if !output.success {
            return Err(GitError::Internal {
                message: format!("checkout {}: {}", name, output.message()),
            });
        }
        Ok(())
    }

    fn create_branch(
        &self,
        name: &RefName,
        base: &RefName,
        base_kind: RefKind,
    ) -> Result<(), GitError> {
        if self.ref_exists(&format!("refs/heads/{}", name)) {
            return Err(GitError::NameCollision {
                refname: name.to_string(),
            });
        }
        let start = self.revision(base_kind, base)?;

        let output = self.run(&["checkout", "-b", name.as_str(), start.as_str()])?;
        if !output.success {
            return Err(GitError::Internal {
                message: format!("create branch {} at {}: {}", name, base, output.message()),
            });
        }
        Ok(())
    }

    fn create_tag(&self, name: &RefName) -> Result<(), GitError> {
        if self.ref_exists(&format!("refs/tags/{}", name)) {
            return Err(GitError::NameCollision {
                refname: name.to_string(),
            });
        }

        let output = self.run(&["tag", name.as_str()])?;
        if !output.success {
            return Err(GitError::Internal {
                message: format!("create tag {}: {}", name, output.message()),
            });
        }
        Ok(())
    }

    fn merge_no_ff(&self, item: &MergeItem) -> Result<(), GitError> {
        let revision = self.revision(item.kind, &item.name)?;

        let output = self.run(&["merge", "--no-ff", "--no-edit", revision.as_str()])?;
        if output.success {
            return Ok(());
        }

        if output.mentions("CONFLICT") || self.state()? == GitState::Merge {
            return Err(GitError::MergeConflict {
                refname: item.name.to_string(),
                message: output.message(),
            });
        }
        Err(GitError::Internal {
            message: format!("merge {}: {}", item.name, output.message()),
        })
    }

    fn merge_abort(&self) -> Result<(), GitError> {
        if self.state()? != GitState::Merge {
            return Ok(());
        }

        let output = self.run(&["merge", "--abort"])?;
        if !output.success {
            return Err(GitError::Internal {
                message: format!("merge --abort: {}", output.message()),
            });
        }
        Ok(())
    }

    fn push(&self, remote: &str, target: &PushTarget) -> Result<(), GitError> {
        let refspec;
        let args: Vec<&str> = match target {
            PushTarget::Branch(name) => {
                refspec = format!("refs/heads/{0}:refs/heads/{0}", name);
                vec!["push", remote, refspec.as_str()]
            }
            PushTarget::Tag(name) => {
                refspec = format!("refs/tags/{0}:refs/tags/{0}", name);
                vec!["push", remote, refspec.as_str()]
            }
            PushTarget::AllBranches => vec!["push", remote, "--all"],
            PushTarget::AllTags => vec!["push", remote, "--tags"],
        };

        let output = self.run(&args)?;
        if !output.success {
            return Err(Self::remote_failure("push", &target.to_string(), &output));
        }
        Ok(())
    }

    fn state(&self) -> Result<GitState, GitError> {
        Ok(match self.repo.state() {
            git2::RepositoryState::Clean => GitState::Clean,
            git2::RepositoryState::Rebase
            | git2::RepositoryState::RebaseInteractive
            | git2::RepositoryState::RebaseMerge => GitState::Rebase,
            git2::RepositoryState::Merge => GitState::Merge,
            git2::RepositoryState::CherryPick | git2::RepositoryState::CherryPickSequence => {
                GitState::CherryPick
            }
            git2::RepositoryState::Revert | git2::RepositoryState::RevertSequence => {
                GitState::Revert
            }
            git2::RepositoryState::Bisect => GitState::Bisect,
            git2::RepositoryState::ApplyMailbox | git2::RepositoryState::ApplyMailboxOrRebase => {
                GitState::ApplyMailbox
            }
        })
    }
}
