//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. No other module imports
//! `git2` or spawns the `git` binary. The engine talks to the repository
//! exclusively through the [`Backend`] trait.
//!
//! Reads (ref listings, HEAD, repository state) go through `git2`. Network
//! operations and working-tree mutations (fetch, push, checkout, merge) run
//! the `git` CLI so they honor the user's credential helpers and hooks.
//!
//! # Invariants
//!
//! - Merges always record a merge commit (`--no-ff`)
//! - Every failure maps onto the [`GitError`] taxonomy
//! - `merge_abort` is a no-op when no merge is in progress
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

mod backend;
mod interface;
pub mod mock;

pub use backend::{Backend, PushTarget};
pub use interface::{Git, GitError, GitState};
