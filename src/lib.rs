//! Branchwright - collision-free dated branch and tag names, batch merges
//!
//! Branchwright derives branch and tag names from a `prefix_date[_suffix]`
//! convention, picking the next free numeric suffix (`.1`, `.2`, ...) against
//! every local branch, remote branch, and tag. It also merges a batch of
//! branches and tags into the current branch, isolating failures per item and
//! always leaving a clean working tree.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Snapshot, plan, and execute lifecycle
//! - [`core`] - Domain types, name resolution, and configuration
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - User interaction utilities
//!
//! # Correctness Invariants
//!
//! 1. Name resolution is pure: same spec and names, same result
//! 2. Resolved names always follow the highest existing suffix; gaps stay gaps
//! 3. Branches are merged before tags, in selection order
//! 4. A failed merge is aborted before anything else happens

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
