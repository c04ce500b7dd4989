//! engine::plan
//!
//! Merge plan construction and validation.
//!
//! # Architecture
//!
//! Selection state (which names the operator picked, in what order) belongs
//! to the CLI. It is turned into a [`MergePlan`] exactly once; the executor
//! only ever sees the final ordered sequence.
//!
//! # Invariants
//!
//! - Every branch item precedes every tag item
//! - Within a kind, selection order is preserved
//! - A `(name, kind)` pair appears at most once

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use super::snapshot::RefSnapshot;
use crate::core::types::{MergeItem, RefKind};

/// Errors from plan validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    /// The plan is empty.
    #[error("nothing to merge")]
    Empty,

    /// The plan would merge the current branch into itself.
    #[error("cannot merge branch '{0}' into itself")]
    SelfMerge(String),

    /// The snapshot does not know the item.
    #[error("{kind} '{name}' not found")]
    UnknownRef { name: String, kind: RefKind },
}

/// An ordered sequence of merge targets, branches first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MergePlan {
    items: Vec<MergeItem>,
}

impl MergePlan {
    /// Build a plan from the operator's selection.
    ///
    /// Branches are moved ahead of tags without reordering either kind.
    /// Repeated `(name, kind)` pairs keep their first position.
    pub fn new(selection: impl IntoIterator<Item = MergeItem>) -> Self {
        let mut seen = HashSet::new();
        let (branches, tags): (Vec<_>, Vec<_>) = selection
            .into_iter()
            .filter(|item| seen.insert(item.clone()))
            .partition(|item| item.kind == RefKind::Branch);

        let items: Vec<_> = branches.into_iter().chain(tags).collect();
        tracing::debug!(items = items.len(), "merge plan built");
        Self { items }
    }

    /// Check the plan against `snapshot`.
    ///
    /// # Errors
    ///
    /// - [`PlanError::Empty`] when there is nothing to merge
    /// - [`PlanError::SelfMerge`] when a branch item is the current branch
    /// - [`PlanError::UnknownRef`] when an item is absent from the snapshot
    pub fn validate(&self, snapshot: &RefSnapshot) -> Result<(), PlanError> {
        if self.items.is_empty() {
            return Err(PlanError::Empty);
        }
        for item in &self.items {
            if item.kind == RefKind::Branch && snapshot.current_branch() == Some(&item.name) {
                return Err(PlanError::SelfMerge(item.name.to_string()));
            }
            if !snapshot.contains(item) {
                return Err(PlanError::UnknownRef {
                    name: item.name.to_string(),
                    kind: item.kind,
                });
            }
        }
        Ok(())
    }

    pub fn items(&self) -> &[MergeItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a MergePlan {
    type Item = &'a MergeItem;
    type IntoIter = std::slice::Iter<'a, MergeItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
