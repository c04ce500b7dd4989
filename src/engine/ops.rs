//! engine::ops
//!
//! Create and push operations.
//!
//! Names are resolved against a caller-supplied [`RefSnapshot`]; these
//! functions never capture one themselves. A collision that appears between
//! capture and creation surfaces as [`GitError::NameCollision`] from the
//! backend.

use thiserror::Error;

use super::snapshot::RefSnapshot;
use crate::core::naming::{self, NameSpec, NamingError, ResolvedName};
use crate::core::types::{RefKind, RefName};
use crate::git::{Backend, GitError, PushTarget};

/// Errors from create operations.
#[derive(Debug, Error)]
pub enum OpsError {
    #[error(transparent)]
    Naming(#[from] NamingError),

    /// The start point for a new branch is neither a branch nor a tag.
    #[error("base '{0}' is neither a known branch nor a tag")]
    BaseNotFound(String),

    #[error(transparent)]
    Git(#[from] GitError),
}

/// Resolve a branch name and create it at `base`, switching to it.
///
/// `base` is looked up as a branch first, then as a tag.
pub fn create_branch<B: Backend + ?Sized>(
    backend: &B,
    snapshot: &RefSnapshot,
    spec: &NameSpec,
    base: &RefName,
) -> Result<ResolvedName, OpsError> {
    let base_kind = if snapshot.has_branch(base.as_str()) {
        RefKind::Branch
    } else if snapshot.has_tag(base.as_str()) {
        RefKind::Tag
    } else {
        return Err(OpsError::BaseNotFound(base.to_string()));
    };

    let resolved = naming::resolve(spec, &snapshot.existing_names())?;
    backend.create_branch(&resolved.name, base, base_kind)?;
    tracing::info!(name = %resolved.name, base = %base, base_kind = %base_kind, "branch created");
    Ok(resolved)
}

/// Resolve a tag name and create it at HEAD.
pub fn create_tag<B: Backend + ?Sized>(
    backend: &B,
    snapshot: &RefSnapshot,
    spec: &NameSpec,
) -> Result<ResolvedName, OpsError> {
    let resolved = naming::resolve(spec, &snapshot.existing_names())?;
    backend.create_tag(&resolved.name)?;
    tracing::info!(name = %resolved.name, "tag created");
    Ok(resolved)
}

/// Push a single branch or tag.
pub fn push_ref<B: Backend + ?Sized>(
    backend: &B,
    remote: &str,
    name: &RefName,
    kind: RefKind,
) -> Result<(), GitError> {
    let target = match kind {
        RefKind::Branch => PushTarget::Branch(name.clone()),
        RefKind::Tag => PushTarget::Tag(name.clone()),
    };
    backend.push(remote, &target)?;
    tracing::info!(remote, target = %target, "pushed");
    Ok(())
}

/// Push every branch, then every tag.
///
/// Stops at the first failure; tags are not pushed if branches failed.
pub fn push_all<B: Backend + ?Sized>(backend: &B, remote: &str) -> Result<(), GitError> {
    for target in [PushTarget::AllBranches, PushTarget::AllTags] {
        backend.push(remote, &target)?;
        tracing::info!(remote, target = %target, "pushed");
    }
    Ok(())
}
