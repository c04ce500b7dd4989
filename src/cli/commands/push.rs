//! push command - Push a ref, or all branches and tags

use anyhow::{anyhow, Context as _, Result};

use super::{verbosity, Session};
use crate::core::types::{RefKind, RefName};
use crate::engine::{self, Context};
use crate::git::Backend;
use crate::ui::output;

/// Push `name` (default: the current branch), or everything with `all`.
pub fn push(ctx: &Context, name: Option<&str>, tag: bool, all: bool) -> Result<()> {
    let verbosity = verbosity(ctx);
    let session = Session::open(ctx)?;

    if all {
        engine::push_all(&session.git, &session.remote)
            .with_context(|| format!("Failed to push to '{}'", session.remote))?;
        output::print(
            format!("Pushed all branches and tags to '{}'", session.remote),
            verbosity,
        );
        return Ok(());
    }

    let (name, kind) = match name {
        Some(name) => {
            let kind = if tag { RefKind::Tag } else { RefKind::Branch };
            (RefName::new(name).context("Invalid ref name")?, kind)
        }
        None => {
            let current = session
                .git
                .current_branch()
                .context("Failed to read current branch")?
                .ok_or_else(|| anyhow!("HEAD is detached; name the ref to push"))?;
            (current, RefKind::Branch)
        }
    };

    engine::push_ref(&session.git, &session.remote, &name, kind)
        .with_context(|| format!("Failed to push {} '{}'", kind, name))?;
    output::print(
        format!("Pushed {} '{}' to '{}'", kind, name, session.remote),
        verbosity,
    );
    Ok(())
}
