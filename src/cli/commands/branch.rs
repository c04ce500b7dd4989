//! branch command - Create a branch with a resolved name

use anyhow::{Context as _, Result};

use super::{name_spec, verbosity, Session};
use crate::cli::args::NamingArgs;
use crate::core::types::{RefKind, RefName};
use crate::engine::{self, Context};
use crate::ui::output;

/// Create a branch at `base`, check it out, and optionally push it.
pub fn branch(ctx: &Context, base: &str, naming: &NamingArgs, push: bool) -> Result<()> {
    let verbosity = verbosity(ctx);
    let base = RefName::new(base).context("Invalid base ref")?;

    let session = Session::open(ctx)?;
    let snapshot = session.snapshot(ctx)?;
    let spec = name_spec(naming, RefKind::Branch, &session.config);

    let resolved = engine::create_branch(&session.git, &snapshot, &spec, &base)
        .context("Failed to create branch")?;
    output::print(
        format!("Created branch '{}' from '{}'", resolved.name, base),
        verbosity,
    );

    if push {
        engine::push_ref(&session.git, &session.remote, &resolved.name, RefKind::Branch)
            .with_context(|| format!("Failed to push branch '{}'", resolved.name))?;
        output::print(
            format!("Pushed '{}' to '{}'", resolved.name, session.remote),
            verbosity,
        );
    }
    Ok(())
}
