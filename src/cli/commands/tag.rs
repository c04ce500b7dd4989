//! tag command - Create a tag with a resolved name

use anyhow::{Context as _, Result};

use super::{name_spec, verbosity, Session};
use crate::cli::args::NamingArgs;
use crate::core::types::RefKind;
use crate::engine::{self, Context};
use crate::ui::output;

/// Create a tag at HEAD and optionally push it.
pub fn tag(ctx: &Context, naming: &NamingArgs, push: bool) -> Result<()> {
    let verbosity = verbosity(ctx);
    let session = Session::open(ctx)?;
    let snapshot = session.snapshot(ctx)?;
    let spec = name_spec(naming, RefKind::Tag, &session.config);

    let resolved =
        engine::create_tag(&session.git, &snapshot, &spec).context("Failed to create tag")?;
    output::print(format!("Created tag '{}'", resolved.name), verbosity);

    if push {
        engine::push_ref(&session.git, &session.remote, &resolved.name, RefKind::Tag)
            .with_context(|| format!("Failed to push tag '{}'", resolved.name))?;
        output::print(
            format!("Pushed '{}' to '{}'", resolved.name, session.remote),
            verbosity,
        );
    }
    Ok(())
}
