//! name command - Print the next free branch or tag name

use anyhow::{Context as _, Result};

use super::{name_spec, Session};
use crate::cli::args::NamingArgs;
use crate::core::naming;
use crate::core::types::RefKind;
use crate::engine::Context;

/// Resolve and print a name without creating anything.
pub fn name(ctx: &Context, tag: bool, naming_args: &NamingArgs) -> Result<()> {
    let session = Session::open(ctx)?;
    let snapshot = session.snapshot(ctx)?;

    let kind = if tag { RefKind::Tag } else { RefKind::Branch };
    let spec = name_spec(naming_args, kind, &session.config);
    let resolved = naming::resolve(&spec, &snapshot.existing_names())
        .with_context(|| format!("Failed to resolve {} name", kind))?;

    println!("{}", resolved.name);
    Ok(())
}
