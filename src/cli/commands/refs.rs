//! refs command - Show the refs a decision would be made against

use std::collections::BTreeSet;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Session;
use crate::core::types::RefName;
use crate::engine::{Context, RefSnapshot};
use crate::ui::output;

/// JSON shape of `bw refs --json`.
#[derive(Debug, Serialize)]
struct RefsView<'a> {
    remote: &'a str,
    fetched: bool,
    captured_at: DateTime<Utc>,
    current_branch: Option<&'a RefName>,
    local: &'a BTreeSet<RefName>,
    remote_only: BTreeSet<RefName>,
    tags: &'a BTreeSet<RefName>,
}

impl<'a> RefsView<'a> {
    fn new(snapshot: &'a RefSnapshot) -> Self {
        Self {
            remote: snapshot.remote(),
            fetched: snapshot.fetched(),
            captured_at: snapshot.captured_at(),
            current_branch: snapshot.current_branch(),
            local: snapshot.local_branches(),
            remote_only: snapshot.remote_only(),
            tags: snapshot.tags(),
        }
    }
}

/// Show current branch, local branches, remote-only branches, and tags.
pub fn refs(ctx: &Context, json: bool) -> Result<()> {
    let session = Session::open(ctx)?;
    let snapshot = session.snapshot(ctx)?;
    let view = RefsView::new(&snapshot);

    if json {
        output::json(&view)?;
        return Ok(());
    }

    match view.current_branch {
        Some(branch) => println!("On branch {}", branch),
        None => println!("HEAD detached"),
    }
    println!();

    let local: Vec<_> = view.local.iter().collect();
    let remote_only: Vec<_> = view.remote_only.iter().collect();
    let tags: Vec<_> = view.tags.iter().collect();

    println!("{}", output::format_section("Local branches", &local));
    println!(
        "{}",
        output::format_section(&format!("Remote-only branches ({})", view.remote), &remote_only)
    );
    println!("{}", output::format_section("Tags", &tags));

    if !snapshot.fetched() {
        output::warn(
            "refs were not fetched; remote names may be stale",
            super::verbosity(ctx),
        );
    }
    Ok(())
}
