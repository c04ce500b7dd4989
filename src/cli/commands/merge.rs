//! merge command - Merge a batch of branches and tags into the current branch

use anyhow::{bail, Context as _, Result};

use super::{verbosity, Session};
use crate::core::config::FailureMode;
use crate::core::types::{MergeItem, RefName};
use crate::engine::{self, Context, ExecError, FailurePolicy, MergePlan, OnFailure, RefSnapshot};
use crate::ui::output::{self, Verbosity};
use crate::ui::prompts::{self, PromptPolicy};

/// Options for the merge command.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    pub branches: Vec<String>,
    pub tags: Vec<String>,
    pub continue_on_failure: bool,
    pub stop_on_failure: bool,
    pub ask_once: bool,
    pub json: bool,
}

/// Merge the selected items and report per-item outcomes.
///
/// Fails when any item was not merged.
pub fn merge(ctx: &Context, opts: MergeOptions) -> Result<()> {
    let verbosity = verbosity(ctx);
    let session = Session::open(ctx)?;
    let snapshot = session.snapshot(ctx)?;

    let selection = if opts.branches.is_empty() && opts.tags.is_empty() {
        select_interactively(&snapshot, ctx.interactive)?
    } else {
        selection_from_args(&opts.branches, &opts.tags)?
    };

    let plan = MergePlan::new(selection);
    plan.validate(&snapshot).context("Invalid merge plan")?;

    // JSON mode keeps stdout to the report alone.
    let verbosity = if opts.json {
        Verbosity::Quiet
    } else {
        verbosity
    };
    if let Some(current) = snapshot.current_branch() {
        output::print(
            format!("Merging {} item(s) into '{}'", plan.len(), current),
            verbosity,
        );
    }

    let mut policy = failure_policy(ctx, &session, &opts);
    let report = match engine::execute(&plan, &session.git, policy.as_mut()) {
        Ok(report) => report,
        Err(ExecError::AbortFailed {
            item,
            source,
            outcomes,
        }) => {
            for outcome in &outcomes {
                output::print(output::format_outcome(outcome), verbosity);
            }
            bail!(
                "Failed to abort merge of {}: {}. \
                 Resolve the working tree manually (git merge --abort)",
                item,
                source
            );
        }
        Err(err) => return Err(err).context("Merge failed"),
    };

    if opts.json {
        output::json(&report)?;
    } else {
        for outcome in report.outcomes() {
            output::print(output::format_outcome(outcome), verbosity);
        }
        output::print(
            format!(
                "Merged {} of {} item(s){}",
                report.merged(),
                report.outcomes().len(),
                if report.stopped() { "; plan stopped" } else { "" }
            ),
            verbosity,
        );
    }

    if !report.all_merged() {
        bail!(
            "{} of {} item(s) not merged",
            report.outcomes().len() - report.merged(),
            report.outcomes().len()
        );
    }
    Ok(())
}

fn selection_from_args(branches: &[String], tags: &[String]) -> Result<Vec<MergeItem>> {
    let branches = branches.iter().map(|name| {
        RefName::new(name.as_str())
            .map(MergeItem::branch)
            .with_context(|| format!("Invalid branch name '{}'", name))
    });
    let tags = tags.iter().map(|name| {
        RefName::new(name.as_str())
            .map(MergeItem::tag)
            .with_context(|| format!("Invalid tag name '{}'", name))
    });
    branches.chain(tags).collect()
}

fn select_interactively(snapshot: &RefSnapshot, interactive: bool) -> Result<Vec<MergeItem>> {
    if !interactive {
        bail!("No merge targets given. Name branches (and --tag TAG), or run interactively.");
    }

    let candidates: Vec<MergeItem> = snapshot
        .branch_candidates()
        .into_iter()
        .map(MergeItem::branch)
        .chain(snapshot.tag_candidates().into_iter().map(MergeItem::tag))
        .collect();
    if candidates.is_empty() {
        bail!("Nothing to merge: no other branches or tags");
    }

    let labels: Vec<String> = candidates.iter().map(ToString::to_string).collect();
    let picked = prompts::select_many("Select branches and tags to merge:", &labels, true)?;
    Ok(picked.into_iter().map(|i| candidates[i].clone()).collect())
}

/// Flags win, then `merge.on_failure`, then asking.
fn failure_policy(ctx: &Context, session: &Session, opts: &MergeOptions) -> Box<dyn FailurePolicy> {
    if opts.continue_on_failure {
        return Box::new(OnFailure::ContinueOnFailure);
    }
    if opts.stop_on_failure {
        return Box::new(OnFailure::StopOnFailure);
    }
    match session.config.on_failure() {
        FailureMode::Continue => Box::new(OnFailure::ContinueOnFailure),
        FailureMode::Stop => Box::new(OnFailure::StopOnFailure),
        FailureMode::Ask => Box::new(PromptPolicy::terminal(ctx.interactive, opts.ask_once)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_build_branches_then_tags() {
        let items = selection_from_args(&["a".into()], &["v1".into()]).unwrap();
        assert_eq!(
            items,
            vec![
                MergeItem::branch(RefName::new("a").unwrap()),
                MergeItem::tag(RefName::new("v1").unwrap()),
            ]
        );
    }

    #[test]
    fn invalid_names_rejected() {
        let err = selection_from_args(&["bad..name".into()], &[]).unwrap_err();
        assert!(err.to_string().contains("bad..name"));
    }

    #[test]
    fn no_targets_non_interactive() {
        let backend = crate::git::mock::MockBackend::new().with_local_branches(["a"]);
        let snapshot = RefSnapshot::capture_offline(&backend, "origin").unwrap();
        assert!(select_interactively(&snapshot, false).is_err());
    }
}
