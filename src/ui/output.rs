//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, output is machine-readable JSON on stdout and
//! everything else goes to stderr.

use std::fmt::Display;

use serde::Serialize;

use crate::engine::{MergeOutcome, MergeResult};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a value as pretty JSON (always shown).
pub fn json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a list under a heading, or `(none)` when empty.
pub fn format_section<T: Display>(title: &str, items: &[T]) -> String {
    if items.is_empty() {
        format!("{}: (none)", title)
    } else {
        format!("{}:\n{}", title, format_list(items, "  "))
    }
}

/// One status line per merge outcome.
pub fn format_outcome(outcome: &MergeOutcome) -> String {
    let marker = match outcome.result {
        MergeResult::Merged => "✓",
        MergeResult::Skipped => "-",
        MergeResult::AbortedPlan => "✗",
    };
    match &outcome.error {
        Some(error) => format!(
            "{} {} ({}): {}",
            marker, outcome.item, outcome.result, error
        ),
        None => format!("{} {} ({})", marker, outcome.item, outcome.result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{MergeItem, RefName};

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn section_formatting() {
        assert_eq!(format_section::<String>("Tags", &[]), "Tags: (none)");
        assert_eq!(format_section("Tags", &["v1", "v2"]), "Tags:\n  v1\n  v2");
    }

    #[test]
    fn outcome_formatting() {
        let item = MergeItem::tag(RefName::new("v1").unwrap());
        let merged = MergeOutcome {
            item: item.clone(),
            result: MergeResult::Merged,
            error: None,
        };
        assert_eq!(format_outcome(&merged), "✓ tag v1 (merged)");

        let failed = MergeOutcome {
            item,
            result: MergeResult::AbortedPlan,
            error: Some("boom".to_string()),
        };
        assert_eq!(format_outcome(&failed), "✗ tag v1 (aborted plan): boom");
    }
}
