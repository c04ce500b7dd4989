//! core::naming
//!
//! Deterministic, collision-free name derivation for branches and tags.
//!
//! # Algorithm
//!
//! A [`NameSpec`] produces a base name, either the custom text alone or
//! `{prefix}_{date}[_{custom}]`. If the base is unused it is returned as-is.
//! Otherwise the result is `base.{N+1}` where `N` is the largest numeric
//! suffix already present among `base`, `base.1`, `base.2`, ... (the bare
//! base counts as 0). Holes in the sequence are never filled. Suffixes are
//! compared and incremented as decimal text, so there is no upper bound.
//!
//! Resolution is pure: it looks only at the supplied set of existing names,
//! which callers take from a freshly captured
//! [`RefSnapshot`](crate::engine::snapshot::RefSnapshot).
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeSet;
//! use branchwright::core::naming::{resolve, NameMode, NameSpec};
//! use branchwright::core::types::RefName;
//!
//! let spec = NameSpec {
//!     prefix: "release".into(),
//!     custom_suffix: None,
//!     date_suffix: "20240101".into(),
//!     mode: NameMode::PrefixDate,
//! };
//! let existing: BTreeSet<RefName> = ["release_20240101", "release_20240101.3"]
//!     .into_iter()
//!     .map(|n| RefName::new(n).unwrap())
//!     .collect();
//!
//! let resolved = resolve(&spec, &existing).unwrap();
//! assert_eq!(resolved.name.as_str(), "release_20240101.4");
//! ```

use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone};
use thiserror::Error;

use crate::core::types::{RefName, TypeError};

/// Errors from name derivation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamingError {
    /// Custom mode was selected without any custom text.
    #[error("name is empty: custom mode requires a non-empty name")]
    EmptyName,

    /// The derived name is not a valid git ref name.
    #[error("derived name '{name}' is not a valid ref name: {source}")]
    InvalidName {
        name: String,
        #[source]
        source: TypeError,
    },
}

/// How the base name is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMode {
    /// The custom suffix is the whole name.
    Custom,
    /// `{prefix}_{date}` with an optional `_{custom}` tail.
    PrefixDate,
}

/// Input to name derivation. Has no identity beyond its field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSpec {
    pub prefix: String,
    pub custom_suffix: Option<String>,
    pub date_suffix: String,
    pub mode: NameMode,
}

impl NameSpec {
    /// Build a spec whose date suffix is `now` rendered with `date_format`
    /// (a `chrono` strftime pattern such as `%Y%m%d`).
    pub fn dated<Tz>(
        prefix: impl Into<String>,
        custom_suffix: Option<String>,
        mode: NameMode,
        date_format: &str,
        now: &DateTime<Tz>,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            prefix: prefix.into(),
            custom_suffix,
            date_suffix: now.format(date_format).to_string(),
            mode,
        }
    }

    /// Compute the base name before collision handling.
    pub fn base(&self) -> Result<String, NamingError> {
        let custom = self
            .custom_suffix
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match self.mode {
            NameMode::Custom => custom.map(str::to_string).ok_or(NamingError::EmptyName),
            NameMode::PrefixDate => {
                let mut base = format!("{}_{}", self.prefix.trim(), self.date_suffix.trim());
                if let Some(custom) = custom {
                    base.push('_');
                    base.push_str(custom);
                }
                Ok(base)
            }
        }
    }
}

/// The outcome of name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    /// The final, collision-free name.
    pub name: RefName,
    /// The base the name was derived from.
    pub base: String,
    /// The numeric suffix appended, if the base was taken.
    pub suffix: Option<String>,
}

impl std::fmt::Display for ResolvedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Resolve `spec` to the first unused name against `existing`.
///
/// # Errors
///
/// - [`NamingError::EmptyName`] when custom mode has no custom text
/// - [`NamingError::InvalidName`] when the result is not a valid ref name
pub fn resolve(
    spec: &NameSpec,
    existing: &BTreeSet<RefName>,
) -> Result<ResolvedName, NamingError> {
    let base = spec.base()?;
    let validated = |name: String| {
        RefName::new(name.as_str()).map_err(|source| NamingError::InvalidName { name, source })
    };

    if !existing.contains(base.as_str()) {
        let name = validated(base.clone())?;
        tracing::info!(base = %base, resolved = %name, "name resolved");
        return Ok(ResolvedName {
            name,
            base,
            suffix: None,
        });
    }

    let next = existing
        .iter()
        .filter_map(|name| numeric_suffix(&base, name.as_str()))
        .max()
        .unwrap_or_else(Position::zero)
        .next();

    let name = validated(format!("{base}.{next}"))?;
    tracing::info!(base = %base, resolved = %name, suffix = %next, "name resolved");
    Ok(ResolvedName {
        name,
        base,
        suffix: Some(next.to_string()),
    })
}

/// A place in the suffix sequence, held as decimal digits without leading
/// zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Position(String);

impl Position {
    fn zero() -> Self {
        Position("0".to_string())
    }

    fn from_digits(digits: &str) -> Self {
        match digits.trim_start_matches('0') {
            "" => Self::zero(),
            trimmed => Position(trimmed.to_string()),
        }
    }

    fn next(&self) -> Self {
        let mut digits: Vec<u8> = self.0.bytes().collect();
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
        Position(digits.into_iter().map(char::from).collect())
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of `candidate` in the `base` sequence.
///
/// `base` itself is 0; `base.N` (N all ASCII digits) is N. Anything else,
/// including `base.rc` or `base.1.2`, is not part of the sequence.
fn numeric_suffix(base: &str, candidate: &str) -> Option<Position> {
    let rest = candidate.strip_prefix(base)?;
    if rest.is_empty() {
        return Some(Position::zero());
    }
    let digits = rest.strip_prefix('.')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(Position::from_digits(digits))
}
