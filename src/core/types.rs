//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`RefName`] - Validated short branch or tag name
//! - [`RefKind`] - Whether a name denotes a branch or a tag
//! - [`MergeItem`] - A single merge target, identified by `(name, kind)`
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use branchwright::core::types::{MergeItem, RefKind, RefName};
//!
//! let name = RefName::new("release_20240101").unwrap();
//! let item = MergeItem::branch(name.clone());
//! assert_eq!(item.kind, RefKind::Branch);
//!
//! assert!(RefName::new("invalid..name").is_err());
//! assert!(RefName::new("").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid ref name: {0}")]
    InvalidRefName(String),
}

/// A validated short ref name (a branch or tag name without `refs/...`).
///
/// Names must conform to Git's refname rules (see `git check-ref-format`):
/// - Cannot be empty
/// - Cannot start with `.` or `-`
/// - Cannot end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, or ASCII control characters
/// - Cannot contain spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
/// - Cannot be exactly `@`
///
/// Remote-tracking names arrive as `<remote>/<short>` and are shortened
/// before they become a `RefName` used for comparison.
///
/// # Example
///
/// ```
/// use branchwright::core::types::RefName;
///
/// let name = RefName::new("release_20240101.2").unwrap();
/// assert_eq!(name.as_str(), "release_20240101.2");
///
/// assert!(RefName::new(".hidden").is_err());
/// assert!(RefName::new("branch.lock").is_err());
/// assert!(RefName::new("has space").is_err());
/// assert!(RefName::new("@").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidRefName("ref name cannot be empty".into()));
        }

        if name == "@" {
            return Err(TypeError::InvalidRefName(
                "ref name cannot be '@' (reserved)".into(),
            ));
        }

        if name.starts_with('.') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot start with '.'".into(),
            ));
        }
        if name.starts_with('-') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot start with '-'".into(),
            ));
        }

        if name.ends_with(".lock") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '.lock'".into(),
            ));
        }
        if name.ends_with('/') || name.ends_with('.') {
            return Err(TypeError::InvalidRefName(format!(
                "ref name cannot end with '{}'",
                &name[name.len() - 1..]
            )));
        }

        for forbidden in ["..", "@{", "//"] {
            if name.contains(forbidden) {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{forbidden}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        for c in INVALID_CHARS {
            if name.contains(c) {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{c}'"
                )));
            }
        }

        if name.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain control characters".into(),
            ));
        }

        for component in name.split('/') {
            if component.starts_with('.') {
                return Err(TypeError::InvalidRefName(
                    "path component cannot start with '.'".into(),
                ));
            }
            if component.ends_with(".lock") {
                return Err(TypeError::InvalidRefName(
                    "path component cannot end with '.lock'".into(),
                ));
            }
        }

        Ok(())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strip a `<remote>/` prefix from a remote-tracking name.
    ///
    /// Returns `None` when `qualified` does not belong to `remote`, when the
    /// short part is the synthetic `HEAD` pointer, or when the short part is
    /// not a valid name.
    ///
    /// ```
    /// use branchwright::core::types::RefName;
    ///
    /// assert_eq!(
    ///     RefName::from_remote("origin", "origin/feature/x").unwrap().as_str(),
    ///     "feature/x"
    /// );
    /// assert!(RefName::from_remote("origin", "origin/HEAD").is_none());
    /// assert!(RefName::from_remote("origin", "upstream/main").is_none());
    /// ```
    pub fn from_remote(remote: &str, qualified: &str) -> Option<Self> {
        let short = qualified.strip_prefix(remote)?.strip_prefix('/')?;
        if short == "HEAD" {
            return None;
        }
        Self::new(short).ok()
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for RefName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of ref a name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Branch,
    Tag,
}

impl RefKind {
    /// Lowercase label used in logs and output.
    pub fn label(&self) -> &'static str {
        match self {
            RefKind::Branch => "branch",
            RefKind::Tag => "tag",
        }
    }
}

impl std::fmt::Display for RefKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single merge target.
///
/// Identity is the `(name, kind)` pair: a branch and a tag sharing a name
/// are distinct items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeItem {
    pub name: RefName,
    pub kind: RefKind,
}

impl MergeItem {
    pub fn branch(name: RefName) -> Self {
        Self {
            name,
            kind: RefKind::Branch,
        }
    }

    pub fn tag(name: RefName) -> Self {
        Self {
            name,
            kind: RefKind::Tag,
        }
    }
}

impl std::fmt::Display for MergeItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod ref_name {
        use super::*;

        #[test]
        fn valid_names() {
            assert!(RefName::new("main").is_ok());
            assert!(RefName::new("feature/login").is_ok());
            assert!(RefName::new("release_20240101").is_ok());
            assert!(RefName::new("release_20240101.12").is_ok());
            assert!(RefName::new("tag_20240101_120000").is_ok());
            assert!(RefName::new("user@feature").is_ok());
        }

        #[test]
        fn invalid_names() {
            assert!(RefName::new("").is_err());
            assert!(RefName::new("@").is_err());
            assert!(RefName::new("-flag").is_err());
            assert!(RefName::new("a..b").is_err());
            assert!(RefName::new("a@{b").is_err());
            assert!(RefName::new("a//b").is_err());
            assert!(RefName::new("trailing/").is_err());
            assert!(RefName::new("trailing.").is_err());
            assert!(RefName::new("x.lock").is_err());
            assert!(RefName::new("a/.hidden").is_err());
            assert!(RefName::new("tab\there").is_err());
            assert!(RefName::new("what?").is_err());
        }

        #[test]
        fn error_message_names_the_problem() {
            let err = RefName::new("a b").unwrap_err();
            assert_eq!(
                err.to_string(),
                "invalid ref name: ref name cannot contain ' '"
            );
        }

        #[test]
        fn serde_rejects_invalid() {
            let parsed: Result<RefName, _> = serde_json::from_str("\"bad..name\"");
            assert!(parsed.is_err());
            let parsed: RefName = serde_json::from_str("\"good\"").unwrap();
            assert_eq!(parsed.as_str(), "good");
        }

        #[test]
        fn from_remote_strips_prefix() {
            let name = RefName::from_remote("origin", "origin/main").unwrap();
            assert_eq!(name.as_str(), "main");
        }

        #[test]
        fn from_remote_skips_head_pointer() {
            assert!(RefName::from_remote("origin", "origin/HEAD").is_none());
        }

        #[test]
        fn from_remote_requires_separator() {
            assert!(RefName::from_remote("origin", "originmain").is_none());
            assert!(RefName::from_remote("orig", "origin/main").is_none());
        }
    }

    mod merge_item {
        use super::*;

        #[test]
        fn identity_includes_kind() {
            let name = RefName::new("v1").unwrap();
            assert_ne!(MergeItem::branch(name.clone()), MergeItem::tag(name));
        }

        #[test]
        fn display() {
            let item = MergeItem::tag(RefName::new("v1.0").unwrap());
            assert_eq!(item.to_string(), "tag v1.0");
        }

        #[test]
        fn serializes_kind_lowercase() {
            let item = MergeItem::branch(RefName::new("feature").unwrap());
            let json = serde_json::to_string(&item).unwrap();
            assert_eq!(json, r#"{"name":"feature","kind":"branch"}"#);
        }
    }
}
