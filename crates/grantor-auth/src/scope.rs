//! OAuth 2.0 scope sets.
//!
//! Scopes are stored as a single space-delimited string that preserves the
//! order the caller supplied, but two scope sets are compared as sets:
//! `"read write"` and `"write read"` describe the same grant.
//!
//! # Examples
//!
//! ```
//! use grantor_auth::scope::ScopeSet;
//!
//! let stored = ScopeSet::parse("read  write");
//! assert_eq!(stored.serialize(), "read write");
//!
//! let requested = ScopeSet::from_names(["write", "read"]);
//! assert!(stored.equal(&requested));
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::error::AuthError;

/// An ordered list of scope names with set semantics for comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeSet {
    names: Vec<String>,
}

impl ScopeSet {
    /// Parses a space-delimited scope string.
    ///
    /// Splits on any whitespace and drops empty entries. Never fails; use
    /// [`ScopeSet::parse_non_empty`] where an empty result is not acceptable.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self {
            names: input.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Parses a scope string that must name at least one scope.
    ///
    /// # Errors
    ///
    /// Returns `InvalidScope` if the input contains no scope names.
    pub fn parse_non_empty(input: &str) -> AuthResult<Self> {
        let scopes = Self::parse(input);
        if scopes.is_empty() {
            return Err(AuthError::invalid_scope("scope must not be empty"));
        }
        Ok(scopes)
    }

    /// Builds a scope set from a sequence of names.
    ///
    /// Entries that themselves contain whitespace are split, so the result is
    /// the same as parsing the joined string.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .flat_map(|n| {
                    n.as_ref()
                        .split_whitespace()
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .collect(),
        }
    }

    /// Returns the scope names in their original order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns `true` if no scope is named.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns `true` if the given scope is part of this set.
    #[must_use]
    pub fn contains(&self, scope: &str) -> bool {
        self.names.iter().any(|s| s == scope)
    }

    /// Joins the names with a single space, preserving order.
    #[must_use]
    pub fn serialize(&self) -> String {
        self.names.join(" ")
    }

    /// Set equality, ignoring order and duplicates.
    #[must_use]
    pub fn equal(&self, other: &ScopeSet) -> bool {
        self.as_set() == other.as_set()
    }

    /// Returns `true` if every scope here is also in `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &ScopeSet) -> bool {
        self.as_set().is_subset(&other.as_set())
    }

    /// Checks that every requested scope is offered by `allowed`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidScope` naming the first scope not in `allowed`.
    pub fn ensure_permitted(&self, allowed: &ScopeSet) -> AuthResult<()> {
        let allowed = allowed.as_set();
        match self.names.iter().find(|s| !allowed.contains(s.as_str())) {
            Some(scope) => Err(AuthError::invalid_scope(format!(
                "scope '{scope}' is not permitted"
            ))),
            None => Ok(()),
        }
    }

    fn as_set(&self) -> HashSet<&str> {
        self.names.iter().map(String::as_str).collect()
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl From<&str> for ScopeSet {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<&String> for ScopeSet {
    fn from(value: &String) -> Self {
        Self::parse(value)
    }
}

impl From<Vec<String>> for ScopeSet {
    fn from(value: Vec<String>) -> Self {
        Self::from_names(value)
    }
}

impl From<&[&str]> for ScopeSet {
    fn from(value: &[&str]) -> Self {
        Self::from_names(value)
    }
}

impl<const N: usize> From<[&str; N]> for ScopeSet {
    fn from(value: [&str; N]) -> Self {
        Self::from_names(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drops_empty_entries() {
        let scopes = ScopeSet::parse("  read \t write\n ");
        assert_eq!(scopes.names(), &["read", "write"]);
        assert!(ScopeSet::parse("   ").is_empty());
    }

    #[test]
    fn test_parse_non_empty() {
        assert!(ScopeSet::parse_non_empty("read").is_ok());

        let err = ScopeSet::parse_non_empty(" ").unwrap_err();
        assert!(matches!(err, AuthError::InvalidScope { .. }));
    }

    #[test]
    fn test_serialize_preserves_order() {
        assert_eq!(ScopeSet::parse("write read").serialize(), "write read");
        assert_eq!(
            ScopeSet::from_names(["b", "a", "c"]).to_string(),
            "b a c"
        );
    }

    #[test]
    fn test_from_names_splits_entries() {
        let scopes = ScopeSet::from_names(vec!["read write".to_string(), "admin".to_string()]);
        assert_eq!(scopes.names(), &["read", "write", "admin"]);
    }

    #[test]
    fn test_equal_ignores_order_and_duplicates() {
        let permutations = [
            ["read", "write", "admin"],
            ["write", "admin", "read"],
            ["admin", "read", "write"],
            ["admin", "write", "read"],
        ];
        let base = ScopeSet::from(permutations[0]);
        for p in permutations {
            assert!(base.equal(&ScopeSet::from(p)));
        }

        assert!(ScopeSet::parse("read read write").equal(&ScopeSet::parse("write read")));
    }

    #[test]
    fn test_equal_detects_differences() {
        let base = ScopeSet::parse("read write");
        assert!(!base.equal(&ScopeSet::parse("read")));
        assert!(!base.equal(&ScopeSet::parse("read write admin")));
        assert!(!base.equal(&ScopeSet::parse("read admin")));
        assert!(!base.equal(&ScopeSet::default()));
    }

    #[test]
    fn test_subset_and_contains() {
        let server = ScopeSet::parse("public read write");
        assert!(ScopeSet::parse("read").is_subset_of(&server));
        assert!(!ScopeSet::parse("read admin").is_subset_of(&server));
        assert!(server.contains("write"));
        assert!(!server.contains("admin"));
    }

    #[test]
    fn test_ensure_permitted() {
        let server = ScopeSet::parse("public read write");
        assert!(ScopeSet::parse("write public").ensure_permitted(&server).is_ok());

        let err = ScopeSet::parse("read admin")
            .ensure_permitted(&server)
            .unwrap_err();
        assert_eq!(err, AuthError::invalid_scope("scope 'admin' is not permitted"));
    }
}
