//! Read-only key/value store backing the overlay.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::PropertyError;
use crate::parser::parse_properties;

/// Exact-match, case-sensitive overlay key such as `flutter.versionCode`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyKey(Cow<'static, str>);

impl PropertyKey {
    /// Key backed by a string literal, usable in `const` items.
    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    pub fn new(key: impl Into<String>) -> Self {
        Self(Cow::Owned(key.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Overlay namespace: everything before the first `.`, or the whole key.
    pub fn namespace(&self) -> &str {
        namespace_of(&self.0)
    }
}

impl AsRef<str> for PropertyKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for PropertyKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Ordered mapping of overlay keys to raw string values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyStore {
    entries: BTreeMap<String, String>,
}

impl PropertyStore {
    /// Store with no entries, used when the overlay file is absent.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse overlay text. `origin` is only used for error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, PropertyError> {
        let pairs = parse_properties(text).map_err(|e| PropertyError::MalformedOverlay {
            path: origin.to_path_buf(),
            line: e.line,
            reason: e.reason,
        })?;
        Ok(Self::from_pairs(pairs))
    }

    /// Build a store from pairs; later duplicates win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries whose key belongs to `namespace`.
    pub fn namespace<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.iter()
            .filter(move |(k, _)| namespace_of(k) == namespace)
    }
}

fn namespace_of(key: &str) -> &str {
    key.split('.').next().unwrap_or(key)
}
