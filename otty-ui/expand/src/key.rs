use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of a table row.
///
/// Keys are compared structurally: `RowKey::Num(1)` and `RowKey::Str("1")`
/// are different keys. There is no notion of an "empty" key, so `0` and `""`
/// are as valid as any other value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowKey {
    Num(i64),
    Str(String),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

impl From<&str> for RowKey {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for RowKey {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for RowKey {
    fn from(value: i64) -> Self {
        Self::Num(value)
    }
}

impl From<i32> for RowKey {
    fn from(value: i32) -> Self {
        Self::Num(i64::from(value))
    }
}

impl From<u32> for RowKey {
    fn from(value: u32) -> Self {
        Self::Num(i64::from(value))
    }
}

/// Ordered collection of expanded row keys.
///
/// Sets produced by a toggle are always in flattened-row order and free of
/// duplicates. Sets seeded from configuration are kept exactly as supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedKeys(Vec<RowKey>);

impl ExpandedKeys {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys in their stored order.
    pub fn as_slice(&self) -> &[RowKey] {
        &self.0
    }

    /// Iterate keys in their stored order.
    pub fn iter(&self) -> std::slice::Iter<'_, RowKey> {
        self.0.iter()
    }

    /// Whether `key` is expanded. Linear in the set size.
    pub fn contains(&self, key: &RowKey) -> bool {
        self.0.contains(key)
    }

    /// Number of expanded keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Owned copy of the keys.
    pub fn to_vec(&self) -> Vec<RowKey> {
        self.0.clone()
    }

    /// Candidate set after toggling `key`: appended when absent, removed
    /// otherwise. The result is not reordered.
    pub(crate) fn toggled(
        keys: &[RowKey],
        key: &RowKey,
    ) -> (bool, Vec<RowKey>) {
        if keys.contains(key) {
            let rest = keys.iter().filter(|k| *k != key).cloned().collect();
            (false, rest)
        } else {
            let mut next = keys.to_vec();
            next.push(key.clone());
            (true, next)
        }
    }

    /// Keep the keys of `ordered` that are also in `candidate`, in the order
    /// of `ordered`, dropping repeats.
    pub(crate) fn presented<'k>(
        ordered: impl IntoIterator<Item = RowKey>,
        candidate: impl IntoIterator<Item = &'k RowKey>,
    ) -> Self {
        let wanted: HashSet<&RowKey> = candidate.into_iter().collect();
        let mut seen = HashSet::new();
        let keys = ordered
            .into_iter()
            .filter(|key| wanted.contains(key) && seen.insert(key.clone()))
            .collect();
        Self(keys)
    }
}

impl From<Vec<RowKey>> for ExpandedKeys {
    fn from(keys: Vec<RowKey>) -> Self {
        Self(keys)
    }
}

impl From<ExpandedKeys> for Vec<RowKey> {
    fn from(keys: ExpandedKeys) -> Self {
        keys.0
    }
}

impl<'a> IntoIterator for &'a ExpandedKeys {
    type Item = &'a RowKey;
    type IntoIter = std::slice::Iter<'a, RowKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
