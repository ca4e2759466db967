//! Setting values and snapshots
//!
//! A [`SettingValue`] is one stored value; a [`Snapshot`] is an owned copy of
//! many of them taken at one instant.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::schema::SettingId;

/// Value held by a single setting
///
/// Enumeration variants are the `&'static str` names from the schema table,
/// so values are `Copy` and compare by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Boolean flag
    Bool(bool),
    /// Integer inside a declared range
    Int(i32),
    /// One of the declared enumeration variants
    Variant(&'static str),
}

impl SettingValue {
    /// Name of the value kind, for diagnostics
    #[inline]
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Variant(_) => "variant",
        }
    }

    /// Boolean payload, if any
    #[inline]
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload, if any
    #[inline]
    #[must_use]
    pub const fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Variant payload, if any
    #[inline]
    #[must_use]
    pub const fn as_variant(&self) -> Option<&'static str> {
        match self {
            Self::Variant(v) => Some(v),
            _ => None,
        }
    }
}

impl Display for SettingValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Variant(v) => f.write_str(v),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

/// Owned copy of setting values
///
/// Iteration is ordered by identifier. A full snapshot holds every setting;
/// an active snapshot omits the inert ones; a decoded snapshot holds only the
/// fields a settings string carried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    values: BTreeMap<SettingId, SettingValue>,
}

impl Snapshot {
    /// Create empty snapshot
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value
    pub fn insert(&mut self, id: SettingId, value: SettingValue) -> Option<SettingValue> {
        self.values.insert(id, value)
    }

    /// Value for a setting
    #[inline]
    #[must_use]
    pub fn get(&self, id: SettingId) -> Option<SettingValue> {
        self.values.get(&id).copied()
    }

    /// Boolean value for a setting (absent or non-boolean reads as `None`)
    #[inline]
    #[must_use]
    pub fn get_bool(&self, id: SettingId) -> Option<bool> {
        self.get(id).and_then(|v| v.as_bool())
    }

    /// Integer value for a setting
    #[inline]
    #[must_use]
    pub fn get_int(&self, id: SettingId) -> Option<i32> {
        self.get(id).and_then(|v| v.as_int())
    }

    /// Check presence
    #[inline]
    #[must_use]
    pub fn contains(&self, id: SettingId) -> bool {
        self.values.contains_key(&id)
    }

    /// Number of values
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate values in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (SettingId, SettingValue)> + '_ {
        self.values.iter().map(|(id, v)| (*id, *v))
    }

    /// Identifiers present
    pub fn ids(&self) -> impl Iterator<Item = SettingId> + '_ {
        self.values.keys().copied()
    }
}

impl FromIterator<(SettingId, SettingValue)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (SettingId, SettingValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Snapshot {
    type Item = (SettingId, SettingValue);
    type IntoIter = btree_map::IntoIter<SettingId, SettingValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
