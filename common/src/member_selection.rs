//! Ordered member -> included flag map for a single filter dimension.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Member keys in first-seen order, each with an "included" flag.
///
/// Iteration order is the insertion order; toggle-all and serialization rely on it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberSelectionSet {
    entries: IndexMap<String, bool>,
}

impl MemberSelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, member: &str) -> bool {
        self.entries.contains_key(member)
    }

    pub fn get(&self, member: &str) -> Option<bool> {
        self.entries.get(member).copied()
    }

    /// Insert a member, or update its flag in place if it is already known.
    pub fn insert(&mut self, member: impl Into<String>, included: bool) {
        self.entries.insert(member.into(), included);
    }

    /// Set the flag of a known member. Unknown members are left out.
    pub fn set(&mut self, member: &str, included: bool) -> bool {
        match self.entries.get_mut(member) {
            Some(flag) => {
                *flag = included;
                true
            }
            None => false,
        }
    }

    /// Flip a known member's flag and return the new value.
    pub fn toggle(&mut self, member: &str) -> Option<bool> {
        let flag = self.entries.get_mut(member)?;
        *flag = !*flag;
        Some(*flag)
    }

    pub fn set_all(&mut self, included: bool) {
        self.entries.values_mut().for_each(|flag| *flag = included);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(member, flag)| (member.as_str(), *flag))
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Split members into included and excluded, keeping order within each.
    pub fn partition(&self) -> MemberPartition {
        let mut partition = MemberPartition::default();
        for (member, included) in self.iter() {
            if included {
                partition.included.push(member.to_string());
            } else {
                partition.excluded.push(member.to_string());
            }
        }
        partition
    }
}

// order matters: two sets listing the same members differently are different selections
impl PartialEq for MemberSelectionSet {
    fn eq(&self, other: &Self) -> bool {
        self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for MemberSelectionSet {}

impl<K: Into<String>> FromIterator<(K, bool)> for MemberSelectionSet {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(member, included)| (member.into(), included)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberPartition {
    pub included: Vec<String>,
    pub excluded: Vec<String>,
}

impl MemberPartition {
    /// Vacuously true for a dimension without members.
    pub fn all_selected(&self) -> bool {
        self.excluded.is_empty()
    }

    /// Whether the included list is the shorter way to describe the selection.
    pub fn prefers_included(&self) -> bool {
        self.included.len() < self.excluded.len()
    }
}
