//! Resource categories, the buff item taxonomy.
//!
//! Each consumable item variant has a small integer ID. Variants of the same
//! buff type occupy a contiguous half-open range of IDs, and each category
//! carries the index the remote service uses when announcing which buffs are
//! active (the `3` in `egem3`).

use serde::{Deserialize, Serialize};

/// Integer identifier of one concrete item variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u16);

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for ResourceId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// A named bucket of resource IDs: `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCategory {
    /// Category identifier (e.g., "type1")
    pub name: String,

    /// Index used in active-buff short codes
    pub index: u32,

    /// First ID in the category (inclusive)
    pub start: u16,

    /// One past the last ID in the category (exclusive)
    pub end: u16,
}

impl ResourceCategory {
    pub fn new(name: impl Into<String>, index: u32, start: u16, end: u16) -> Self {
        Self {
            name: name.into(),
            index,
            start,
            end,
        }
    }

    pub fn contains(&self, id: ResourceId) -> bool {
        self.start <= id.0 && id.0 < self.end
    }

    fn overlaps(&self, other: &ResourceCategory) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// The ordered, immutable set of configured categories.
///
/// Declaration order is significant: it is the tie-break for IDs claimed by
/// more than one category and the order inactive categories are reported in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTable {
    categories: Vec<ResourceCategory>,
}

impl CategoryTable {
    pub fn new(categories: Vec<ResourceCategory>) -> Self {
        Self { categories }
    }

    /// Resolve an ID to the first category containing it.
    pub fn lookup(&self, id: ResourceId) -> Option<&ResourceCategory> {
        self.categories.iter().find(|c| c.contains(id))
    }

    pub fn is_known(&self, id: ResourceId) -> bool {
        self.lookup(id).is_some()
    }

    /// Find a category by its short-code index.
    pub fn by_index(&self, index: u32) -> Option<&ResourceCategory> {
        self.categories.iter().find(|c| c.index == index)
    }

    pub fn by_name(&self, name: &str) -> Option<&ResourceCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceCategory> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Pairs of category names whose ranges intersect.
    pub fn overlapping_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        for (i, a) in self.categories.iter().enumerate() {
            for b in &self.categories[i + 1..] {
                if a.overlaps(b) {
                    pairs.push((a.name.as_str(), b.name.as_str()));
                }
            }
        }
        pairs
    }
}

impl Default for CategoryTable {
    /// The five gem types, seven variants each, starting at 051.
    fn default() -> Self {
        Self::new(
            (0..5u16)
                .map(|i| {
                    let start = 51 + i * 7;
                    ResourceCategory::new(format!("type{}", i + 1), u32::from(i) + 1, start, start + 7)
                })
                .collect(),
        )
    }
}
