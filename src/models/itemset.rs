use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt::Display;

/// Identifier of a recommendable item (a quote)
pub type ItemId = i64;

/// A non-empty set of item ids, stored sorted ascending without duplicates
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Itemset(Vec<ItemId>);

#[allow(clippy::len_without_is_empty)]
impl Itemset {
    /// Builds an itemset from any collection of ids
    ///
    /// Returns `None` for an empty collection, so every `Itemset` in the
    /// crate is non-empty by construction.
    pub fn new(items: impl IntoIterator<Item = ItemId>) -> Option<Self> {
        let items: BTreeSet<ItemId> = items.into_iter().collect();
        if items.is_empty() {
            None
        } else {
            Some(Self(items.into_iter().collect()))
        }
    }

    /// Wraps ids that are already sorted, unique and non-empty
    pub(crate) fn from_sorted(items: Vec<ItemId>) -> Self {
        debug_assert!(!items.is_empty());
        debug_assert!(items.windows(2).all(|w| w[0] < w[1]));
        Self(items)
    }

    pub fn items(&self) -> &[ItemId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.0.binary_search(&item).is_ok()
    }

    /// True when every item of this set is present in `likes`
    pub fn is_satisfied_by(&self, likes: &HashSet<ItemId>) -> bool {
        self.0.iter().all(|item| likes.contains(item))
    }

    pub fn is_disjoint(&self, other: &Itemset) -> bool {
        !self.0.iter().any(|item| other.contains(*item))
    }

    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.0.iter().copied()
    }
}

impl Display for Itemset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "}}")
    }
}

/// An itemset whose support met the mining threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequentItemset {
    pub itemset: Itemset,
    /// Number of transactions containing the itemset
    pub count: usize,
    /// Fraction of transactions (0.0 to 1.0) containing the itemset
    pub support: f64,
}
