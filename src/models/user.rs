use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::ItemId;

/// A known user of the quotes service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
}

/// Raw per-user like record as handed over by a likes store
///
/// `likes` is the serialized list of liked item ids, e.g. `"[3, 17, 42]"`.
/// It is only parsed by the transaction loader.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LikeRecord {
    pub user_id: i64,
    pub name: String,
    pub likes: String,
}

/// The set of items one user liked at snapshot time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub user_id: i64,
    pub items: BTreeSet<ItemId>,
}

impl Transaction {
    pub fn new(user_id: i64, items: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            user_id,
            items: items.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
