use std::collections::HashSet;

use crate::{
    error::AppResult,
    models::{ItemId, LikeRecord, User},
};

/// Source of users, their likes and the item catalog
///
/// Implementations own persistence; the mining pipeline only sees the raw
/// like records and the catalog they hand over.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LikesStore: Send + Sync {
    /// One record per known user, including users with no likes
    async fn fetch_like_records(&self) -> AppResult<Vec<LikeRecord>>;

    /// Ids of every item that exists
    async fn fetch_catalog(&self) -> AppResult<HashSet<ItemId>>;

    async fn find_user(&self, user_id: i64) -> AppResult<Option<User>>;

    async fn find_user_by_name(&self, name: &str) -> AppResult<Option<User>>;

    /// Items the user currently likes
    async fn fetch_user_likes(&self, user_id: i64) -> AppResult<Vec<ItemId>>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}
