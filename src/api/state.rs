use std::sync::Arc;

use crate::db::LikesStore;
use crate::services::{MiningConfig, RuleSet, RuleSetStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LikesStore>,
    pub rules: RuleSetStore,
    /// Thresholds used when a rebuild request does not override them
    pub mining: MiningConfig,
    /// Restrict recommendations to catalog ids and add the catalog to the item universe
    pub validate_catalog: bool,
}

impl AppState {
    /// Creates state serving `initial` until the first rebuild
    pub fn new(store: Arc<dyn LikesStore>, initial: RuleSet, mining: MiningConfig) -> Self {
        Self {
            store,
            rules: RuleSetStore::new(initial),
            mining,
            validate_catalog: false,
        }
    }

    pub fn with_catalog_validation(mut self, enabled: bool) -> Self {
        self.validate_catalog = enabled;
        self
    }
}
