use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::{
    db::LikesStore,
    error::{AppError, AppResult},
};

use super::{build_rule_set, build_rule_set_with_catalog, load_transactions, MiningConfig, RuleSet};

/// Holder of the published rule set
///
/// Readers clone the current `Arc<RuleSet>` and keep using it even if a
/// rebuild publishes a new one meanwhile. Publishing is a single pointer swap,
/// so nobody ever sees a half-built rule set.
#[derive(Clone)]
pub struct RuleSetStore {
    current: Arc<RwLock<Arc<RuleSet>>>,
    rebuild_lock: Arc<Mutex<()>>,
}

impl RuleSetStore {
    pub fn new(initial: RuleSet) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(initial))),
            rebuild_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The published snapshot
    pub async fn current(&self) -> Arc<RuleSet> {
        self.current.read().await.clone()
    }

    /// Swaps in a new snapshot and returns it
    pub async fn publish(&self, rule_set: RuleSet) -> Arc<RuleSet> {
        let rule_set = Arc::new(rule_set);
        let previous = std::mem::replace(&mut *self.current.write().await, rule_set.clone());

        tracing::info!(
            snapshot_id = %rule_set.id(),
            previous_snapshot_id = %previous.id(),
            rules = rule_set.rules().len(),
            "Rule set published"
        );

        rule_set
    }

    /// Rebuilds from a fresh store snapshot and publishes the result
    ///
    /// Concurrent rebuilds run one at a time. Any failure leaves the published
    /// snapshot untouched.
    pub async fn rebuild(
        &self,
        store: &dyn LikesStore,
        config: MiningConfig,
        include_catalog: bool,
    ) -> AppResult<Arc<RuleSet>> {
        let _guard = self.rebuild_lock.lock().await;

        let result = build_from_store(store, config, include_catalog).await;
        match result {
            Ok(rule_set) => Ok(self.publish(rule_set).await),
            Err(e) => {
                let kept = self.current().await;
                tracing::error!(
                    error = %e,
                    store = store.name(),
                    kept_snapshot_id = %kept.id(),
                    "Rule set rebuild failed, keeping previous snapshot"
                );
                Err(e)
            }
        }
    }
}

/// Loads likes from `store` and mines a rule set on a blocking thread
pub async fn build_from_store(
    store: &dyn LikesStore,
    config: MiningConfig,
    include_catalog: bool,
) -> AppResult<RuleSet> {
    let records = store.fetch_like_records().await?;
    let catalog = if include_catalog {
        Some(store.fetch_catalog().await?)
    } else {
        None
    };

    tracing::info!(
        store = store.name(),
        users = records.len(),
        min_support = config.min_support(),
        min_confidence = config.min_confidence(),
        "Building rule set"
    );

    tokio::task::spawn_blocking(move || -> AppResult<RuleSet> {
        let transactions = load_transactions(&records)?;
        Ok(match catalog {
            Some(catalog) => build_rule_set_with_catalog(&transactions, catalog, &config),
            None => build_rule_set(&transactions, &config),
        })
    })
    .await
    .map_err(|e| AppError::Internal(format!("Rule mining task failed: {}", e)))?
}
