use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod itemset;
mod rule;
mod user;

pub use itemset::{FrequentItemset, ItemId, Itemset};
pub use rule::AssociationRule;
pub(crate) use rule::SplitSupports;
pub use user::{LikeRecord, Transaction, User};

/// Request for recommendations given a user's current likes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub username: String,
    pub liked_quotes: Vec<ItemId>,
}

/// Recommended quote ids for a user, sorted ascending
///
/// The order carries no ranking; it only keeps responses stable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub username: String,
    pub recommendations: Vec<ItemId>,
}

/// Optional threshold overrides for a rule set rebuild
///
/// Missing fields fall back to the configured thresholds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RebuildRequest {
    #[serde(default)]
    pub min_support: Option<f64>,
    #[serde(default)]
    pub min_confidence: Option<f64>,
    #[serde(default)]
    pub max_itemset_len: Option<usize>,
}

/// Query parameters for listing rules
#[derive(Debug, Clone, Deserialize)]
pub struct RulesQuery {
    #[serde(default = "default_rules_limit")]
    pub limit: usize,
}

fn default_rules_limit() -> usize {
    50
}

/// Description of the published rule set snapshot
#[derive(Debug, Clone, Serialize)]
pub struct RuleSetSummary {
    pub snapshot_id: Uuid,
    pub built_at: DateTime<Utc>,
    pub min_support: f64,
    pub min_confidence: f64,
    pub max_itemset_len: Option<usize>,
    pub transaction_count: usize,
    pub item_count: usize,
    pub frequent_itemset_count: usize,
    pub rule_count: usize,
    /// Highest-confidence rules, at most the requested limit
    pub rules: Vec<AssociationRule>,
}
