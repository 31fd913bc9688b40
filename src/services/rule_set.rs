use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AssociationRule, ItemId, LikeRecord, RuleSetSummary, Transaction};

use super::apriori::{Apriori, FrequentItemsets};
use super::encoder::TransactionEncoder;
use super::loader::load_transactions;
use super::recommendations;
use super::rules::generate_rules;

/// Error types for rule mining
#[derive(Debug, Error)]
pub enum MiningError {
    #[error("Malformed likes for user {user_id}: {reason}")]
    DataFormat { user_id: i64, reason: String },

    #[error("Invalid mining configuration: {0}")]
    Configuration(String),
}

/// Validated mining thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiningConfig {
    min_support: f64,
    min_confidence: f64,
    max_itemset_len: Option<usize>,
}

impl MiningConfig {
    /// Both thresholds must lie in (0, 1]
    pub fn new(min_support: f64, min_confidence: f64) -> Result<Self, MiningError> {
        check_threshold("min_support", min_support)?;
        check_threshold("min_confidence", min_confidence)?;

        Ok(Self {
            min_support,
            min_confidence,
            max_itemset_len: None,
        })
    }

    /// Stops mining after itemsets of this size. Zero is rejected.
    pub fn with_max_itemset_len(mut self, max_len: Option<usize>) -> Result<Self, MiningError> {
        if max_len == Some(0) {
            return Err(MiningError::Configuration(
                "max_itemset_len must be at least 1".to_string(),
            ));
        }
        self.max_itemset_len = max_len;
        Ok(self)
    }

    pub fn min_support(&self) -> f64 {
        self.min_support
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    pub fn max_itemset_len(&self) -> Option<usize> {
        self.max_itemset_len
    }
}

fn check_threshold(name: &str, value: f64) -> Result<(), MiningError> {
    // NaN fails both comparisons
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(MiningError::Configuration(format!(
            "{} must be in (0, 1], got {}",
            name, value
        )))
    }
}

/// Immutable set of retained association rules for one data snapshot
#[derive(Debug, Clone)]
pub struct RuleSet {
    id: Uuid,
    built_at: DateTime<Utc>,
    config: MiningConfig,
    transaction_count: usize,
    item_count: usize,
    itemsets: FrequentItemsets,
    rules: Vec<AssociationRule>,
    // Catalog the snapshot was built against, if any
    catalog: Option<HashSet<ItemId>>,
}

impl RuleSet {
    /// A rule set mined from no transactions; recommends nothing
    pub fn empty(config: MiningConfig) -> Self {
        build_rule_set(&[], &config)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    pub fn transaction_count(&self) -> usize {
        self.transaction_count
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn frequent_itemsets(&self) -> &FrequentItemsets {
        &self.itemsets
    }

    pub fn rules(&self) -> &[AssociationRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Item catalog fetched with this snapshot's likes
    pub fn catalog(&self) -> Option<&HashSet<ItemId>> {
        self.catalog.as_ref()
    }

    /// Items implied by the rules whose antecedent `likes` satisfies
    pub fn recommend(&self, likes: &HashSet<ItemId>) -> BTreeSet<ItemId> {
        recommendations::recommend(likes, self)
    }

    /// Snapshot description with up to `limit` rules, highest confidence first
    pub fn summary(&self, limit: usize) -> RuleSetSummary {
        let mut rules = self.rules.clone();
        rules.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.antecedent.cmp(&b.antecedent))
                .then_with(|| a.consequent.cmp(&b.consequent))
        });
        rules.truncate(limit);

        RuleSetSummary {
            snapshot_id: self.id,
            built_at: self.built_at,
            min_support: self.config.min_support,
            min_confidence: self.config.min_confidence,
            max_itemset_len: self.config.max_itemset_len,
            transaction_count: self.transaction_count,
            item_count: self.item_count,
            frequent_itemset_count: self.itemsets.len(),
            rule_count: self.rules.len(),
            rules,
        }
    }
}

/// Mines frequent itemsets and retained rules from a transaction snapshot
///
/// Pure function of its inputs apart from the snapshot id and timestamp.
pub fn build_rule_set(transactions: &[Transaction], config: &MiningConfig) -> RuleSet {
    build_with_encoder(transactions, TransactionEncoder::new(), None, config)
}

/// Same as [`build_rule_set`], with catalog items added to the item universe
///
/// The catalog is kept on the rule set for filtering recommendations.
pub fn build_rule_set_with_catalog(
    transactions: &[Transaction],
    catalog: impl IntoIterator<Item = ItemId>,
    config: &MiningConfig,
) -> RuleSet {
    let catalog: HashSet<ItemId> = catalog.into_iter().collect();
    build_with_encoder(
        transactions,
        TransactionEncoder::new().with_catalog(catalog.iter().copied()),
        Some(catalog),
        config,
    )
}

/// Parses raw like records and builds a rule set from them
pub fn build_from_records(
    records: &[LikeRecord],
    config: &MiningConfig,
) -> Result<RuleSet, MiningError> {
    let transactions = load_transactions(records)?;
    Ok(build_rule_set(&transactions, config))
}

fn build_with_encoder(
    transactions: &[Transaction],
    encoder: TransactionEncoder,
    catalog: Option<HashSet<ItemId>>,
    config: &MiningConfig,
) -> RuleSet {
    let start = Instant::now();

    let encoded = encoder.encode(transactions);
    let itemsets = Apriori::new(config).mine(&encoded);
    let rules = generate_rules(&itemsets, config.min_confidence);

    let rule_set = RuleSet {
        id: Uuid::new_v4(),
        built_at: Utc::now(),
        config: *config,
        transaction_count: encoded.n_transactions(),
        item_count: encoded.n_items(),
        itemsets,
        rules,
        catalog,
    };

    tracing::info!(
        snapshot_id = %rule_set.id,
        transactions = rule_set.transaction_count,
        items = rule_set.item_count,
        frequent_itemsets = rule_set.itemsets.len(),
        rules = rule_set.rules.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Rule set built"
    );

    rule_set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Itemset;

    fn scenario() -> Vec<Transaction> {
        vec![
            Transaction::new(1, vec![1, 2]),
            Transaction::new(2, vec![1, 2, 3]),
            Transaction::new(3, vec![2, 3]),
            Transaction::new(4, vec![1]),
        ]
    }

    fn rule_keys(rule_set: &RuleSet) -> BTreeSet<(Vec<ItemId>, Vec<ItemId>)> {
        rule_set
            .rules()
            .iter()
            .map(|r| (r.antecedent.items().to_vec(), r.consequent.items().to_vec()))
            .collect()
    }

    #[test]
    fn test_config_rejects_out_of_range() {
        assert!(matches!(
            MiningConfig::new(1.1, 0.5),
            Err(MiningError::Configuration(_))
        ));
        assert!(MiningConfig::new(0.0, 0.5).is_err());
        assert!(MiningConfig::new(0.5, 0.0).is_err());
        assert!(MiningConfig::new(0.5, -0.1).is_err());
        assert!(MiningConfig::new(f64::NAN, 0.5).is_err());
        assert!(MiningConfig::new(0.5, f64::NAN).is_err());
        assert!(MiningConfig::new(1.0, 1.0).is_ok());
    }

    #[test]
    fn test_config_rejects_zero_max_len() {
        let config = MiningConfig::new(0.5, 0.5).unwrap();
        assert!(config.with_max_itemset_len(Some(0)).is_err());
        assert_eq!(
            config.with_max_itemset_len(Some(2)).unwrap().max_itemset_len(),
            Some(2)
        );
    }

    #[test]
    fn test_invalid_min_support_fails_before_any_records_are_read() {
        // Malformed data would be a DataFormat error; the config check wins
        let result = MiningConfig::new(1.1, 0.5)
            .and_then(|config| build_from_records(&[], &config));
        assert!(matches!(result, Err(MiningError::Configuration(_))));
    }

    #[test]
    fn test_build_scenario() {
        let config = MiningConfig::new(0.5, 0.6).unwrap();
        let rule_set = build_rule_set(&scenario(), &config);

        assert_eq!(rule_set.transaction_count(), 4);
        assert_eq!(rule_set.item_count(), 3);

        let pair = Itemset::new(vec![1, 2]).unwrap();
        assert_eq!(rule_set.frequent_itemsets().support_of(&pair), Some(0.5));

        // {1}=>{2}: 0.5/0.75, {2}=>{1}: 0.5/0.75, {2}=>{3}: 0.5/0.75, {3}=>{2}: 0.5/0.5
        let keys = rule_keys(&rule_set);
        assert!(keys.contains(&(vec![1], vec![2])));
        assert!(keys.contains(&(vec![3], vec![2])));
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn test_build_is_deterministic() {
        let config = MiningConfig::new(0.25, 0.3).unwrap();
        let first = build_rule_set(&scenario(), &config);
        let second = build_rule_set(&scenario(), &config);

        assert_eq!(rule_keys(&first), rule_keys(&second));
        assert_eq!(
            first.frequent_itemsets().iter().collect::<Vec<_>>(),
            second.frequent_itemsets().iter().collect::<Vec<_>>()
        );
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_empty_rule_set() {
        let config = MiningConfig::new(0.5, 0.5).unwrap();
        let rule_set = RuleSet::empty(config);
        assert!(rule_set.is_empty());
        assert_eq!(rule_set.transaction_count(), 0);
        assert!(rule_set.recommend(&[1, 2].into_iter().collect()).is_empty());
    }

    #[test]
    fn test_catalog_items_widen_universe_only() {
        let config = MiningConfig::new(0.5, 0.6).unwrap();
        let plain = build_rule_set(&scenario(), &config);
        let with_catalog = build_rule_set_with_catalog(&scenario(), vec![1, 2, 3, 99], &config);

        assert_eq!(with_catalog.item_count(), 4);
        assert_eq!(rule_keys(&plain), rule_keys(&with_catalog));
        assert!(plain.catalog().is_none());
        assert_eq!(
            with_catalog.catalog(),
            Some(&[1, 2, 3, 99].into_iter().collect::<HashSet<ItemId>>())
        );
        assert_eq!(
            with_catalog
                .frequent_itemsets()
                .support_of(&Itemset::new(vec![99]).unwrap()),
            None
        );
    }

    #[test]
    fn test_build_from_records_rejects_malformed_likes() {
        let config = MiningConfig::new(0.5, 0.5).unwrap();
        let records = vec![LikeRecord {
            user_id: 9,
            name: "bob".to_string(),
            likes: "[1, two]".to_string(),
        }];

        match build_from_records(&records, &config) {
            Err(MiningError::DataFormat { user_id, .. }) => assert_eq!(user_id, 9),
            other => panic!("expected DataFormat error, got {:?}", other.map(|r| r.id())),
        }
    }

    #[test]
    fn test_summary_orders_by_confidence_and_limits() {
        let config = MiningConfig::new(0.5, 0.6).unwrap();
        let rule_set = build_rule_set(&scenario(), &config);
        let summary = rule_set.summary(2);

        assert_eq!(summary.rule_count, 4);
        assert_eq!(summary.rules.len(), 2);
        assert_eq!(summary.rules[0].confidence, 1.0);
        assert_eq!(summary.rules[0].antecedent.items(), &[3]);
        assert!(summary.rules[0].confidence >= summary.rules[1].confidence);
    }
}
