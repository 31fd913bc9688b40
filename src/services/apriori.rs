//! Level-wise frequent itemset mining.
//!
//! Itemsets are handled as sorted column indices of the encoded matrix while
//! mining. Since columns are sorted by item id, index order and id order agree
//! and the results convert straight back to [`Itemset`]s.

use std::collections::{HashMap, HashSet};

use crate::models::{FrequentItemset, Itemset};

use super::encoder::EncodedTransactions;
use super::MiningConfig;

/// Apriori frequent itemset miner
#[derive(Debug, Clone)]
pub struct Apriori {
    min_support: f64,
    max_len: Option<usize>,
}

/// All frequent itemsets of one snapshot, with support lookup
#[derive(Debug, Clone, Default)]
pub struct FrequentItemsets {
    itemsets: Vec<FrequentItemset>,
    // (transaction count, support)
    lookup: HashMap<Itemset, (usize, f64)>,
}

impl FrequentItemsets {
    pub fn support_of(&self, itemset: &Itemset) -> Option<f64> {
        self.lookup.get(itemset).map(|&(_, support)| support)
    }

    /// Number of transactions containing `itemset`, if it is frequent
    pub fn count_of(&self, itemset: &Itemset) -> Option<usize> {
        self.lookup.get(itemset).map(|&(count, _)| count)
    }

    /// Itemsets in mining order: by size, then by item ids
    pub fn iter(&self) -> impl Iterator<Item = &FrequentItemset> {
        self.itemsets.iter()
    }

    pub fn len(&self) -> usize {
        self.itemsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itemsets.is_empty()
    }

    fn push(&mut self, itemset: Itemset, count: usize, support: f64) {
        self.lookup.insert(itemset.clone(), (count, support));
        self.itemsets.push(FrequentItemset {
            itemset,
            count,
            support,
        });
    }
}

impl Apriori {
    pub fn new(config: &MiningConfig) -> Self {
        Self {
            min_support: config.min_support(),
            max_len: config.max_itemset_len(),
        }
    }

    /// Finds every itemset with support >= `min_support`
    ///
    /// Each level fully completes before the next one starts, so the
    /// `max_len` cutoff always leaves a consistent result.
    pub fn mine(&self, encoded: &EncodedTransactions) -> FrequentItemsets {
        let mut result = FrequentItemsets::default();
        if encoded.n_transactions() == 0 {
            return result;
        }

        let singletons: Vec<Vec<usize>> = (0..encoded.n_items()).map(|col| vec![col]).collect();
        let mut level = self.keep_frequent(singletons, encoded, &mut result);
        let mut size = 1;
        tracing::debug!(size, frequent = level.len(), "Apriori level complete");

        while !level.is_empty() && self.max_len.map_or(true, |max| size < max) {
            size += 1;
            let candidates = generate_candidates(&level);
            let candidate_count = candidates.len();
            level = self.keep_frequent(candidates, encoded, &mut result);
            tracing::debug!(
                size,
                candidates = candidate_count,
                frequent = level.len(),
                "Apriori level complete"
            );
        }

        result
    }

    /// Scans the matrix for each candidate and records the frequent ones
    fn keep_frequent(
        &self,
        candidates: Vec<Vec<usize>>,
        encoded: &EncodedTransactions,
        result: &mut FrequentItemsets,
    ) -> Vec<Vec<usize>> {
        let n_transactions = encoded.n_transactions() as f64;
        let mut frequent = Vec::new();

        for candidate in candidates {
            let count = encoded.count_containing(&candidate);
            let support = count as f64 / n_transactions;
            if support >= self.min_support {
                let itemset = Itemset::from_sorted(
                    candidate.iter().map(|&col| encoded.item_at(col)).collect(),
                );
                result.push(itemset, count, support);
                frequent.push(candidate);
            }
        }

        frequent
    }
}

/// Joins frequent (k-1)-itemsets sharing a (k-2)-prefix into k-candidates
///
/// `prev` must be sorted lexicographically, which holds for every level the
/// miner produces. Candidates with an infrequent (k-1)-subset are dropped.
pub(crate) fn generate_candidates(prev: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let frequent: HashSet<&[usize]> = prev.iter().map(|s| s.as_slice()).collect();
    let mut candidates = Vec::new();
    let mut pruned = 0usize;

    for (i, a) in prev.iter().enumerate() {
        let prefix = &a[..a.len() - 1];
        for b in &prev[i + 1..] {
            // Same-prefix itemsets are contiguous in sorted order
            if !b.starts_with(prefix) {
                break;
            }

            let mut candidate = a.clone();
            candidate.push(b[b.len() - 1]);

            if has_infrequent_subset(&candidate, &frequent) {
                pruned += 1;
                continue;
            }
            candidates.push(candidate);
        }
    }

    if pruned > 0 {
        tracing::trace!(pruned, kept = candidates.len(), "Candidates pruned");
    }

    candidates
}

/// Downward closure check over the (k-1)-subsets of `candidate`
fn has_infrequent_subset(candidate: &[usize], frequent: &HashSet<&[usize]>) -> bool {
    // Dropping either of the last two items yields one of the joined parents
    let mut subset = Vec::with_capacity(candidate.len() - 1);
    (0..candidate.len().saturating_sub(2)).any(|skip| {
        subset.clear();
        subset.extend(
            candidate
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != skip)
                .map(|(_, &col)| col),
        );
        !frequent.contains(subset.as_slice())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;
    use crate::services::encoder::TransactionEncoder;

    fn mine(transactions: &[Transaction], min_support: f64) -> FrequentItemsets {
        let config = MiningConfig::new(min_support, 0.5).unwrap();
        let encoded = TransactionEncoder::new().encode(transactions);
        Apriori::new(&config).mine(&encoded)
    }

    fn set(items: &[i64]) -> Itemset {
        Itemset::new(items.iter().copied()).unwrap()
    }

    fn scenario() -> Vec<Transaction> {
        vec![
            Transaction::new(1, vec![1, 2]),
            Transaction::new(2, vec![1, 2, 3]),
            Transaction::new(3, vec![2, 3]),
            Transaction::new(4, vec![1]),
        ]
    }

    #[test]
    fn test_scenario_supports() {
        let itemsets = mine(&scenario(), 0.5);

        assert_eq!(itemsets.support_of(&set(&[1])), Some(0.75));
        assert_eq!(itemsets.support_of(&set(&[2])), Some(0.75));
        assert_eq!(itemsets.support_of(&set(&[3])), Some(0.5));
        assert_eq!(itemsets.support_of(&set(&[1, 2])), Some(0.5));
        assert_eq!(itemsets.support_of(&set(&[2, 3])), Some(0.5));
        assert_eq!(itemsets.count_of(&set(&[1])), Some(3));
        assert_eq!(itemsets.count_of(&set(&[1, 2])), Some(2));
        assert_eq!(itemsets.count_of(&set(&[1, 3])), None);
        // Generated from frequent 1 and 3, rejected on support (0.25)
        assert_eq!(itemsets.support_of(&set(&[1, 3])), None);
        assert_eq!(itemsets.support_of(&set(&[1, 2, 3])), None);
        assert_eq!(itemsets.len(), 5);
    }

    #[test]
    fn test_pair_candidates_include_all_frequent_singleton_pairs() {
        let candidates = generate_candidates(&[vec![0], vec![1], vec![2]]);
        assert_eq!(candidates, vec![vec![0, 1], vec![0, 2], vec![1, 2]]);
    }

    #[test]
    fn test_candidates_join_on_shared_prefix_only() {
        let prev = vec![vec![0, 1], vec![0, 2], vec![1, 2], vec![1, 3]];
        let candidates = generate_candidates(&prev);
        // {0,1,2}: all subsets frequent. {1,2,3}: {2,3} missing.
        assert_eq!(candidates, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_candidates_pruned_by_downward_closure() {
        // {0,1,2} joins from {0,1} and {0,2} but {1,2} is not frequent
        let candidates = generate_candidates(&[vec![0, 1], vec![0, 2]]);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_empty_transactions_yield_nothing() {
        assert!(mine(&[], 0.1).is_empty());
    }

    #[test]
    fn test_only_empty_transactions() {
        let transactions = vec![Transaction::new(1, vec![]), Transaction::new(2, vec![])];
        assert!(mine(&transactions, 0.1).is_empty());
    }

    #[test]
    fn test_empty_transactions_count_in_denominator() {
        let transactions = vec![Transaction::new(1, vec![5]), Transaction::new(2, vec![])];
        let itemsets = mine(&transactions, 0.5);
        assert_eq!(itemsets.support_of(&set(&[5])), Some(0.5));
    }

    #[test]
    fn test_three_item_itemset() {
        let transactions = vec![
            Transaction::new(1, vec![1, 2, 3]),
            Transaction::new(2, vec![1, 2, 3]),
            Transaction::new(3, vec![1, 2]),
            Transaction::new(4, vec![4]),
        ];
        let itemsets = mine(&transactions, 0.5);
        assert_eq!(itemsets.support_of(&set(&[1, 2, 3])), Some(0.5));
        assert_eq!(itemsets.support_of(&set(&[1, 2])), Some(0.75));
        assert_eq!(itemsets.support_of(&set(&[4])), None);
    }

    #[test]
    fn test_max_len_stops_after_level() {
        let transactions = vec![
            Transaction::new(1, vec![1, 2, 3]),
            Transaction::new(2, vec![1, 2, 3]),
        ];
        let config = MiningConfig::new(0.5, 0.5)
            .unwrap()
            .with_max_itemset_len(Some(2))
            .unwrap();
        let encoded = TransactionEncoder::new().encode(&transactions);
        let itemsets = Apriori::new(&config).mine(&encoded);

        assert_eq!(itemsets.support_of(&set(&[1, 2])), Some(1.0));
        assert_eq!(itemsets.support_of(&set(&[1, 2, 3])), None);
        assert!(itemsets.iter().all(|f| f.itemset.len() <= 2));
    }

    #[test]
    fn test_mining_order_by_size() {
        let itemsets = mine(&scenario(), 0.5);
        let sizes: Vec<usize> = itemsets.iter().map(|f| f.itemset.len()).collect();
        assert_eq!(sizes, vec![1, 1, 1, 2, 2]);
    }
}
