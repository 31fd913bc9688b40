use crate::models::{AssociationRule, ItemId, Itemset, SplitSupports};

use super::apriori::FrequentItemsets;

/// Expands frequent itemsets of size >= 2 into rules meeting `min_confidence`
///
/// Every proper non-empty subset of an itemset is tried as antecedent with its
/// complement as consequent. Supports come from the miner's output; a split
/// whose sides are missing from it is skipped.
///
/// Confidence is the ratio of transaction counts rather than of supports, so
/// a rule sitting exactly on `min_confidence` is kept.
pub fn generate_rules(itemsets: &FrequentItemsets, min_confidence: f64) -> Vec<AssociationRule> {
    let mut rules = Vec::new();
    let mut skipped = 0usize;

    for frequent in itemsets.iter().filter(|f| f.itemset.len() >= 2) {
        let items = frequent.itemset.items();
        // Itemsets with 64 items would need 2^64 splits
        if items.len() >= u64::BITS as usize {
            tracing::warn!(size = items.len(), "Itemset too large to split, skipping");
            continue;
        }

        let full_mask = (1u64 << items.len()) - 1;
        for mask in 1..full_mask {
            let (antecedent, consequent) = split(items, mask);

            let (Some(antecedent_count), Some(antecedent_support), Some(consequent_support)) = (
                itemsets.count_of(&antecedent),
                itemsets.support_of(&antecedent),
                itemsets.support_of(&consequent),
            ) else {
                skipped += 1;
                continue;
            };

            let confidence = frequent.count as f64 / antecedent_count as f64;
            if confidence < min_confidence {
                continue;
            }

            rules.push(AssociationRule::score(
                antecedent,
                consequent,
                SplitSupports {
                    union: frequent.support,
                    antecedent: antecedent_support,
                    consequent: consequent_support,
                },
                confidence,
            ));
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Rule splits skipped for missing subset supports");
    }
    tracing::debug!(rules = rules.len(), min_confidence, "Rules generated");

    rules
}

/// Splits sorted `items` by bitmask: set bits form the antecedent
fn split(items: &[ItemId], mask: u64) -> (Itemset, Itemset) {
    let mut antecedent = Vec::new();
    let mut consequent = Vec::new();
    for (i, &item) in items.iter().enumerate() {
        if mask & (1 << i) != 0 {
            antecedent.push(item);
        } else {
            consequent.push(item);
        }
    }
    (Itemset::from_sorted(antecedent), Itemset::from_sorted(consequent))
}
