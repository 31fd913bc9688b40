use serde::Serialize;

use super::Itemset;

/// Association rule: antecedent => consequent
///
/// Both sides come from a single frequent itemset, are non-empty, and are
/// disjoint. Rules are only built by the rule generator, which enforces this.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssociationRule {
    pub antecedent: Itemset,
    pub consequent: Itemset,
    /// Support of antecedent ∪ consequent
    pub support: f64,
    /// count(antecedent ∪ consequent) / count(antecedent)
    pub confidence: f64,
    /// confidence / support(consequent)
    pub lift: f64,
    /// support(A ∪ C) - support(A) * support(C)
    pub leverage: f64,
    /// (1 - support(C)) / (1 - confidence), infinite when confidence is 1.
    /// Serialized as `null` in that case.
    pub conviction: f64,
}

/// Supports needed to score one split of a frequent itemset
#[derive(Debug, Clone, Copy)]
pub(crate) struct SplitSupports {
    pub union: f64,
    pub antecedent: f64,
    pub consequent: f64,
}

impl AssociationRule {
    /// Scores a split whose `confidence` the caller already computed from counts
    pub(crate) fn score(
        antecedent: Itemset,
        consequent: Itemset,
        supports: SplitSupports,
        confidence: f64,
    ) -> Self {
        debug_assert!(antecedent.is_disjoint(&consequent));

        let lift = confidence / supports.consequent;
        let leverage = supports.union - supports.antecedent * supports.consequent;
        let conviction = if confidence >= 1.0 {
            f64::INFINITY
        } else {
            (1.0 - supports.consequent) / (1.0 - confidence)
        };

        Self {
            antecedent,
            consequent,
            support: supports.union,
            confidence,
            lift,
            leverage,
            conviction,
        }
    }
}
