use std::collections::{BTreeSet, HashSet};

use crate::models::ItemId;

use super::RuleSet;

/// Recommends items implied by a user's current likes
///
/// Unions the consequents of every rule whose antecedent is contained in
/// `likes`, then removes anything already liked. No ranking is applied; the
/// set is ordered by id only. Unknown ids in `likes` simply match nothing.
pub fn recommend(likes: &HashSet<ItemId>, rule_set: &RuleSet) -> BTreeSet<ItemId> {
    if likes.is_empty() {
        return BTreeSet::new();
    }

    let mut recommendations: BTreeSet<ItemId> = rule_set
        .rules()
        .iter()
        .filter(|rule| rule.antecedent.is_satisfied_by(likes))
        .flat_map(|rule| rule.consequent.iter())
        .collect();
    recommendations.retain(|item| !likes.contains(item));

    tracing::debug!(
        liked = likes.len(),
        recommended = recommendations.len(),
        "Recommendations matched"
    );

    recommendations
}

/// Keeps only ids present in the item catalog
pub fn restrict_to_catalog(
    recommendations: BTreeSet<ItemId>,
    catalog: &HashSet<ItemId>,
) -> BTreeSet<ItemId> {
    recommendations
        .into_iter()
        .filter(|item| catalog.contains(item))
        .collect()
}
