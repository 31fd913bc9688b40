use crate::models::{ItemId, LikeRecord, Transaction};

use super::MiningError;

/// Turns raw per-user like records into transactions, one per user
///
/// Users with an empty like list are kept as empty transactions: they count
/// towards the support denominator but never contain any itemset.
pub fn load_transactions(records: &[LikeRecord]) -> Result<Vec<Transaction>, MiningError> {
    let transactions = records
        .iter()
        .map(|record| {
            let items = parse_likes(&record.likes).map_err(|reason| MiningError::DataFormat {
                user_id: record.user_id,
                reason,
            })?;
            Ok(Transaction::new(record.user_id, items))
        })
        .collect::<Result<Vec<_>, MiningError>>()?;

    let empty = transactions.iter().filter(|t| t.is_empty()).count();
    tracing::debug!(
        transactions = transactions.len(),
        empty_transactions = empty,
        "Transactions loaded"
    );

    Ok(transactions)
}

/// Parses a serialized like list such as `"[3, 17, 42]"`
pub fn parse_likes(raw: &str) -> Result<Vec<ItemId>, String> {
    serde_json::from_str::<Vec<ItemId>>(raw.trim())
        .map_err(|e| format!("expected a list of integer ids, got {:?}: {}", raw, e))
}
