use std::collections::BTreeSet;

use crate::models::{ItemId, Transaction};

/// One-hot encodes transactions over the universe of distinct items
///
/// Columns are the item ids sorted ascending, so the same transactions
/// always produce the same column order.
#[derive(Debug, Clone, Default)]
pub struct TransactionEncoder {
    catalog: BTreeSet<ItemId>,
}

/// Boolean presence matrix of shape (transactions × items), row-major
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTransactions {
    columns: Vec<ItemId>,
    cells: Vec<bool>,
    n_rows: usize,
}

impl TransactionEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds catalog items to the universe even if nobody liked them
    pub fn with_catalog(mut self, catalog: impl IntoIterator<Item = ItemId>) -> Self {
        self.catalog.extend(catalog);
        self
    }

    pub fn encode(&self, transactions: &[Transaction]) -> EncodedTransactions {
        let universe: BTreeSet<ItemId> = transactions
            .iter()
            .flat_map(|t| t.items.iter().copied())
            .chain(self.catalog.iter().copied())
            .collect();
        let columns: Vec<ItemId> = universe.into_iter().collect();

        let n_cols = columns.len();
        let mut cells = vec![false; transactions.len() * n_cols];
        for (row, transaction) in transactions.iter().enumerate() {
            for item in &transaction.items {
                if let Ok(col) = columns.binary_search(item) {
                    cells[row * n_cols + col] = true;
                }
            }
        }

        tracing::debug!(
            transactions = transactions.len(),
            items = n_cols,
            "Transactions encoded"
        );

        EncodedTransactions {
            columns,
            cells,
            n_rows: transactions.len(),
        }
    }
}

impl EncodedTransactions {
    pub fn n_transactions(&self) -> usize {
        self.n_rows
    }

    pub fn n_items(&self) -> usize {
        self.columns.len()
    }

    /// Item ids in column order
    pub fn columns(&self) -> &[ItemId] {
        &self.columns
    }

    pub fn item_at(&self, col: usize) -> ItemId {
        self.columns[col]
    }

    pub fn row(&self, row: usize) -> &[bool] {
        let n_cols = self.columns.len();
        &self.cells[row * n_cols..(row + 1) * n_cols]
    }

    /// Number of transactions containing every column in `cols`
    pub fn count_containing(&self, cols: &[usize]) -> usize {
        (0..self.n_rows)
            .filter(|&row| {
                let cells = self.row(row);
                cols.iter().all(|&col| cells[col])
            })
            .count()
    }
}
