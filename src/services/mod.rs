pub mod apriori;
pub mod encoder;
pub mod loader;
pub mod recommendations;
pub mod rule_set;
pub mod rules;
pub mod snapshot;

pub use apriori::{Apriori, FrequentItemsets};
pub use encoder::{EncodedTransactions, TransactionEncoder};
pub use loader::load_transactions;
pub use recommendations::{recommend, restrict_to_catalog};
pub use rule_set::{
    build_from_records, build_rule_set, build_rule_set_with_catalog, MiningConfig, MiningError,
    RuleSet,
};
pub use rules::generate_rules;
pub use snapshot::{build_from_store, RuleSetStore};
