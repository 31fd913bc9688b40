pub mod csv_store;
pub mod postgres;
mod store;

pub use csv_store::CsvLikesStore;
pub use postgres::{create_pool, PgLikesStore};
pub use store::LikesStore;

#[cfg(test)]
pub use store::MockLikesStore;
