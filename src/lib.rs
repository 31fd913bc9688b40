//! Quote recommendations from association rules mined over user likes.
//!
//! The rule set is mined once per data snapshot (load → encode → Apriori →
//! rule generation) and published as an immutable snapshot; recommendation
//! queries only read it.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
