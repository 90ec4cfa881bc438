//! Precedent search adapter for the external legal index

pub mod client;
pub mod models;
pub mod query;

pub use client::PrecedentSearchClient;
pub use models::Precedent;
pub use query::{build_search_query, jurisdiction_code};
