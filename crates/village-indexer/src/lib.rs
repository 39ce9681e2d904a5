//! Village Indexer - Access to indexed villages and characters
//!
//! Villages and characters are indexed on chain by a subgraph. This crate
//! reads them back, either over the subgraph's GraphQL endpoint or from
//! JSON files saved earlier. It never writes to the subgraph or the chain.

mod client;
mod error;
mod file;
pub mod query;

pub use client::SubgraphClient;
pub use error::{IndexerError, Result};
pub use file::{load_characters, parse_characters};
pub use query::normalize_address;
