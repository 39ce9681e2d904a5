//! GraphQL documents and response envelopes for the village subgraph.
//!
//! Queries select the fields the subgraph schema exposes for `Village` and
//! `Character` entities. Values are passed as variables, never spliced into
//! the document.

use crate::error::{IndexerError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use village_core::Village;

/// Single village with its characters.
pub const VILLAGE_QUERY: &str = r#"query Village($id: ID!) {
  village(id: $id) {
    id
    villageId
    creator
    owner
    metadataURI
    createdAt
    updatedAt
    charactersCount
    characters {
      id
      name
      parents
      symbol
      charMetadata
    }
  }
}"#;

/// Villages owned by an address, without characters.
pub const VILLAGES_BY_OWNER_QUERY: &str = r#"query VillagesByOwner($owner: Bytes!) {
  villages(where: { owner: $owner }) {
    id
    villageId
    creator
    owner
    metadataURI
    createdAt
    updatedAt
    charactersCount
  }
}"#;

/// Villages with at least two characters, i.e. ones where a pair of
/// characters can be picked as parents.
pub const BREEDABLE_VILLAGES_QUERY: &str = r#"query BreedableVillages {
  villages(where: { charactersCount_gte: 2 }) {
    id
    villageId
    creator
    owner
    metadataURI
    createdAt
    updatedAt
    charactersCount
    characters {
      id
      name
      parents
      charMetadata
    }
  }
}"#;

/// Body of a GraphQL POST.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: Value,
}

impl<'a> GraphQlRequest<'a> {
    pub fn new(query: &'a str, variables: Value) -> Self {
        Self { query, variables }
    }

    pub fn village(id: &str) -> Self {
        Self::new(VILLAGE_QUERY, json!({ "id": id }))
    }

    pub fn villages_by_owner(owner: &str) -> Self {
        Self::new(VILLAGES_BY_OWNER_QUERY, json!({ "owner": owner }))
    }

    pub fn breedable_villages() -> Self {
        Self::new(BREEDABLE_VILLAGES_QUERY, json!({}))
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct VillageData {
    pub village: Option<Village>,
}

#[derive(Debug, Deserialize)]
pub struct VillagesData {
    #[serde(default)]
    pub villages: Vec<Village>,
}

/// Decodes a GraphQL response body, turning `errors` into an error.
pub fn decode_response<T: DeserializeOwned>(body: &str) -> Result<T> {
    let response: GraphQlResponse<T> = serde_json::from_str(body)?;

    if !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(IndexerError::GraphQl(messages.join("; ")));
    }

    response.data.ok_or(IndexerError::MissingData)
}

/// Validates a `0x`-prefixed 20-byte hex address and lowercases it.
///
/// The subgraph stores ids as lowercase `Bytes`, so mixed-case checksummed
/// input would otherwise never match.
pub fn normalize_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| IndexerError::InvalidAddress(address.to_string()))?;

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(IndexerError::InvalidAddress(address.to_string()));
    }

    Ok(format!("0x{}", hex.to_ascii_lowercase()))
}
