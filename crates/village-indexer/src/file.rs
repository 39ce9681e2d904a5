//! Loading character lists from JSON files.
//!
//! Accepts the shapes people actually save: a bare array of characters, a
//! village object, or a raw subgraph response.

use crate::error::{IndexerError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use village_core::{Character, Village};

#[derive(Deserialize)]
#[serde(untagged)]
enum CharacterSource {
    List(Vec<Character>),
    Envelope { data: EnvelopeData },
    Village(Village),
}

#[derive(Deserialize)]
struct EnvelopeData {
    village: Option<Village>,
}

/// Reads characters from a JSON file.
pub fn load_characters(path: &Path) -> Result<Vec<Character>> {
    let text = fs::read_to_string(path).map_err(|source| IndexerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_characters(&text)
}

/// Parses characters from JSON text.
pub fn parse_characters(text: &str) -> Result<Vec<Character>> {
    let source: CharacterSource = serde_json::from_str(text)?;
    let characters = match source {
        CharacterSource::List(characters) => characters,
        CharacterSource::Envelope { data } => data
            .village
            .and_then(|v| v.characters)
            .unwrap_or_default(),
        CharacterSource::Village(village) => village.characters.unwrap_or_default(),
    };
    tracing::debug!("Parsed {} characters", characters.len());
    Ok(characters)
}
