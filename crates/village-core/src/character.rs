//! Character records as served by the indexer.

use crate::metadata::CharacterMetadata;
use serde::{Deserialize, Serialize};

/// The zero address. Marks an empty parent slot.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// A character as indexed from `CharacterAdded` events.
///
/// Characters are externally owned: the lineage code reads them but never
/// mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Character contract address.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Parent addresses. Two slots on chain; the zero address fills an
    /// empty slot. May be empty for characters the indexer only saw sold.
    #[serde(default)]
    pub parents: Vec<String>,

    /// Token symbol.
    #[serde(default)]
    pub symbol: Option<String>,

    /// Raw metadata JSON from the generation pipeline.
    #[serde(rename = "charMetadata", default)]
    pub char_metadata: String,
}

impl Character {
    /// Creates a character with no parents and no metadata.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parents: Vec::new(),
            symbol: None,
            char_metadata: String::new(),
        }
    }

    /// Sets the parent slots.
    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the raw metadata string.
    pub fn with_metadata(mut self, raw: impl Into<String>) -> Self {
        self.char_metadata = raw.into();
        self
    }

    /// Iterates over parent slots that are not the sentinel.
    pub fn valid_parents<'a>(&'a self, sentinel: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.parents
            .iter()
            .map(String::as_str)
            .filter(move |p| *p != sentinel)
    }

    /// True when every parent slot holds the sentinel.
    pub fn is_root(&self, sentinel: &str) -> bool {
        self.valid_parents(sentinel).next().is_none()
    }

    /// Parses the metadata, substituting the placeholder on failure.
    pub fn metadata_lossy(&self) -> CharacterMetadata {
        CharacterMetadata::parse_lossy(&self.char_metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_detection() {
        let root = Character::new("a", "A").with_parents([ZERO_ADDRESS, ZERO_ADDRESS]);
        assert!(root.is_root(ZERO_ADDRESS));

        let bare = Character::new("b", "B");
        assert!(bare.is_root(ZERO_ADDRESS));

        let child = Character::new("c", "C").with_parents(["a", ZERO_ADDRESS]);
        assert!(!child.is_root(ZERO_ADDRESS));
        assert_eq!(child.valid_parents(ZERO_ADDRESS).collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_deserialize_indexer_shape() {
        let json = r#"{
            "id": "0xabc",
            "name": "Mira",
            "parents": ["0x0000000000000000000000000000000000000000", "0x0000000000000000000000000000000000000000"],
            "symbol": "MIRA",
            "charMetadata": "{\"description\":\"A weaver\"}"
        }"#;

        let character: Character = serde_json::from_str(json).unwrap();
        assert_eq!(character.id, "0xabc");
        assert_eq!(character.symbol.as_deref(), Some("MIRA"));
        assert!(character.is_root(ZERO_ADDRESS));
        assert_eq!(character.metadata_lossy().description, "A weaver");
    }

    #[test]
    fn test_missing_optional_fields() {
        let character: Character = serde_json::from_str(r#"{"id":"0x1","name":"X"}"#).unwrap();
        assert!(character.parents.is_empty());
        assert!(character.char_metadata.is_empty());
    }
}
