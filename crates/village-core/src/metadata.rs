//! Character metadata produced by the generation pipeline.
//!
//! Metadata is ERC721-style JSON written by an external text/image
//! generator. It is not validated: parsing is best-effort, and callers that
//! only need something to display use [`CharacterMetadata::parse_lossy`].

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Description shown when metadata is missing or unreadable.
pub const PLACEHOLDER_DESCRIPTION: &str = "Description not available";

/// A single `{trait_type, value}` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    /// Generators emit strings or numbers here, and sometimes nothing.
    #[serde(default)]
    pub value: Value,
}

impl Attribute {
    /// Renders the value as display text.
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Parsed character metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default = "placeholder_description")]
    pub description: String,

    /// Image URL (usually an IPFS gateway link).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

fn placeholder_description() -> String {
    PLACEHOLDER_DESCRIPTION.to_string()
}

/// Reads `raw` as a JSON object.
pub(crate) fn parse_object(raw: &str) -> Result<Map<String, Value>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CoreError::EmptyMetadata);
    }
    match serde_json::from_str(raw)? {
        Value::Object(object) => Ok(object),
        _ => Err(CoreError::NotAnObject),
    }
}

/// A string field, if present with that type.
pub(crate) fn text_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

fn attribute_from(entry: &Value) -> Option<Attribute> {
    let trait_type = entry.get("trait_type")?.as_str()?;
    Some(Attribute {
        trait_type: trait_type.to_string(),
        value: entry.get("value").cloned().unwrap_or(Value::Null),
    })
}

impl Default for CharacterMetadata {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl CharacterMetadata {
    /// Metadata used when the raw blob cannot be read.
    pub fn placeholder() -> Self {
        Self {
            name: None,
            description: placeholder_description(),
            image: None,
            attributes: Vec::new(),
        }
    }

    /// Parses raw metadata, reporting why it could not be read.
    ///
    /// Only unreadable JSON is an error. Each field of a readable object is
    /// taken on its own, so one malformed field never hides the others.
    pub fn parse(raw: &str) -> Result<Self> {
        let object = parse_object(raw)?;

        let attributes = match object.get("attributes") {
            Some(Value::Array(entries)) => entries.iter().filter_map(attribute_from).collect(),
            _ => Vec::new(),
        };

        Ok(Self {
            name: text_field(&object, "name").map(str::to_string),
            description: text_field(&object, "description")
                .map_or_else(placeholder_description, str::to_string),
            image: text_field(&object, "image")
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string),
            attributes,
        })
    }

    /// Parses raw metadata, falling back to [`CharacterMetadata::placeholder`].
    pub fn parse_lossy(raw: &str) -> Self {
        match Self::parse(raw) {
            Ok(meta) => meta,
            Err(e) => {
                tracing::trace!("metadata unreadable, using placeholder: {}", e);
                Self::placeholder()
            }
        }
    }

    /// Looks up an attribute by trait type, case-insensitively.
    pub fn attribute(&self, trait_type: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.trait_type.eq_ignore_ascii_case(trait_type))
    }

    /// True when this is the placeholder (nothing usable was parsed).
    pub fn is_placeholder(&self) -> bool {
        *self == Self::placeholder()
    }
}
