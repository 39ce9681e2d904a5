//! Village records and their metadata.

use crate::character::Character;
use crate::error::{CoreError, Result};
use crate::metadata::{parse_object, text_field, PLACEHOLDER_DESCRIPTION};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A village as indexed from `VillageCreated` and follow-up events.
///
/// Numeric fields travel as strings (GraphQL `BigInt`); use the accessor
/// methods to read them as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Village {
    /// Village contract address.
    pub id: String,
    #[serde(default)]
    pub village_id: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub owner: String,
    /// Village metadata as JSON text (despite the name, not a URI).
    #[serde(rename = "metadataURI", default)]
    pub metadata_uri: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub characters_count: String,
    /// Present only when the query selected characters.
    #[serde(default)]
    pub characters: Option<Vec<Character>>,
}

impl Village {
    /// Creates a village with no characters.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            village_id: String::new(),
            creator: String::new(),
            owner: String::new(),
            metadata_uri: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
            characters_count: "0".to_string(),
            characters: None,
        }
    }

    /// Attaches characters, keeping the count in sync.
    pub fn with_characters(mut self, characters: Vec<Character>) -> Self {
        self.characters_count = characters.len().to_string();
        self.characters = Some(characters);
        self
    }

    /// Number of characters as reported by the indexer.
    pub fn characters_count(&self) -> Result<u64> {
        parse_number("charactersCount", &self.characters_count)
    }

    /// Creation time.
    pub fn created_at(&self) -> Result<DateTime<Utc>> {
        parse_timestamp("createdAt", &self.created_at)
    }

    /// Last update time.
    pub fn updated_at(&self) -> Result<DateTime<Utc>> {
        parse_timestamp("updatedAt", &self.updated_at)
    }

    /// Characters, or an empty slice when none were fetched.
    pub fn characters(&self) -> &[Character] {
        self.characters.as_deref().unwrap_or(&[])
    }

    /// Parses the village metadata, falling back to a placeholder.
    pub fn metadata_lossy(&self) -> VillageMetadata {
        VillageMetadata::parse_lossy(&self.metadata_uri)
    }

    /// Display name: metadata name, else the village id.
    pub fn display_name(&self) -> String {
        let meta = self.metadata_lossy();
        if meta.name.is_empty() {
            self.id.clone()
        } else {
            meta.name
        }
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| CoreError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>> {
    let secs = parse_number(field, value)?;
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .ok_or_else(|| CoreError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Generated village attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VillageAttributes {
    #[serde(default)]
    pub population: u64,
    #[serde(default)]
    pub climate: String,
    #[serde(default)]
    pub terrain: String,
    #[serde(default)]
    pub culture: String,
    #[serde(default)]
    pub resources: Vec<String>,
}

/// Generated village metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VillageMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attributes: VillageAttributes,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub atmosphere: String,
    #[serde(default)]
    pub size: String,
}

impl VillageMetadata {
    /// Parses raw metadata field by field. Only unreadable JSON is an error.
    pub fn parse(raw: &str) -> Result<Self> {
        let object = parse_object(raw)?;
        let text = |key| text_field(&object, key).unwrap_or_default().to_string();

        let attributes = match object.get("attributes") {
            Some(Value::Object(attrs)) => VillageAttributes {
                population: attrs.get("population").and_then(count_from).unwrap_or(0),
                climate: text_field(attrs, "climate").unwrap_or_default().to_string(),
                terrain: text_field(attrs, "terrain").unwrap_or_default().to_string(),
                culture: text_field(attrs, "culture").unwrap_or_default().to_string(),
                resources: string_list(attrs.get("resources")),
            },
            _ => VillageAttributes::default(),
        };

        Ok(Self {
            name: text("name"),
            description: text_field(&object, "description")
                .unwrap_or(PLACEHOLDER_DESCRIPTION)
                .to_string(),
            attributes,
            features: string_list(object.get("features")),
            atmosphere: text("atmosphere"),
            size: text("size"),
        })
    }

    pub fn parse_lossy(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|e| {
            tracing::trace!("village metadata unreadable: {}", e);
            Self {
                description: PLACEHOLDER_DESCRIPTION.to_string(),
                ..Self::default()
            }
        })
    }
}

/// Generators write counts as numbers or as numeric strings.
fn count_from(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_subgraph_village() {
        let json = r#"{
            "id": "0xvillage",
            "villageId": "3",
            "creator": "0xcreator",
            "owner": "0xowner",
            "metadataURI": "{\"name\":\"Brookhollow\",\"description\":\"River town\",\"attributes\":{\"population\":120,\"climate\":\"mild\",\"terrain\":\"valley\",\"culture\":\"artisan\",\"resources\":[\"wood\"]},\"features\":[\"mill\"],\"atmosphere\":\"calm\",\"size\":\"small\"}",
            "createdAt": "1735689600",
            "updatedAt": "1735776000",
            "charactersCount": "2",
            "characters": [
                {"id": "0xa", "name": "A", "parents": [], "charMetadata": ""},
                {"id": "0xb", "name": "B", "parents": [], "charMetadata": ""}
            ]
        }"#;

        let village: Village = serde_json::from_str(json).unwrap();
        assert_eq!(village.characters_count().unwrap(), 2);
        assert_eq!(village.characters().len(), 2);
        assert_eq!(village.created_at().unwrap().timestamp(), 1_735_689_600);
        assert_eq!(village.display_name(), "Brookhollow");
        assert_eq!(village.metadata_lossy().attributes.population, 120);
    }

    #[test]
    fn test_bad_fields_are_reported() {
        let mut village = Village::new("0xv");
        village.characters_count = "many".into();
        assert!(matches!(
            village.characters_count(),
            Err(CoreError::InvalidNumber { field: "charactersCount", .. })
        ));
        assert!(village.created_at().is_err());
    }

    #[test]
    fn test_lossy_village_metadata() {
        let village = Village::new("0xv");
        let meta = village.metadata_lossy();
        assert_eq!(meta.description, PLACEHOLDER_DESCRIPTION);
        assert_eq!(village.display_name(), "0xv");
    }

    #[test]
    fn test_village_metadata_survives_odd_shapes() {
        let meta = VillageMetadata::parse_lossy(
            r#"{"name": "Fernmoor", "description": null, "attributes": {"population": "240", "climate": 7, "resources": ["peat", 3], "types": ["marsh"]}, "features": "none"}"#,
        );
        assert_eq!(meta.name, "Fernmoor");
        assert_eq!(meta.description, PLACEHOLDER_DESCRIPTION);
        assert_eq!(meta.attributes.population, 240);
        assert_eq!(meta.attributes.climate, "");
        assert_eq!(meta.attributes.resources, vec!["peat".to_string()]);
        assert!(meta.features.is_empty());
    }
}
