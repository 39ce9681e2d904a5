//! Village Core - The ShapeVillage data model
//!
//! This crate defines the records the rest of ShapeVillage works with:
//! characters, villages and the AI-generated metadata attached to them.
//! Records arrive from the subgraph indexer as-is; nothing here talks to
//! the network.
//!
//! # Example
//!
//! ```
//! use village_core::{Character, ZERO_ADDRESS};
//!
//! let founder = Character::new("0xa1", "Ada").with_parents([ZERO_ADDRESS, ZERO_ADDRESS]);
//! assert!(founder.is_root(ZERO_ADDRESS));
//!
//! // Metadata parsing never fails; garbage degrades to a placeholder.
//! let meta = founder.metadata_lossy();
//! assert_eq!(meta.image, None);
//! ```

pub mod character;
pub mod config;
pub mod error;
pub mod metadata;
pub mod village;

pub use character::{Character, ZERO_ADDRESS};
pub use config::{
    Config, LayoutSettings, ServerSettings, CONFIG_DIR, CONFIG_FILE, SUBGRAPH_URL_ENV,
};
pub use error::{ConfigError, CoreError, Result};
pub use metadata::{Attribute, CharacterMetadata, PLACEHOLDER_DESCRIPTION};
pub use village::{Village, VillageAttributes, VillageMetadata};
