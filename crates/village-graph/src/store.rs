//! Local snapshots of fetched villages.
//!
//! Villages fetched from the subgraph are cached here so lineage graphs can
//! be rebuilt offline. Only source records are stored; graphs are always
//! rebuilt from them.

use sled::Db;
use std::path::Path;
use thiserror::Error;
use village_core::Village;

const VILLAGES_TREE: &str = "villages";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
}

pub struct SnapshotStore {
    db: Db,
    villages: sled::Tree,
}

impl SnapshotStore {
    /// Opens or creates a snapshot store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let villages = db.open_tree(VILLAGES_TREE)?;
        Ok(Self { db, villages })
    }

    /// Saves a village, replacing any earlier snapshot with the same id.
    pub fn save_village(&self, village: &Village) -> Result<(), StoreError> {
        let bytes = bincode::serialize(village)?;
        self.villages.insert(village.id.as_bytes(), bytes)?;
        self.db.flush()?;
        Ok(())
    }

    /// Loads a village snapshot.
    pub fn load_village(&self, id: &str) -> Result<Option<Village>, StoreError> {
        match self.villages.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Lists all stored villages, ordered by id.
    pub fn list_villages(&self) -> Result<Vec<Village>, StoreError> {
        self.villages
            .iter()
            .values()
            .map(|bytes| -> Result<Village, StoreError> { Ok(bincode::deserialize(&bytes?)?) })
            .collect()
    }

    /// Removes a village snapshot. Returns whether one existed.
    pub fn remove_village(&self, id: &str) -> Result<bool, StoreError> {
        let existed = self.villages.remove(id.as_bytes())?.is_some();
        self.db.flush()?;
        Ok(existed)
    }

    /// Number of stored villages.
    pub fn len(&self) -> usize {
        self.villages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.villages.is_empty()
    }

    /// Clears all snapshots.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.villages.clear()?;
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use village_core::{Character, ZERO_ADDRESS};

    fn sample_village(id: &str) -> Village {
        Village::new(id).with_characters(vec![
            Character::new("0xa", "Ada").with_parents([ZERO_ADDRESS, ZERO_ADDRESS]),
            Character::new("0xb", "Bo")
                .with_parents(["0xa", ZERO_ADDRESS])
                .with_metadata(r#"{"description":"Child of Ada"}"#),
        ])
    }

    #[test]
    fn test_save_load_village() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();

        let village = sample_village("0xv1");
        store.save_village(&village).unwrap();

        let loaded = store.load_village("0xv1").unwrap().unwrap();
        assert_eq!(loaded, village);
        assert!(store.load_village("0xmissing").unwrap().is_none());
    }

    #[test]
    fn test_list_and_remove() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();

        store.save_village(&sample_village("0xv2")).unwrap();
        store.save_village(&sample_village("0xv1")).unwrap();
        assert_eq!(store.len(), 2);

        let ids: Vec<_> = store
            .list_villages()
            .unwrap()
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec!["0xv1", "0xv2"]);

        assert!(store.remove_village("0xv1").unwrap());
        assert!(!store.remove_village("0xv1").unwrap());

        store.clear().unwrap();
        assert!(store.is_empty());
    }
}
