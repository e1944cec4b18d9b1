use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};

use crate::error::KVError;
use crate::traits::KVStore;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

/// RedbStore is a KVStore implementation backed by redb — a pure-Rust
/// embedded key-value database. Batch operations and conditional writes
/// run in a single redb write transaction.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        let db = Database::create(path).map_err(|e| KVError::Storage(e.to_string()))?;

        // Ensure the table exists by doing a write transaction.
        let write_txn = db
            .begin_write()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        {
            let _table = write_txn
                .open_table(TABLE)
                .map_err(|e| KVError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| KVError::Storage(e.to_string()))?;

        tracing::debug!(path = %path.display(), "opened redb store");
        Ok(Self { db: Arc::new(db) })
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        let table = read_txn
            .open_table(TABLE)
            .map_err(|e| KVError::Storage(e.to_string()))?;

        match table.get(key) {
            Ok(Some(val)) => Ok(Some(val.value().to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(KVError::Storage(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(TABLE)
                .map_err(|e| KVError::Storage(e.to_string()))?;
            table
                .insert(key, value)
                .map_err(|e| KVError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(())
    }

    fn set_if_absent(&self, key: &str, value: &[u8]) -> Result<bool, KVError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        let written = {
            let mut table = write_txn
                .open_table(TABLE)
                .map_err(|e| KVError::Storage(e.to_string()))?;
            let existing = table
                .get(key)
                .map_err(|e| KVError::Storage(e.to_string()))?
                .is_some();
            if existing {
                false
            } else {
                table
                    .insert(key, value)
                    .map_err(|e| KVError::Storage(e.to_string()))?;
                true
            }
        };
        write_txn
            .commit()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(written)
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(TABLE)
                .map_err(|e| KVError::Storage(e.to_string()))?;
            table
                .remove(key)
                .map_err(|e| KVError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(())
    }

    fn batch_set(&self, entries: &[(&str, &[u8])]) -> Result<(), KVError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(TABLE)
                .map_err(|e| KVError::Storage(e.to_string()))?;
            for (key, value) in entries {
                table
                    .insert(*key, *value)
                    .map_err(|e| KVError::Storage(e.to_string()))?;
            }
        }
        write_txn
            .commit()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(())
    }

    fn batch_delete(&self, keys: &[&str]) -> Result<(), KVError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(TABLE)
                .map_err(|e| KVError::Storage(e.to_string()))?;
            for key in keys {
                table
                    .remove(*key)
                    .map_err(|e| KVError::Storage(e.to_string()))?;
            }
        }
        write_txn
            .commit()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        let table = read_txn
            .open_table(TABLE)
            .map_err(|e| KVError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        let iter = table
            .range(prefix..)
            .map_err(|e| KVError::Storage(e.to_string()))?;

        for entry in iter {
            let entry = entry.map_err(|e| KVError::Storage(e.to_string()))?;
            let key = entry.0.value().to_string();
            if !key.starts_with(prefix) {
                break;
            }
            let value = entry.1.value().to_vec();
            results.push((key, value));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> RedbStore {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        RedbStore::open(tmp.path()).unwrap()
    }

    #[test]
    fn test_get_set_delete() {
        let store = test_store();

        assert!(store.get("users/a").unwrap().is_none());

        store.set("users/a", b"alice").unwrap();
        assert_eq!(store.get("users/a").unwrap().unwrap(), b"alice");

        store.set("users/a", b"alice2").unwrap();
        assert_eq!(store.get("users/a").unwrap().unwrap(), b"alice2");

        store.delete("users/a").unwrap();
        assert!(store.get("users/a").unwrap().is_none());

        // Deleting a missing key is fine.
        store.delete("users/a").unwrap();
    }

    #[test]
    fn test_set_if_absent() {
        let store = test_store();

        assert!(store.set_if_absent("settings/defaultRole", b"v1").unwrap());
        // Second conditional write loses and leaves the value untouched.
        assert!(!store.set_if_absent("settings/defaultRole", b"v2").unwrap());
        assert_eq!(store.get("settings/defaultRole").unwrap().unwrap(), b"v1");
    }

    #[test]
    fn test_scan_prefix() {
        let store = test_store();

        store.set("videos/1", b"a").unwrap();
        store.set("videos/2", b"b").unwrap();
        store.set("categories/x", b"c").unwrap();

        let videos = store.scan("videos/").unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].0, "videos/1");
        assert_eq!(videos[1].0, "videos/2");

        let all = store.scan("").unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_batch_delete() {
        let store = test_store();

        store.set("users/a", b"1").unwrap();
        store.set("users/b", b"2").unwrap();
        store.set("users/c", b"3").unwrap();

        store.batch_delete(&["users/a", "users/c"]).unwrap();
        assert!(store.get("users/a").unwrap().is_none());
        assert_eq!(store.get("users/b").unwrap().unwrap(), b"2");
        assert!(store.get("users/c").unwrap().is_none());
    }
}
