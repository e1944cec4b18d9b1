use crate::error::KVError;

/// KVStore provides a document-store interface over namespaced keys.
///
/// Keys follow a `collection/id` convention: `users/4f2a…`,
/// `settings/defaultRole`, `videos/91bc…`, etc. A prefix scan over
/// `collection/` is the collection listing; there is no richer query
/// surface.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, overwriting any existing value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Write the value only if the key is absent, in a single write
    /// transaction. Returns true if the write happened, false if the key
    /// already held a value (which is left untouched).
    fn set_if_absent(&self, key: &str, value: &[u8]) -> Result<bool, KVError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// Set several key-value pairs in one atomic transaction.
    fn batch_set(&self, entries: &[(&str, &[u8])]) -> Result<(), KVError>;

    /// Delete several keys in one atomic transaction. Either every key is
    /// removed or, on error, none are.
    fn batch_delete(&self, keys: &[&str]) -> Result<(), KVError>;

    /// Scan all keys matching a prefix. Returns sorted (key, value) pairs.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;
}
