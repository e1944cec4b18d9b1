pub mod categories;
pub mod classify;
pub mod integrity;
pub mod videos;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use vidgate_kv::{KVError, KVStore};

/// Catalog service error type.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    /// A video still references the category.
    #[error("category-in-use: {0}")]
    CategoryInUse(String),

    /// The video names a category that does not exist.
    #[error("unknown-category: {0}")]
    UnknownCategory(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<CatalogError> for vidgate_core::ServiceError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(m) => vidgate_core::ServiceError::NotFound(m),
            CatalogError::Conflict(m) => vidgate_core::ServiceError::Conflict(m),
            CatalogError::Validation(m) => vidgate_core::ServiceError::Validation(m),
            integrity @ (CatalogError::CategoryInUse(_) | CatalogError::UnknownCategory(_)) => {
                vidgate_core::ServiceError::Integrity(integrity.to_string())
            }
            CatalogError::Storage(m) => vidgate_core::ServiceError::Storage(m),
            CatalogError::Internal(m) => vidgate_core::ServiceError::Internal(m),
        }
    }
}

impl From<KVError> for CatalogError {
    fn from(e: KVError) -> Self {
        CatalogError::Storage(e.to_string())
    }
}

// ── Storage layout ──────────────────────────────────────────────────

pub(crate) const VIDEOS_PREFIX: &str = "videos/";
pub(crate) const CATEGORIES_PREFIX: &str = "categories/";

pub(crate) fn video_key(id: &str) -> String {
    format!("{VIDEOS_PREFIX}{id}")
}

pub(crate) fn category_key(name: &str) -> String {
    format!("{CATEGORIES_PREFIX}{name}")
}

/// The catalog service. Holds the document store; every mutating call
/// runs the integrity checks before it writes, never after.
pub struct CatalogService {
    pub(crate) store: Arc<dyn KVStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn KVStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }

    // ── JSON document helpers over the store (same pattern as the
    //    access service) ──

    pub(crate) fn read_doc<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, CatalogError> {
        match self.store.get(key)? {
            Some(bytes) => {
                let doc = serde_json::from_slice(&bytes)
                    .map_err(|e| CatalogError::Internal(format!("corrupt document {key}: {e}")))?;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    pub(crate) fn require_doc<T: DeserializeOwned>(
        &self,
        key: &str,
        what: &str,
    ) -> Result<T, CatalogError> {
        self.read_doc(key)?
            .ok_or_else(|| CatalogError::NotFound(what.to_string()))
    }

    pub(crate) fn write_doc<T: Serialize>(&self, key: &str, doc: &T) -> Result<(), CatalogError> {
        let bytes =
            serde_json::to_vec(doc).map_err(|e| CatalogError::Internal(e.to_string()))?;
        self.store.set(key, &bytes)?;
        Ok(())
    }

    pub(crate) fn write_doc_if_absent<T: Serialize>(
        &self,
        key: &str,
        doc: &T,
    ) -> Result<bool, CatalogError> {
        let bytes =
            serde_json::to_vec(doc).map_err(|e| CatalogError::Internal(e.to_string()))?;
        Ok(self.store.set_if_absent(key, &bytes)?)
    }

    /// Full-collection scan, deserialized.
    pub(crate) fn scan_docs<T: DeserializeOwned>(
        &self,
        prefix: &str,
    ) -> Result<Vec<T>, CatalogError> {
        let mut docs = Vec::new();
        for (key, bytes) in self.store.scan(prefix)? {
            let doc = serde_json::from_slice(&bytes)
                .map_err(|e| CatalogError::Internal(format!("corrupt document {key}: {e}")))?;
            docs.push(doc);
        }
        Ok(docs)
    }
}
