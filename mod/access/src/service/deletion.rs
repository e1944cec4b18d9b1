use vidgate_kv::KVStore;

use crate::model::UserRecord;
use crate::service::{AccessError, AccessService, user_key};

impl AccessService {
    /// Delete the given user records as one atomic batch.
    ///
    /// Every id must resolve to an existing record; any unknown id rejects
    /// the whole batch before a single delete happens, and the store-level
    /// batch is all-or-nothing, so a failure leaves every record in place.
    ///
    /// Deliberately asymmetric: the corresponding identity-provider
    /// accounts are NOT deleted, and nothing cascades to videos or
    /// categories.
    pub fn delete_users(&self, user_ids: &[String]) -> Result<usize, AccessError> {
        if user_ids.is_empty() {
            return Err(AccessError::Validation("user_ids must not be empty".into()));
        }

        let mut keys = Vec::with_capacity(user_ids.len());
        for id in user_ids {
            let key = user_key(id);
            if self.read_doc::<UserRecord>(&key)?.is_none() {
                return Err(AccessError::NotFound(format!("user {id}")));
            }
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        self.store.batch_delete(&key_refs)?;
        tracing::info!(count = keys.len(), "deleted user records");
        Ok(keys.len())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vidgate_core::ListParams;
    use vidgate_kv::RedbStore;

    use crate::provider::{IdentityProvider, MemoryIdentityProvider};
    use crate::service::{AccessConfig, AccessService};

    use super::*;

    fn test_service() -> (Arc<AccessService>, Arc<MemoryIdentityProvider>) {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let store = Arc::new(RedbStore::open(tmp.path()).unwrap());
        let provider = Arc::new(MemoryIdentityProvider::new());
        let svc = AccessService::new(store, provider.clone(), AccessConfig::default());
        (svc, provider)
    }

    fn provision(svc: &AccessService, provider: &MemoryIdentityProvider, email: &str) -> String {
        let identity = provider.create_account(email, "pw").unwrap();
        svc.resolve_role(&identity.id).unwrap();
        identity.id
    }

    #[test]
    fn test_deletes_all_records() {
        let (svc, provider) = test_service();
        let a = provision(&svc, &provider, "a@example.com");
        let b = provision(&svc, &provider, "b@example.com");

        let count = svc.delete_users(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(count, 2);
        assert!(svc.get_user(&a).is_err());
        assert!(svc.get_user(&b).is_err());

        // The identities themselves are untouched.
        assert!(provider.account_exists("a@example.com"));
        assert!(provider.account_exists("b@example.com"));
    }

    #[test]
    fn test_invalid_id_deletes_nothing() {
        let (svc, provider) = test_service();
        let a = provision(&svc, &provider, "a@example.com");
        let b = provision(&svc, &provider, "b@example.com");

        let err = svc
            .delete_users(&[a.clone(), "missing".to_string(), b.clone()])
            .unwrap_err();
        assert!(matches!(err, AccessError::NotFound(_)));

        // No partial deletion occurred.
        assert!(svc.get_user(&a).is_ok());
        assert!(svc.get_user(&b).is_ok());
        assert_eq!(svc.list_users(&ListParams::default()).unwrap().total, 2);
    }

    #[test]
    fn test_empty_set_rejected() {
        let (svc, _) = test_service();
        assert!(matches!(
            svc.delete_users(&[]),
            Err(AccessError::Validation(_))
        ));
    }
}
