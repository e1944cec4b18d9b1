use vidgate_core::{ListParams, ListResult, now_rfc3339};
use vidgate_kv::KVStore;

use crate::model::{DefaultRolePolicy, Role, UserRecord};
use crate::provider::IdentityProvider;
use crate::service::{AccessError, AccessService, DEFAULT_ROLE_KEY, USERS_PREFIX, user_key};

/// Wrap store failures from the admin-facing mutators so callers see a
/// single stable reason.
fn role_update_failed(e: AccessError) -> AccessError {
    match e {
        AccessError::Storage(m) => AccessError::Storage(format!("role-update-failed: {m}")),
        other => other,
    }
}

impl AccessService {
    /// Current default-role policy, self-initializing to `visitor`.
    ///
    /// The initialization is a conditional write at the store level, so
    /// concurrent first reads agree on one winner instead of racing a
    /// read-then-write.
    pub fn default_role_policy(&self) -> Result<DefaultRolePolicy, AccessError> {
        if let Some(policy) = self.read_doc::<DefaultRolePolicy>(DEFAULT_ROLE_KEY)? {
            return Ok(policy);
        }
        let fallback = DefaultRolePolicy::fallback(now_rfc3339());
        self.write_doc_if_absent(DEFAULT_ROLE_KEY, &fallback)?;
        // Re-read: if a concurrent initializer won, its value stands.
        self.require_doc(DEFAULT_ROLE_KEY, "default role policy")
    }

    /// Role assigned to never-seen identities.
    pub fn default_role(&self) -> Result<Role, AccessError> {
        Ok(self.default_role_policy()?.role)
    }

    /// Overwrite the default-role policy. Admin-gated at the API layer.
    pub fn set_default_role(&self, role: Role) -> Result<DefaultRolePolicy, AccessError> {
        let policy = DefaultRolePolicy {
            role,
            updated_at: now_rfc3339(),
        };
        self.write_doc(DEFAULT_ROLE_KEY, &policy)
            .map_err(role_update_failed)?;
        Ok(policy)
    }

    /// Resolve an identity's role, provisioning the user record on first
    /// sight.
    ///
    /// Never answers without a durably recorded UserRecord: either the
    /// existing record's role is returned, or a new record is written
    /// (conditionally, so a racing first sight keeps exactly one record)
    /// before the role is reported.
    pub fn resolve_role(&self, identity_id: &str) -> Result<Role, AccessError> {
        let key = user_key(identity_id);
        if let Some(user) = self.read_doc::<UserRecord>(&key)? {
            return Ok(user.role);
        }

        let identity = self
            .provider
            .lookup(identity_id)?
            .ok_or_else(|| AccessError::NotFound(format!("identity {identity_id}")))?;

        let role = self.default_role()?;
        let now = now_rfc3339();
        let record = UserRecord {
            id: identity.id,
            email: identity.email,
            role,
            discord_id: None,
            created_at: now.clone(),
            updated_at: now,
        };

        if self.write_doc_if_absent(&key, &record)? {
            tracing::info!(user = identity_id, %role, "provisioned user record");
            Ok(role)
        } else {
            // Lost a first-sight race; the stored record is the answer.
            let existing: UserRecord = self.require_doc(&key, "user record")?;
            Ok(existing.role)
        }
    }

    /// Get a user record by id.
    pub fn get_user(&self, id: &str) -> Result<UserRecord, AccessError> {
        self.require_doc(&user_key(id), &format!("user {id}"))
    }

    /// List user records with pagination.
    pub fn list_users(&self, params: &ListParams) -> Result<ListResult<UserRecord>, AccessError> {
        let mut items = Vec::new();
        for (key, bytes) in self.store.scan(USERS_PREFIX)? {
            let user: UserRecord = serde_json::from_slice(&bytes)
                .map_err(|e| AccessError::Internal(format!("corrupt document {key}: {e}")))?;
            items.push(user);
        }
        let total = items.len();
        let items = items
            .into_iter()
            .skip(params.offset)
            .take(params.limit)
            .collect();
        Ok(ListResult { items, total })
    }

    /// Change a user's role, preserving every other field.
    pub fn set_role(&self, user_id: &str, role: Role) -> Result<UserRecord, AccessError> {
        let mut user = self.get_user(user_id)?;
        user.role = role;
        user.updated_at = now_rfc3339();
        self.write_doc(&user_key(user_id), &user)
            .map_err(role_update_failed)?;
        Ok(user)
    }

    /// Set or clear a user's Discord id, preserving every other field.
    ///
    /// The id is trimmed of surrounding whitespace; an empty string after
    /// trimming clears the field.
    pub fn set_discord_id(
        &self,
        user_id: &str,
        discord_id: Option<&str>,
    ) -> Result<UserRecord, AccessError> {
        let mut user = self.get_user(user_id)?;
        user.discord_id = crate::service::registration::normalize_discord_id(discord_id);
        user.updated_at = now_rfc3339();
        self.write_doc(&user_key(user_id), &user)
            .map_err(role_update_failed)?;
        Ok(user)
    }

    /// Reject callers whose resolved role is below `admin`.
    pub fn require_admin(&self, identity_id: &str) -> Result<(), AccessError> {
        let role = self.resolve_role(identity_id)?;
        if role >= Role::Admin {
            Ok(())
        } else {
            Err(AccessError::Forbidden("administrator role required".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

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

    #[test]
    fn test_default_role_self_initializes() {
        let (svc, _) = test_service();

        assert_eq!(svc.default_role().unwrap(), Role::Visitor);
        // The fallback is durably recorded, not just returned.
        let policy = svc.default_role_policy().unwrap();
        assert_eq!(policy.role, Role::Visitor);
    }

    #[test]
    fn test_first_sight_provisions_exactly_one_record() {
        let (svc, provider) = test_service();
        let identity = provider.create_account("a@example.com", "pw").unwrap();

        let role = svc.resolve_role(&identity.id).unwrap();
        assert_eq!(role, Role::Visitor);

        let user = svc.get_user(&identity.id).unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_eq!(user.discord_id, None);

        // Second resolution returns the same role without a second record.
        let role2 = svc.resolve_role(&identity.id).unwrap();
        assert_eq!(role2, role);
        let list = svc.list_users(&ListParams::default()).unwrap();
        assert_eq!(list.total, 1);
    }

    #[test]
    fn test_new_identity_gets_current_default_role() {
        let (svc, provider) = test_service();
        svc.set_default_role(Role::Subscriber).unwrap();

        let identity = provider.create_account("b@example.com", "pw").unwrap();
        assert_eq!(svc.resolve_role(&identity.id).unwrap(), Role::Subscriber);

        // An already-provisioned user is not affected by later policy changes.
        svc.set_default_role(Role::Visitor).unwrap();
        assert_eq!(svc.resolve_role(&identity.id).unwrap(), Role::Subscriber);
    }

    #[test]
    fn test_resolve_role_unknown_identity() {
        let (svc, _) = test_service();
        assert!(matches!(
            svc.resolve_role("no-such-identity"),
            Err(AccessError::NotFound(_))
        ));
    }

    #[test]
    fn test_set_role_preserves_other_fields() {
        let (svc, provider) = test_service();
        let identity = provider.create_account("c@example.com", "pw").unwrap();
        svc.resolve_role(&identity.id).unwrap();
        svc.set_discord_id(&identity.id, Some("carol#1234")).unwrap();

        let updated = svc.set_role(&identity.id, Role::Admin).unwrap();
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.email, "c@example.com");
        assert_eq!(updated.discord_id, Some("carol#1234".to_string()));
    }

    #[test]
    fn test_set_discord_id_trims() {
        let (svc, provider) = test_service();
        let identity = provider.create_account("d@example.com", "pw").unwrap();
        svc.resolve_role(&identity.id).unwrap();

        let user = svc.set_discord_id(&identity.id, Some("  dave#42  ")).unwrap();
        assert_eq!(user.discord_id, Some("dave#42".to_string()));

        // Whitespace-only clears the field.
        let user = svc.set_discord_id(&identity.id, Some("   ")).unwrap();
        assert_eq!(user.discord_id, None);
    }

    #[test]
    fn test_require_admin() {
        let (svc, provider) = test_service();
        let identity = provider.create_account("e@example.com", "pw").unwrap();
        svc.resolve_role(&identity.id).unwrap();

        assert!(matches!(
            svc.require_admin(&identity.id),
            Err(AccessError::Forbidden(_))
        ));

        svc.set_role(&identity.id, Role::Admin).unwrap();
        assert!(svc.require_admin(&identity.id).is_ok());
    }
}
