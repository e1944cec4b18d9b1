//! Bootstrap — first-start checks and idempotent seeding.
//!
//! When vidgated starts:
//! 1. Verify the configuration is usable.
//! 2. Ensure the default-role policy document exists.
//! 3. Seed the legacy gate passwords, if configured and not yet stored.
//! 4. Create the configured admin account, if any.

use std::sync::Arc;

use tracing::{info, warn};

use access::model::{GatePassword, GateScope, Role};
use access::provider::IdentityProvider;
use access::service::AccessService;
use vidgate_kv::KVStore;

use crate::config::ServerConfig;

/// Verify server configuration is ready for use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("storage.data_dir is empty in configuration");
    }
    config.gate_mode()?;
    for (scope, value) in [
        (GateScope::Video, &config.gate.video_password),
        (GateScope::Admin, &config.gate.admin_password),
    ] {
        if let Some(value) = value {
            if !is_four_digit(value) {
                anyhow::bail!("gate password for the {scope} scope must be a 4-digit number");
            }
        }
    }
    Ok(())
}

fn is_four_digit(value: &str) -> bool {
    value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit())
}

/// Ensure the default-role policy exists. The read self-initializes the
/// document with a conditional write, so a restart never overwrites an
/// admin's chosen policy.
pub fn ensure_default_role(svc: &AccessService) -> anyhow::Result<()> {
    let policy = svc
        .default_role_policy()
        .map_err(|e| anyhow::anyhow!("failed to initialize default role policy: {e}"))?;
    info!(role = %policy.role, "default role policy ready");
    Ok(())
}

/// Seed a gate password if none is stored yet. An already-stored value
/// always wins over the config file.
pub fn seed_gate_password(
    store: &Arc<dyn KVStore>,
    scope: GateScope,
    value: &str,
) -> anyhow::Result<()> {
    let doc = serde_json::to_vec(&GatePassword {
        value: value.to_string(),
    })?;
    let written = store
        .set_if_absent(scope.storage_key(), &doc)
        .map_err(|e| anyhow::anyhow!("failed to seed {scope} gate password: {e}"))?;
    if written {
        info!(%scope, "seeded gate password");
    }
    Ok(())
}

/// Create the configured admin account and promote its record.
///
/// With the in-memory provider this runs on every start; a creation
/// refusal (duplicate email on a persistent provider) is logged and
/// skipped, not fatal.
pub fn ensure_admin_account(svc: &AccessService, email: &str, password: &str) -> anyhow::Result<()> {
    match svc.provider().create_account(email, password) {
        Ok(identity) => {
            svc.resolve_role(&identity.id)
                .map_err(|e| anyhow::anyhow!("failed to provision admin record: {e}"))?;
            svc.set_role(&identity.id, Role::Admin)
                .map_err(|e| anyhow::anyhow!("failed to promote admin record: {e}"))?;
            info!(%email, "admin account ready");
        }
        Err(e) => {
            warn!(%email, error = %e, "admin account not created");
        }
    }
    Ok(())
}
