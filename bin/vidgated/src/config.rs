//! Server configuration, loaded from a TOML file.
//!
//! ```toml
//! [storage]
//! data_dir = "/var/lib/vidgate"
//!
//! [gate]
//! mode = "role"            # or "legacy"
//! video_password = "1234"  # seeded once, legacy mode
//! admin_password = "4321"
//!
//! [bootstrap]
//! admin_email = "admin@example.com"
//! admin_password = "change-me"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use vidgate_core::GateMode;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,

    #[serde(default)]
    pub gate: GateConfig,

    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding all persistent state.
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Gating strategy: `role` (default) or `legacy`.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Legacy-mode gate passwords, seeded on first start only.
    #[serde(default)]
    pub video_password: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            video_password: None,
            admin_password: None,
        }
    }
}

fn default_mode() -> String {
    "role".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootstrapConfig {
    /// Admin account created at startup (in-memory provider only).
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

impl ServerConfig {
    /// Resolve a context name to a config path. A bare name resolves to
    /// `/etc/vidgate/<name>.toml`; anything with a `/` or `.` is used as
    /// a path directly.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/vidgate/{name_or_path}.toml"))
        }
    }

    /// Load and parse the config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("cannot parse {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Parsed gate mode.
    pub fn gate_mode(&self) -> anyhow::Result<GateMode> {
        self.gate
            .mode
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/vidgate/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
    }

    #[test]
    fn test_parse_minimal() {
        let config: ServerConfig = toml::from_str(
            r#"
            [storage]
            data_dir = "/tmp/vidgate"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.data_dir, "/tmp/vidgate");
        assert_eq!(config.gate_mode().unwrap(), GateMode::RoleBased);
        assert!(config.bootstrap.admin_email.is_none());
    }

    #[test]
    fn test_parse_legacy_gate() {
        let config: ServerConfig = toml::from_str(
            r#"
            [storage]
            data_dir = "/tmp/vidgate"

            [gate]
            mode = "legacy"
            video_password = "1234"
            "#,
        )
        .unwrap();
        assert_eq!(config.gate_mode().unwrap(), GateMode::Legacy);
        assert_eq!(config.gate.video_password.as_deref(), Some("1234"));
    }
}
