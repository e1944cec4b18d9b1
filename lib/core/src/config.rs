use std::path::PathBuf;
use std::str::FromStr;

/// Which gating strategy protects the catalog and the admin console.
///
/// Both strategies sit behind the same authorizer interface; a deployment
/// picks one. `Legacy` is the shared-password session gate kept for
/// deployments that predate account-based roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateMode {
    #[default]
    RoleBased,
    Legacy,
}

impl FromStr for GateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "role" | "role-based" => Ok(GateMode::RoleBased),
            "legacy" | "password" => Ok(GateMode::Legacy),
            other => Err(format!("unknown gate mode: {other}")),
        }
    }
}

/// Common service configuration shared by the server binary and tests.
///
/// The binary fills this from its TOML config and command-line arguments,
/// then passes it to storage initialization.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding all persistent state.
    pub data_dir: Option<PathBuf>,

    /// Path to the redb database file.
    /// Defaults to `{data_dir}/data.redb` if not specified.
    pub db_path: Option<PathBuf>,

    /// Listen address for the HTTP server.
    pub listen: String,

    /// Gating strategy for protected areas.
    pub gate_mode: GateMode,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            db_path: None,
            listen: "0.0.0.0:8080".to_string(),
            gate_mode: GateMode::default(),
        }
    }
}

impl ServiceConfig {
    /// Resolve the redb database path, falling back to `{data_dir}/data.redb`.
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| {
            self.data_dir
                .as_ref()
                .map(|d| d.join("data.redb"))
                .unwrap_or_else(|| PathBuf::from("data.redb"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_mode_parse() {
        assert_eq!("role".parse::<GateMode>().unwrap(), GateMode::RoleBased);
        assert_eq!("legacy".parse::<GateMode>().unwrap(), GateMode::Legacy);
        assert!("both".parse::<GateMode>().is_err());
    }

    #[test]
    fn test_resolve_db_path() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            ..Default::default()
        };
        assert_eq!(config.resolve_db_path(), PathBuf::from("/data/data.redb"));

        let explicit = ServiceConfig {
            db_path: Some(PathBuf::from("/elsewhere/gate.redb")),
            ..Default::default()
        };
        assert_eq!(explicit.resolve_db_path(), PathBuf::from("/elsewhere/gate.redb"));
    }
}
