//! `vidgated` — the gated video-catalog server binary.
//!
//! Usage:
//!   vidgated -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/vidgate/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use access::checker::RoleChecker;
use access::provider::{IdentityProvider, MemoryIdentityProvider};
use access::service::AccessConfig;
use access::{AccessModule, model::GateScope};
use catalog::CatalogModule;
use vidgate_core::{AllowAll, Authenticator, GateMode, Module};
use vidgate_kv::{KVStore, RedbStore};

use config::ServerConfig;

/// Gated video-catalog server.
#[derive(Parser, Debug)]
#[command(name = "vidgated", about = "Gated video-catalog server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides default 0.0.0.0:8080).
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;
    let gate_mode = server_config.gate_mode()?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = vidgate_core::ServiceConfig {
        data_dir: Some(data_dir),
        listen: cli.listen.clone(),
        gate_mode,
        ..Default::default()
    };

    let store: Arc<dyn KVStore> = Arc::new(
        RedbStore::open(&core_config.resolve_db_path())
            .map_err(|e| anyhow::anyhow!("failed to open document store: {}", e))?,
    );

    // The identity provider collaborator. In-process for now; a real
    // deployment swaps in an implementation backed by its provider.
    let provider: Arc<dyn IdentityProvider> = Arc::new(MemoryIdentityProvider::new());

    // ── Modules ──

    let access_module = AccessModule::new(
        Arc::clone(&store),
        Arc::clone(&provider),
        AccessConfig { gate_mode },
    );
    info!(mode = ?gate_mode, "Access module initialized");

    // Bootstrap: idempotent seeding against the shared store.
    bootstrap::ensure_default_role(access_module.service())?;
    for (scope, value) in [
        (GateScope::Video, &server_config.gate.video_password),
        (GateScope::Admin, &server_config.gate.admin_password),
    ] {
        if let Some(value) = value {
            bootstrap::seed_gate_password(&store, scope, value)?;
        }
    }
    if let (Some(email), Some(password)) = (
        &server_config.bootstrap.admin_email,
        &server_config.bootstrap.admin_password,
    ) {
        bootstrap::ensure_admin_account(access_module.service(), email, password)?;
    }

    // Role-based deployments gate catalog writes on the caller's role;
    // legacy ones rely on the client-session gate and stay open here.
    let authenticator: Arc<dyn Authenticator> = match gate_mode {
        GateMode::RoleBased => Arc::new(RoleChecker::new(access_module.service().clone())),
        GateMode::Legacy => Arc::new(AllowAll),
    };

    let catalog_module = CatalogModule::new(Arc::clone(&store), authenticator);
    info!("Catalog module initialized");

    let module_routes = vec![
        (access_module.name(), access_module.routes()),
        (catalog_module.name(), catalog_module.routes()),
    ];

    // Build router.
    let app = routes::build_router(module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("vidgated listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
