use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sheet_crud::config::{AppConfig, StorageBackend};
use sheet_crud::database::{CharacterStore, DatabaseManager, InMemoryCharacterStore, PgCharacterStore};
use sheet_crud::rbac::RoleClient;
use sheet_crud::{app, AppState};

#[derive(Debug, Parser)]
#[command(name = "sheet-crud", version, about = "Character sheet CRUD service")]
struct Cli {
    /// Listen port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Log verbosity (overrides LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_TOKEN_DECODER, etc.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.tracing_level().to_string()))
        .init();
    info!("Starting sheet-crud {}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config).await?;
    let rbac = Arc::new(RoleClient::new(&config.rbac).context("invalid JWT_TOKEN_DECODER url")?);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(store, rbac);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await.context("server")?;
    Ok(())
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn CharacterStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory character store");
            Ok(Arc::new(InMemoryCharacterStore::new()))
        }
        StorageBackend::Postgres => {
            let pool = DatabaseManager::connect_with_retry(&config.storage)
                .await
                .context("Failed to initialize database client")?;
            let store = PgCharacterStore::new(pool, &config.storage)?;
            store.ensure_collection().await?;
            info!(
                "Using collection {} in {} (archive {})",
                config.storage.collection,
                store.database_name(),
                store.archive_name()
            );
            Ok(Arc::new(store))
        }
    }
}
