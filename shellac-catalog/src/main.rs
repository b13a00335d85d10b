//! shellac-catalog: audio library catalog service
//!
//! Loads configuration, opens the catalog database, runs one library
//! synchronization pass, then serves the read API.

use anyhow::Result;
use std::path::Path;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use shellac_catalog::services::art_store::ArtStore;
use shellac_catalog::services::library_sync::LibrarySync;
use shellac_catalog::services::metadata::LoftyTagReader;
use shellac_catalog::AppState;
use shellac_common::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "shellac.toml".to_string());

    let config = Config::load(Path::new(&config_path))?;

    let level = config.logging.level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting shellac-catalog");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Config: {}", config_path);
    info!("Library root: {}", config.library_root.display());
    info!("Database: {}", config.database_path.display());

    let pool = shellac_common::db::init_database(&config.database_path).await?;

    let sync = LibrarySync::new(
        pool.clone(),
        LoftyTagReader::new(),
        ArtStore::new(config.storage_root.clone()),
    );
    let processed = sync.synchronize(&config.library_root).await?;
    info!("Synchronization pass processed {} files", processed);

    let state = AppState::new(pool);
    let app = shellac_catalog::build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Song catalog: http://{}/songs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
