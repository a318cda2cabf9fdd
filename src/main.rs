use crudgate::store::SqliteStore;
use crudgate::{AppState, Config, create_router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Inizializza il logging, RUST_LOG sovrascrive il livello di default
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Carica la configurazione
    let config = Config::from_env()?;
    config.print_info();

    // Apre il pool e crea lo schema se manca
    let store = SqliteStore::connect(&config.database_url, config.max_connections).await?;
    store.migrate().await?;

    let state = Arc::new(AppState::new(store));
    let app = create_router(state);

    let listener = TcpListener::bind(config.address()).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
