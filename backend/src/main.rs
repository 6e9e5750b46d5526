use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use env_logger::Env;
use listings_backend::config::AppConfig;
use listings_backend::store::{ListingStore, PgListingStore};
use listings_backend::{create_router, db, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;
    log::info!("Loaded config: {:?}", config);
    if config.admin_key.is_none() {
        log::warn!("ADMIN_KEY is not set; admin routes will reject every request");
    }

    let pool = db::build_pool(&config)?;
    let store = PgListingStore::new(pool);
    let reachable = store.health_check().await?;
    log::info!("Database test query succeeded: {}", reachable);

    let state = AppState::new(Arc::new(store), config.admin_key.clone());
    let app = create_router(state, config.static_dir.as_deref().map(Path::new));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    log::info!("Starting server on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app.into_make_service()).await?;

    Ok(())
}
