use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursefinder::api::router;
use coursefinder::catalog::{
    CatalogConfig, CatalogSource, HttpCatalogSource, NormalizeOptions, StaticCatalogSource,
};
use coursefinder::db::SqliteBookmarkStore;
use coursefinder::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "coursefinder=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://coursefinder.db".to_string());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let catalog: Arc<dyn CatalogSource> = match std::env::var("CATALOG_URL") {
        Ok(_) => {
            let config = CatalogConfig::new_from_env()?;
            info!("using catalog source at {}", config.catalog_url);
            Arc::new(HttpCatalogSource::new(config)?)
        }
        Err(_) => {
            info!("CATALOG_URL not set, using bundled seed catalog");
            Arc::new(StaticCatalogSource::seeded())
        }
    };

    let state = AppState {
        db: pool.clone(),
        bookmarks: Arc::new(SqliteBookmarkStore::new(pool)),
        catalog,
        normalize: NormalizeOptions::new_from_env(),
    };

    let app = router(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(5000);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
