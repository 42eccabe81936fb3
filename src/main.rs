//! Portal list backend.
//!
//! Serves filtered, sorted, paginated pages of generic tables stored in SQLite.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portal_lists::config::Config;
use portal_lists::db::{self, Repository};
use portal_lists::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting portal list backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!(
        "List defaults: page size {}, retry page size {}, sort {} {}",
        config.default_page_size,
        config.retry_page_size,
        config.default_sort_column,
        config.default_sort_direction.as_str()
    );

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Repository::new(pool);

    let tables = repo.list_tables().await?;
    tracing::info!("Row store holds {} tables", tables.len());

    let state = AppState::new(repo, config.clone());

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
