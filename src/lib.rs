//! Portal list engine.
//!
//! Turns paginated, sortable, multi-condition list requests into result sets,
//! on the client (in-memory evaluation) or on the server (the REST backend in
//! [`api`]), and keeps sticky filter state per navigation scope.

pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod errors;
pub mod models;

use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::Repository;
use engine::{FilterStateStore, QueryCodec};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
    /// Server-side list defaults, taken from `config`.
    pub codec: QueryCodec,
    pub filter_state: Arc<RwLock<FilterStateStore>>,
}

impl AppState {
    pub fn new(repo: Repository, config: Config) -> Self {
        Self {
            repo: Arc::new(repo),
            codec: QueryCodec::from_config(&config),
            config: Arc::new(config),
            filter_state: Arc::new(RwLock::new(FilterStateStore::new())),
        }
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Tables
        .route("/tables", get(api::list_tables))
        .route(
            "/tables/{table}/rows",
            get(api::list_rows).post(api::insert_rows),
        )
        .route("/tables/{table}/rows/{id}", delete(api::delete_row))
        // Filter state
        .route(
            "/filter-state/{scope}",
            get(api::get_filter_state)
                .put(api::update_filter_state)
                .delete(api::clear_filter_state),
        );

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
