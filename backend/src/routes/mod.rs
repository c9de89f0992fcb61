//! Route definitions for the FIFO allocation server

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/allocations", allocation_routes())
}

/// Allocation routes: upload two tables, get the FIFO results back
fn allocation_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::run_allocation))
        .route("/preview", post(handlers::preview_allocation))
        .route("/export/:output", post(handlers::export_allocation))
}
