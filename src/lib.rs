pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod rbac;
pub mod state;
pub mod types;

#[cfg(test)]
pub mod testing;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use state::AppState;

/// Full HTTP surface with global middleware applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .merge(public_routes())
        // Role-checked sheet API
        .merge(sheet_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/ping", get(public::ping))
        .route("/health", get(public::health))
}

fn sheet_routes() -> Router<AppState> {
    use handlers::protected::sheet;

    Router::new()
        // Collection
        .route(
            "/force-character-sheet",
            get(sheet::sheet_list).post(sheet::sheet_insert),
        )
        // Individual sheets
        .route(
            "/force-character-sheet/:id",
            get(sheet::record_get)
                .put(sheet::record_put)
                .delete(sheet::record_delete),
        )
}
