//! HTTP API Route Definitions
//!
//! Defines the REST API routes for vectord.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, AppState};

/// Create the API router with all routes
pub fn create_router(app_state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        // Index lifecycle
        .route("/index", get(handlers::list_indexes))
        .route(
            "/index/:name",
            post(handlers::create_index)
                .get(handlers::index_info)
                .delete(handlers::destroy_index),
        )
        .route("/index/:name/stats", get(handlers::index_stats))
        // Vector operations
        .route("/vector/:name", post(handlers::insert_vector))
        .route("/vector/:name/search", get(handlers::search_vector))
        .route(
            "/vector/:name/:id",
            get(handlers::contains_vector).delete(handlers::delete_vector),
        )
        // Applies to the routes above, so it stays last
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(app_state);

    Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
}
