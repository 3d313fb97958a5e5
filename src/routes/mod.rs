use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

pub mod movies;
pub mod state;

pub use state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Creates the application router with all routes and layers
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/movies", movie_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// Routes under /api/movies
fn movie_routes() -> Router<AppState> {
    Router::new()
        .route("/watched", get(movies::watched))
        .route("/recommendations", get(movies::recommendations))
        .route("/predictions", get(movies::predictions))
        .route("/stats", get(movies::stats))
        .route("/categories", get(movies::categories))
        .route("/by-category/:category", get(movies::by_category))
        .route("/rate", post(movies::rate))
        .route("/import", post(movies::import))
        .route("/related", get(movies::related))
        .route("/discover", get(movies::discover))
        .route("/roulette/:mood", get(movies::roulette))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Horror movie recommendation API is running", "version": VERSION }))
}

/// Health check endpoint
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy", "version": VERSION }))
}
