//! Axum router configuration with middleware.
//!
//! All gateway routes are under `/api/`.
//! Middleware: CORS, tracing, request body limit.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Pods
        .route("/pods", get(handlers::pod::list_pods))
        // Expenses
        .route("/expenses/create", post(handlers::expense::create_expense))
        .route("/expenses/get", get(handlers::expense::get_expense))
        .route("/expenses/update", put(handlers::expense::update_expense))
        .route("/expenses/delete", delete(handlers::expense::delete_expense))
        .route(
            "/expenses/receipts/add",
            put(handlers::expense::add_receipt_to_expense),
        )
        // Raw resources
        .route(
            "/resource/get",
            get(handlers::resource::get_resource_as_turtle),
        )
        .route(
            "/resource/nonRDF/add",
            put(handlers::resource::add_non_rdf_file),
        )
        .layer(DefaultBodyLimit::max(state.upload_limit));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness check. Does not contact the pod.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
