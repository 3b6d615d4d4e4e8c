//! Route definitions.

use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/config", get(handlers::config))
        .route("/healthz", get(handlers::healthz))
        .route("/querystudent", get(handlers::query_student))
        .route("/querystudentByXml", get(handlers::list_students))
        .route("/student", post(handlers::add_student))
        .route(
            "/student/{sno}",
            put(handlers::update_student).delete(handlers::delete_student),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
