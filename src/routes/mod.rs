pub mod api_routes;
pub mod docs_routes;
pub mod middleware;

use crate::config::AppState;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::sync::Arc;

async fn handler_404() -> Response {
    (StatusCode::NOT_FOUND, "404 Not Found").into_response()
}

/// Builds the complete application: API under `/api`, the docs, and every middleware layer.
///
/// # Errors
/// Fails when the session store can't be prepared.
pub async fn build_app(app_state: Arc<AppState>) -> Result<Router, sqlx::Error> {
    let app = Router::new()
        .nest("/api", api_routes::get_routes())
        .merge(docs_routes::get_routes())
        .fallback(handler_404)
        .with_state(app_state.clone());

    middleware::configure_middleware(app, &app_state).await
}
