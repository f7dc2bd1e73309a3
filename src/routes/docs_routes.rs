use crate::api_docs::ApiDoc;
use crate::config::AppState;
use axum::Router;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

/// Creates a new router with the documentation routes
///
/// - Swagger UI is served at `/swagger-ui`
/// - `ReDoc` is served at `/redoc`
/// - `RapiDoc` is served at `/rapidoc`
///
/// All three read the same document, published at `/api-docs/openapi.json`.
pub fn get_routes() -> Router<Arc<AppState>> {
    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi());
    let redoc = Redoc::with_url("/redoc", ApiDoc::openapi());
    let rapidoc = RapiDoc::new("/api-docs/openapi.json").path("/rapidoc");

    Router::new().merge(swagger_ui).merge(redoc).merge(rapidoc)
}
