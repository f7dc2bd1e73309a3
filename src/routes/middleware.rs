use crate::config::{AppState, Profile};
use crate::models::auth_model::Backend;
use axum::Router;
use axum_login::AuthManagerLayerBuilder;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace,
};
use tower_sessions::{cookie::time::Duration, Expiry, MemoryStore, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

/// Configures middleware for the application
///
/// Adds compression, CORS, HTTP tracing and the session/auth layers. Sessions are kept in
/// Postgres when the application has a database and in memory otherwise; the session cookie is
/// `Secure` only for the `prod` profile.
///
/// # Errors
/// Fails when the Postgres session table can't be created.
pub async fn configure_middleware(app: Router, app_state: &AppState) -> Result<Router, sqlx::Error> {
    let secure = app_state.config.profile == Profile::Prod;
    let backend = app_state.auth_backend.clone();

    let app = match &app_state.db_pool {
        Some(db_pool) => {
            let session_store = PostgresStore::new(db_pool.clone());
            session_store.migrate().await?;
            with_auth(app, backend, session_store, secure)
        }
        None => with_auth(app, backend, MemoryStore::default(), secure),
    };

    Ok(app
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .layer(
            ServiceBuilder::new().layer(
                trace::TraceLayer::new_for_http()
                    .make_span_with(trace::DefaultMakeSpan::new())
                    .on_response(trace::DefaultOnResponse::new()),
            ),
        ))
}

fn with_auth<S>(app: Router, backend: Backend, session_store: S, secure: bool) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)));
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    app.layer(auth_layer)
}
