use crate::middleware::auth::{unauthorized, AuthInfo, AuthSessionLayer};
use crate::models::member_model::Member;
use crate::types::ApiError;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use axum_macros::debug_handler;

#[utoipa::path(
    get,
    path = "/api/security/all",
    responses((status = 200, description = "Anyone may call this", body = String)),
    tag = "Security"
)]
#[debug_handler]
pub async fn all() -> &'static str {
    tracing::info!("do all can access everybody");
    "All can access everybody"
}

#[utoipa::path(
    get,
    path = "/api/security/member",
    responses(
        (status = 200, description = "The caller's username", body = String),
        (status = 401, description = "Not signed in", body = ApiError)
    ),
    tag = "Security"
)]
#[debug_handler]
pub async fn member(Extension(auth_info): Extension<AuthInfo>) -> String {
    tracing::info!("username = {}", auth_info.username);
    auth_info.username
}

#[utoipa::path(
    get,
    path = "/api/security/admin",
    responses(
        (status = 200, description = "The signed-in admin", body = Member),
        (status = 401, description = "Not signed in", body = ApiError),
        (status = 403, description = "Missing ROLE_ADMIN")
    ),
    tag = "Security"
)]
#[debug_handler]
pub async fn admin(auth_session: AuthSessionLayer) -> Response {
    match auth_session.user {
        Some(member) => {
            tracing::info!("admin = {:?}", member);
            Json(member).into_response()
        }
        None => unauthorized(),
    }
}
