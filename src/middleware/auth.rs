use crate::models::auth_model::Backend;
use crate::models::member_model::Member;
use crate::types::{ApiError, ApiStatusCode};
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_login::AuthSession;
use axum_macros::debug_handler;

pub type AuthSessionLayer = AuthSession<Backend>;

/// The signed-in member, placed in the request extensions by `auth_middleware`
#[derive(Clone, Debug)]
pub struct AuthInfo {
    pub username: String,
}

#[derive(Debug, thiserror::Error)]
#[error("Authentication required")]
pub struct AuthRequired;

/// 401 with the usual `ApiError` body
pub fn unauthorized() -> Response {
    ApiError::response(ApiStatusCode::from(StatusCode::UNAUTHORIZED), &AuthRequired)
}

/// Rejects anonymous requests with 401 and hands the member on to the handler as `AuthInfo`
pub async fn auth_middleware(auth_session: AuthSessionLayer, mut req: Request, next: Next) -> Response {
    let Some(member) = auth_session.user else {
        return unauthorized();
    };

    req.extensions_mut().insert(AuthInfo {
        username: member.username,
    });

    next.run(req).await
}

#[utoipa::path(
    get,
    path = "/api/auth/current_user",
    responses(
        (status = 200, description = "The signed-in member", body = Member),
        (status = 401, description = "Not signed in", body = ApiError)
    ),
    tag = "Auth"
)]
#[debug_handler]
pub async fn current_user_handler(auth_session: AuthSessionLayer) -> Response {
    match auth_session.user {
        Some(member) => (StatusCode::OK, Json(member)).into_response(),
        None => unauthorized(),
    }
}
