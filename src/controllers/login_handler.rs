use crate::middleware::auth::AuthSessionLayer;
use crate::models::auth_model::{Credentials, LoginRequest, LoginResponse};
use crate::types::ApiError;
use axum::response::IntoResponse;
use axum::{http::StatusCode, Json};
use axum_macros::debug_handler;

fn reply(status: StatusCode, success: bool, message: &str) -> (StatusCode, Json<LoginResponse>) {
    (
        status,
        Json(LoginResponse {
            success,
            message: message.to_string(),
        }),
    )
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body(content = LoginRequest, description = "Username and password"),
    responses(
        (status = 200, description = "Signed in; the session cookie is set", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = LoginResponse)
    ),
    tag = "Auth"
)]
#[debug_handler]
pub async fn login_handler(
    mut auth_session: AuthSessionLayer,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    tracing::trace!("Logging in {}", request.username);
    let creds = Credentials::from(request);

    let member = match auth_session.authenticate(creds).await {
        Ok(Some(member)) => member,
        Ok(None) => return reply(StatusCode::UNAUTHORIZED, false, "Invalid credentials"),
        Err(e) => {
            tracing::error!("authentication failed: {}", e);
            return reply(StatusCode::INTERNAL_SERVER_ERROR, false, "Internal server error");
        }
    };

    if let Err(e) = auth_session.login(&member).await {
        tracing::error!("failed to create session for {}: {}", member.username, e);
        return reply(StatusCode::INTERNAL_SERVER_ERROR, false, "Failed to create session");
    }

    tracing::info!("{} signed in", member.username);
    reply(StatusCode::OK, true, "Login successful")
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Signed out", body = LoginResponse),
        (status = 401, description = "Not signed in", body = ApiError)
    ),
    tag = "Auth"
)]
#[debug_handler]
pub async fn logout_handler(mut auth_session: AuthSessionLayer) -> impl IntoResponse {
    match auth_session.logout().await {
        Ok(_) => reply(StatusCode::OK, true, "Logout successful"),
        Err(e) => {
            tracing::error!("logout failed: {}", e);
            reply(StatusCode::INTERNAL_SERVER_ERROR, false, "Failed to logout")
        }
    }
}
