use crate::config::AppState;
use crate::files::{content_type_for, file_response, Disposition};
use crate::middleware::auth::AuthInfo;
use crate::models::member_model::{
    ChangePasswordRequest, Member, MemberErr, MemberJoinRequest, MemberUpdateRequest,
};
use crate::types::ApiError;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use axum_macros::debug_handler;
use serde_json::json;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/member/checkusername/{username}",
    params(("username" = String, Path, description = "Username to check")),
    responses(
        (status = 200, description = "true when the username is already taken", body = bool)
    ),
    tag = "Member"
)]
#[debug_handler]
pub async fn check_username(
    State(app_state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<bool>, MemberErr> {
    Ok(Json(app_state.members.check_duplicate(&username).await?))
}

#[utoipa::path(
    post,
    path = "/api/member",
    request_body(content = MemberJoinRequest, description = "New account"),
    responses(
        (status = 201, description = "Account created", body = Member),
        (status = 400, description = "Invalid username or password", body = ApiError),
        (status = 409, description = "Username taken", body = ApiError)
    ),
    tag = "Member"
)]
#[debug_handler]
/// Registers a new member
///
/// Handler for `POST /api/member`. The new account gets the `ROLE_MEMBER` role.
pub async fn join(
    State(app_state): State<Arc<AppState>>,
    Json(form): Json<MemberJoinRequest>,
) -> Result<Response, MemberErr> {
    let member = app_state.members.join(form).await?;
    Ok((StatusCode::CREATED, Json(member)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/member/{username}/avatar",
    params(("username" = String, Path, description = "Member username")),
    responses(
        (status = 200, description = "The avatar image, or the placeholder when there is none"),
        (status = 404, description = "Neither avatar nor placeholder image exist")
    ),
    tag = "Member"
)]
#[debug_handler]
pub async fn avatar(
    State(app_state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Response {
    let path = app_state.members.avatar_path(&username).await;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("avatar.png")
        .to_string();

    file_response(&path, &filename, content_type_for(&path), Disposition::Inline).await
}

#[utoipa::path(
    put,
    path = "/api/member/{username}",
    params(("username" = String, Path, description = "Member username")),
    request_body(content = MemberUpdateRequest, description = "New email, confirmed with the current password"),
    responses(
        (status = 200, description = "Updated member", body = Member),
        (status = 400, description = "Password does not match", body = ApiError),
        (status = 403, description = "Not your account", body = ApiError),
        (status = 404, description = "No such member", body = ApiError)
    ),
    tag = "Member"
)]
#[debug_handler]
pub async fn update_member(
    State(app_state): State<Arc<AppState>>,
    Extension(auth_info): Extension<AuthInfo>,
    Path(username): Path<String>,
    Json(form): Json<MemberUpdateRequest>,
) -> Result<Json<Member>, MemberErr> {
    let member = app_state
        .members
        .update(&username, &auth_info.username, form)
        .await?;
    Ok(Json(member))
}

#[utoipa::path(
    put,
    path = "/api/member/{username}/changepassword",
    params(("username" = String, Path, description = "Member username")),
    request_body(content = ChangePasswordRequest, description = "Old and new password"),
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Old password does not match", body = ApiError),
        (status = 403, description = "Not your account", body = ApiError)
    ),
    tag = "Member"
)]
#[debug_handler]
/// Changes a member's password
///
/// Sessions created with the old password stop validating once the hash changes.
pub async fn change_password(
    State(app_state): State<Arc<AppState>>,
    Extension(auth_info): Extension<AuthInfo>,
    Path(username): Path<String>,
    Json(form): Json<ChangePasswordRequest>,
) -> Result<Response, MemberErr> {
    app_state
        .members
        .change_password(&username, &auth_info.username, form)
        .await?;
    Ok(Json(json!({ "success": true })).into_response())
}
