use crate::config::AppState;
use crate::files::{file_response, resolve_stored, Disposition};
use crate::middleware::auth::AuthInfo;
use crate::models::board_model::{Board, BoardAttachment, BoardErr, BoardForm};
use crate::pagination::{ListingParams, Page, PageRequest};
use crate::types::ApiError;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{debug_handler, Extension, Json};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/board",
    params(ListingParams),
    responses(
        (status = 200, description = "One page of posts, newest first", body = Page<Board>),
        (status = 400, description = "Invalid page or amount", body = ApiError)
    ),
    tag = "Board"
)]
#[debug_handler]
/// Lists posts one page at a time
///
/// Handler for `GET /api/board`. A non-blank `keyword` restricts the listing to posts matching it
/// in the fields named by `type`.
pub async fn boards(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<ListingParams>,
) -> Result<Response, BoardErr> {
    let request = PageRequest::try_from(params)?;
    let page = app_state.boards.get_page(&request).await?;
    Ok(Json(page).into_response())
}

#[utoipa::path(
    get,
    path = "/api/board/{no}",
    params(("no" = i64, Path, description = "Post number")),
    responses(
        (status = 200, description = "The post with its attachments", body = Board),
        (status = 404, description = "No post with this number", body = ApiError)
    ),
    tag = "Board"
)]
#[debug_handler]
pub async fn get_board(
    State(app_state): State<Arc<AppState>>,
    Path(no): Path<i64>,
) -> Result<Json<Board>, BoardErr> {
    Ok(Json(app_state.boards.get(no).await?))
}

#[utoipa::path(
    post,
    path = "/api/board",
    request_body(content = BoardForm, description = "Post to create"),
    responses(
        (status = 201, description = "Created post", body = Board),
        (status = 400, description = "Bad request", body = ApiError),
        (status = 401, description = "Not signed in", body = ApiError)
    ),
    tag = "Board"
)]
#[debug_handler]
/// Creates a post written by the signed-in member
pub async fn post_board(
    State(app_state): State<Arc<AppState>>,
    Extension(auth_info): Extension<AuthInfo>,
    Json(form): Json<BoardForm>,
) -> Result<Response, BoardErr> {
    let board = app_state.boards.create(&auth_info.username, form).await?;
    Ok((StatusCode::CREATED, Json(board)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/board/{no}",
    params(("no" = i64, Path, description = "Post number")),
    request_body(content = BoardForm, description = "New title and content"),
    responses(
        (status = 200, description = "Updated post", body = Board),
        (status = 403, description = "Not the writer", body = ApiError),
        (status = 404, description = "No post with this number", body = ApiError)
    ),
    tag = "Board"
)]
#[debug_handler]
pub async fn update_board(
    State(app_state): State<Arc<AppState>>,
    Extension(auth_info): Extension<AuthInfo>,
    Path(no): Path<i64>,
    Json(form): Json<BoardForm>,
) -> Result<Json<Board>, BoardErr> {
    Ok(Json(app_state.boards.update(no, &auth_info.username, form).await?))
}

#[utoipa::path(
    delete,
    path = "/api/board/{no}",
    params(("no" = i64, Path, description = "Post number")),
    responses(
        (status = 200, description = "The deleted post", body = Board),
        (status = 403, description = "Not the writer", body = ApiError),
        (status = 404, description = "No post with this number", body = ApiError)
    ),
    tag = "Board"
)]
#[debug_handler]
pub async fn delete_board(
    State(app_state): State<Arc<AppState>>,
    Extension(auth_info): Extension<AuthInfo>,
    Path(no): Path<i64>,
) -> Result<Json<Board>, BoardErr> {
    Ok(Json(app_state.boards.delete(no, &auth_info.username).await?))
}

#[utoipa::path(
    get,
    path = "/api/board/download/{no}",
    params(("no" = i64, Path, description = "Attachment number")),
    responses(
        (status = 200, description = "The attachment file"),
        (status = 404, description = "No such attachment, or its file is gone", body = ApiError)
    ),
    tag = "Board"
)]
#[debug_handler]
/// Sends an attachment's stored file as a download
pub async fn download(
    State(app_state): State<Arc<AppState>>,
    Path(no): Path<i64>,
) -> Result<Response, BoardErr> {
    let attachment = app_state.boards.get_attachment(no).await?;
    let Some(path) = resolve_stored(&app_state.config.upload_dir, &attachment.path) else {
        tracing::warn!("attachment {} has an unusable path {}", no, attachment.path);
        return Err(BoardErr::AttachmentDoesNotExist(no));
    };

    Ok(file_response(
        &path,
        &attachment.filename,
        &attachment.content_type,
        Disposition::Attachment,
    )
    .await)
}

#[utoipa::path(
    delete,
    path = "/api/board/attachment/{no}",
    params(("no" = i64, Path, description = "Attachment number")),
    responses(
        (status = 200, description = "The deleted attachment", body = BoardAttachment),
        (status = 403, description = "Not the writer of the post", body = ApiError),
        (status = 404, description = "No such attachment", body = ApiError)
    ),
    tag = "Board"
)]
#[debug_handler]
pub async fn delete_attachment(
    State(app_state): State<Arc<AppState>>,
    Extension(auth_info): Extension<AuthInfo>,
    Path(no): Path<i64>,
) -> Result<Json<BoardAttachment>, BoardErr> {
    Ok(Json(
        app_state
            .boards
            .delete_attachment(no, &auth_info.username)
            .await?,
    ))
}
