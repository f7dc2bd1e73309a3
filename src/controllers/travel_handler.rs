use crate::config::AppState;
use crate::files::{content_type_for, file_response, resolve_stored, Disposition};
use crate::models::travel_model::{Travel, TravelErr};
use crate::pagination::{ListingParams, Page, PageRequest};
use crate::types::ApiError;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use axum_macros::debug_handler;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/travel",
    params(ListingParams),
    responses(
        (status = 200, description = "One page of travel entries", body = Page<Travel>),
        (status = 400, description = "Invalid page or amount", body = ApiError)
    ),
    tag = "Travel"
)]
#[debug_handler]
/// Lists travel entries one page at a time, in entry number order
pub async fn travels(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<ListingParams>,
) -> Result<Json<Page<Travel>>, TravelErr> {
    let request = PageRequest::try_from(params)?;
    Ok(Json(app_state.travels.get_page(&request).await?))
}

#[utoipa::path(
    get,
    path = "/api/travel/{no}",
    params(("no" = i64, Path, description = "Travel entry number")),
    responses(
        (status = 200, description = "The entry with its images", body = Travel),
        (status = 404, description = "No entry with this number", body = ApiError)
    ),
    tag = "Travel"
)]
#[debug_handler]
pub async fn get_travel(
    State(app_state): State<Arc<AppState>>,
    Path(no): Path<i64>,
) -> Result<Json<Travel>, TravelErr> {
    Ok(Json(app_state.travels.get(no).await?))
}

#[utoipa::path(
    get,
    path = "/api/travel/image/{no}",
    params(("no" = i64, Path, description = "Image number")),
    responses(
        (status = 200, description = "The image file"),
        (status = 404, description = "No such image, or its file is gone", body = ApiError)
    ),
    tag = "Travel"
)]
#[debug_handler]
pub async fn image(
    State(app_state): State<Arc<AppState>>,
    Path(no): Path<i64>,
) -> Result<Response, TravelErr> {
    let image = app_state.travels.get_image(no).await?;
    let path = resolve_stored(&app_state.config.upload_dir, &image.path)
        .ok_or(TravelErr::ImageDoesNotExist(no))?;

    Ok(file_response(&path, &image.filename, content_type_for(&path), Disposition::Inline).await)
}
