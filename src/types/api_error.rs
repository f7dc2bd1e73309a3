use crate::types::ApiStatusCode;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{ser::SerializeStruct, Serialize, Serializer};
use std::error::Error;
use utoipa::ToSchema;

/// Struct representing an error returned to an API caller.
///
/// # Fields
/// - `status` - The HTTP status code associated with the error
/// - `error` - A string describing the specific error that occurred
#[derive(Debug, ToSchema)]
pub struct ApiError {
    pub status: ApiStatusCode,
    pub error: String,
}

/// Serializes an `ApiError` as `{"status": "<code>", "error": "<message>"}`
impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let status: String = self.status.to_string();
        let mut state = serializer.serialize_struct("ApiError", 2)?;
        state.serialize_field("status", &status)?;
        state.serialize_field("error", &self.error)?;
        state.end()
    }
}

impl ApiError {
    /// Creates a `Response` from a status and the error that caused it.
    ///
    /// Server-side failures are logged here so handlers don't have to; the caller only sees the
    /// error's display text.
    pub fn response(status: ApiStatusCode, error: &dyn Error) -> Response {
        if status.is_server_error() {
            tracing::error!("{}", error);
        } else {
            tracing::debug!("{}: {}", status, error);
        }

        let body = ApiError {
            status,
            error: error.to_string(),
        };

        (StatusCode::from(status), Json(body)).into_response()
    }
}
