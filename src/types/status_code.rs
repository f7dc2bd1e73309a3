use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use utoipa::ToSchema;

/// HTTP status carried inside error bodies
///
/// Stored as the raw `u16` so the value serializes and shows up in the OpenAPI schema as a
/// plain number, while still converting back to an `axum` `StatusCode` when a response is built.
#[derive(Debug, ToSchema, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatusCode(pub u16);

impl ApiStatusCode {
    pub fn new(status: StatusCode) -> Self {
        Self(status.as_u16())
    }

    pub fn as_status_code(self) -> StatusCode {
        StatusCode::from_u16(self.0).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn is_server_error(self) -> bool {
        self.as_status_code().is_server_error()
    }
}

impl From<StatusCode> for ApiStatusCode {
    fn from(status: StatusCode) -> Self {
        Self::new(status)
    }
}

impl From<ApiStatusCode> for StatusCode {
    fn from(status: ApiStatusCode) -> Self {
        status.as_status_code()
    }
}

impl Display for ApiStatusCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_code_falls_back_to_internal_error() {
        assert_eq!(ApiStatusCode(42).as_status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiStatusCode::from(StatusCode::NOT_FOUND).to_string(), "404");
    }
}
