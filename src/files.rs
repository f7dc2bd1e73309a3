use crate::types::{ApiError, ApiStatusCode};
use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::path::{Component, Path, PathBuf};

/// Failures while reading a stored file
#[derive(Debug, thiserror::Error)]
pub enum FileErr {
    #[error("File {0} doesn't exist")]
    Missing(String),
    #[error("Reading {0} failed: {1}")]
    Read(String, std::io::Error),
}

impl FileErr {
    pub fn status(&self) -> StatusCode {
        match self {
            FileErr::Missing(_) => StatusCode::NOT_FOUND,
            FileErr::Read(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FileErr {
    fn into_response(self) -> Response {
        ApiError::response(ApiStatusCode::from(self.status()), &self)
    }
}

/// How a stored file is handed to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

/// Content type guessed from the file extension, for files stored without one
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("txt") => "text/plain; charset=utf-8",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Joins a stored relative path onto the upload root.
///
/// Returns `None` for absolute paths or paths that climb out of `root`.
pub fn resolve_stored(root: &Path, stored: &str) -> Option<PathBuf> {
    let relative = Path::new(stored);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }
    Some(root.join(relative))
}

/// Reads a stored file and returns it as a response body.
///
/// A missing file is a 404 and any other read failure a 500, both with an `ApiError` body.
/// Only the client-facing `filename` appears in the body.
pub async fn file_response(
    path: &Path,
    filename: &str,
    content_type: &str,
    disposition: Disposition,
) -> Response {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("file {} not found", path.display());
            return FileErr::Missing(filename.to_string()).into_response();
        }
        Err(e) => {
            tracing::error!("reading {} failed: {}", path.display(), e);
            return FileErr::Read(filename.to_string(), e).into_response();
        }
    };

    let disposition = match disposition {
        Disposition::Inline => "inline".to_string(),
        Disposition::Attachment => {
            format!("attachment; filename=\"{}\"", filename.replace(['"', '\\'], "_"))
        }
    };

    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(bytes),
    )
        .into_response()
}
