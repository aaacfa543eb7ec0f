use axum::{
    Extension,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use tokio::fs;
use tracing::{info, warn};

use parley_types::api::{ApiResponse, Claims, UploadData};

use crate::auth::AppState;
use crate::response::{envelope, failure};

/// Store the raw request body under the configured upload directory.
/// No chunking, retention or download surface; this mirrors the original
/// write-and-forget upload.
pub async fn upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Extension(claims): Extension<Claims>,
    body: Bytes,
) -> Result<Response, StatusCode> {
    if !is_safe_filename(&filename) {
        warn!(
            "{} ({}) rejected upload filename: {:?}",
            claims.username, claims.sub, filename
        );
        return Ok(failure(StatusCode::BAD_REQUEST, "Invalid filename"));
    }

    fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let dest = state.upload_dir.join(&filename);
    let size = body.len() as u64;
    fs::write(&dest, &body)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    info!(
        "{} ({}) uploaded {} ({} bytes)",
        claims.username, claims.sub, filename, size
    );

    Ok(envelope(
        StatusCode::OK,
        ApiResponse::ok("File uploaded successfully", UploadData { filename, size }),
    ))
}

/// A single path component: no separators, no parent traversal, non-empty.
fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_traversal_and_separators() {
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename(".."));
        assert!(!is_safe_filename("../etc/passwd"));
        assert!(!is_safe_filename("a/b"));
        assert!(!is_safe_filename("a\\b"));
    }

    #[test]
    fn accepts_plain_names() {
        assert!(is_safe_filename("report.pdf"));
        assert!(is_safe_filename("photo (1).png"));
        assert!(is_safe_filename(".hidden"));
    }
}
