//! # Download Handler
//!
//! Serves conversion artifacts from the results directory as attachments.

use super::{AppError, AppState};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
};
use talend2dbt::input::secure_filename;
use tracing::info;

/// The handler for `GET /download/{filename}`.
///
/// Only plain file names are accepted; anything that would change under
/// sanitizing (path separators, `..`, control characters) is rejected.
pub async fn download_handler(
    State(app_state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<(StatusCode, HeaderMap, Vec<u8>), AppError> {
    if filename.is_empty() || secure_filename(&filename) != filename {
        return Err(AppError::BadRequest(format!(
            "Invalid file name '{filename}'"
        )));
    }

    let path = app_state.results_dir().join(&filename);
    if !tokio::fs::metadata(&path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
    {
        return Err(AppError::NotFound("File not found".to_string()));
    }
    let data = tokio::fs::read(&path).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&filename)),
    );
    let disposition = format!("attachment; filename=\"{filename}\"");
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    info!(file = %filename, size = data.len(), "Serving download");
    Ok((StatusCode::OK, headers, data))
}

fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit('.').next() {
        Some("zip") => "application/zip",
        Some("sql") | Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
