//! # General Route Handlers
//!
//! The upload page and the health check.

use super::{AppError, AppState};
use axum::{extract::State, response::Html};
use tracing::debug;

/// The file served at `/`, looked up in the configured static directory.
pub const INDEX_PAGE: &str = "talendtodbt.html";

/// The handler for the root (`/`) endpoint, serving the upload page.
pub async fn root(State(app_state): State<AppState>) -> Result<Html<String>, AppError> {
    let page_path = app_state.static_dir().join(INDEX_PAGE);
    debug!(path = %page_path.display(), "Serving upload page");

    match tokio::fs::read_to_string(&page_path).await {
        Ok(page) => Ok(Html(page)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::NotFound(format!("{INDEX_PAGE} not found")))
        }
        Err(e) => Err(e.into()),
    }
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}
