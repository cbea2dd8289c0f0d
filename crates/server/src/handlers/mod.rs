//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for the `talend2dbt-server`.

// Sub-modules for different handler categories.
pub mod convert;
pub mod download;
pub mod general;

// Re-export all handlers from the sub-modules to make them easily accessible
// to the router under a single `handlers::` path.
pub use convert::*;
pub use download::*;
pub use general::*;

// Shared items used by multiple handler modules.
use super::{
    errors::AppError,
    state::AppState,
    types::{ApiResponse, DebugParams},
};
use axum::{extract::Query, http::HeaderMap, Json};
use serde_json::Value;

/// A shared helper function to wrap a successful result in the standard `ApiResponse`
/// format, optionally including debug information if requested.
pub(crate) fn wrap_response<T>(
    result: T,
    debug_params: Query<DebugParams>,
    debug_info: Option<Value>,
) -> Json<ApiResponse<T>> {
    let debug = if debug_params.debug.unwrap_or(false) {
        debug_info
    } else {
        None
    };
    Json(ApiResponse { debug, result })
}

/// The absolute `/download/{file_name}` URL as seen by the caller.
///
/// Falls back to a relative URL when the request carries no `Host` header.
pub(crate) fn download_url(headers: &HeaderMap, file_name: &str) -> String {
    match headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
    {
        Some(host) => format!("http://{host}/download/{file_name}"),
        None => format!("/download/{file_name}"),
    }
}
