use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::multipart::MultipartError;
use serde_json::json;
use talend2dbt::{ConversionError, ExtractionError};
use tracing::{error, warn};

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
pub enum AppError {
    /// Errors originating from the `talend2dbt` pipeline.
    Conversion(ConversionError),
    /// The uploaded job could not be summarized.
    Extraction {
        job_id: String,
        source: ExtractionError,
    },
    /// The multipart body could not be read.
    Multipart(MultipartError),
    BadRequest(String),
    NotFound(String),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

/// Conversion from `ConversionError` to `AppError`.
impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        AppError::Conversion(err)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Multipart(err)
    }
}

/// Conversion from `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Conversion(err) => {
                // Log the original error for debugging purposes
                error!("ConversionError: {:?}", err);
                match err {
                    ConversionError::MissingAiProvider(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server is not configured correctly.".to_string(),
                    ),
                    ConversionError::AiRequest(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Request to AI provider failed: {e}"),
                    ),
                    ConversionError::AiDeserialization(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Failed to deserialize AI provider response: {e}"),
                    ),
                    ConversionError::AiApi(e) => {
                        (StatusCode::BAD_GATEWAY, format!("AI provider error: {e}"))
                    }
                    ConversionError::EmptyCompletion(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("AI provider returned no content: {e}"),
                    ),
                    ConversionError::Extraction(e) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                    }
                    ConversionError::ReqwestClientBuild(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to build HTTP client: {e}"),
                    ),
                    other => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to write conversion results: {other}"),
                    ),
                }
            }
            AppError::Extraction { job_id, source } => {
                warn!(%job_id, "Job extraction failed: {source}");
                let body = Json(json!({
                    "error": source.to_string(),
                    "job_id": job_id,
                }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
            AppError::Multipart(err) => {
                warn!("Multipart error: {err}");
                (err.status(), err.body_text())
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
