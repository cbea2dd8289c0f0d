use super::{handlers, state::AppState};
use axum::extract::DefaultBodyLimit;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    let max_upload_bytes = app_state.config.max_upload_bytes;
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route(
            "/convert",
            post(handlers::convert_handler).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/generate_sql", post(handlers::generate_sql_handler))
        .route("/download/{filename}", get(handlers::download_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
