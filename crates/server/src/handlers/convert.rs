//! # Conversion Handlers
//!
//! `/convert` runs an uploaded Talend job through the conversion task and
//! writes the resulting artifacts; `/generate_sql` asks for one commented SQL
//! file built from an earlier answer.

use super::{download_url, wrap_response, ApiResponse, AppError, AppState, DebugParams};
use crate::{
    config::{CONVERSION_TASK, SQL_COMMENTARY_TASK},
    types::{ConversionFiles, ConvertResponse, GenerateSqlRequest, GenerateSqlResponse},
};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use axum_extra::extract::Multipart;
use serde_json::json;
use talend2dbt::{
    input::{decode_job_bytes, is_supported_job_file, job_file_stem, secure_filename},
    materialize_artifacts, write_commented_sql, ConversionError,
};
use tracing::{info, warn};
use uuid::Uuid;

/// The multipart field carrying the job file.
pub const UPLOAD_FIELD: &str = "file";

/// The handler for `POST /convert`.
pub async fn convert_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ConvertResponse>>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if name == UPLOAD_FIELD {
            let file_name = field.file_name().unwrap_or("").to_string();
            let bytes = field.bytes().await?;
            upload = Some((file_name, bytes.to_vec()));
        } else {
            warn!("Ignoring unknown multipart field: {}", name);
        }
    }

    let (file_name, bytes) = upload
        .ok_or_else(|| AppError::BadRequest("No file part in the request".to_string()))?;
    if file_name.is_empty() {
        return Err(AppError::BadRequest("No file selected".to_string()));
    }
    if !is_supported_job_file(&file_name) {
        return Err(AppError::BadRequest(
            "Invalid file type. Please upload a .item or .xml file".to_string(),
        ));
    }
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }

    let job_id = Uuid::new_v4().to_string();
    let stem = job_file_stem(&file_name);
    let upload_path = app_state
        .upload_dir()
        .join(format!("{job_id}_{stem}.item"));
    tokio::fs::create_dir_all(app_state.upload_dir()).await?;
    tokio::fs::write(&upload_path, &bytes).await?;
    info!(%job_id, file_name = %file_name, path = %upload_path.display(), "Saved uploaded job");

    let xml_text = decode_job_bytes(&bytes);
    let converter = app_state.converter_for(CONVERSION_TASK)?;
    let outcome = converter.convert(&xml_text).await.map_err(|e| match e {
        ConversionError::Extraction(source) => AppError::Extraction {
            job_id: job_id.clone(),
            source,
        },
        other => other.into(),
    })?;

    let names = materialize_artifacts(
        app_state.results_dir(),
        job_id.clone(),
        stem,
        outcome.raw_output.clone(),
    )
    .await?;

    let debug_info = if debug_params.debug.unwrap_or(false) {
        Some(json!({
            "summary": outcome.summary,
            "prompt": outcome.prompt,
            "upload_path": upload_path.display().to_string(),
        }))
    } else {
        None
    };

    let files = ConversionFiles {
        raw_txt: download_url(&headers, &names.raw_txt),
        sql: download_url(&headers, &names.sql),
        dbt_project_zip: download_url(&headers, &names.dbt_project_zip),
    };

    Ok(wrap_response(
        ConvertResponse {
            job_id,
            raw_output: outcome.raw_output,
            files,
        },
        debug_params,
        debug_info,
    ))
}

/// The handler for `POST /generate_sql`.
///
/// An empty payload is rejected. A missing or unusable `job_id` is replaced
/// by a fresh one.
pub async fn generate_sql_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    headers: HeaderMap,
    Json(payload): Json<GenerateSqlRequest>,
) -> Result<Json<ApiResponse<GenerateSqlResponse>>, AppError> {
    if payload.raw_output.is_none() && payload.job_id.is_none() {
        return Err(AppError::BadRequest("No JSON payload provided".to_string()));
    }

    let job_id = payload
        .job_id
        .as_deref()
        .map(secure_filename)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    info!(%job_id, has_raw_output = payload.raw_output.is_some(), "Generating commented SQL");

    let converter = app_state.converter_for(SQL_COMMENTARY_TASK)?;
    let sql_output = converter.comment_sql(payload.raw_output.as_deref()).await?;

    let results_dir = app_state.results_dir();
    let (file_job_id, sql) = (job_id.clone(), sql_output.clone());
    let file_name = tokio::task::spawn_blocking(move || {
        write_commented_sql(&results_dir, &file_job_id, &sql)
    })
    .await
    .map_err(ConversionError::from)??;

    let debug_info = Some(json!({ "job_id": job_id, "file_name": file_name }));
    Ok(wrap_response(
        GenerateSqlResponse {
            sql_output,
            file_url: download_url(&headers, &file_name),
        },
        debug_params,
        debug_info,
    ))
}
