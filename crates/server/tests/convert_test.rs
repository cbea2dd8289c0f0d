//! # `/convert` Endpoint Tests
//!
//! Uploads Talend jobs to a running server whose AI provider is mocked and
//! checks validation, error mapping and the produced artifacts.

mod common;

use common::{TestApp, CONVERSION_PROMPT_MARKER};
use httpmock::Method::POST;
use reqwest::StatusCode;
use serde_json::Value;
use std::{fs, io::Read};
use talend2dbt_test_utils::fixtures::{MALFORMED_JOB, ORDERS_JOB_ITEM, TWO_MODEL_COMPLETION};

#[tokio::test]
async fn test_convert_success() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let mock = app.mock_completion(CONVERSION_PROMPT_MARKER, TWO_MODEL_COMPLETION);

    let response = app
        .upload("orders daily load.item", ORDERS_JOB_ITEM, "")
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await?;
    assert!(body.get("debug").is_none());
    let result = &body["result"];
    let job_id = result["job_id"].as_str().unwrap().to_string();
    assert_eq!(result["raw_output"], TWO_MODEL_COMPLETION);

    let host = app.address.trim_start_matches("http://");
    assert_eq!(
        result["files"]["sql"],
        format!("http://{host}/download/{job_id}_orders_daily_load.sql")
    );
    assert_eq!(
        result["files"]["raw_txt"],
        format!("http://{host}/download/{job_id}_llm_raw_output.txt")
    );
    assert_eq!(
        result["files"]["dbt_project_zip"],
        format!("http://{host}/download/{job_id}_orders_daily_load_dbt_project.zip")
    );

    // The upload is kept next to the generated artifacts.
    let saved = fs::read_to_string(
        app.upload_dir()
            .join(format!("{job_id}_orders_daily_load.item")),
    )?;
    assert_eq!(saved, ORDERS_JOB_ITEM);

    let sql = fs::read_to_string(
        app.results_dir()
            .join(format!("{job_id}_orders_daily_load.sql")),
    )?;
    assert!(sql.starts_with("-- dbt model #1\n"));
    assert!(sql.contains("-- dbt model #2\n"));

    mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_convert_download_links_resolve() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_completion(CONVERSION_PROMPT_MARKER, TWO_MODEL_COMPLETION);

    let body: Value = app
        .upload("orders.xml", ORDERS_JOB_ITEM, "")
        .await?
        .json()
        .await?;
    let zip_url = body["result"]["files"]["dbt_project_zip"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app.client.get(&zip_url).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/zip");

    let bytes = response.bytes().await?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec()))?;
    let mut model = String::new();
    archive
        .by_name("models/orders.sql")?
        .read_to_string(&mut model)?;
    assert!(model.contains("select o.order_id, c.customer_name"));
    assert!(archive.by_name("dbt_project.yml").is_ok());
    Ok(())
}

#[tokio::test]
async fn test_convert_debug_includes_summary_and_prompt() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_completion(CONVERSION_PROMPT_MARKER, "select 1");

    let body: Value = app
        .upload("orders.item", ORDERS_JOB_ITEM, "?debug=true")
        .await?
        .json()
        .await?;

    let debug = &body["debug"];
    assert_eq!(debug["summary"]["job_name"], "orders_daily_load");
    assert_eq!(debug["summary"]["components"].as_array().unwrap().len(), 4);
    assert!(debug["prompt"]["system"]
        .as_str()
        .unwrap()
        .contains(CONVERSION_PROMPT_MARKER));
    assert!(debug["prompt"]["user"]
        .as_str()
        .unwrap()
        .contains("Job Name: orders_daily_load"));
    Ok(())
}

#[tokio::test]
async fn test_convert_rejects_missing_file_part() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;

    let form = reqwest::multipart::Form::new().text("comment", "no file here");
    let response = app
        .client
        .post(format!("{}/convert", app.address))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "No file part in the request");
    Ok(())
}

#[tokio::test]
async fn test_convert_rejects_empty_file_name() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;

    let response = app.upload("", ORDERS_JOB_ITEM, "").await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "No file selected");
    Ok(())
}

#[tokio::test]
async fn test_convert_rejects_wrong_extension() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;

    let response = app.upload("orders.csv", "a,b,c", "").await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert!(body["error"].as_str().unwrap().contains("Invalid file type"));
    Ok(())
}

#[tokio::test]
async fn test_convert_accepts_uppercase_extension() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_completion(CONVERSION_PROMPT_MARKER, "select 1");

    let response = app.upload("ORDERS.XML", ORDERS_JOB_ITEM, "").await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_convert_rejects_empty_content() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;

    let response = app.upload("orders.item", "", "").await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "Uploaded file is empty");
    Ok(())
}

#[tokio::test]
async fn test_convert_malformed_job_skips_model() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let mock = app.mock_server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).body("{}");
    });

    let response = app.upload("broken.item", MALFORMED_JOB, "").await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await?;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to parse XML:"));
    assert!(body["job_id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(mock.hits(), 0);
    Ok(())
}

#[tokio::test]
async fn test_convert_provider_failure_is_bad_gateway() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(500).body("model overloaded");
    });

    let response = app.upload("orders.item", ORDERS_JOB_ITEM, "").await?;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await?;
    assert!(body["error"].as_str().unwrap().contains("model overloaded"));
    Ok(())
}

#[tokio::test]
async fn test_convert_uses_configured_prompts() -> anyhow::Result<()> {
    let app = TestApp::spawn_with_extra_config(
        r#"
tasks:
  conversion:
    system_prompt: "House conversion rules."
    user_prompt: "Convert job {job_name} please."
"#,
    )
    .await?;
    let mock = app.mock_completion("Convert job orders_daily_load please.", "select 1");

    let response = app.upload("orders.item", ORDERS_JOB_ITEM, "").await?;

    assert_eq!(response.status(), StatusCode::OK);
    mock.assert();
    Ok(())
}
