//! # Common Test Utilities
//!
//! `TestApp` spawns a real server on a random port, configured against an
//! `httpmock::MockServer` standing in for the AI provider, with every working
//! directory inside a temporary folder.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::{Method::POST, Mock, MockServer};
use reqwest::Client;
use serde_json::json;
use std::{fs, net::SocketAddr, path::PathBuf};
use talend2dbt_server::{
    config, router,
    state::{build_app_state, AppState},
};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

/// A phrase unique to the default conversion system prompt.
pub const CONVERSION_PROMPT_MARKER: &str = "Talend to dbt conversion";
/// A phrase unique to the default SQL commentary system prompt.
pub const COMMENTARY_PROMPT_MARKER: &str = "Data Build Tool expert";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    pub work_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server and returns a `TestApp` instance.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_extra_config("").await
    }

    /// Like `spawn`, appending `extra` (YAML) to the generated config file.
    pub async fn spawn_with_extra_config(extra: &str) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start();
        let work_dir = tempdir()?;
        let root = work_dir.path();

        let config_path = root.join("config.yml");
        let config_content = format!(
            r#"
port: 0
upload_dir: "{}"
results_dir: "{}"
static_dir: "{}"
max_upload_bytes: 1048576
providers:
  default:
    provider: "local"
    api_url: "{}"
    api_key: null
    model_name: "mock-chat-model"
    timeout_secs: 5
{extra}
"#,
            root.join("uploads").display(),
            root.join("results").display(),
            root.join("static").display(),
            mock_server.url("/v1/chat/completions"),
        );
        fs::write(&config_path, config_content)?;

        let config = config::get_config(config_path.to_str())?;
        let app_state = build_app_state(config).await?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let app_state_for_harness = app_state.clone();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state: app_state_for_harness,
            work_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn results_dir(&self) -> PathBuf {
        self.work_dir.path().join("results")
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.work_dir.path().join("uploads")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.work_dir.path().join("static")
    }

    /// Mocks a chat completion answer for requests whose body contains `marker`.
    pub fn mock_completion(&self, marker: &str, content: &str) -> Mock<'_> {
        self.mock_server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains(marker);
            then.status(200).json_body(json!({
                "choices": [{ "message": { "role": "assistant", "content": content } }]
            }));
        })
    }

    /// Uploads `contents` as the `file` part of a `/convert` request.
    pub async fn upload(
        &self,
        file_name: &str,
        contents: &str,
        query: &str,
    ) -> Result<reqwest::Response> {
        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(contents.as_bytes().to_vec())
                .file_name(file_name.to_string()),
        );
        Ok(self
            .client
            .post(format!("{}/convert{query}", self.address))
            .multipart(form)
            .send()
            .await?)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
