use crate::{errors::ConversionError, providers::ai::AiProvider};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, time::Duration};
use tracing::debug;

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize)]
struct LocalAiRequest<'a> {
    messages: Vec<LocalAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct LocalAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize, Debug)]
struct LocalAiResponse {
    #[serde(default)]
    choices: Vec<LocalAiChoice>,
}

#[derive(Deserialize, Debug)]
struct LocalAiChoice {
    message: LocalAiMessage,
}

// --- Local Provider implementation ---

/// A provider for a local or OpenAI-compatible chat completions API.
///
/// When `api_version` is set the endpoint is treated as an Azure-style
/// deployment: the key travels in the `api-key` header and the version as a
/// query parameter. Otherwise the key is sent as a bearer token.
#[derive(Clone, Debug)]
pub struct LocalAiProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    model: Option<String>,
    api_version: Option<String>,
}

impl LocalAiProvider {
    /// Creates a new `LocalAiProvider`.
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        model: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ConversionError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(ConversionError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
            model,
            api_version: None,
        })
    }

    pub fn with_api_version(mut self, api_version: Option<String>) -> Self {
        self.api_version = api_version;
        self
    }
}

#[async_trait]
impl AiProvider for LocalAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ConversionError> {
        let mut messages = Vec::with_capacity(2);
        if !system_prompt.trim().is_empty() {
            messages.push(LocalAiMessage {
                role: "system".to_string(),
                content: system_prompt.to_string(),
            });
        }
        messages.push(LocalAiMessage {
            role: "user".to_string(),
            content: user_prompt.to_string(),
        });

        let request_body = LocalAiRequest {
            messages,
            model: self.model.as_deref(),
            temperature: 0.7,
            stream: false,
        };

        debug!(prompt_len = user_prompt.len(), model = ?self.model, "--> Sending prompt to local AI provider");

        let mut request_builder = self.client.post(&self.api_url);

        match (&self.api_key, &self.api_version) {
            (Some(key), Some(version)) => {
                request_builder = request_builder
                    .header("api-key", key)
                    .query(&[("api-version", version)]);
            }
            (Some(key), None) => request_builder = request_builder.bearer_auth(key),
            (None, Some(version)) => {
                request_builder = request_builder.query(&[("api-version", version)]);
            }
            (None, None) => {}
        }

        let response = request_builder
            .json(&request_body)
            .send()
            .await
            .map_err(ConversionError::AiRequest)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ConversionError::AiApi(format!("{status}: {error_text}")));
        }

        let local_ai_response: LocalAiResponse = response
            .json()
            .await
            .map_err(ConversionError::AiDeserialization)?;

        local_ai_response
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| {
                ConversionError::EmptyCompletion(
                    "content generation failed (prompt blocked?)".to_string(),
                )
            })
    }
}
