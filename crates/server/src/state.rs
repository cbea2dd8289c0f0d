//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds the configuration, the
//! resolved tasks and the instantiated AI provider clients.

use crate::{config::AppConfig, errors::AppError};
use talend2dbt::{
    prompts::{tasks::CONVERSION_RAW_XML_USER_PROMPT, ConversionTemplates},
    providers::{ai::AiProvider, factory::create_provider},
    Converter, ExtractorConfig,
};
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tracing::info;

/// A fully resolved task configuration with non-optional fields.
#[derive(Clone, Debug)]
pub struct ResolvedTask {
    pub provider: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub fallback_user_prompt: Option<String>,
}

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// A map of fully resolved tasks, ready for use by handlers.
    pub tasks: Arc<HashMap<String, ResolvedTask>>,
    /// A map of instantiated AI providers, keyed by their name from the config.
    pub ai_providers: Arc<HashMap<String, Box<dyn AiProvider>>>,
}

impl AppState {
    pub fn upload_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.upload_dir)
    }

    pub fn results_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.results_dir)
    }

    pub fn static_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.static_dir)
    }

    /// Builds a `Converter` wired to the provider and prompts of `task_name`.
    pub fn converter_for(&self, task_name: &str) -> Result<Converter, AppError> {
        let task = self.tasks.get(task_name).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("Task '{task_name}' is not configured"))
        })?;
        let provider = self.ai_providers.get(&task.provider).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Provider '{}' for task '{task_name}' not found",
                task.provider
            ))
        })?;

        let templates = ConversionTemplates {
            system_prompt: task.system_prompt.clone(),
            user_prompt: task.user_prompt.clone(),
            raw_xml_user_prompt: task
                .fallback_user_prompt
                .clone()
                .unwrap_or_else(|| CONVERSION_RAW_XML_USER_PROMPT.to_string()),
        };

        Ok(Converter::builder()
            .ai_provider(provider.clone())
            .templates(templates)
            .commentary_prompts(task.system_prompt.clone(), task.user_prompt.clone())
            .extractor_config(
                ExtractorConfig::default().with_max_components(self.config.max_components),
            )
            .build()?)
    }
}

/// Builds the shared application state from the configuration.
///
/// It instantiates an AI provider client for each entry in the `providers`
/// section of the configuration and validates every task.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    // Create a map of AI provider instances from the configuration.
    let mut ai_providers = HashMap::new();
    for (name, provider_config) in &config.providers {
        let provider = create_provider(name, provider_config)?;
        ai_providers.insert(name.clone(), provider);
    }

    // Validate and resolve all tasks from the configuration.
    let mut resolved_tasks = HashMap::new();
    for (name, task_config) in &config.tasks {
        let provider = task_config.provider.clone().ok_or_else(|| {
            anyhow::anyhow!("Resolved task '{name}' is missing required 'provider' field")
        })?;
        let system_prompt = task_config.system_prompt.clone().ok_or_else(|| {
            anyhow::anyhow!("Resolved task '{name}' is missing required 'system_prompt' field")
        })?;
        let user_prompt = task_config.user_prompt.clone().ok_or_else(|| {
            anyhow::anyhow!("Resolved task '{name}' is missing required 'user_prompt' field")
        })?;
        if !ai_providers.contains_key(&provider) {
            return Err(anyhow::anyhow!(
                "Task '{name}' refers to unknown provider '{provider}'"
            ));
        }

        resolved_tasks.insert(
            name.clone(),
            ResolvedTask {
                provider,
                system_prompt,
                user_prompt,
                fallback_user_prompt: task_config.fallback_user_prompt.clone(),
            },
        );
    }

    for dir in [&config.upload_dir, &config.results_dir] {
        tokio::fs::create_dir_all(dir).await?;
    }
    info!(
        upload_dir = %config.upload_dir,
        results_dir = %config.results_dir,
        providers = ai_providers.len(),
        tasks = resolved_tasks.len(),
        "Application state initialized"
    );

    Ok(AppState {
        config: Arc::new(config),
        tasks: Arc::new(resolved_tasks),
        ai_providers: Arc::new(ai_providers),
    })
}
