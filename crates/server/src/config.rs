//! # Application Configuration
//!
//! This module defines the configuration structure for the `talend2dbt-server`
//! and provides the logic for loading it from a `config.yml` file and
//! environment variables.

use config::{
    Config as ConfigBuilder, Environment, File, FileFormat, Value as ConfigValue,
    ValueKind as ConfigValueKind,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use talend2dbt::{prompts::tasks::*, substitute_env_placeholders};
use tracing::info;

pub use talend2dbt::ProviderConfig;

/// The task that turns a Talend job into dbt models.
pub const CONVERSION_TASK: &str = "conversion";
/// The task that produces a single commented SQL file.
pub const SQL_COMMENTARY_TASK: &str = "sql_commentary";
/// The provider key every default task points at.
pub const DEFAULT_PROVIDER_KEY: &str = "default";

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Where uploaded job files are kept.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Where conversion artifacts are written and served from.
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
    /// The directory holding `talendtodbt.html`.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Upper bound on components per job summary.
    #[serde(default = "default_max_components")]
    pub max_components: usize,
    /// A map of named, reusable AI provider configurations.
    pub providers: HashMap<String, ProviderConfig>,
    /// A map of tasks, each specifying a provider and prompts.
    pub tasks: HashMap<String, TaskConfig>,
}

fn default_port() -> u16 {
    5001
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_results_dir() -> String {
    "results".to_string()
}

fn default_static_dir() -> String {
    ".".to_string()
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_max_components() -> usize {
    talend2dbt::extractor::DEFAULT_MAX_COMPONENTS
}

/// Defines the prompts and provider for a specific application task.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TaskConfig {
    /// The key of the provider to use from the `providers` map.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub user_prompt: Option<String>,
    /// Used instead of `user_prompt` when the job could not be summarized.
    #[serde(default)]
    pub fallback_user_prompt: Option<String>,
}

/// Constructs a `config::Value` map of the default, hardcoded tasks from the library.
/// This serves as the base layer of configuration.
fn build_default_tasks() -> HashMap<String, ConfigValue> {
    let tasks = vec![
        (
            CONVERSION_TASK,
            (
                CONVERSION_SYSTEM_PROMPT,
                CONVERSION_USER_PROMPT,
                Some(CONVERSION_RAW_XML_USER_PROMPT),
            ),
        ),
        (
            SQL_COMMENTARY_TASK,
            (SQL_COMMENTARY_SYSTEM_PROMPT, SQL_COMMENTARY_USER_PROMPT, None),
        ),
    ];

    tasks
        .into_iter()
        .map(|(name, (sys, user, fallback))| {
            let mut table = HashMap::new();
            table.insert(
                "provider".to_string(),
                ConfigValue::from(DEFAULT_PROVIDER_KEY),
            );
            table.insert("system_prompt".to_string(), ConfigValue::from(sys));
            table.insert("user_prompt".to_string(), ConfigValue::from(user));
            if let Some(fallback) = fallback {
                table.insert(
                    "fallback_user_prompt".to_string(),
                    ConfigValue::from(fallback),
                );
            }
            (
                name.to_string(),
                ConfigValue::new(None, ConfigValueKind::Table(table)),
            )
        })
        .collect()
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let expanded_content =
        substitute_env_placeholders(&content).map_err(|e| ConfigError::General(e.to_string()))?;

    Ok(Some(expanded_content))
}

/// Loads the application configuration from a file and environment variables.
///
/// - Top-level keys like `port` and `results_dir` are overridden by `PORT` and `RESULTS_DIR`.
/// - Nested keys are overridden by `TALEND2DBT_...` variables
///   (e.g., `TALEND2DBT_PROVIDERS__DEFAULT__MODEL_NAME`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults from the library.
        .set_default("tasks", build_default_tasks())?;

    // Layer 2: Main Config (with Fallback)
    let main_config_path = if let Some(override_path) = config_path_override {
        override_path.to_string()
    } else {
        let user_config_path = format!("{base_path}/config.yml");
        if std::path::Path::new(&user_config_path).exists() {
            info!("Loading user-defined configuration from '{user_config_path}'.");
            user_config_path
        } else {
            let provider = env::var("AI_PROVIDER").unwrap_or_else(|_| "gemini".to_string());
            let fallback_path = format!("{base_path}/config.{provider}.yml");
            info!("'{user_config_path}' not found. Falling back to '{fallback_path}' based on AI_PROVIDER='{provider}'.");
            fallback_path
        }
    };

    let main_content = read_and_substitute(&main_config_path)?
        .ok_or_else(|| ConfigError::NotFound(format!("Main config file not found at '{main_config_path}'. Please ensure 'config.yml' exists or your AI_PROVIDER is set to load a valid template ('local' or 'gemini').")))?;
    builder = builder.add_source(File::from_str(&main_content, FileFormat::Yaml));

    // Layer 3: User Prompt Overrides (Optional)
    let user_prompt_path = format!("{base_path}/prompt.yml");
    if let Some(user_prompts_content) = read_and_substitute(&user_prompt_path)? {
        info!("Loading user prompt overrides from '{user_prompt_path}'.");
        builder = builder.add_source(File::from_str(&user_prompts_content, FileFormat::Yaml));
    }

    let settings = builder
        // Layer 4: Load environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 5: Load prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("TALEND2DBT")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    // Deserialize the fully resolved configuration into our `AppConfig` struct.
    let config: AppConfig = settings.try_deserialize()?;
    Ok(config)
}
