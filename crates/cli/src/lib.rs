//! # `talend2dbt-cli` Library Crate
//!
//! Command-line access to the conversion pipeline: `extract` prints the job
//! summary of a Talend item file, `convert` runs the full pipeline and writes
//! the dbt artifacts to a local directory.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use talend2dbt::{
    input::{job_file_stem, read_job_file},
    materialize_artifacts,
    prompts::{
        tasks::{
            CONVERSION_RAW_XML_USER_PROMPT, CONVERSION_SYSTEM_PROMPT, CONVERSION_USER_PROMPT,
            SQL_COMMENTARY_SYSTEM_PROMPT, SQL_COMMENTARY_USER_PROMPT,
        },
        ConversionTemplates,
    },
    providers::factory::create_provider,
    substitute_env_placeholders,
    write_commented_sql, Converter, ExtractorConfig, JobSummary, ProviderConfig,
};
use tracing::info;
use uuid::Uuid;

/// The provider key tasks fall back to when they name none.
pub const DEFAULT_PROVIDER_KEY: &str = "default";
const CONVERSION_TASK: &str = "conversion";
const SQL_COMMENTARY_TASK: &str = "sql_commentary";

// --- CLI Argument Structs ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the extracted job summary of a Talend .item/.xml file as JSON
    Extract(ExtractArgs),
    /// Convert a Talend job into dbt models and a zipped dbt project
    Convert(ConvertArgs),
}

#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// The Talend job file.
    pub file: PathBuf,
    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
    /// Upper bound on the number of components read from the job.
    #[arg(long)]
    pub max_components: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// The Talend job file.
    pub file: PathBuf,
    /// Directory the artifacts are written to.
    #[arg(long, default_value = "results")]
    pub out: PathBuf,
    /// A server-style YAML config with `providers` and `tasks` sections.
    /// When given, the provider flags below are ignored.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Also ask for a single commented SQL file.
    #[arg(long)]
    pub commented: bool,
    #[command(flatten)]
    pub provider: ProviderArgs,
}

/// Provider settings used when no config file is given.
#[derive(Args, Debug, Clone)]
pub struct ProviderArgs {
    /// The provider type ("gemini" or "local").
    #[arg(long = "provider", env = "AI_PROVIDER", default_value = "gemini")]
    pub provider: String,
    /// The completion endpoint. Required for "local".
    #[arg(long, env = "AI_API_URL")]
    pub api_url: Option<String>,
    #[arg(long, env = "GEN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    #[arg(long = "model", env = "AI_MODEL", default_value = "gemini-2.0-flash")]
    pub model_name: String,
    #[arg(long, env = "AI_API_VERSION")]
    pub api_version: Option<String>,
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,
}

impl From<ProviderArgs> for ProviderConfig {
    fn from(args: ProviderArgs) -> Self {
        ProviderConfig {
            provider: args.provider,
            api_url: args.api_url,
            api_key: args.api_key,
            model_name: args.model_name,
            api_version: args.api_version,
            timeout_secs: args.timeout_secs,
        }
    }
}

// --- Config File ---

/// The subset of the server configuration the CLI understands. Other keys
/// (`port`, directories, ...) are ignored.
#[derive(Debug, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub max_components: Option<usize>,
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub tasks: HashMap<String, CliTask>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CliTask {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub user_prompt: Option<String>,
    #[serde(default)]
    pub fallback_user_prompt: Option<String>,
}

impl CliConfig {
    fn task(&self, name: &str) -> CliTask {
        self.tasks.get(name).cloned().unwrap_or_default()
    }

    fn provider_for(&self, task: &CliTask) -> Result<(&str, &ProviderConfig)> {
        let key = task.provider.as_deref().unwrap_or(DEFAULT_PROVIDER_KEY);
        self.providers
            .get_key_value(key)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| anyhow!("Provider '{key}' is not defined in the config file"))
    }
}

/// Reads a YAML config file, replacing `${VAR}` placeholders from the
/// environment (unset variables become empty strings).
pub fn load_cli_config(path: &Path) -> Result<CliConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    let expanded = substitute_env_placeholders(&content)?;
    serde_yaml::from_str(&expanded)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

// --- Public Entrypoint ---

/// The main entry point for the `talend2dbt` CLI library.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Extract(args) => handle_extract(args),
        Commands::Convert(args) => handle_convert(args).await.map(|_| ()),
    }
}

// --- Command Handlers ---

/// Handles `talend2dbt extract`. The summary is always printed; an extraction
/// error is returned afterwards so the process exits non-zero.
fn handle_extract(args: ExtractArgs) -> Result<()> {
    info!("Starting 'extract' command with args: {:?}", args);
    let xml_text = read_job_file(&args.file)
        .with_context(|| format!("Failed to read job file '{}'", args.file.display()))?;

    let mut config = ExtractorConfig::default();
    if let Some(max) = args.max_components {
        config = config.with_max_components(max);
    }
    let summary = talend2dbt::JobExtractor::new(config).extract(&xml_text);

    println!("{}", format_summary(&summary, args.pretty)?);

    match &summary.error {
        Some(err) => bail!("Extraction failed: {err}"),
        None => Ok(()),
    }
}

/// Serializes a summary as compact or pretty JSON.
pub fn format_summary(summary: &JobSummary, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(summary)?
    } else {
        serde_json::to_string(summary)?
    };
    Ok(json)
}

/// Paths of everything `convert` wrote.
#[derive(Debug, Clone)]
pub struct ConvertReport {
    pub job_id: String,
    pub raw_txt: PathBuf,
    pub sql: PathBuf,
    pub dbt_project_zip: PathBuf,
    pub commented_sql: Option<PathBuf>,
}

/// Handles `talend2dbt convert` and reports the written files.
pub async fn handle_convert(args: ConvertArgs) -> Result<ConvertReport> {
    info!(file = %args.file.display(), out = %args.out.display(), "Starting 'convert' command");
    let xml_text = read_job_file(&args.file)
        .with_context(|| format!("Failed to read job file '{}'", args.file.display()))?;

    let (converter, commentary) = build_converters(&args)?;

    let outcome = converter.convert(&xml_text).await?;
    let job_id = Uuid::new_v4().to_string();
    let file_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = job_file_stem(&file_name);

    let names = materialize_artifacts(
        args.out.clone(),
        job_id.clone(),
        stem,
        outcome.raw_output.clone(),
    )
    .await?;

    let commented_sql = if args.commented {
        let sql = commentary.comment_sql(Some(&outcome.raw_output)).await?;
        let name = write_commented_sql(&args.out, &job_id, &sql)?;
        Some(args.out.join(name))
    } else {
        None
    };

    let report = ConvertReport {
        raw_txt: args.out.join(&names.raw_txt),
        sql: args.out.join(&names.sql),
        dbt_project_zip: args.out.join(&names.dbt_project_zip),
        commented_sql,
        job_id,
    };

    println!("✅ Converted job {}", report.job_id);
    println!("  raw output:  {}", report.raw_txt.display());
    println!("  sql:         {}", report.sql.display());
    println!("  dbt project: {}", report.dbt_project_zip.display());
    if let Some(path) = &report.commented_sql {
        println!("  commented:   {}", path.display());
    }
    Ok(report)
}

/// Builds the conversion and commentary converters, from the config file when
/// one is given and from the provider flags otherwise.
fn build_converters(args: &ConvertArgs) -> Result<(Converter, Converter)> {
    let Some(path) = &args.config else {
        let provider = create_provider(DEFAULT_PROVIDER_KEY, &args.provider.clone().into())?;
        let converter = Converter::builder().ai_provider(provider).build()?;
        return Ok((converter.clone(), converter));
    };

    let config = load_cli_config(path)?;
    let extractor_config = config
        .max_components
        .map(|max| ExtractorConfig::default().with_max_components(max))
        .unwrap_or_default();

    let conversion_task = config.task(CONVERSION_TASK);
    let (name, provider_config) = config.provider_for(&conversion_task)?;
    let templates = ConversionTemplates {
        system_prompt: conversion_task
            .system_prompt
            .clone()
            .unwrap_or_else(|| CONVERSION_SYSTEM_PROMPT.to_string()),
        user_prompt: conversion_task
            .user_prompt
            .clone()
            .unwrap_or_else(|| CONVERSION_USER_PROMPT.to_string()),
        raw_xml_user_prompt: conversion_task
            .fallback_user_prompt
            .clone()
            .unwrap_or_else(|| CONVERSION_RAW_XML_USER_PROMPT.to_string()),
    };
    let converter = Converter::builder()
        .ai_provider(create_provider(name, provider_config)?)
        .templates(templates)
        .extractor_config(extractor_config.clone())
        .build()?;

    let commentary_task = config.task(SQL_COMMENTARY_TASK);
    let (name, provider_config) = config.provider_for(&commentary_task)?;
    let commentary = Converter::builder()
        .ai_provider(create_provider(name, provider_config)?)
        .commentary_prompts(
            commentary_task
                .system_prompt
                .unwrap_or_else(|| SQL_COMMENTARY_SYSTEM_PROMPT.to_string()),
            commentary_task
                .user_prompt
                .unwrap_or_else(|| SQL_COMMENTARY_USER_PROMPT.to_string()),
        )
        .extractor_config(extractor_config)
        .build()?;

    Ok((converter, commentary))
}
