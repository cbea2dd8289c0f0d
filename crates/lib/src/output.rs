//! # Output Materializer
//!
//! Splits the completion text into SQL blocks and writes the per-job
//! artifacts: the raw output, a numbered SQL file and a zipped dbt project.

use crate::errors::ConversionError;
use regex::Regex;
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

/// Name of the generated dbt project.
pub const DBT_PROJECT_NAME: &str = "talend_converted_project";

/// The `dbt_project.yml` of a generated project.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct DbtProjectConfig {
    pub name: String,
    pub version: String,
    pub config_version: u32,
    pub profile: String,
    pub model_paths: Vec<String>,
}

impl Default for DbtProjectConfig {
    fn default() -> Self {
        Self {
            name: DBT_PROJECT_NAME.to_string(),
            version: "1.0.0".to_string(),
            config_version: 2,
            profile: "default".to_string(),
            model_paths: vec!["models".to_string()],
        }
    }
}

/// File names (relative to the results directory) written for one conversion.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub raw_txt: String,
    pub sql: String,
    pub dbt_project_zip: String,
}

/// Extracts fenced code blocks (```` ```sql ```` or bare ```` ``` ````).
///
/// Text without any fenced block is returned whole as a single block.
pub fn extract_sql_blocks(text: &str) -> Result<Vec<String>, ConversionError> {
    let re = Regex::new(r"(?s)```(?:sql)?\n(.*?)\n```")?;
    let blocks: Vec<String> = re
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();

    if blocks.is_empty() {
        debug!("No fenced code blocks found, treating the whole output as SQL");
        return Ok(vec![text.to_string()]);
    }
    Ok(blocks)
}

/// Renders blocks as one SQL file, each preceded by `-- dbt model #N`.
pub fn render_sql_file(blocks: &[String]) -> String {
    blocks
        .iter()
        .enumerate()
        .map(|(i, block)| format!("-- dbt model #{}\n{}\n\n", i + 1, block.trim()))
        .collect()
}

/// Writes every artifact for one conversion into `results_dir`.
///
/// Produces `{job_id}_llm_raw_output.txt`, `{job_id}_{stem}.sql`, the project
/// directory `dbt_project_{job_id}/` and `{job_id}_{stem}_dbt_project.zip`.
pub fn write_conversion_artifacts(
    results_dir: &Path,
    job_id: &str,
    stem: &str,
    raw_output: &str,
) -> Result<ArtifactNames, ConversionError> {
    fs::create_dir_all(results_dir)?;

    let names = ArtifactNames {
        raw_txt: format!("{job_id}_llm_raw_output.txt"),
        sql: format!("{job_id}_{stem}.sql"),
        dbt_project_zip: format!("{job_id}_{stem}_dbt_project.zip"),
    };

    fs::write(results_dir.join(&names.raw_txt), raw_output)?;

    let sql = render_sql_file(&extract_sql_blocks(raw_output)?);
    fs::write(results_dir.join(&names.sql), &sql)?;

    let project_dir = results_dir.join(format!("dbt_project_{job_id}"));
    write_dbt_project(&project_dir, stem, &sql)?;
    zip_directory(&project_dir, &results_dir.join(&names.dbt_project_zip))?;

    info!(
        job_id,
        sql = %names.sql,
        archive = %names.dbt_project_zip,
        "Wrote conversion artifacts"
    );
    Ok(names)
}

/// Runs [`write_conversion_artifacts`] on the blocking thread pool.
pub async fn materialize_artifacts(
    results_dir: PathBuf,
    job_id: String,
    stem: String,
    raw_output: String,
) -> Result<ArtifactNames, ConversionError> {
    tokio::task::spawn_blocking(move || {
        write_conversion_artifacts(&results_dir, &job_id, &stem, &raw_output)
    })
    .await?
}

/// Writes `{job_id}_commented.sql` and returns its file name.
pub fn write_commented_sql(
    results_dir: &Path,
    job_id: &str,
    sql: &str,
) -> Result<String, ConversionError> {
    fs::create_dir_all(results_dir)?;
    let file_name = format!("{job_id}_commented.sql");
    fs::write(results_dir.join(&file_name), sql)?;
    Ok(file_name)
}

/// Lays out a minimal dbt project: `dbt_project.yml` and `models/{stem}.sql`.
pub fn write_dbt_project(project_dir: &Path, stem: &str, sql: &str) -> Result<(), ConversionError> {
    let models_dir = project_dir.join("models");
    fs::create_dir_all(&models_dir)?;

    let project_yml = serde_yaml::to_string(&DbtProjectConfig::default())?;
    fs::write(project_dir.join("dbt_project.yml"), project_yml)?;
    fs::write(models_dir.join(format!("{stem}.sql")), sql)?;
    Ok(())
}

/// Zips every file below `dir` (deflated, paths relative to `dir`).
pub fn zip_directory(dir: &Path, zip_path: &Path) -> Result<(), ConversionError> {
    let mut files = Vec::new();
    collect_files(dir, &mut files)?;
    files.sort();

    let mut zip = ZipWriter::new(File::create(zip_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let relative = path.strip_prefix(dir).unwrap_or(&path);
        let entry_name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let mut contents = Vec::new();
        File::open(&path)?.read_to_end(&mut contents)?;

        zip.start_file(entry_name, options)?;
        zip.write_all(&contents)?;
    }

    zip.finish()?;
    Ok(())
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}
