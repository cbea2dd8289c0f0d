//! # Talend to dbt
//!
//! This crate turns Talend ETL job definitions (`.item` XML) into a compact
//! `JobSummary`, renders that summary into a prompt for a configurable AI
//! provider and writes the returned dbt models to disk.

pub mod converter;
pub mod env;
pub mod errors;
pub mod extractor;
pub mod input;
pub mod output;
pub mod prompts;
pub mod providers;
pub mod types;

pub use converter::{ConversionOutcome, Converter, ConverterBuilder};
pub use env::substitute_env_placeholders;
pub use errors::{ConversionError, ExtractionError};
pub use extractor::{extract_job_summary, ExtractorConfig, JobExtractor};
pub use output::{materialize_artifacts, write_commented_sql, ArtifactNames};
pub use types::{
    Column, Component, Connection, JobSummary, ParameterValue, ProviderConfig, Schema,
    SchemaColumns, UNKNOWN_JOB_NAME,
};
