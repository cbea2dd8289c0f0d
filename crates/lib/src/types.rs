//! # Job Summary Data Model
//!
//! The normalized, JSON-serializable view of a Talend job produced by the
//! extractor and consumed by the prompt builder.

use crate::errors::ExtractionError;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// The job name used when the document declares neither a `Property` label
/// nor a `processType` name.
pub const UNKNOWN_JOB_NAME: &str = "unknown_job";

/// The root output of the extractor.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct JobSummary {
    pub job_name: String,
    pub components: Vec<Component>,
    pub connections: Vec<Connection>,
    /// Job-level schemas keyed by name. The first schema seen under a name wins.
    pub metadata: BTreeMap<String, SchemaColumns>,
    pub notes: Vec<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ExtractionError>,
}

impl Default for JobSummary {
    fn default() -> Self {
        Self {
            job_name: UNKNOWN_JOB_NAME.to_string(),
            components: Vec::new(),
            connections: Vec::new(),
            metadata: BTreeMap::new(),
            notes: Vec::new(),
            error: None,
        }
    }
}

impl JobSummary {
    /// Returns `true` when extraction recorded a failure.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Merges a component-local schema into the job-level map.
    ///
    /// Unnamed schemas are skipped and an existing entry is never replaced.
    pub(crate) fn register_schema(&mut self, schema: &Schema) {
        if let Some(name) = schema.name.as_deref().filter(|n| !n.is_empty()) {
            self.metadata
                .entry(name.to_string())
                .or_insert_with(|| SchemaColumns {
                    columns: schema.columns.clone(),
                });
        }
    }
}

/// A parameter value as it appears in `Component::parameters`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ParameterValue {
    Text(String),
    Absent,
}

impl ParameterValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::Text(s) => Some(s),
            ParameterValue::Absent => None,
        }
    }
}

impl From<Option<&str>> for ParameterValue {
    fn from(value: Option<&str>) -> Self {
        value.map_or(ParameterValue::Absent, |v| ParameterValue::Text(v.to_string()))
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Text(value.to_string())
    }
}

/// A single processing step of the job graph.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Component {
    #[serde(rename = "type")]
    pub component_type: Option<String>,
    pub unique_name: Option<String>,
    pub label: Option<String>,
    pub parameters: BTreeMap<String, ParameterValue>,
    pub metadata: Vec<Schema>,
}

impl Component {
    /// Looks up a parameter's text value.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).and_then(ParameterValue::as_str)
    }
}

/// A named, ordered list of columns attached to one side of a component.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Schema {
    pub connector_type: Option<String>,
    pub name: Option<String>,
    pub columns: Vec<Column>,
}

/// The job-level view of a schema.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SchemaColumns {
    pub columns: Vec<Column>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Column {
    pub name: Option<String>,
    pub talend_type: Option<String>,
    pub key: bool,
    pub nullable: bool,
    pub length: Option<String>,
    pub precision: Option<String>,
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// A directed edge between two components. The ids are not validated.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Connection {
    pub source_component_id: Option<String>,
    pub target_component_id: Option<String>,
    pub connector_name: Option<String>,
    pub line_style: Option<String>,
    pub metadata_name: Option<String>,
}

/// A reusable configuration for a specific AI provider instance.
#[derive(Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    /// The type of provider ("gemini" or "local").
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    pub model_name: String,
    /// Sent as the `api-version` query parameter (Azure-style deployments).
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    120
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
