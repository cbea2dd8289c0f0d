use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Default)]
pub struct DebugParams {
    pub debug: Option<bool>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
    pub result: T,
}

/// Download links for the artifacts of one conversion.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConversionFiles {
    pub raw_txt: String,
    pub sql: String,
    pub dbt_project_zip: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ConvertResponse {
    pub job_id: String,
    pub raw_output: String,
    pub files: ConversionFiles,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct GenerateSqlRequest {
    #[serde(default)]
    pub raw_output: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GenerateSqlResponse {
    pub sql_output: String,
    pub file_url: String,
}
