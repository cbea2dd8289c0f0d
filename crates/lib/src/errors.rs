use serde::{Serialize, Serializer};
use thiserror::Error;

/// Failures recorded by the job summary extractor.
///
/// These never escape `JobExtractor::extract`; they are stored in
/// `JobSummary::error` next to whatever was collected before the failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The input is not well-formed XML.
    #[error("Failed to parse XML: {0}")]
    MalformedInput(String),
    /// Any other failure while walking the parsed document.
    #[error("Unexpected error during XML parsing: {0}")]
    UnexpectedExtractionFailure(String),
}

impl Serialize for ExtractionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Custom error types for the conversion pipeline.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("AI provider returned no content: {0}")]
    EmptyCompletion(String),
    #[error("AI provider is not configured: {0}")]
    MissingAiProvider(String),
    #[error("Job extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write project archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
    #[error("YAML serialization error: {0}")]
    YamlSerialization(#[from] serde_yaml::Error),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
