//! # Prompt Builder
//!
//! Renders a `JobSummary` (or the raw XML it came from) into the system and
//! user prompts sent to the completion service.

use super::tasks::{
    CONVERSION_RAW_XML_USER_PROMPT, CONVERSION_SYSTEM_PROMPT, CONVERSION_USER_PROMPT,
    MISSING_RAW_OUTPUT,
};
use crate::{errors::ConversionError, types::JobSummary};
use serde::Serialize;
use tracing::debug;

/// A rendered system/user prompt pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// The templates used for the conversion task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTemplates {
    pub system_prompt: String,
    /// Rendered from the extracted summary.
    pub user_prompt: String,
    /// Rendered from the raw XML when the summary carries an error.
    pub raw_xml_user_prompt: String,
}

impl Default for ConversionTemplates {
    fn default() -> Self {
        Self {
            system_prompt: CONVERSION_SYSTEM_PROMPT.to_string(),
            user_prompt: CONVERSION_USER_PROMPT.to_string(),
            raw_xml_user_prompt: CONVERSION_RAW_XML_USER_PROMPT.to_string(),
        }
    }
}

/// Builds the conversion prompt.
///
/// No summary field has to be populated. When `summary.error` is set, the raw
/// XML template is used instead of the summary template.
pub fn build_conversion_prompt(
    templates: &ConversionTemplates,
    summary: &JobSummary,
    raw_xml: &str,
) -> Result<PromptPair, ConversionError> {
    let user = if summary.has_error() {
        debug!("Summary carries an error, embedding raw XML in the prompt");
        render_template(&templates.raw_xml_user_prompt, &[("raw_xml", raw_xml)])
    } else {
        let components = serde_json::to_string_pretty(&summary.components)?;
        let connections = serde_json::to_string_pretty(&summary.connections)?;
        let metadata = serde_json::to_string_pretty(&summary.metadata)?;
        let notes = serde_json::to_string_pretty(&summary.notes)?;
        render_template(
            &templates.user_prompt,
            &[
                ("job_name", summary.job_name.as_str()),
                ("components", components.as_str()),
                ("connections", connections.as_str()),
                ("metadata", metadata.as_str()),
                ("notes", notes.as_str()),
                ("raw_xml", raw_xml),
            ],
        )
    };

    Ok(PromptPair {
        system: templates.system_prompt.clone(),
        user,
    })
}

/// Builds the prompt asking for a single, commented SQL file.
pub fn build_commentary_prompt(
    system_prompt: &str,
    user_template: &str,
    raw_output: Option<&str>,
) -> PromptPair {
    let raw_output = raw_output.unwrap_or(MISSING_RAW_OUTPUT);
    PromptPair {
        system: system_prompt.to_string(),
        user: render_template(user_template, &[("raw_output", raw_output)]),
    }
}

/// Replaces `{name}` placeholders in a single pass, so substituted values are
/// never scanned for further placeholders. Unknown placeholders are kept.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start + 1..];
        let matched = vars.iter().find(|(name, _)| {
            candidate.starts_with(name) && candidate[name.len()..].starts_with('}')
        });
        match matched {
            Some((name, value)) => {
                out.push_str(value);
                rest = &candidate[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = candidate;
            }
        }
    }
    out.push_str(rest);
    out
}
