//! # Talend to dbt Converter
//!
//! Ties the pipeline together: extract a `JobSummary`, render the conversion
//! prompt and ask the configured AI provider for dbt models.

use crate::{
    errors::ConversionError,
    extractor::{ExtractorConfig, JobExtractor},
    prompts::{
        build_commentary_prompt, build_conversion_prompt,
        tasks::{SQL_COMMENTARY_SYSTEM_PROMPT, SQL_COMMENTARY_USER_PROMPT},
        ConversionTemplates, PromptPair,
    },
    providers::ai::AiProvider,
    types::JobSummary,
};
use serde::Serialize;
use std::fmt;
use tracing::{error, info};

/// The result of a successful conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutcome {
    pub summary: JobSummary,
    pub prompt: PromptPair,
    pub raw_output: String,
}

/// Runs the extraction and model steps of a conversion.
#[derive(Clone)]
pub struct Converter {
    extractor: JobExtractor,
    ai_provider: Box<dyn AiProvider>,
    templates: ConversionTemplates,
    commentary_system_prompt: String,
    commentary_user_prompt: String,
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("extractor", &self.extractor)
            .field("ai_provider", &self.ai_provider)
            .finish_non_exhaustive()
    }
}

impl Converter {
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::new()
    }

    pub fn extractor(&self) -> &JobExtractor {
        &self.extractor
    }

    /// Extracts the job summary without contacting the model.
    pub fn summarize(&self, xml_text: &str) -> JobSummary {
        self.extractor.extract(xml_text)
    }

    /// Converts a Talend job into the model's dbt answer.
    ///
    /// A summary carrying an extraction error aborts the conversion before
    /// any model call.
    pub async fn convert(&self, xml_text: &str) -> Result<ConversionOutcome, ConversionError> {
        let summary = self.summarize(xml_text);
        if let Some(err) = &summary.error {
            error!(job_name = %summary.job_name, "Aborting conversion: {err}");
            return Err(ConversionError::Extraction(err.clone()));
        }

        let prompt = build_conversion_prompt(&self.templates, &summary, xml_text)?;
        info!(job_name = %summary.job_name, "Requesting dbt models from AI provider");
        let raw_output = self
            .ai_provider
            .generate(&prompt.system, &prompt.user)
            .await?;

        Ok(ConversionOutcome {
            summary,
            prompt,
            raw_output,
        })
    }

    /// Asks the model for a single commented SQL file based on a previous answer.
    pub async fn comment_sql(&self, raw_output: Option<&str>) -> Result<String, ConversionError> {
        let prompt = build_commentary_prompt(
            &self.commentary_system_prompt,
            &self.commentary_user_prompt,
            raw_output,
        );
        self.ai_provider.generate(&prompt.system, &prompt.user).await
    }
}

/// A builder for creating `Converter` instances.
#[derive(Default)]
pub struct ConverterBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    templates: Option<ConversionTemplates>,
    extractor_config: Option<ExtractorConfig>,
    commentary: Option<(String, String)>,
}

impl ConverterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the provider used for every model call.
    pub fn ai_provider(mut self, ai_provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    /// Overrides the conversion prompt templates.
    pub fn templates(mut self, templates: ConversionTemplates) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Overrides the SQL commentary system prompt and user template.
    pub fn commentary_prompts(mut self, system_prompt: String, user_prompt: String) -> Self {
        self.commentary = Some((system_prompt, user_prompt));
        self
    }

    pub fn extractor_config(mut self, config: ExtractorConfig) -> Self {
        self.extractor_config = Some(config);
        self
    }

    /// Builds the `Converter`. Fails when no AI provider was set.
    pub fn build(self) -> Result<Converter, ConversionError> {
        let ai_provider = self.ai_provider.ok_or_else(|| {
            ConversionError::MissingAiProvider("no AI provider was given to the converter".into())
        })?;
        let (commentary_system_prompt, commentary_user_prompt) =
            self.commentary.unwrap_or_else(|| {
                (
                    SQL_COMMENTARY_SYSTEM_PROMPT.to_string(),
                    SQL_COMMENTARY_USER_PROMPT.to_string(),
                )
            });

        Ok(Converter {
            extractor: JobExtractor::new(self.extractor_config.unwrap_or_default()),
            ai_provider,
            templates: self.templates.unwrap_or_default(),
            commentary_system_prompt,
            commentary_user_prompt,
        })
    }
}
