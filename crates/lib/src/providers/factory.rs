//! # AI Provider Factory
//!
//! This module centralizes the creation of AI provider instances from a
//! `ProviderConfig`. By placing this logic in the `lib` crate, any consumer
//! (server, cli, etc.) builds providers the same way.

use crate::{
    errors::ConversionError,
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
    types::ProviderConfig,
};
use std::time::Duration;
use tracing::info;

/// Instantiates the provider described by `config`.
///
/// `name` is only used in error messages and logs.
pub fn create_provider(
    name: &str,
    config: &ProviderConfig,
) -> Result<Box<dyn AiProvider>, ConversionError> {
    let timeout = Duration::from_secs(config.timeout_secs);

    let provider: Box<dyn AiProvider> = match config.provider.as_str() {
        "gemini" => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    ConversionError::MissingAiProvider(format!(
                        "api_key is required for gemini provider '{name}'"
                    ))
                })?;
            // If api_url is not provided in config, construct it from the model name.
            let api_url = config
                .api_url
                .clone()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| GeminiProvider::default_api_url(&config.model_name));
            info!(provider = name, %api_url, "Configuring Gemini provider");
            Box::new(GeminiProvider::new(api_url, api_key, timeout)?)
        }
        "local" => {
            let api_url = config
                .api_url
                .clone()
                .filter(|u| !u.is_empty())
                .ok_or_else(|| {
                    ConversionError::MissingAiProvider(format!(
                        "api_url is required for local provider '{name}'"
                    ))
                })?;
            info!(provider = name, %api_url, "Configuring local AI provider");
            Box::new(
                LocalAiProvider::new(
                    api_url,
                    config.api_key.clone().filter(|k| !k.is_empty()),
                    Some(config.model_name.clone()),
                    timeout,
                )?
                .with_api_version(config.api_version.clone().filter(|v| !v.is_empty())),
            )
        }
        other => {
            return Err(ConversionError::MissingAiProvider(format!(
                "unsupported AI provider type '{other}' for provider '{name}'"
            )))
        }
    };

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_config(provider: &str) -> ProviderConfig {
        ProviderConfig {
            provider: provider.to_string(),
            api_url: None,
            api_key: None,
            model_name: "gemini-2.0-flash".to_string(),
            api_version: None,
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_gemini_requires_api_key() {
        let err = create_provider("gemini_default", &provider_config("gemini")).unwrap_err();
        assert!(err.to_string().contains("api_key is required"));
    }

    #[test]
    fn test_local_requires_api_url() {
        let err = create_provider("local_default", &provider_config("local")).unwrap_err();
        assert!(err.to_string().contains("api_url is required"));
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let err = create_provider("x", &provider_config("bedrock")).unwrap_err();
        assert!(matches!(err, ConversionError::MissingAiProvider(_)));
    }

    #[test]
    fn test_gemini_with_key_is_built() {
        let mut config = provider_config("gemini");
        config.api_key = Some("secret".to_string());
        assert!(create_provider("gemini_default", &config).is_ok());
    }
}
