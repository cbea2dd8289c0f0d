pub mod gemini;
pub mod local;

use crate::errors::ConversionError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with an AI provider.
///
/// This trait defines a common interface for text completion across
/// different Large Language Models (e.g., Gemini, OpenAI-compatible endpoints).
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    ///
    /// The result should be a string containing the AI's response.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ConversionError>;
}

dyn_clone::clone_trait_object!(AiProvider);
