//! # Prompt Template Modules
//!
//! This module organizes the prompt templates used by the conversion pipeline
//! and the logic that renders a `JobSummary` into them.

pub mod builder;
pub mod tasks;

pub use builder::{
    build_commentary_prompt, build_conversion_prompt, ConversionTemplates, PromptPair,
};
