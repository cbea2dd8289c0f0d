//! # Converter Logic Tests
//!
//! Runs the full extraction → prompt → model pipeline with a scripted AI
//! provider, so no network access is needed.

use talend2dbt::{ConversionError, Converter, ExtractionError, ExtractorConfig};
use talend2dbt_test_utils::{
    fixtures::{MALFORMED_JOB, ORDERS_JOB_ITEM, TWO_MODEL_COMPLETION},
    MockAiProvider,
};

fn converter_with(mock: &MockAiProvider) -> Converter {
    Converter::builder()
        .ai_provider(Box::new(mock.clone()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_convert_returns_model_answer() {
    let mock = MockAiProvider::new();
    mock.add_response("Talend to dbt conversion", TWO_MODEL_COMPLETION);
    let converter = converter_with(&mock);

    let outcome = converter.convert(ORDERS_JOB_ITEM).await.unwrap();

    assert_eq!(outcome.raw_output, TWO_MODEL_COMPLETION);
    assert_eq!(outcome.summary.job_name, "orders_daily_load");
    assert_eq!(outcome.summary.components.len(), 4);

    let calls = mock.get_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, outcome.prompt.system);
    assert_eq!(calls[0].1, outcome.prompt.user);
    assert!(calls[0].1.contains("Job Name: orders_daily_load"));
}

#[tokio::test]
async fn test_malformed_job_is_rejected_before_model_call() {
    let mock = MockAiProvider::new();
    mock.add_response("Talend to dbt conversion", TWO_MODEL_COMPLETION);
    let converter = converter_with(&mock);

    let err = converter.convert(MALFORMED_JOB).await.unwrap_err();

    assert!(matches!(
        err,
        ConversionError::Extraction(ExtractionError::MalformedInput(_))
    ));
    assert!(mock.get_calls().is_empty());
}

#[tokio::test]
async fn test_component_limit_aborts_conversion() {
    let mock = MockAiProvider::new();
    let converter = Converter::builder()
        .ai_provider(Box::new(mock.clone()))
        .extractor_config(ExtractorConfig::default().with_max_components(1))
        .build()
        .unwrap();

    let err = converter.convert(ORDERS_JOB_ITEM).await.unwrap_err();
    assert!(matches!(
        err,
        ConversionError::Extraction(ExtractionError::UnexpectedExtractionFailure(_))
    ));
    assert!(mock.get_calls().is_empty());
}

#[tokio::test]
async fn test_provider_error_is_propagated() {
    // Nothing programmed: the mock answers with an API error.
    let mock = MockAiProvider::new();
    let converter = converter_with(&mock);

    let err = converter.convert(ORDERS_JOB_ITEM).await.unwrap_err();
    assert!(matches!(err, ConversionError::AiApi(_)));
    assert_eq!(mock.get_calls().len(), 1);
}

#[tokio::test]
async fn test_comment_sql_uses_commentary_prompt() {
    let mock = MockAiProvider::new();
    mock.add_response("Data Build Tool expert", "-- commented\nselect 1");
    let converter = converter_with(&mock);

    let sql = converter.comment_sql(Some("```sql\nselect 1\n```")).await.unwrap();
    assert_eq!(sql, "-- commented\nselect 1");

    let calls = mock.get_calls();
    assert!(calls[0].1.contains("Raw Output:\n```sql\nselect 1\n```"));
}

#[tokio::test]
async fn test_custom_commentary_prompts() {
    let mock = MockAiProvider::new();
    mock.add_response("house style", "ok");
    let converter = Converter::builder()
        .ai_provider(Box::new(mock.clone()))
        .commentary_prompts("Use the house style.".into(), "Answer: {raw_output}".into())
        .build()
        .unwrap();

    converter.comment_sql(None).await.unwrap();
    assert_eq!(mock.get_calls()[0].1, "Answer: (No raw output provided)");
}

#[test]
fn test_builder_requires_provider() {
    let err = Converter::builder().build().unwrap_err();
    assert!(matches!(err, ConversionError::MissingAiProvider(_)));
}

#[test]
fn test_summarize_does_not_call_model() {
    let mock = MockAiProvider::new();
    let converter = converter_with(&mock);
    let summary = converter.summarize(ORDERS_JOB_ITEM);
    assert_eq!(summary.connections.len(), 3);
    assert!(mock.get_calls().is_empty());
}
