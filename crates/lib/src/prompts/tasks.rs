//! # Default Task Prompts
//!
//! This module contains the default, hardcoded prompt templates for the standard tasks.
//! These are loaded programmatically and can be overridden by `config.yml` or `prompt.yml`.

// --- Conversion ---
pub const CONVERSION_SYSTEM_PROMPT: &str = r#"You are an expert Talend to dbt conversion assistant. You translate Talend ETL jobs into dbt projects made of SQL models and YAML configuration. Always return SQL models in fenced code blocks marked ```sql."#;

/// Placeholders: `{job_name}`, `{components}`, `{connections}`, `{metadata}`, `{notes}`.
pub const CONVERSION_USER_PROMPT: &str = r#"Convert the provided Talend job into corresponding dbt models (SQL and YAML configuration), using the parsed summary below.

**Parsed Talend Job Summary:**
Job Name: {job_name}

Components:
```json
{components}
```

Connections:
```json
{connections}
```

Metadata:
```json
{metadata}
```

Notes:
```json
{notes}
```

**Instructions:**
1. Generate dbt SQL models (.sql files) based on the Talend job logic.
2. Include a `dbt_project.yml` configuration file.
3. Provide detailed comments in the SQL files.
4. Handle tMap components by converting mappings to SQL transformations.
5. Return SQL code blocks marked by ```sql\n...\n```."#;

/// Used instead of `CONVERSION_USER_PROMPT` when no summary could be extracted.
///
/// Placeholders: `{raw_xml}`.
pub const CONVERSION_RAW_XML_USER_PROMPT: &str = r#"Convert the following Talend item XML into its corresponding dbt models (SQL and YAML configuration). No parsed summary is available, so analyze the raw XML directly.

```xml
{raw_xml}
```

**Instructions:**
1. Generate dbt SQL models (.sql files) based on the Talend job logic.
2. Provide detailed comments in the SQL files.
3. Return SQL code blocks marked by ```sql\n...\n```."#;

// --- SQL Commentary ---
pub const SQL_COMMENTARY_SYSTEM_PROMPT: &str = r#"You are a Data Build Tool expert. Generate a properly formatted SQL file with detailed comments based on the Talend job that was converted to dbt."#;

/// Placeholders: `{raw_output}`.
pub const SQL_COMMENTARY_USER_PROMPT: &str = r#"Analyze the content provided and create comprehensive SQL models.

Raw Output:
{raw_output}

**Instructions:**
1. Create a single SQL file combining all models.
2. Add detailed comments explaining the purpose and logic of each model.
3. Ensure dbt compatibility with proper syntax.
4. Return the SQL content as plain text."#;

/// Substituted for `{raw_output}` when the request carries none.
pub const MISSING_RAW_OUTPUT: &str = "(No raw output provided)";
