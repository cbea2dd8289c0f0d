//! # Talend Job Summary Extractor
//!
//! Turns the XML of a Talend `.item` job into a [`JobSummary`]. The source
//! format is externally defined and loosely populated, so every lookup here is
//! tolerant: a missing attribute becomes `None` or a documented default, and no
//! failure escapes `JobExtractor::extract`. Failures are recorded in
//! `JobSummary::error` next to whatever was collected before them.

use crate::{
    errors::ExtractionError,
    types::{Column, Component, Connection, JobSummary, ParameterValue, Schema},
};
use roxmltree::{Document, Node, ParsingOptions};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Namespace of the `Property` element carrying the job label.
pub const TALEND_PROPERTIES_NS: &str = "http://www.talend.org/properties";

/// Parameter names that only wire the job inside the authoring tool.
pub const DEFAULT_PARAMETER_DENYLIST: &[&str] = &[
    "UNIQUE_NAME",
    "COMPONENT_NAME",
    "LABEL",
    "CONNECTION_FORMAT",
    "CHECK_NUM",
    "CHECK_UNIQUE_NAME",
    "ACTIVATE",
    "LOG4J_ACTIVATE",
    "START",
    "STARTABLE",
    "SUBTREE_START",
    "END_OF_FLOW",
    "PROCESS_TYPE_VERSION",
    "PROCESS_TYPE_CONTEXT",
    "PROCESS_TYPE_PROCESS",
    "QUERYSTORE",
    "UPDATE_COMPONENTS",
    "CURRENT_OS",
];

/// Default upper bound on the number of components kept in one summary.
pub const DEFAULT_MAX_COMPONENTS: usize = 5_000;

/// The component kind whose mapping tables are copied verbatim.
const MAPPING_COMPONENT: &str = "tMap";

/// Settings for a [`JobExtractor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Parameter names never copied into `Component::parameters`.
    pub denylist: BTreeSet<String>,
    /// Extraction stops with an error once this many components were collected.
    pub max_components: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            denylist: DEFAULT_PARAMETER_DENYLIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_components: DEFAULT_MAX_COMPONENTS,
        }
    }
}

impl ExtractorConfig {
    pub fn with_max_components(mut self, max_components: usize) -> Self {
        self.max_components = max_components;
        self
    }

    pub fn with_denylist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.denylist = names.into_iter().map(Into::into).collect();
        self
    }
}

/// Parses Talend job XML into a [`JobSummary`].
///
/// The extractor holds no mutable state, so one instance can be shared
/// between threads and called concurrently.
#[derive(Debug, Clone, Default)]
pub struct JobExtractor {
    config: ExtractorConfig,
}

/// Extracts a summary using the default configuration.
pub fn extract_job_summary(xml_text: &str) -> JobSummary {
    JobExtractor::default().extract(xml_text)
}

/// Removes one leading and one trailing `"` from a value.
pub fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

impl JobExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts the job summary. Never fails; check `JobSummary::error`.
    pub fn extract(&self, xml_text: &str) -> JobSummary {
        let mut summary = JobSummary::default();

        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = match Document::parse_with_options(xml_text, options) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("XML parsing error: {e}");
                summary.error = Some(ExtractionError::MalformedInput(e.to_string()));
                return summary;
            }
        };

        if let Err(e) = self.populate(&doc, &mut summary) {
            warn!("Extraction stopped early: {e}");
            summary.error = Some(e);
        }

        info!(
            job_name = %summary.job_name,
            components = summary.components.len(),
            connections = summary.connections.len(),
            schemas = summary.metadata.len(),
            notes = summary.notes.len(),
            "Extracted job summary"
        );
        summary
    }

    fn populate(&self, doc: &Document, summary: &mut JobSummary) -> Result<(), ExtractionError> {
        let root = doc.root_element();

        if let Some(job_name) = resolve_job_name(root) {
            summary.job_name = job_name.to_string();
        }
        debug!("Found job name: {}", summary.job_name);

        for node in find_all(root, "node") {
            if summary.components.len() >= self.config.max_components {
                return Err(ExtractionError::UnexpectedExtractionFailure(format!(
                    "job defines more than {} components",
                    self.config.max_components
                )));
            }
            let component = self.extract_component(node);
            for schema in &component.metadata {
                summary.register_schema(schema);
            }
            summary.components.push(component);
        }

        for conn in find_all(root, "connection") {
            summary.connections.push(extract_connection(conn));
        }

        for note in find_all(root, "note") {
            summary.notes.push(note.attribute("text").map(str::to_string));
        }

        Ok(())
    }

    fn extract_component(&self, node: Node) -> Component {
        let component_type = node.attribute("componentName");
        let unique_name = node.attribute("uniqueName");
        let mut label = unique_name.map(str::to_string);
        let mut params = BTreeMap::new();

        for param in find_all(node, "elementParameter") {
            let field = non_empty(param.attribute("field"));
            let name = non_empty(param.attribute("name"));
            let value = param.text().or_else(|| param.attribute("value"));

            let Some(name) = name else { continue };
            if self.is_denied(name) {
                continue;
            }

            if let (Some(value), Some(_)) = (value, field) {
                params.insert(name.to_string(), ParameterValue::from(strip_quotes(value)));
            }

            if component_type == Some(MAPPING_COMPONENT) {
                match name {
                    "VAR_TABLE" => self.promote(&mut params, "tMap_variables_raw", value.into()),
                    "OUTPUT_TABLES" => self.promote(&mut params, "tMap_outputs_raw", value.into()),
                    _ => {}
                }
            } else if let Some(value) = non_empty(value) {
                let promoted = match name {
                    "QUERY" => Some("sql_query"),
                    "FILENAME" => Some("filepath"),
                    "TABLE" => Some("db_table_name"),
                    _ => None,
                };
                if let Some(key) = promoted {
                    self.promote(&mut params, key, strip_quotes(value).into());
                }
            }
        }

        if let Some(value) = first_parameter_value(node, "LABEL") {
            label = Some(strip_quotes(value).to_string());
        }
        if let Some(value) = first_parameter_value(node, "HINT") {
            if !self.is_denied("HINT") {
                self.promote(&mut params, "hint", strip_quotes(value).into());
            }
        }

        let metadata: Vec<Schema> = find_all(node, "metadata").map(extract_schema).collect();

        debug!(
            unique_name = ?unique_name,
            component_type = ?component_type,
            parameters = params.len(),
            schemas = metadata.len(),
            "Extracted component"
        );

        Component {
            component_type: component_type.map(str::to_string),
            unique_name: unique_name.map(str::to_string),
            label,
            parameters: params,
            metadata,
        }
    }

    fn is_denied(&self, name: &str) -> bool {
        self.config.denylist.contains(name)
    }

    fn promote(&self, params: &mut BTreeMap<String, ParameterValue>, key: &str, value: ParameterValue) {
        if !self.is_denied(key) {
            params.insert(key.to_string(), value);
        }
    }
}

/// Job name lookup: the labelled `Property` first, then a named `processType`.
fn resolve_job_name<'a>(root: Node<'a, '_>) -> Option<&'a str> {
    let from_property = root
        .descendants()
        .skip(1)
        .find(|n| n.has_tag_name((TALEND_PROPERTIES_NS, "Property")))
        .and_then(|n| non_empty(n.attribute("label")));

    from_property.or_else(|| {
        find_all(root, "processType")
            .next()
            .and_then(|n| non_empty(n.attribute("name")))
    })
}

fn extract_schema(meta: Node) -> Schema {
    Schema {
        connector_type: meta.attribute("connector").map(str::to_string),
        name: meta.attribute("name").map(str::to_string),
        columns: find_all(meta, "column").map(extract_column).collect(),
    }
}

fn extract_column(col: Node) -> Column {
    Column {
        name: col.attribute("name").map(str::to_string),
        talend_type: col.attribute("type").map(str::to_string),
        key: col.attribute("key").unwrap_or("false") == "true",
        nullable: col.attribute("nullable").unwrap_or("true") == "true",
        length: col.attribute("length").map(str::to_string),
        precision: col.attribute("precision").map(str::to_string),
        comment: col.attribute("comment").map(str::to_string),
        default: non_empty(col.attribute("defaultValue")).map(|v| strip_quotes(v).to_string()),
    }
}

fn extract_connection(conn: Node) -> Connection {
    Connection {
        source_component_id: conn.attribute("source").map(str::to_string),
        target_component_id: conn.attribute("target").map(str::to_string),
        connector_name: conn.attribute("connectorName").map(str::to_string),
        line_style: conn.attribute("lineStyle").map(str::to_string),
        metadata_name: conn.attribute("metaname").map(str::to_string),
    }
}

/// The non-empty `value` attribute of the first `elementParameter` named `name`.
fn first_parameter_value<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    find_all(node, "elementParameter")
        .find(|p| p.attribute("name") == Some(name))
        .and_then(|p| non_empty(p.attribute("value")))
}

/// Every element below `scope` (excluding `scope` itself) with the given local
/// name, in document order and at any depth.
fn find_all<'a, 'input: 'a>(
    scope: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    scope
        .descendants()
        .skip(1)
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
