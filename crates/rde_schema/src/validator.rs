//! Invoice and metadata validation (`spec.md` §4.C2).
//!
//! Validation is fail-slow within a document — every violation is
//! collected into one `ValidationReport` rather than stopping at the
//! first — and fail-fast across documents: a catastrophic schema parse
//! error is surfaced as a `ConfigError`/`FatalError` before validation of
//! any document is attempted at all.

use std::collections::{BTreeMap, HashSet};

use rde_protocol::error::{ValidationKind, ValidationReport};
use rde_protocol::{InvoiceDocument, Outcome};
use serde_json::{Map, Value};

use crate::metadata::{MetadataDefinition, MetadataDocument, MAX_VALUE_SIZE};
use crate::node::{FieldType, SchemaNode};
use crate::schema::InvoiceSchema;

/// Enforce required keys, type compatibility, enum membership, and
/// format constraints declared by `schema`.
///
/// When `required_only` is true, only fields that are declared required
/// (directly or via the `sampleWhenRestructured` allow-shape) are type
/// checked; other present fields are left unexamined. This is the mode
/// used right after `generate_from_schema` with `required_only` set, where
/// only the mandatory skeleton is expected to be well typed yet.
pub fn validate_invoice(
    doc: &InvoiceDocument,
    schema: &InvoiceSchema,
    required_only: bool,
) -> Outcome<(), ValidationReport> {
    let mut report = ValidationReport::new();

    if schema.required_top_level().iter().any(|r| r == "datasetId") && doc.dataset_id.is_none() {
        report.push("datasetId", ValidationKind::Missing, "datasetId is required");
    }

    let properties = schema.root().properties().cloned().unwrap_or_default();
    for container in ["basic", "custom", "sample"] {
        if let Some(node) = properties.get(container) {
            let map = match container {
                "basic" => &doc.basic,
                "custom" => &doc.custom,
                "sample" => &doc.sample,
                _ => unreachable!(),
            };
            validate_object_node(container, node, map, required_only, schema, &mut report);
        }
    }

    if report.is_empty() {
        Outcome::Success(())
    } else {
        tracing::warn!(items = report.items.len(), "invoice validation failed");
        Outcome::Failure(report)
    }
}

fn validate_object_node(
    path_prefix: &str,
    node: &SchemaNode,
    map: &Map<String, Value>,
    required_only: bool,
    schema: &InvoiceSchema,
    report: &mut ValidationReport,
) {
    let (properties, required) = match node {
        SchemaNode::Object { properties, required } => (properties, required),
        _ => return,
    };

    // `sampleWhenRestructured`: an allow-shape where only `sampleId` is
    // required. If the document's `sample` satisfies that shape, it is
    // valid even though it does not satisfy the full `sample` schema.
    if path_prefix == "sample" {
        if let Some(alt) = schema.find_field("sampleWhenRestructured") {
            let alt_required = alt.required();
            let satisfies_alt = map.contains_key("sampleId")
                && alt_required.iter().all(|field| map.contains_key(field));
            if satisfies_alt {
                if let Some(alt_props) = alt.properties() {
                    for (name, field_node) in alt_props {
                        if let Some(value) = map.get(name) {
                            check_value(path_prefix, name, field_node, value, report);
                        }
                    }
                }
                return;
            }
        }
    }

    for field in required {
        if !map.contains_key(field) {
            report.push(
                format!("{path_prefix}/{field}"),
                ValidationKind::Missing,
                format!("required field '{field}' is missing"),
            );
        }
    }

    for (name, field_node) in properties {
        if let Some(value) = map.get(name) {
            if required_only && !required.contains(name) {
                continue;
            }
            check_value(path_prefix, name, field_node, value, report);
        }
    }
}

fn check_value(
    path_prefix: &str,
    name: &str,
    field_node: &SchemaNode,
    value: &Value,
    report: &mut ValidationReport,
) {
    let path = format!("{path_prefix}/{name}");

    if !type_compatible(field_node.field_type(), value) {
        report.push(
            path.clone(),
            ValidationKind::TypeMismatch,
            format!(
                "expected {}, got {}",
                field_node.field_type().as_str(),
                json_type_name(value)
            ),
        );
        return;
    }

    if let Some(enum_values) = field_node.enum_values() {
        if !enum_values.contains(value) {
            report.push(
                path.clone(),
                ValidationKind::EnumViolation,
                format!("value {value} is not one of the declared enum values"),
            );
        }
    }

    if let Some(format) = field_node.format() {
        if !format_compatible(format, value) {
            report.push(
                path,
                ValidationKind::FormatError,
                format!("value does not match format '{format}'"),
            );
        }
    }
}

fn type_compatible(field_type: FieldType, value: &Value) -> bool {
    match field_type {
        FieldType::String => value.is_string(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Integer => value.as_i64().is_some() || value.as_u64().is_some(),
        FieldType::Number => value.is_number(),
        FieldType::Array => value.is_array(),
        FieldType::Object => value.is_object(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Light format check: `date`/`date-time` values must be a string of the
/// shape `YYYY-MM-DD[...]`, without pulling in a date-parsing dependency
/// for a single hyphen-count heuristic.
fn format_compatible(format: &str, value: &Value) -> bool {
    match format {
        "date" | "date-time" => {
            let Some(s) = value.as_str() else {
                return false;
            };
            let date_part = s.split('T').next().unwrap_or(s);
            let segments: Vec<&str> = date_part.split('-').collect();
            segments.len() == 3
                && segments[0].len() == 4
                && segments.iter().all(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_ascii_digit()))
        }
        _ => true,
    }
}

/// Check each `constant`/`variable` entry against its declared type and
/// `MAX_VALUE_SIZE` length bound. A key absent from `metadata_def` is
/// reported as `ExtraProperty` — the definition is the closed set of
/// allowed metadata keys.
pub fn validate_metadata(
    doc: &MetadataDocument,
    metadata_def: &MetadataDefinition,
) -> Outcome<(), ValidationReport> {
    let mut report = ValidationReport::new();

    for (name, entry) in &doc.constant {
        validate_metadata_entry(&format!("constant/{name}"), name, &entry.value, metadata_def, &mut report);
    }

    for (index, row) in doc.variable.iter().enumerate() {
        for (name, entry) in row {
            validate_metadata_entry(
                &format!("variable[{index}]/{name}"),
                name,
                &entry.value,
                metadata_def,
                &mut report,
            );
        }
    }

    if report.is_empty() {
        Outcome::Success(())
    } else {
        tracing::warn!(items = report.items.len(), "metadata validation failed");
        Outcome::Failure(report)
    }
}

fn validate_metadata_entry(
    path: &str,
    name: &str,
    value: &Value,
    metadata_def: &MetadataDefinition,
    report: &mut ValidationReport,
) {
    let Some(def) = metadata_def.get(name) else {
        report.push(
            path.to_string(),
            ValidationKind::ExtraProperty,
            format!("metadata key '{name}' is not declared in metadata-def.json"),
        );
        return;
    };

    if let Some(expected) = FieldType::parse(&def.field_type) {
        if !type_compatible(expected, value) {
            report.push(
                path.to_string(),
                ValidationKind::TypeMismatch,
                format!("expected {}, got {}", expected.as_str(), json_type_name(value)),
            );
        }
    }

    let serialized_len = value
        .as_str()
        .map(str::len)
        .unwrap_or_else(|| value.to_string().len());
    if serialized_len > MAX_VALUE_SIZE {
        report.push(
            path.to_string(),
            ValidationKind::SizeExceeded,
            format!("serialized length {serialized_len} exceeds MAX_VALUE_SIZE ({MAX_VALUE_SIZE})"),
        );
    }
}

/// Distinct keys declared across `constant` and every `variable` row,
/// used by the DescriptionUpdater to decide precedence (`constant`
/// shadows `variable`).
pub fn metadata_keys(doc: &MetadataDocument) -> HashSet<String> {
    let mut keys: HashSet<String> = doc.constant.keys().cloned().collect();
    for row in &doc.variable {
        keys.extend(row.keys().cloned());
    }
    keys
}

/// `constant` values shadow `variable` values with the same key — return
/// the merged view used for feature-description transcription.
pub fn merged_metadata_values(doc: &MetadataDocument) -> BTreeMap<String, Value> {
    let mut merged = BTreeMap::new();
    for (name, entries) in group_variable_by_key(doc) {
        merged.insert(name, entries);
    }
    for (name, entry) in &doc.constant {
        merged.insert(name.clone(), entry.value.clone());
    }
    merged
}

fn group_variable_by_key(doc: &MetadataDocument) -> BTreeMap<String, Value> {
    let mut grouped: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for row in &doc.variable {
        for (name, entry) in row {
            grouped.entry(name.clone()).or_default().push(entry.value.clone());
        }
    }
    grouped
        .into_iter()
        .map(|(name, values)| (name, Value::Array(values)))
        .collect()
}
