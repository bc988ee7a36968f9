//! SmartTable-row / patch driven invoice materialization (`spec.md`
//! §4.C5, entry point B).

use std::collections::BTreeMap;

use rde_protocol::error::{ValidationKind, ValidationReport};
use rde_protocol::{InvoiceDocument, Outcome};
use rde_schema::{FieldType, InvoiceSchema, MetadataDefinition};
use serde_json::Value;

/// The mutated invoice plus any `meta/`-prefixed columns, which are
/// destined for `metadata.json`'s `constant` section rather than the
/// invoice itself.
pub struct OverwriteResult {
    pub document: InvoiceDocument,
    pub metadata_updates: BTreeMap<String, Value>,
}

/// Apply a SmartTable row (or an arbitrary patch using the same
/// `column/path` syntax) onto a deep clone of `base_doc`. The clone
/// means fields the row does not touch — including `sample.ownerId` —
/// survive from `base_doc` unchanged.
///
/// An empty cell string removes the mapped field rather than writing an
/// empty value; a typed cast failure is collected as a `TypeMismatch`
/// item so every column in the row is attempted before reporting.
pub fn overwrite_invoice(
    base_doc: &InvoiceDocument,
    row: &BTreeMap<String, String>,
    schema: &InvoiceSchema,
    metadata_def: Option<&MetadataDefinition>,
) -> Outcome<OverwriteResult, ValidationReport> {
    let mut document = base_doc.deep_clone();
    let mut metadata_updates = BTreeMap::new();
    let mut report = ValidationReport::new();

    for (column_path, cell) in row {
        if let Some(metadata_name) = column_path.strip_prefix("meta/") {
            match cast_metadata_cell(metadata_name, cell, metadata_def) {
                Ok(value) => {
                    metadata_updates.insert(metadata_name.to_string(), value);
                }
                Err(detail) => report.push(column_path.clone(), ValidationKind::TypeMismatch, detail),
            }
            continue;
        }

        if cell.is_empty() {
            document.remove_path(column_path);
            continue;
        }

        let field_type = resolve_field_type(schema, column_path);
        match cast_cell(field_type, cell) {
            Ok(value) => document.set_path(column_path, value),
            Err(detail) => report.push(column_path.clone(), ValidationKind::TypeMismatch, detail),
        }
    }

    if report.is_empty() {
        Outcome::Success(OverwriteResult {
            document,
            metadata_updates,
        })
    } else {
        tracing::warn!(items = report.items.len(), "row overwrite produced invalid cells");
        Outcome::Failure(report)
    }
}

/// Resolve the declared type for a column path: first by descending the
/// schema along the path's own segments, then by a depth-first search on
/// the leaf name (covers dynamic attribute paths like
/// `sample/generalAttributes/<termId>` that the schema does not
/// literally enumerate), finally defaulting to `String` when nothing
/// declares a type.
fn resolve_field_type(schema: &InvoiceSchema, column_path: &str) -> FieldType {
    if let Some(node) = schema.find_by_column_path(column_path) {
        return node.field_type();
    }
    if let Some(leaf) = column_path.rsplit('/').next() {
        if let Some(node) = schema.find_field(leaf) {
            return node.field_type();
        }
    }
    FieldType::String
}

fn cast_metadata_cell(name: &str, cell: &str, metadata_def: Option<&MetadataDefinition>) -> Result<Value, String> {
    let field_type = metadata_def
        .and_then(|def| def.get(name))
        .and_then(|def| FieldType::parse(&def.field_type))
        .unwrap_or(FieldType::String);
    cast_cell(field_type, cell)
}

/// Cast a raw SmartTable cell string into the target field type.
/// Boolean casting is case-insensitive and strict: only `TRUE`/`FALSE`
/// (any case) are accepted; every other string for a boolean-typed
/// field is a `TypeMismatch`.
fn cast_cell(field_type: FieldType, raw: &str) -> Result<Value, String> {
    match field_type {
        FieldType::String => Ok(Value::String(raw.to_string())),
        FieldType::Boolean => match raw.to_ascii_uppercase().as_str() {
            "TRUE" => Ok(Value::Bool(true)),
            "FALSE" => Ok(Value::Bool(false)),
            _ => Err(format!("'{raw}' is not a valid boolean (expected TRUE/FALSE)")),
        },
        FieldType::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("'{raw}' is not a valid integer")),
        FieldType::Number => raw
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| format!("'{raw}' is not a valid number")),
        FieldType::Array | FieldType::Object => {
            serde_json::from_str(raw).map_err(|_| format!("'{raw}' is not valid JSON for a {}", field_type.as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> InvoiceSchema {
        InvoiceSchema::from_value(json!({
            "type": "object",
            "required": ["basic"],
            "properties": {
                "basic": {
                    "type": "object",
                    "required": ["dataName"],
                    "properties": { "dataName": {"type": "string"} }
                },
                "custom": {
                    "type": "object",
                    "properties": { "isPublic": {"type": "boolean"} }
                }
            }
        }))
        .unwrap()
    }

    fn base_with_owner() -> InvoiceDocument {
        let mut doc = InvoiceDocument::new();
        doc.set_path("sample/ownerId", json!("owner-1"));
        doc
    }

    #[test]
    fn empty_cell_removes_field_instead_of_writing_empty_string() {
        let mut base = base_with_owner();
        base.set_path("basic/dataName", json!("carried-over.csv"));
        let mut row = BTreeMap::new();
        row.insert("basic/dataName".to_string(), String::new());

        let outcome = overwrite_invoice(&base, &row, &schema(), None);
        let result = outcome.success().unwrap();
        assert_eq!(result.document.basic.get("dataName"), None);
    }

    #[test]
    fn strict_boolean_cast_accepts_only_true_false_case_insensitive() {
        let mut row = BTreeMap::new();
        row.insert("custom/isPublic".to_string(), "true".to_string());
        let outcome = overwrite_invoice(&base_with_owner(), &row, &schema(), None);
        let result = outcome.success().unwrap();
        assert_eq!(result.document.custom.get("isPublic"), Some(&json!(true)));
    }

    #[test]
    fn strict_boolean_cast_rejects_other_strings() {
        let mut row = BTreeMap::new();
        row.insert("custom/isPublic".to_string(), "yes".to_string());
        let outcome = overwrite_invoice(&base_with_owner(), &row, &schema(), None);
        match outcome {
            Outcome::Failure(report) => {
                assert!(report
                    .items
                    .iter()
                    .any(|i| i.kind == ValidationKind::TypeMismatch && i.path == "custom/isPublic"));
            }
            Outcome::Success(_) => panic!("expected a TypeMismatch"),
        }
    }

    #[test]
    fn owner_id_survives_rows_that_do_not_touch_it() {
        let mut row = BTreeMap::new();
        row.insert("basic/dataName".to_string(), "a.csv".to_string());
        let outcome = overwrite_invoice(&base_with_owner(), &row, &schema(), None);
        let result = outcome.success().unwrap();
        assert_eq!(result.document.get_path("sample/ownerId"), Some(&json!("owner-1")));
    }

    #[test]
    fn meta_prefixed_columns_route_to_metadata_updates_not_the_invoice() {
        let mut row = BTreeMap::new();
        row.insert("meta/instrument".to_string(), "XRD-200".to_string());
        let outcome = overwrite_invoice(&base_with_owner(), &row, &schema(), None);
        let result = outcome.success().unwrap();
        assert_eq!(result.metadata_updates.get("instrument"), Some(&json!("XRD-200")));
        assert!(result.document.get_path("meta/instrument").is_none());
    }
}
