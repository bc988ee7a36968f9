//! Schema-driven invoice generation (`spec.md` §4.C5, entry point A).

use rde_protocol::InvoiceDocument;
use rde_schema::{FieldType, InvoiceSchema, SchemaNode};
use serde_json::{Map, Value};

/// Controls for [`generate_from_schema`].
#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    /// When no explicit `default` is declared, fall back to the first
    /// `examples` entry before the type-based default.
    pub fill_defaults: bool,
    /// Only emit fields that appear in their container's `required` list.
    pub required_only: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            fill_defaults: true,
            required_only: false,
        }
    }
}

/// Materialize an `InvoiceDocument` by walking `schema`'s `basic`/`custom`/
/// `sample` containers. Default-value strategy, in priority order: the
/// field's declared `default`; the first `examples` entry when
/// `fill_defaults` is set; a type-based default (`""`, `0.0`, `0`,
/// `false`, `[]`, `{}`).
pub fn generate_from_schema(schema: &InvoiceSchema, options: &GenerateOptions) -> InvoiceDocument {
    tracing::debug!(required_only = options.required_only, "generating invoice from schema");
    let mut doc = InvoiceDocument::new();
    let top_required = schema.required_top_level();

    for container in ["basic", "custom", "sample"] {
        if options.required_only && container != "basic" && !top_required.iter().any(|r| r == container) {
            continue;
        }

        let Some(node) = schema.root().properties().and_then(|props| props.get(container)) else {
            continue;
        };

        let map = materialize_object(node, options);
        match container {
            "basic" => doc.basic = map,
            "custom" => doc.custom = map,
            "sample" => doc.sample = map,
            _ => unreachable!("loop is over a fixed container list"),
        }
    }

    doc
}

fn materialize_object(node: &SchemaNode, options: &GenerateOptions) -> Map<String, Value> {
    let mut out = Map::new();
    let SchemaNode::Object { properties, required } = node else {
        return out;
    };

    for (name, field_node) in properties {
        if options.required_only && !required.iter().any(|r| r == name) {
            continue;
        }
        out.insert(name.clone(), materialize_value(field_node, options));
    }
    out
}

fn materialize_value(node: &SchemaNode, options: &GenerateOptions) -> Value {
    match node {
        SchemaNode::Object { .. } => Value::Object(materialize_object(node, options)),
        SchemaNode::Array { .. } => Value::Array(Vec::new()),
        SchemaNode::Scalar {
            field_type,
            default,
            examples,
            ..
        } => {
            if let Some(default_value) = default {
                return default_value.clone();
            }
            if options.fill_defaults {
                if let Some(first_example) = examples.first() {
                    return first_example.clone();
                }
            }
            type_default(*field_type)
        }
    }
}

fn type_default(field_type: FieldType) -> Value {
    match field_type {
        FieldType::String => Value::String(String::new()),
        FieldType::Number => Value::from(0.0_f64),
        FieldType::Integer => Value::from(0_i64),
        FieldType::Boolean => Value::Bool(false),
        FieldType::Array => Value::Array(Vec::new()),
        FieldType::Object => Value::Object(Map::new()),
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
                    "properties": {
                        "dataName": {"type": "string"},
                        "experimentId": {"type": "string", "examples": ["EXP-001"]}
                    }
                },
                "custom": {
                    "type": "object",
                    "properties": {
                        "isPublic": {"type": "boolean", "default": true}
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn declared_default_wins_over_examples_and_type_default() {
        let doc = generate_from_schema(&schema(), &GenerateOptions::default());
        assert_eq!(doc.custom.get("isPublic"), Some(&json!(true)));
    }

    #[test]
    fn examples_used_when_fill_defaults_and_no_declared_default() {
        let doc = generate_from_schema(&schema(), &GenerateOptions::default());
        assert_eq!(doc.basic.get("experimentId"), Some(&json!("EXP-001")));
    }

    #[test]
    fn type_default_used_when_fill_defaults_disabled() {
        let options = GenerateOptions {
            fill_defaults: false,
            required_only: false,
        };
        let doc = generate_from_schema(&schema(), &options);
        assert_eq!(doc.basic.get("experimentId"), Some(&json!("")));
    }

    #[test]
    fn required_only_skips_non_required_fields() {
        let options = GenerateOptions {
            fill_defaults: true,
            required_only: true,
        };
        let doc = generate_from_schema(&schema(), &options);
        assert!(doc.basic.contains_key("dataName"));
        assert!(!doc.basic.contains_key("experimentId"));
    }
}
