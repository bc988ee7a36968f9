//! `InvoiceSchema`: the parsed JSON Schema variant (`spec.md` §3, §4.C2).

use std::path::Path;

use rde_protocol::ConfigError;
use serde_json::Value;

use crate::node::SchemaNode;

/// Parsed invoice schema. Shared, read-only across the run once loaded.
#[derive(Debug, Clone)]
pub struct InvoiceSchema {
    root: SchemaNode,
}

impl InvoiceSchema {
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let root = SchemaNode::parse(&value).ok_or_else(|| ConfigError::Schema {
            field: "$root".to_string(),
            message: "schema root must be a JSON Schema object".to_string(),
        })?;
        Ok(Self { root })
    }

    /// Parse a schema JSON file. Syntactic errors are reported with
    /// line/column; structural errors with a field path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let value: Value = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        })?;
        Self::from_value(value)
    }

    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// Top-level field/container names the schema itself declares
    /// required, verbatim — no names are injected beyond what `required`
    /// actually lists.
    pub fn required_top_level(&self) -> Vec<String> {
        self.root.required().to_vec()
    }

    pub fn find_field<'a>(&'a self, name: &str) -> Option<&'a SchemaNode> {
        self.root.find_field(name)
    }

    /// Depth-first lookup by column path (`basic/fieldName`,
    /// `sample/generalAttributes/<termId>`, ...), descending through
    /// nested `properties` along each segment rather than searching the
    /// whole tree for a leaf name.
    pub fn find_by_column_path<'a>(&'a self, column_path: &str) -> Option<&'a SchemaNode> {
        let mut segments = column_path.split('/');
        let mut current = self.root.properties()?.get(segments.next()?)?;
        for segment in segments {
            current = current.properties()?.get(segment)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_schema() -> InvoiceSchema {
        InvoiceSchema::from_value(json!({
            "type": "object",
            "required": ["basic"],
            "properties": {
                "basic": {
                    "type": "object",
                    "required": ["dataName"],
                    "properties": {
                        "dataName": {"type": "string"},
                        "experimentId": {"type": "string"}
                    }
                },
                "custom": {
                    "type": "object",
                    "properties": {
                        "isPublic": {"type": "boolean", "default": false}
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn required_top_level_reflects_schema_exactly() {
        let schema = sample_schema();
        let required = schema.required_top_level();
        assert_eq!(required, vec!["basic".to_string()]);
        assert!(!required.contains(&"datasetId".to_string()));
    }

    #[test]
    fn find_field_depth_first_search() {
        let schema = sample_schema();
        let field = schema.find_field("dataName").unwrap();
        assert_eq!(field.field_type(), crate::node::FieldType::String);
    }

    #[test]
    fn find_by_column_path_descends_segments() {
        let schema = sample_schema();
        let field = schema.find_by_column_path("custom/isPublic").unwrap();
        assert_eq!(field.field_type(), crate::node::FieldType::Boolean);
    }
}
