//! The schema walker's tagged variant (Design Note 9 in `spec.md` §9):
//! recursion over an untyped JSON-Schema-flavored tree is unavoidable, so
//! it happens exactly once here, over a closed, typed representation,
//! rather than at every call site that needs a field's type or default.

use std::collections::BTreeMap;

use serde_json::Value;

/// A field's declared type (`spec.md` §3's `InvoiceSchema` invariant:
/// per-field `type` ∈ {string,number,integer,boolean,array,object}).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "string" => Some(FieldType::String),
            "number" => Some(FieldType::Number),
            "integer" => Some(FieldType::Integer),
            "boolean" => Some(FieldType::Boolean),
            "array" => Some(FieldType::Array),
            "object" => Some(FieldType::Object),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }
}

/// One node of the parsed schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Object {
        properties: BTreeMap<String, SchemaNode>,
        required: Vec<String>,
    },
    Array {
        items: Box<SchemaNode>,
    },
    Scalar {
        field_type: FieldType,
        default: Option<Value>,
        examples: Vec<Value>,
        enum_values: Option<Vec<Value>>,
        format: Option<String>,
    },
}

impl SchemaNode {
    pub fn field_type(&self) -> FieldType {
        match self {
            SchemaNode::Object { .. } => FieldType::Object,
            SchemaNode::Array { .. } => FieldType::Array,
            SchemaNode::Scalar { field_type, .. } => *field_type,
        }
    }

    pub fn default_value(&self) -> Option<&Value> {
        match self {
            SchemaNode::Scalar { default, .. } => default.as_ref(),
            _ => None,
        }
    }

    pub fn examples(&self) -> &[Value] {
        match self {
            SchemaNode::Scalar { examples, .. } => examples,
            _ => &[],
        }
    }

    pub fn enum_values(&self) -> Option<&[Value]> {
        match self {
            SchemaNode::Scalar { enum_values, .. } => enum_values.as_deref(),
            _ => None,
        }
    }

    pub fn format(&self) -> Option<&str> {
        match self {
            SchemaNode::Scalar { format, .. } => format.as_deref(),
            _ => None,
        }
    }

    pub fn properties(&self) -> Option<&BTreeMap<String, SchemaNode>> {
        match self {
            SchemaNode::Object { properties, .. } => Some(properties),
            _ => None,
        }
    }

    pub fn required(&self) -> &[String] {
        match self {
            SchemaNode::Object { required, .. } => required,
            _ => &[],
        }
    }

    /// Parse a single schema node from its raw JSON Schema representation.
    pub fn parse(value: &Value) -> Option<SchemaNode> {
        let obj = value.as_object()?;
        let type_str = obj.get("type").and_then(Value::as_str).unwrap_or("object");
        let field_type = FieldType::parse(type_str)?;

        match field_type {
            FieldType::Object => {
                let mut properties = BTreeMap::new();
                if let Some(props) = obj.get("properties").and_then(Value::as_object) {
                    for (name, prop_value) in props {
                        if let Some(node) = SchemaNode::parse(prop_value) {
                            properties.insert(name.clone(), node);
                        }
                    }
                }
                let required = obj
                    .get("required")
                    .and_then(Value::as_array)
                    .map(|arr| {
                        arr.iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                Some(SchemaNode::Object { properties, required })
            }
            FieldType::Array => {
                let items = obj
                    .get("items")
                    .and_then(SchemaNode::parse)
                    .unwrap_or(SchemaNode::Scalar {
                        field_type: FieldType::String,
                        default: None,
                        examples: Vec::new(),
                        enum_values: None,
                        format: None,
                    });
                Some(SchemaNode::Array {
                    items: Box::new(items),
                })
            }
            other => {
                let default = obj.get("default").cloned();
                let examples = obj
                    .get("examples")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                let enum_values = obj
                    .get("enum")
                    .and_then(Value::as_array)
                    .cloned();
                let format = obj
                    .get("format")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Some(SchemaNode::Scalar {
                    field_type: other,
                    default,
                    examples,
                    enum_values,
                    format,
                })
            }
        }
    }

    /// Depth-first search for the first field named `name`, across nested
    /// `properties` (§4.C2's `find_field`). Arrays are not descended into
    /// since column paths never index through an array.
    pub fn find_field<'a>(&'a self, name: &str) -> Option<&'a SchemaNode> {
        if let SchemaNode::Object { properties, .. } = self {
            if let Some(direct) = properties.get(name) {
                return Some(direct);
            }
            for child in properties.values() {
                if let Some(found) = child.find_field(name) {
                    return Some(found);
                }
            }
        }
        None
    }
}
