//! The closed set of recognized `${...}` patterns (`spec.md` §4.C10's
//! table), parsed as a tagged enum rather than matched ad hoc at each
//! call site (Design Note 9: dispatch over string prefixes belongs in
//! one place, not scattered `if`/`else if` chains).

use rde_protocol::TemplateError;
use serde_json::Value;

use crate::context::MagicContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MagicPattern {
    Filename,
    InvoiceBasic(String),
    InvoiceCustom(String),
    InvoiceSampleNames,
    MetadataConstant(String),
}

impl MagicPattern {
    /// Parse the token found between `${` and `}` (exclusive of the
    /// braces). `metadata:variable:*` is rejected outright here since it
    /// is never resolvable, not merely "currently missing".
    pub fn parse(token: &str) -> Result<Self, TemplateError> {
        if token == "filename" {
            return Ok(MagicPattern::Filename);
        }
        if token == "invoice:sample:names" {
            return Ok(MagicPattern::InvoiceSampleNames);
        }
        if let Some(field) = token.strip_prefix("invoice:basic:") {
            return Ok(MagicPattern::InvoiceBasic(field.to_string()));
        }
        if let Some(field) = token.strip_prefix("invoice:custom:") {
            return Ok(MagicPattern::InvoiceCustom(field.to_string()));
        }
        if let Some(field) = token.strip_prefix("metadata:constant:") {
            return Ok(MagicPattern::MetadataConstant(field.to_string()));
        }
        if let Some(name) = token.strip_prefix("metadata:variable:") {
            return Err(TemplateError::VariableMetadataRejected {
                name: name.to_string(),
            });
        }
        Err(TemplateError::UnknownPattern {
            pattern: token.to_string(),
        })
    }

    /// Resolve against `ctx`. `None` means the field the pattern names is
    /// absent — the caller turns that into a fatal `UnresolvedField`.
    pub fn resolve(&self, ctx: &MagicContext<'_>) -> Option<String> {
        match self {
            MagicPattern::Filename => ctx.filename.map(|s| s.to_string()),
            MagicPattern::InvoiceBasic(field) => ctx
                .invoice_org
                .get_path(&format!("basic/{field}"))
                .map(stringify),
            MagicPattern::InvoiceCustom(field) => ctx
                .invoice_org
                .get_path(&format!("custom/{field}"))
                .map(stringify),
            MagicPattern::InvoiceSampleNames => ctx
                .invoice_org
                .get_path("sample/names")
                .and_then(Value::as_array)
                .map(|names| {
                    names
                        .iter()
                        .filter_map(Value::as_str)
                        .filter(|name| !name.is_empty())
                        .collect::<Vec<_>>()
                        .join("_")
                }),
            MagicPattern::MetadataConstant(field) => ctx
                .metadata
                .and_then(|metadata| metadata.constant.get(field))
                .map(|entry| stringify(&entry.value)),
        }
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recognized_patterns() {
        assert_eq!(MagicPattern::parse("filename").unwrap(), MagicPattern::Filename);
        assert_eq!(
            MagicPattern::parse("invoice:basic:dataName").unwrap(),
            MagicPattern::InvoiceBasic("dataName".to_string())
        );
        assert_eq!(
            MagicPattern::parse("invoice:sample:names").unwrap(),
            MagicPattern::InvoiceSampleNames
        );
    }

    #[test]
    fn rejects_variable_metadata() {
        let err = MagicPattern::parse("metadata:variable:temperature").unwrap_err();
        assert!(matches!(err, TemplateError::VariableMetadataRejected { .. }));
    }

    #[test]
    fn rejects_unknown_pattern() {
        let err = MagicPattern::parse("bogus:thing").unwrap_err();
        assert!(matches!(err, TemplateError::UnknownPattern { .. }));
    }
}
