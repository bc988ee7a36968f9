//! Scans `basic`/`custom`/`sample` string values for `${...}` tokens and
//! resolves them against a [`MagicContext`] (`spec.md` §4.C10).

use once_cell::sync::Lazy;
use regex::Regex;
use rde_protocol::{InvoiceDocument, TemplateError};
use serde_json::{Map, Value};

use crate::context::MagicContext;
use crate::pattern::MagicPattern;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]*)\}").expect("static pattern"));

/// Substitute every `${...}` token in `doc`'s `basic`/`custom`/`sample`
/// trees in place.
pub fn substitute_document(doc: &mut InvoiceDocument, ctx: &MagicContext<'_>) -> Result<(), TemplateError> {
    substitute_map(&mut doc.basic, "basic", ctx)?;
    substitute_map(&mut doc.custom, "custom", ctx)?;
    substitute_map(&mut doc.sample, "sample", ctx)?;
    Ok(())
}

fn substitute_map(map: &mut Map<String, Value>, prefix: &str, ctx: &MagicContext<'_>) -> Result<(), TemplateError> {
    for (key, value) in map.iter_mut() {
        let field_path = format!("{prefix}/{key}");
        substitute_value(value, &field_path, ctx)?;
    }
    Ok(())
}

fn substitute_value(value: &mut Value, field_path: &str, ctx: &MagicContext<'_>) -> Result<(), TemplateError> {
    match value {
        Value::String(s) => {
            *s = substitute_string(s, field_path, ctx)?;
        }
        Value::Object(obj) => {
            for (key, nested) in obj.iter_mut() {
                let nested_path = format!("{field_path}/{key}");
                substitute_value(nested, &nested_path, ctx)?;
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                substitute_value(item, field_path, ctx)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Substitute every `${...}` token in a single string. `field_path` names
/// the owning field for error messages only.
pub fn substitute_string(input: &str, field_path: &str, ctx: &MagicContext<'_>) -> Result<String, TemplateError> {
    if !input.contains("${") {
        return Ok(input.to_string());
    }

    let mut output = String::with_capacity(input.len());
    let mut last_end = 0;
    for captures in TOKEN_RE.captures_iter(input) {
        let whole = captures.get(0).expect("group 0 always matches");
        let token = captures.get(1).expect("capture group 1").as_str();

        output.push_str(&input[last_end..whole.start()]);

        let pattern = MagicPattern::parse(token)?;
        let resolved = pattern.resolve(ctx).ok_or_else(|| {
            tracing::warn!(token, field = field_path, "magic variable did not resolve");
            TemplateError::UnresolvedField {
                token: format!("${{{token}}}"),
                field: field_path.to_string(),
            }
        })?;
        output.push_str(&resolved);

        last_end = whole.end();
    }
    output.push_str(&input[last_end..]);

    Ok(collapse_underscores(&output))
}

/// Collapse runs of `_` introduced by empty substitutions down to a
/// single `_` (`spec.md` §8: "no sequence `__` ... introduced by empty
/// substitution").
fn collapse_underscores(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut last_was_underscore = false;
    for ch in input.chars() {
        if ch == '_' {
            if last_was_underscore {
                continue;
            }
            last_was_underscore = true;
        } else {
            last_was_underscore = false;
        }
        output.push(ch);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rde_schema::{MetadataDocument, MetadataValue};
    use serde_json::json;

    fn sample_invoice() -> InvoiceDocument {
        let mut doc = InvoiceDocument::new();
        doc.set_path("basic/experimentId", json!("EXP-1"));
        doc.set_path("sample/names", json!(["", "beta"]));
        doc
    }

    #[test]
    fn resolves_filename_pattern() {
        let invoice = sample_invoice();
        let ctx = MagicContext::new(Some("a.csv"), &invoice, None);
        assert_eq!(substitute_string("${filename}", "basic/dataName", &ctx).unwrap(), "a.csv");
    }

    #[test]
    fn joins_non_empty_sample_names_and_collapses_underscores() {
        let invoice = sample_invoice();
        let ctx = MagicContext::new(Some("a.csv"), &invoice, None);
        let result = substitute_string(
            "${invoice:basic:experimentId}_${invoice:sample:names}_${filename}",
            "basic/dataName",
            &ctx,
        )
        .unwrap();
        assert_eq!(result, "EXP-1_beta_a.csv");
    }

    #[test]
    fn missing_field_is_fatal() {
        let invoice = sample_invoice();
        let ctx = MagicContext::new(Some("a.csv"), &invoice, None);
        let err = substitute_string("${invoice:basic:missingField}", "basic/dataName", &ctx).unwrap_err();
        assert!(matches!(err, TemplateError::UnresolvedField { .. }));
    }

    #[test]
    fn metadata_constant_resolves_from_document() {
        let invoice = sample_invoice();
        let mut metadata = MetadataDocument::new();
        metadata.constant.insert(
            "instrument".to_string(),
            MetadataValue {
                value: json!("XRD-200"),
                unit: None,
            },
        );
        let ctx = MagicContext::new(Some("a.csv"), &invoice, Some(&metadata));
        assert_eq!(
            substitute_string("${metadata:constant:instrument}", "basic/dataName", &ctx).unwrap(),
            "XRD-200"
        );
    }

    #[test]
    fn rejects_variable_metadata_pattern() {
        let invoice = sample_invoice();
        let ctx = MagicContext::new(Some("a.csv"), &invoice, None);
        let err = substitute_string("${metadata:variable:temperature}", "basic/dataName", &ctx).unwrap_err();
        assert!(matches!(err, TemplateError::VariableMetadataRejected { .. }));
    }

    #[test]
    fn substitute_document_walks_nested_sample_objects() {
        let mut invoice = sample_invoice();
        invoice.set_path("sample/generalAttributes/termA", json!("${filename}"));
        let snapshot = invoice.clone();
        let ctx = MagicContext::new(Some("a.csv"), &snapshot, None);
        substitute_document(&mut invoice, &ctx).unwrap();
        assert_eq!(
            invoice.get_path("sample/generalAttributes/termA"),
            Some(&json!("a.csv"))
        );
    }
}
