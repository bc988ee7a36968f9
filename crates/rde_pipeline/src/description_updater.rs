//! Transcribes feature-flagged metadata into the invoice's
//! `basic.description` (`spec.md` §4.C6 item 5, gated by
//! `system.feature_description`).

use rde_protocol::error::{PipelineErrorKind, ProcessorKind};
use rde_schema::merged_metadata_values;
use serde_json::Value;

use crate::context::ProcessingContext;
use crate::processor::{Processor, StepOutcome};

pub struct DescriptionUpdaterProcessor;

impl Processor for DescriptionUpdaterProcessor {
    fn kind(&self) -> ProcessorKind {
        ProcessorKind::DescriptionUpdater
    }

    fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<StepOutcome, PipelineErrorKind> {
        if !ctx.config.feature_description {
            return Ok(StepOutcome::Continue);
        }
        let Some(def) = ctx.metadata_def else {
            return Ok(StepOutcome::Continue);
        };

        let merged = merged_metadata_values(&ctx.metadata);
        let lines: Vec<String> = def
            .feature_flagged()
            .into_iter()
            .filter_map(|name| merged.get(name).map(|value| format!("{name}: {}", display(value))))
            .collect();

        if lines.is_empty() {
            return Ok(StepOutcome::Continue);
        }

        let existing = ctx
            .invoice
            .basic
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let appended = if existing.is_empty() {
            lines.join("\n")
        } else {
            format!("{existing}\n{}", lines.join("\n"))
        };
        ctx.invoice
            .basic
            .insert("description".to_string(), Value::String(appended));

        Ok(StepOutcome::Continue)
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rde_config::Config;
    use rde_protocol::{InputPaths, InvoiceDocument, Mode, OutputPaths};
    use rde_schema::{MetadataDefinition, MetadataFieldDef, MetadataValue};
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn appends_feature_flagged_metadata_to_description() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["inputdata", "invoice", "tasksupport"] {
            std::fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        let input_paths = InputPaths::new(
            dir.path().join("inputdata"),
            dir.path().join("invoice"),
            dir.path().join("tasksupport"),
        )
        .unwrap();
        let mut config = Config::default();
        config.feature_description = true;
        let schema = rde_schema::InvoiceSchema::from_value(json!({"type": "object", "properties": {}})).unwrap();

        let mut fields = BTreeMap::new();
        fields.insert(
            "instrument".to_string(),
            MetadataFieldDef {
                field_type: "string".to_string(),
                unit: None,
                feature: true,
            },
        );
        let def = MetadataDefinition { fields };

        let mut ctx = ProcessingContext::new(
            Mode::Invoice,
            &config,
            &input_paths,
            &schema,
            Some(&def),
            0,
            vec![],
            None,
            OutputPaths::for_tile(dir.path(), 0, 4),
            InvoiceDocument::new(),
        );
        ctx.metadata.constant.insert(
            "instrument".to_string(),
            MetadataValue {
                value: json!("XRD-200"),
                unit: None,
            },
        );

        let processor = DescriptionUpdaterProcessor;
        processor.process(&mut ctx).unwrap();
        assert_eq!(
            ctx.invoice.basic.get("description"),
            Some(&json!("instrument: XRD-200"))
        );
    }
}
