//! Applies `${...}` magic-variable substitution to the tile's invoice
//! (`spec.md` §4.C6 item 2, gated by `system.magic_variable`).

use rde_magic::{substitute_document, MagicContext};
use rde_protocol::error::{PipelineErrorKind, ProcessorKind};

use crate::context::ProcessingContext;
use crate::processor::{Processor, StepOutcome};

pub struct MagicVariableSubstitutorProcessor;

impl Processor for MagicVariableSubstitutorProcessor {
    fn kind(&self) -> ProcessorKind {
        ProcessorKind::MagicVariableSubstitutor
    }

    fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<StepOutcome, PipelineErrorKind> {
        if !ctx.config.magic_variable {
            return Ok(StepOutcome::Continue);
        }

        let filename = ctx
            .first_input_file()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy());
        let magic_ctx = MagicContext::new(filename.as_deref(), &ctx.invoice_org, Some(&ctx.metadata));
        substitute_document(&mut ctx.invoice, &magic_ctx)?;
        Ok(StepOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rde_config::Config;
    use rde_protocol::{InputPaths, InvoiceDocument, Mode, OutputPaths};
    use rde_schema::InvoiceSchema;
    use serde_json::json;

    #[test]
    fn disabled_by_default_leaves_invoice_untouched() {
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
        let config = Config::default();
        let schema = InvoiceSchema::from_value(json!({"type": "object", "properties": {}})).unwrap();
        let mut ctx = ProcessingContext::new(
            Mode::Invoice,
            &config,
            &input_paths,
            &schema,
            None,
            0,
            vec![dir.path().join("a.csv")],
            None,
            OutputPaths::for_tile(dir.path(), 0, 4),
            InvoiceDocument::new(),
        );
        ctx.invoice.set_path("basic/dataName", json!("${filename}"));

        let processor = MagicVariableSubstitutorProcessor;
        processor.process(&mut ctx).unwrap();
        assert_eq!(ctx.invoice.get_path("basic/dataName"), Some(&json!("${filename}")));
    }
}
