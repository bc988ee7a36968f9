//! Mirrors the tile's finalized invoice into `structured/` (`spec.md`
//! §4.C6 item 7, gated by `system.save_invoice_to_structured`), so
//! downstream structured-data consumers can read invoice fields without
//! reaching into `invoice/`.

use rde_protocol::error::{IoError, PipelineErrorKind, ProcessorKind};

use crate::context::ProcessingContext;
use crate::processor::{Processor, StepOutcome};

pub struct StructuredInvoiceSaverProcessor;

impl Processor for StructuredInvoiceSaverProcessor {
    fn kind(&self) -> ProcessorKind {
        ProcessorKind::StructuredInvoiceSaver
    }

    fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<StepOutcome, PipelineErrorKind> {
        if !ctx.config.save_invoice_to_structured {
            return Ok(StepOutcome::Continue);
        }

        let dest = ctx.output_paths.structured().join("invoice.json");
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|source| IoError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        ctx.invoice
            .save(&dest)
            .map_err(|source| IoError::Write { path: dest, source })?;

        Ok(StepOutcome::Continue)
    }
}
