//! The pipeline's first step: materialize `invoice.json` for the tile
//! (`spec.md` §4.C6 item 1, §4.C7's per-mode substitution table).

use rde_invoice::overwrite_invoice;
use rde_protocol::error::{PipelineErrorKind, ProcessorKind, ValidationKind, ValidationReport};
use rde_protocol::Outcome;
use serde_json::Value;

use crate::context::ProcessingContext;
use crate::processor::{Processor, StepOutcome};

/// Which Initializer strategy a mode wires in (`spec.md` §4.C7's
/// Initializer column, a closed dispatch table rather than a branch per
/// mode scattered through the pipeline).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializerStrategy {
    /// *Invoice*, *MultiDataTile*: clone `invoice_org` as the tile's
    /// working invoice, filling `basic.dataName` from the first input
    /// file name when absent.
    CopyFromInvoiceOrg,
    /// *ExcelInvoice*, *SmartTable*: apply the tile's row (Excel data row
    /// or SmartTable row, same `column/path` cell syntax) onto a clone of
    /// `invoice_org`.
    ApplyRow,
    /// *RDEFormat*: the invoice is already provided by the embedded
    /// archive; nothing to materialize here.
    NoOp,
}

pub struct InitializerProcessor {
    pub strategy: InitializerStrategy,
}

impl Processor for InitializerProcessor {
    fn kind(&self) -> ProcessorKind {
        ProcessorKind::Initializer
    }

    fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<StepOutcome, PipelineErrorKind> {
        match self.strategy {
            InitializerStrategy::CopyFromInvoiceOrg => {
                let mut doc = ctx.invoice_org.deep_clone();
                if doc.basic.get("dataName").is_none() {
                    if let Some(first_file) = ctx.first_input_file() {
                        if let Some(name) = first_file.file_name() {
                            doc.basic.insert(
                                "dataName".to_string(),
                                Value::String(name.to_string_lossy().to_string()),
                            );
                        }
                    }
                }
                ctx.invoice = doc;
                Ok(StepOutcome::Continue)
            }
            InitializerStrategy::ApplyRow => {
                let row = ctx.smarttable_row.clone().unwrap_or_default();
                // A row's `inputdataN` columns are what decide whether the
                // tile has a data payload; other patch columns (e.g. a
                // `meta/`-only row) do not count as one.
                ctx.no_data_payload = ctx.input_files.is_empty();

                match overwrite_invoice(&ctx.invoice_org, &row, ctx.schema, ctx.metadata_def) {
                    Outcome::Success(result) => {
                        ctx.invoice = result.document;
                        for (name, value) in result.metadata_updates {
                            ctx.metadata.constant.insert(
                                name,
                                rde_schema::MetadataValue { value, unit: None },
                            );
                        }
                        Ok(StepOutcome::Continue)
                    }
                    Outcome::Failure(report) => Err(PipelineErrorKind::Validation(report)),
                }
            }
            InitializerStrategy::NoOp => {
                let invoice_file = ctx
                    .input_files
                    .iter()
                    .find(|p| p.file_name().map(|n| n == "invoice.json").unwrap_or(false));

                match invoice_file {
                    Some(path) => match rde_protocol::InvoiceDocument::load(path) {
                        Ok(doc) => {
                            ctx.invoice = doc;
                            Ok(StepOutcome::Continue)
                        }
                        Err(e) => {
                            let mut report = ValidationReport::new();
                            report.push(
                                "invoice",
                                ValidationKind::FormatError,
                                format!("embedded invoice.json at {} is not valid: {e}", path.display()),
                            );
                            Err(PipelineErrorKind::Validation(report))
                        }
                    },
                    None => {
                        tracing::warn!(tile_index = ctx.tile_index, "RDEFormat archive missing invoice.json");
                        let mut report = ValidationReport::new();
                        report.push(
                            "invoice",
                            ValidationKind::Missing,
                            "RDEFormat archive did not contain an invoice.json",
                        );
                        Err(PipelineErrorKind::Validation(report))
                    }
                }
            }
        }
    }
}
