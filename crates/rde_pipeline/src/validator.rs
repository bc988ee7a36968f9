//! Validates the tile's invoice and metadata, and owns the SmartTable
//! "no data payload" early exit (`spec.md` §4.C6 item 3, §4.C6's
//! `SkipRemainingProcessors` signal).

use rde_protocol::error::{PipelineErrorKind, ProcessorKind, ValidationReport};
use rde_protocol::{Mode, Outcome};
use rde_schema::{validate_invoice, validate_metadata};

use crate::context::ProcessingContext;
use crate::processor::{Processor, StepOutcome};

pub struct ValidatorProcessor;

impl Processor for ValidatorProcessor {
    fn kind(&self) -> ProcessorKind {
        ProcessorKind::Validator
    }

    fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<StepOutcome, PipelineErrorKind> {
        let mut report = ValidationReport::new();

        if let Outcome::Failure(r) = validate_invoice(&ctx.invoice, ctx.schema, false) {
            report.merge(r);
        }

        if let Some(def) = ctx.metadata_def {
            if let Outcome::Failure(r) = validate_metadata(&ctx.metadata, def) {
                report.merge(r);
            }
        }

        if !report.is_empty() {
            tracing::warn!(tile_index = ctx.tile_index, items = report.items.len(), "validation failed");
            return Err(PipelineErrorKind::Validation(report));
        }

        // A SmartTable row with no file references still validates, but
        // runs no further: there is nothing for RawCopier/thumbnailing to
        // act on (`spec.md` §4.C6 item 3's "row indicates no data
        // payload" early exit).
        if ctx.mode == Mode::SmartTable && ctx.no_data_payload {
            Ok(StepOutcome::SkipRemaining)
        } else {
            Ok(StepOutcome::Continue)
        }
    }
}
