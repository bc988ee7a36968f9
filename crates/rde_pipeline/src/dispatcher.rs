//! Mode → processor-sequence dispatch and the per-tile pipeline runner
//! (`spec.md` §4.C7).
//!
//! Every mode runs the same processor sequence; only the Initializer's
//! strategy varies by mode (a closed dispatch table, not a branch
//! scattered through each processor) and `RawCopier` branches internally
//! on `ctx.mode` for RDEFormat's copy-only semantics.

use rde_classifier::ClassificationResult;
use rde_config::Config;
use rde_protocol::error::{IoError, PipelineError, PipelineErrorKind, ProcessorKind};
use rde_protocol::{InputPaths, InvoiceDocument, Mode, RunSummary, TileUnit, WorkflowStatus};
use rde_schema::{InvoiceSchema, MetadataDefinition};

use crate::cancel::CancellationToken;
use crate::context::{ProcessingContext, TileStatus};
use crate::description_updater::DescriptionUpdaterProcessor;
use crate::initializer::{InitializerProcessor, InitializerStrategy};
use crate::magic_variable::MagicVariableSubstitutorProcessor;
use crate::processor::{Processor, StepOutcome};
use crate::raw_copier::RawCopierProcessor;
use crate::structured_saver::StructuredInvoiceSaverProcessor;
use crate::thumbnail::{ThumbnailBackend, ThumbnailGeneratorProcessor};
use crate::user_dataset::{DatasetFunction, UserDatasetFunctionProcessor};
use crate::validator::ValidatorProcessor;

fn initializer_strategy(mode: Mode) -> InitializerStrategy {
    match mode {
        Mode::Invoice | Mode::MultiDataTile => InitializerStrategy::CopyFromInvoiceOrg,
        Mode::ExcelInvoice | Mode::SmartTable => InitializerStrategy::ApplyRow,
        Mode::RdeFormat => InitializerStrategy::NoOp,
    }
}

/// Per-run collaborators the dispatcher does not own: the thumbnail
/// backend and an optional user dataset callback.
pub struct PipelineOptions<'f, B: ThumbnailBackend> {
    pub thumbnail_backend: B,
    pub dataset_function: Option<&'f DatasetFunction>,
}

/// Run every tile in `classification` through the Tile Pipeline in
/// order, checking `cancellation` between tiles, and return the
/// aggregated `RunSummary`.
///
/// Runs to completion unconditionally: a failed tile does not stop later
/// tiles from being attempted (`spec.md` §3's failure isolation). A
/// `FatalError` is the one exception — it sets `cancellation` itself so
/// every tile after it is reported `Skipped` rather than attempted,
/// matching §7's "propagate to the top level, never isolated to a
/// single tile."
pub fn run<B: ThumbnailBackend>(
    classification: &ClassificationResult,
    config: &Config,
    input_paths: &InputPaths,
    schema: &InvoiceSchema,
    metadata_def: Option<&MetadataDefinition>,
    invoice_org: &InvoiceDocument,
    options: &PipelineOptions<'_, B>,
    cancellation: &CancellationToken,
) -> RunSummary {
    let strategy = initializer_strategy(classification.mode);
    let processors: Vec<Box<dyn Processor + '_>> = vec![
        Box::new(InitializerProcessor { strategy }),
        Box::new(MagicVariableSubstitutorProcessor),
        Box::new(ValidatorProcessor),
        Box::new(RawCopierProcessor),
        Box::new(DescriptionUpdaterProcessor),
        Box::new(ThumbnailGeneratorProcessor {
            backend: &options.thumbnail_backend,
        }),
        Box::new(StructuredInvoiceSaverProcessor),
        Box::new(UserDatasetFunctionProcessor {
            function: options.dataset_function,
        }),
    ];

    let mut statuses = Vec::with_capacity(classification.tiles.len());

    for tile in &classification.tiles {
        if cancellation.is_cancelled() {
            tracing::warn!(tile_index = tile.index, "tile skipped: run was cancelled");
            statuses.push(WorkflowStatus::skipped(tile.index, classification.mode));
            continue;
        }

        tracing::info!(tile_index = tile.index, mode = classification.mode.as_str(), "tile start");

        let status = run_tile(
            tile,
            classification.mode,
            config,
            input_paths,
            schema,
            metadata_def,
            invoice_org,
            &processors,
        );

        match &status.error {
            Some(error) if error.is_fatal() => {
                tracing::error!(tile_index = tile.index, %error, "fatal error, cancelling remaining tiles");
                cancellation.cancel();
            }
            Some(error) => {
                tracing::warn!(tile_index = tile.index, %error, "tile failed");
            }
            None => {
                tracing::info!(tile_index = tile.index, outcome = ?status.outcome, "tile end");
            }
        }
        statuses.push(status);
    }

    RunSummary::new(statuses)
}

fn run_tile(
    tile: &TileUnit,
    mode: Mode,
    config: &Config,
    input_paths: &InputPaths,
    schema: &InvoiceSchema,
    metadata_def: Option<&MetadataDefinition>,
    invoice_org: &InvoiceDocument,
    processors: &[Box<dyn Processor + '_>],
) -> WorkflowStatus {
    if let Err(err) = tile.output_paths.ensure_dirs() {
        return WorkflowStatus::failed(
            tile.index,
            mode,
            PipelineError::new(tile.index, ProcessorKind::Initializer, PipelineErrorKind::Io(err)),
        );
    }

    let mut ctx = ProcessingContext::new(
        mode,
        config,
        input_paths,
        schema,
        metadata_def,
        tile.index,
        tile.input_files.clone(),
        tile.smarttable_row.clone(),
        tile.output_paths.clone(),
        invoice_org.deep_clone(),
    );

    for processor in processors {
        match processor.process(&mut ctx) {
            Ok(StepOutcome::Continue) => {}
            Ok(StepOutcome::SkipRemaining) => {
                ctx.status = TileStatus::Skipped;
                break;
            }
            Err(kind) => {
                ctx.status = TileStatus::Failed;
                ctx.errors.push(PipelineError::new(tile.index, processor.kind(), kind));
                break;
            }
        }
    }

    if ctx.is_failed() {
        let error = ctx.errors.into_iter().next().expect("a failed tile carries at least one error");
        return WorkflowStatus::failed(tile.index, mode, error);
    }

    if let Err(err) = finalize(&ctx) {
        return WorkflowStatus::failed(
            tile.index,
            mode,
            PipelineError::new(tile.index, ProcessorKind::StructuredInvoiceSaver, PipelineErrorKind::Io(err)),
        );
    }

    if ctx.status == TileStatus::Skipped {
        WorkflowStatus::skipped(tile.index, mode)
    } else {
        WorkflowStatus::success(tile.index, mode)
    }
}

/// Persist the tile's finalized `invoice.json`, `invoice_org/invoice.json`
/// and `metadata.json` once every processor has run without failing.
/// Not itself a named `ProcessorKind` (`spec.md` §1 describes "finalize"
/// as the pipeline's last phase, not one of the Tile Pipeline's 8 steps).
fn finalize(ctx: &ProcessingContext<'_>) -> Result<(), IoError> {
    ctx.invoice_org
        .save(&ctx.output_paths.invoice_org_json())
        .map_err(|source| IoError::Write {
            path: ctx.output_paths.invoice_org_json(),
            source,
        })?;
    ctx.invoice
        .save(&ctx.output_paths.invoice_json())
        .map_err(|source| IoError::Write {
            path: ctx.output_paths.invoice_json(),
            source,
        })?;
    ctx.metadata
        .save(&ctx.output_paths.meta().join("metadata.json"))
        .map_err(|source| IoError::Write {
            path: ctx.output_paths.meta().join("metadata.json"),
            source,
        })?;
    Ok(())
}
