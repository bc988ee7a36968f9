//! The user-supplied dataset processing callback (`spec.md` §4.C6 item
//! 8, §1's named collaborator boundary: user code, not this crate, owns
//! what happens to the tile's files from here).

use std::path::PathBuf;

use rde_protocol::error::{PipelineErrorKind, ProcessorKind};
use rde_protocol::OutputPaths;

use crate::context::ProcessingContext;
use crate::processor::{Processor, StepOutcome};

/// The directories a user dataset function is handed, named the way the
/// tile's own `OutputPaths` names them so a callback can be written
/// without reaching into pipeline internals.
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    pub raw: PathBuf,
    pub nonshared_raw: PathBuf,
    pub structured: PathBuf,
    pub main_image: PathBuf,
    pub other_image: PathBuf,
    pub meta: PathBuf,
    pub thumbnail: PathBuf,
    pub logs: PathBuf,
    pub invoice: PathBuf,
    pub invoice_schema_json: PathBuf,
    pub attachment: PathBuf,
}

impl DatasetPaths {
    pub fn from_output_paths(paths: &OutputPaths) -> Self {
        Self {
            raw: paths.raw(),
            nonshared_raw: paths.nonshared_raw(),
            structured: paths.structured(),
            main_image: paths.main_image(),
            other_image: paths.other_image(),
            meta: paths.meta(),
            thumbnail: paths.thumbnail(),
            logs: paths.logs(),
            invoice: paths.invoice(),
            invoice_schema_json: paths.invoice_schema_json(),
            attachment: paths.attachment(),
        }
    }
}

/// Signature of a user-supplied dataset function. Failures here surface
/// through `anyhow`, not this crate's typed errors — user callback code
/// sits outside the `thiserror` taxonomy boundary (`spec.md` §7).
pub type DatasetFunction = dyn Fn(&DatasetPaths) -> anyhow::Result<()> + Send + Sync;

pub struct UserDatasetFunctionProcessor<'f> {
    pub function: Option<&'f DatasetFunction>,
}

impl<'f> Processor for UserDatasetFunctionProcessor<'f> {
    fn kind(&self) -> ProcessorKind {
        ProcessorKind::UserDatasetFunction
    }

    fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<StepOutcome, PipelineErrorKind> {
        let Some(function) = self.function else {
            return Ok(StepOutcome::Continue);
        };
        let paths = DatasetPaths::from_output_paths(&ctx.output_paths);
        function(&paths).map_err(|e| {
            tracing::error!(tile_index = ctx.tile_index, error = %e, "user dataset function failed");
            PipelineErrorKind::UserCallback(e.to_string())
        })?;
        Ok(StepOutcome::Continue)
    }
}
