//! The processor trait every Tile Pipeline step implements (`spec.md`
//! §4.C6): `process(ctx) -> Result<(), PipelineError>`, generalized here
//! to carry the `SkipRemainingProcessors` control-flow signal out of
//! band from ordinary errors (`spec.md` §7: it is "not an error").

use rde_protocol::error::{PipelineErrorKind, ProcessorKind};

use crate::context::ProcessingContext;

/// What a processor wants the pipeline driver to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    /// `spec.md` §4.C6's early-exit signal: end the tile now with
    /// `outcome=success`, skipping every later processor.
    SkipRemaining,
}

pub trait Processor {
    /// Identifies this step in `PipelineError`'s `{tile_index, processor}`
    /// context.
    fn kind(&self) -> ProcessorKind;

    fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<StepOutcome, PipelineErrorKind>;
}
