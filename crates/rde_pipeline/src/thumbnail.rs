//! Thumbnail generation (`spec.md` §4.C6 item 6, gated by
//! `system.save_thumbnail_image`).
//!
//! Real image resizing is a named out-of-core collaborator (`spec.md`
//! §1/§6's Non-goals); this module owns only the invocation point and a
//! default stand-in backend.

use std::path::Path;

use rde_protocol::error::{IoError, PipelineErrorKind, ProcessorKind};

use crate::context::ProcessingContext;
use crate::image_ext::is_image;
use crate::processor::{Processor, StepOutcome};

/// The seam a real thumbnailing backend plugs into.
pub trait ThumbnailBackend {
    fn generate(&self, source: &Path, dest: &Path) -> std::io::Result<()>;
}

/// Copies the source image unchanged. Exercises the pipeline wiring and
/// the `save_thumbnail_image` gate without pulling in an image codec.
pub struct CopyThumbnailBackend;

impl ThumbnailBackend for CopyThumbnailBackend {
    fn generate(&self, source: &Path, dest: &Path) -> std::io::Result<()> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(source, dest)?;
        Ok(())
    }
}

impl<T: ThumbnailBackend + ?Sized> ThumbnailBackend for &T {
    fn generate(&self, source: &Path, dest: &Path) -> std::io::Result<()> {
        (**self).generate(source, dest)
    }
}

pub struct ThumbnailGeneratorProcessor<B: ThumbnailBackend> {
    pub backend: B,
}

impl<B: ThumbnailBackend> Processor for ThumbnailGeneratorProcessor<B> {
    fn kind(&self) -> ProcessorKind {
        ProcessorKind::ThumbnailGenerator
    }

    fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<StepOutcome, PipelineErrorKind> {
        if !ctx.config.save_thumbnail_image {
            return Ok(StepOutcome::Continue);
        }

        let Some(source) = ctx.first_input_file().filter(|p| is_image(p)) else {
            return Ok(StepOutcome::Continue);
        };
        let Some(name) = source.file_name() else {
            return Ok(StepOutcome::Continue);
        };

        let dest = ctx.output_paths.thumbnail().join(name);
        self.backend.generate(source, &dest).map_err(|source| {
            tracing::warn!(tile_index = ctx.tile_index, dest = %dest.display(), %source, "thumbnail generation failed");
            PipelineErrorKind::Io(IoError::Write { path: dest, source })
        })?;
        Ok(StepOutcome::Continue)
    }
}
