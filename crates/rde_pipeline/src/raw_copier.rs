//! Copies raw input files into the tile's output tree (`spec.md` §4.C6
//! item 4).

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use rde_protocol::error::{IoError, PipelineErrorKind, ProcessorKind};
use rde_protocol::Mode;

use crate::context::ProcessingContext;
use crate::image_ext::is_image;
use crate::processor::{Processor, StepOutcome};

pub struct RawCopierProcessor;

impl Processor for RawCopierProcessor {
    fn kind(&self) -> ProcessorKind {
        ProcessorKind::RawCopier
    }

    fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<StepOutcome, PipelineErrorKind> {
        if ctx.mode == Mode::RdeFormat {
            return copy_only(ctx);
        }

        if !ctx.config.save_raw && !ctx.config.save_nonshared_raw {
            return Ok(StepOutcome::Continue);
        }

        let raw_dir = ctx.output_paths.raw();
        let nonshared_dir = ctx.output_paths.nonshared_raw();
        let main_image_dir = ctx.output_paths.main_image();
        let other_image_dir = ctx.output_paths.other_image();
        let mut seen_main_image = false;

        for input in &ctx.input_files {
            let Some(name) = input.file_name() else { continue };

            if is_image(input) {
                let dest_dir = if !seen_main_image {
                    seen_main_image = true;
                    &main_image_dir
                } else {
                    &other_image_dir
                };
                copy_into(input, dest_dir, name)?;
                continue;
            }

            if ctx.config.save_raw {
                copy_into(input, &raw_dir, name)?;
            }
            if ctx.config.save_nonshared_raw {
                copy_into(input, &nonshared_dir, name)?;
            }
        }

        tracing::debug!(tile_index = ctx.tile_index, files = ctx.input_files.len(), "raw files copied");
        Ok(StepOutcome::Continue)
    }
}

/// RDEFormat mode: the expanded archive already holds the final directory
/// tree (`raw/`, `main_image/`, `meta/`, ...); copy it wholesale instead
/// of re-splitting files by extension.
fn copy_only(ctx: &mut ProcessingContext<'_>) -> Result<StepOutcome, PipelineErrorKind> {
    let Some(tile_root) = common_parent(&ctx.input_files) else {
        return Ok(StepOutcome::Continue);
    };

    for input in &ctx.input_files {
        if input.file_name() == Some(OsStr::new("invoice.json")) {
            continue;
        }
        let Ok(relative) = input.strip_prefix(&tile_root) else {
            continue;
        };
        let dest = ctx.output_paths.root().join(relative);
        copy_file(input, &dest)?;
    }
    Ok(StepOutcome::Continue)
}

fn copy_into(src: &Path, dest_dir: &Path, name: &OsStr) -> Result<(), PipelineErrorKind> {
    copy_file(src, &dest_dir.join(name))
}

fn copy_file(src: &Path, dest: &Path) -> Result<(), PipelineErrorKind> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|source| IoError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::copy(src, dest).map_err(|source| IoError::Write {
        path: dest.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn common_parent(paths: &[PathBuf]) -> Option<PathBuf> {
    Some(paths.first()?.parent()?.to_path_buf())
}
