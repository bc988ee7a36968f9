//! The per-tile Tile Pipeline and the mode dispatcher that drives it
//! across every tile the Classifier built (`spec.md` §4.C6, §4.C7).
//!
//! # Modules
//!
//! - [`context`]: `ProcessingContext`, the per-tile mutable record
//! - [`processor`]: the `Processor` trait and `StepOutcome`
//! - [`initializer`]: materializes the tile's working invoice
//! - [`magic_variable`]: `${...}` substitution over the invoice
//! - [`validator`]: invoice/metadata validation, SmartTable early exit
//! - [`raw_copier`]: copies raw/image files into the tile's output tree
//! - [`description_updater`]: feature-flagged metadata → `basic.description`
//! - [`thumbnail`]: thumbnail generation and its backend seam
//! - [`structured_saver`]: mirrors the invoice into `structured/`
//! - [`user_dataset`]: the user-supplied dataset callback and `DatasetPaths`
//! - [`dispatcher`]: mode → processor sequence, the per-tile runner, `RunSummary` aggregation
//! - [`cancel`]: cooperative, between-tiles `CancellationToken`

pub mod cancel;
pub mod context;
pub mod description_updater;
pub mod dispatcher;
pub mod image_ext;
pub mod initializer;
pub mod magic_variable;
pub mod processor;
pub mod raw_copier;
pub mod structured_saver;
pub mod thumbnail;
pub mod user_dataset;
pub mod validator;

pub use cancel::CancellationToken;
pub use context::{ProcessingContext, TileStatus};
pub use dispatcher::{run, PipelineOptions};
pub use processor::{Processor, StepOutcome};
pub use thumbnail::{CopyThumbnailBackend, ThumbnailBackend};
pub use user_dataset::{DatasetFunction, DatasetPaths};
