//! `ProcessingContext`: the per-tile mutable record threaded through the
//! pipeline's processors (`spec.md` §3).

use std::collections::BTreeMap;
use std::path::PathBuf;

use rde_config::Config;
use rde_protocol::error::PipelineError;
use rde_protocol::{InputPaths, InvoiceDocument, Mode, OutputPaths};
use rde_schema::{InvoiceSchema, MetadataDefinition, MetadataDocument};

/// Once a processor appends a terminal error the tile's status moves to
/// `Failed`; later processors observe this and must not write outputs
/// other than logs (`spec.md` §3's `ProcessingContext` invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileStatus {
    Running,
    Success,
    Skipped,
    Failed,
}

pub struct ProcessingContext<'a> {
    pub mode: Mode,
    pub config: &'a Config,
    pub input_paths: &'a InputPaths,
    pub schema: &'a InvoiceSchema,
    pub metadata_def: Option<&'a MetadataDefinition>,
    pub tile_index: usize,
    pub input_files: Vec<PathBuf>,
    pub smarttable_row: Option<BTreeMap<String, String>>,
    pub output_paths: OutputPaths,

    /// `invoice_org`, read-only across every tile's mutation.
    pub invoice_org: InvoiceDocument,
    /// The tile's own working invoice, mutated in place by the
    /// Initializer and every processor after it.
    pub invoice: InvoiceDocument,
    pub metadata: MetadataDocument,

    /// Set true by the Initializer when a SmartTable row carries no raw
    /// file references (`spec.md` §4.C6's "row indicates no data
    /// payload"); consulted by the Validator to decide early exit.
    pub no_data_payload: bool,

    pub errors: Vec<PipelineError>,
    pub status: TileStatus,
}

impl<'a> ProcessingContext<'a> {
    pub fn new(
        mode: Mode,
        config: &'a Config,
        input_paths: &'a InputPaths,
        schema: &'a InvoiceSchema,
        metadata_def: Option<&'a MetadataDefinition>,
        tile_index: usize,
        input_files: Vec<PathBuf>,
        smarttable_row: Option<BTreeMap<String, String>>,
        output_paths: OutputPaths,
        invoice_org: InvoiceDocument,
    ) -> Self {
        Self {
            mode,
            config,
            input_paths,
            schema,
            metadata_def,
            tile_index,
            input_files,
            smarttable_row,
            output_paths,
            invoice_org,
            invoice: InvoiceDocument::new(),
            metadata: MetadataDocument::new(),
            no_data_payload: false,
            errors: Vec::new(),
            status: TileStatus::Running,
        }
    }

    /// The tile's first input file, used by `${filename}` and as the
    /// `basic.dataName` fallback.
    pub fn first_input_file(&self) -> Option<&PathBuf> {
        self.input_files.first()
    }

    pub fn is_failed(&self) -> bool {
        self.status == TileStatus::Failed
    }
}
