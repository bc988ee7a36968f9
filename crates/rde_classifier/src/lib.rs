//! Input bundle classification and tile construction (`spec.md` §4.C4).
//!
//! # Modules
//!
//! - [`discovery`]: deterministic, noise-filtered directory listing
//! - [`mode_select`]: the fixed-priority mode selection rule
//! - [`excel`]: `_excel_invoice.xlsx` row parsing
//! - [`smarttable`]: `smarttable_*.csv` descriptor parsing
//! - [`tiles`]: per-mode `TileUnit` construction
//! - [`error`]: `ClassifyError`

pub mod discovery;
pub mod error;
pub mod excel;
pub mod mode_select;
pub mod smarttable;
pub mod tiles;

use std::path::{Path, PathBuf};

use rde_config::Config;
use rde_protocol::error::{ValidationKind, ValidationReport};
use rde_protocol::{FileGroup, InputPaths, Mode, TileUnit};

pub use error::ClassifyError;

/// Classifier output: the selected mode plus the tiles constructed for it.
#[derive(Debug)]
pub struct ClassificationResult {
    pub mode: Mode,
    pub tiles: Vec<TileUnit>,
}

/// Classify `input_paths` under `config`, writing expanded archive
/// contents under `scratch_root` and computing each tile's
/// [`rde_protocol::OutputPaths`] relative to `output_root`.
pub fn classify(
    input_paths: &InputPaths,
    config: &Config,
    output_root: &Path,
    scratch_root: &Path,
) -> Result<ClassificationResult, ClassifyError> {
    let mut entries = discovery::list_top_level_entries(input_paths.inputdata())?;

    let smarttable_descriptor = mode_select::find_smarttable_descriptor(&entries).cloned();
    let file_group = FileGroup::from_paths(entries.clone());
    let mode = mode_select::select_mode(&file_group, config, &entries);
    tracing::info!(mode = mode.as_str(), entries = entries.len(), "mode selected");

    // The descriptor/invoice-workbook itself is metadata about the run,
    // never a raw file bound to any tile; exclude it from the general
    // entry list once the mode it signals has been decided.
    if let Some(descriptor) = &smarttable_descriptor {
        if mode == Mode::SmartTable && !config.smarttable_save_table_file {
            entries.retain(|p| p != descriptor);
        }
    }

    let tiles = match mode {
        Mode::Invoice => {
            let built = tiles::build_invoice_tiles(&entries, output_root, scratch_root, config)?;
            // §4.C4 edge case: the only inputs were archives that unpacked
            // to zero files. Unlike MultiDataTile's "empty dir still yields
            // one empty tile" rule, Invoice mode reports this as a failure
            // to produce any tile rather than running an empty one.
            if !entries.is_empty() && built.iter().all(|t| t.input_files.is_empty()) {
                let mut report = ValidationReport::new();
                report.push(
                    "inputdata",
                    ValidationKind::Missing,
                    "every input archive expanded to zero files; no tile could be constructed",
                );
                return Err(ClassifyError::NoTilesProduced(report));
            }
            built
        }
        Mode::ExcelInvoice => {
            let workbook = file_group
                .excel_invoices
                .first()
                .expect("ExcelInvoice mode implies at least one excel invoice file");
            let rows = excel::read_excel_invoice(workbook)?;
            let remaining: Vec<PathBuf> = entries.into_iter().filter(|p| p != workbook).collect();
            tiles::build_excel_invoice_tiles(rows, &remaining, output_root, scratch_root, config)?
        }
        Mode::MultiDataTile => tiles::build_multidata_tiles(&entries, output_root, scratch_root, config)?,
        Mode::RdeFormat => tiles::build_rdeformat_tiles(&entries, output_root, scratch_root, config)?,
        Mode::SmartTable => {
            let descriptor = smarttable_descriptor.expect("SmartTable mode implies a descriptor was found");
            let rows = smarttable::read_smarttable(&descriptor)?;
            tiles::build_smarttable_tiles(rows, &entries, output_root, scratch_root, config)?
        }
    };

    Ok(ClassificationResult { mode, tiles })
}
