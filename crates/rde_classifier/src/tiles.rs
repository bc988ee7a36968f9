//! Per-mode tile construction (`spec.md` §4.C4 "Tile construction").

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rde_archive::{expand, is_archive};
use rde_config::Config;
use rde_protocol::{OutputPaths, TileUnit};

use crate::error::ClassifyError;
use crate::excel::ExcelInvoiceRow;
use crate::smarttable::SmartTableRow;

/// Output directory for tile `tile_index`, honoring the
/// `multidata_tile.divided_dir_start_number` offset applied to every
/// non-top-level tile (`spec.md` §6). Tile 0 always writes to the run
/// root regardless of the offset.
fn output_paths_for(base: &Path, tile_index: usize, config: &Config) -> OutputPaths {
    if tile_index == 0 {
        OutputPaths::for_tile(base, 0, config.divided_dir_digit)
    } else {
        let directory_number = config.divided_dir_start_number + tile_index;
        OutputPaths::for_tile(base, directory_number, config.divided_dir_digit)
    }
}

/// Expand every archive in `entries` into its own subdirectory of
/// `scratch_root`, returning the flattened, classifier-ordered file list
/// (non-archive entries interleaved in their original position, archive
/// contents in archive-internal lexicographic order) plus a
/// filename→path index used by ExcelInvoice/SmartTable's by-name binding.
fn expand_archives_and_index(
    entries: &[PathBuf],
    scratch_root: &Path,
) -> Result<(Vec<PathBuf>, BTreeMap<String, PathBuf>), ClassifyError> {
    let mut resolved = Vec::new();
    let mut index = BTreeMap::new();

    for entry in entries {
        if is_archive(entry) {
            let stem = entry
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "archive".to_string());
            let scratch_dir = scratch_root.join(stem);
            let extracted = expand(entry, &scratch_dir)?;
            for path in extracted {
                if let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) {
                    index.entry(name).or_insert_with(|| path.clone());
                }
                resolved.push(path);
            }
        } else {
            if let Some(name) = entry.file_name().map(|n| n.to_string_lossy().to_string()) {
                index.entry(name).or_insert_with(|| entry.clone());
            }
            resolved.push(entry.clone());
        }
    }

    Ok((resolved, index))
}

/// *Invoice*: exactly one tile; `input_files` = all non-archive inputs
/// plus the contents of any archive, in classifier order.
pub fn build_invoice_tiles(
    entries: &[PathBuf],
    output_root: &Path,
    scratch_root: &Path,
    config: &Config,
) -> Result<Vec<TileUnit>, ClassifyError> {
    let (input_files, _index) = expand_archives_and_index(entries, scratch_root)?;
    let output_paths = output_paths_for(output_root, 0, config);
    Ok(vec![TileUnit::new(0, input_files, output_paths)])
}

/// *ExcelInvoice*: one tile per data row; the `i`-th tile receives the
/// files referenced by the row's `inputdataN` columns.
pub fn build_excel_invoice_tiles(
    excel_rows: Vec<ExcelInvoiceRow>,
    entries: &[PathBuf],
    output_root: &Path,
    scratch_root: &Path,
    config: &Config,
) -> Result<Vec<TileUnit>, ClassifyError> {
    let (_all_files, index) = expand_archives_and_index(entries, scratch_root)?;

    let mut tiles = Vec::with_capacity(excel_rows.len());
    for (tile_index, row) in excel_rows.into_iter().enumerate() {
        let input_files = resolve_referenced_files(&row.file_names, &index);
        let output_paths = output_paths_for(output_root, tile_index, config);
        let mut tile = TileUnit::new(tile_index, input_files, output_paths);
        if !row.patch.is_empty() {
            tile = tile.with_smarttable_row(row.patch);
        }
        tiles.push(tile);
    }
    Ok(tiles)
}

/// *SmartTable*: one tile per descriptor row; the row's column/value
/// mapping is attached as `smarttable_row`.
pub fn build_smarttable_tiles(
    smarttable_rows: Vec<SmartTableRow>,
    entries: &[PathBuf],
    output_root: &Path,
    scratch_root: &Path,
    config: &Config,
) -> Result<Vec<TileUnit>, ClassifyError> {
    let (_all_files, index) = expand_archives_and_index(entries, scratch_root)?;

    let mut tiles = Vec::with_capacity(smarttable_rows.len());
    for (tile_index, row) in smarttable_rows.into_iter().enumerate() {
        let input_files = resolve_referenced_files(&row.file_names, &index);
        let output_paths = output_paths_for(output_root, tile_index, config);
        let tile = TileUnit::new(tile_index, input_files, output_paths).with_smarttable_row(row.patch);
        tiles.push(tile);
    }
    Ok(tiles)
}

/// *MultiDataTile*: one tile per top-level entry (archives expand into
/// their own tile). An empty `inputdata/` still yields one empty tile so
/// validators run (`spec.md` §4.C4 edge case).
pub fn build_multidata_tiles(
    entries: &[PathBuf],
    output_root: &Path,
    scratch_root: &Path,
    config: &Config,
) -> Result<Vec<TileUnit>, ClassifyError> {
    if entries.is_empty() {
        let output_paths = output_paths_for(output_root, 0, config);
        return Ok(vec![TileUnit::new(0, Vec::new(), output_paths)]);
    }

    let mut tiles = Vec::with_capacity(entries.len());
    for (tile_index, entry) in entries.iter().enumerate() {
        let input_files = if is_archive(entry) {
            let stem = entry
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "archive".to_string());
            let scratch_dir = scratch_root.join(format!("tile_{tile_index:04}_{stem}"));
            expand(entry, &scratch_dir)?
        } else {
            vec![entry.clone()]
        };
        let output_paths = output_paths_for(output_root, tile_index, config);
        tiles.push(TileUnit::new(tile_index, input_files, output_paths));
    }
    Ok(tiles)
}

/// *RDEFormat*: one tile per embedded dataset archive (`rdeformat_*.zip`).
pub fn build_rdeformat_tiles(
    entries: &[PathBuf],
    output_root: &Path,
    scratch_root: &Path,
    config: &Config,
) -> Result<Vec<TileUnit>, ClassifyError> {
    let mut rdeformat_archives: Vec<&PathBuf> = entries
        .iter()
        .filter(|p| {
            let name = p.file_name().map(|n| n.to_string_lossy().to_lowercase()).unwrap_or_default();
            name.starts_with("rdeformat_") && name.ends_with(".zip")
        })
        .collect();
    rdeformat_archives.sort();

    let mut tiles = Vec::with_capacity(rdeformat_archives.len());
    for (tile_index, archive) in rdeformat_archives.into_iter().enumerate() {
        let stem = archive
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "rdeformat".to_string());
        let scratch_dir = scratch_root.join(stem);
        let input_files = expand(archive, &scratch_dir)?;
        let output_paths = output_paths_for(output_root, tile_index, config);
        tiles.push(TileUnit::new(tile_index, input_files, output_paths));
    }
    Ok(tiles)
}

/// Resolve row-referenced file names against the classifier's
/// filename→path index, falling back to the bare name (relative to
/// whichever root the caller resolves it against) when the index has no
/// entry — keeps a malformed reference visible downstream as a missing
/// raw file rather than silently dropped.
fn resolve_referenced_files(file_names: &[String], index: &BTreeMap<String, PathBuf>) -> Vec<PathBuf> {
    file_names
        .iter()
        .map(|name| index.get(name).cloned().unwrap_or_else(|| PathBuf::from(name)))
        .collect()
}
