//! Fixed-priority mode selection (`spec.md` §4.C4).

use std::path::{Path, PathBuf};

use rde_config::{Config, ExtendedMode};
use rde_protocol::{FileGroup, Mode};

/// SmartTable descriptor file name convention (Glossary): a CSV file
/// named `smarttable_*.csv` directly under `inputdata/`.
pub fn is_smarttable_descriptor(path: &Path) -> bool {
    let name = path.file_name().map(|n| n.to_string_lossy().to_lowercase()).unwrap_or_default();
    name.starts_with("smarttable_") && name.ends_with(".csv")
}

pub fn find_smarttable_descriptor(entries: &[PathBuf]) -> Option<&PathBuf> {
    entries.iter().find(|p| is_smarttable_descriptor(p))
}

/// Select the run's mode by the fixed priority order in `spec.md` §4.C4.
/// Invalid `extended_mode` values never reach this function — the Config
/// Loader rejects them first.
pub fn select_mode(file_group: &FileGroup, config: &Config, inputdata_entries: &[PathBuf]) -> Mode {
    if !file_group.excel_invoices.is_empty() {
        return Mode::ExcelInvoice;
    }
    match config.extended_mode {
        Some(ExtendedMode::MultiDataTile) => return Mode::MultiDataTile,
        Some(ExtendedMode::RdeFormat) => return Mode::RdeFormat,
        None => {}
    }
    if find_smarttable_descriptor(inputdata_entries).is_some() {
        return Mode::SmartTable;
    }
    Mode::Invoice
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn excel_invoice_wins_over_extended_mode() {
        let mut file_group = FileGroup::new();
        file_group.excel_invoices.push(PathBuf::from("x_excel_invoice.xlsx"));
        let mut config = Config::default();
        config.extended_mode = Some(ExtendedMode::MultiDataTile);
        let mode = select_mode(&file_group, &config, &[]);
        assert_eq!(mode, Mode::ExcelInvoice);
    }

    #[test]
    fn smarttable_descriptor_selects_smarttable_mode() {
        let file_group = FileGroup::new();
        let config = Config::default();
        let entries = vec![PathBuf::from("/in/smarttable_batch.csv")];
        assert_eq!(select_mode(&file_group, &config, &entries), Mode::SmartTable);
    }

    #[test]
    fn no_signals_falls_back_to_invoice() {
        let file_group = FileGroup::new();
        let config = Config::default();
        assert_eq!(select_mode(&file_group, &config, &[]), Mode::Invoice);
    }
}
