//! `smarttable_*.csv` descriptor parsing for SmartTable mode
//! (`spec.md` §4.C4, Glossary "SmartTable descriptor").
//!
//! Header row specifies column paths (`basic/fieldName`, `meta/<name>`,
//! ...); one or more `inputdataN` columns bind raw files to the row's
//! tile, the same convention used for `_excel_invoice.xlsx` (see
//! `excel.rs`) since both are row-per-tile descriptors over the same
//! `column/path` syntax.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ClassifyError;

#[derive(Debug, Clone, Default)]
pub struct SmartTableRow {
    pub file_names: Vec<String>,
    pub patch: BTreeMap<String, String>,
}

/// Parse a SmartTable descriptor CSV into one row per tile, in file order.
pub fn read_smarttable(path: &Path) -> Result<Vec<SmartTableRow>, ClassifyError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| ClassifyError::MalformedSmartTable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ClassifyError::MalformedSmartTable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ClassifyError::MalformedSmartTable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut row = SmartTableRow::default();
        for (header, cell) in headers.iter().zip(record.iter()) {
            let value = cell.trim();
            if header.starts_with("inputdata") {
                if !value.is_empty() {
                    row.file_names.push(value.to_string());
                }
            } else if !header.is_empty() {
                row.patch.insert(header.clone(), value.to_string());
            }
        }
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_header_as_column_paths_and_inputdata_as_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smarttable_batch.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "inputdata1,basic/description").unwrap();
        writeln!(file, "a.csv,first").unwrap();
        writeln!(file, "b.csv,").unwrap();
        drop(file);

        let rows = read_smarttable(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].file_names, vec!["a.csv".to_string()]);
        assert_eq!(rows[0].patch.get("basic/description"), Some(&"first".to_string()));
        // Empty cell is present as an empty string, not absent: §8 requires
        // the caller (`overwrite_invoice`) to treat empty specially, the
        // reader itself does not decide that.
        assert_eq!(rows[1].patch.get("basic/description"), Some(&"".to_string()));
    }
}
