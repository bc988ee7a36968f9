//! Errors raised while classifying an input bundle (`spec.md` §4.C4).

use rde_protocol::error::{IoError, ValidationReport};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("excel invoice workbook {path} has no data rows")]
    EmptyExcelInvoice { path: std::path::PathBuf },

    #[error("excel invoice workbook {path}: {message}")]
    MalformedExcelInvoice { path: std::path::PathBuf, message: String },

    #[error("smarttable descriptor {path}: {message}")]
    MalformedSmartTable { path: std::path::PathBuf, message: String },

    /// §4.C4's edge case: an archive that unpacks to zero files, with no
    /// other inputs present, yields zero tiles. The run still needs to
    /// surface *why* no tile was produced, so the empty-tile outcome is
    /// carried as a report rather than silently returning nothing.
    #[error(transparent)]
    NoTilesProduced(#[from] ValidationReport),
}
