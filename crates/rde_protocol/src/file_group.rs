//! `FileGroup`: the immutable classification of an input bundle into
//! suffix-based buckets (`spec.md` §3).

use std::path::{Path, PathBuf};

/// Immutable record of input paths classified into exactly one bucket each.
///
/// Invariant: `all_files()` equals the ordered concatenation of
/// `raw_files`, `zip_files`, `excel_invoices`, `other_files`, in that
/// order — the same order the classifier discovered them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileGroup {
    pub raw_files: Vec<PathBuf>,
    pub zip_files: Vec<PathBuf>,
    pub excel_invoices: Vec<PathBuf>,
    pub other_files: Vec<PathBuf>,
}

impl FileGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a single path into its bucket by suffix rule:
    /// `_excel_invoice.xlsx` → excel invoice, `.zip` → archive, known raw
    /// data extensions → raw, everything else → other.
    pub fn classify_one(path: &Path) -> FileBucket {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if name.ends_with("_excel_invoice.xlsx") {
            FileBucket::ExcelInvoice
        } else if name.ends_with(".zip") {
            FileBucket::Zip
        } else if is_raw_extension(&name) {
            FileBucket::Raw
        } else {
            FileBucket::Other
        }
    }

    pub fn push(&mut self, path: PathBuf) {
        match Self::classify_one(&path) {
            FileBucket::ExcelInvoice => self.excel_invoices.push(path),
            FileBucket::Zip => self.zip_files.push(path),
            FileBucket::Raw => self.raw_files.push(path),
            FileBucket::Other => self.other_files.push(path),
        }
    }

    /// Build a `FileGroup` from an ordered iterator of discovered paths.
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut group = Self::new();
        for path in paths {
            group.push(path);
        }
        group
    }

    /// Ordered concatenation of every bucket, in classifier discovery
    /// order (raw, zip, excel invoices, other).
    pub fn all_files(&self) -> Vec<PathBuf> {
        let mut all = Vec::with_capacity(
            self.raw_files.len() + self.zip_files.len() + self.excel_invoices.len() + self.other_files.len(),
        );
        all.extend(self.raw_files.iter().cloned());
        all.extend(self.zip_files.iter().cloned());
        all.extend(self.excel_invoices.iter().cloned());
        all.extend(self.other_files.iter().cloned());
        all
    }

    pub fn is_empty(&self) -> bool {
        self.raw_files.is_empty()
            && self.zip_files.is_empty()
            && self.excel_invoices.is_empty()
            && self.other_files.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileBucket {
    Raw,
    Zip,
    ExcelInvoice,
    Other,
}

fn is_raw_extension(lowercase_name: &str) -> bool {
    const RAW_EXTENSIONS: &[&str] = &[
        ".csv", ".tsv", ".txt", ".dat", ".json", ".xml", ".tif", ".tiff", ".png", ".jpg", ".jpeg",
        ".h5", ".hdf5",
    ];
    RAW_EXTENSIONS.iter().any(|ext| lowercase_name.ends_with(ext))
}
