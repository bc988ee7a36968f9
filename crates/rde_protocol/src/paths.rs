//! Typed wrappers for the on-disk input and output directory bundles
//! (`spec.md` §3, §6).

use std::path::{Path, PathBuf};

use crate::error::IoError;

/// Immutable bundle of directory roots supplied to a run.
///
/// Invariant: each root exists at the start of the run; `tasksupport` is
/// opened read-only and never written to by the core.
#[derive(Debug, Clone)]
pub struct InputPaths {
    inputdata: PathBuf,
    invoice: PathBuf,
    tasksupport: PathBuf,
}

impl InputPaths {
    /// Construct from the three roots, verifying each exists.
    pub fn new(
        inputdata: impl Into<PathBuf>,
        invoice: impl Into<PathBuf>,
        tasksupport: impl Into<PathBuf>,
    ) -> Result<Self, IoError> {
        let inputdata = inputdata.into();
        let invoice = invoice.into();
        let tasksupport = tasksupport.into();
        for path in [&inputdata, &invoice, &tasksupport] {
            if !path.exists() {
                return Err(IoError::Read {
                    path: path.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "required input root is missing",
                    ),
                });
            }
        }
        Ok(Self {
            inputdata,
            invoice,
            tasksupport,
        })
    }

    pub fn inputdata(&self) -> &Path {
        &self.inputdata
    }

    pub fn invoice(&self) -> &Path {
        &self.invoice
    }

    pub fn invoice_json(&self) -> PathBuf {
        self.invoice.join("invoice.json")
    }

    /// Read-only to the core; only the Archive Expander and Classifier list
    /// it, never write into it.
    pub fn tasksupport(&self) -> &Path {
        &self.tasksupport
    }

    pub fn invoice_schema_json(&self) -> PathBuf {
        self.tasksupport.join("invoice.schema.json")
    }

    pub fn metadata_def_json(&self) -> PathBuf {
        self.tasksupport.join("metadata-def.json")
    }

    pub fn rdeconfig_yaml(&self) -> PathBuf {
        self.tasksupport.join("rdeconfig.yaml")
    }

    pub fn pyproject_toml(&self) -> PathBuf {
        self.tasksupport.join("pyproject.toml")
    }
}

/// Per-tile directory bundle. Parent directories must exist before any
/// processor writes inside them; directory creation is idempotent.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    root: PathBuf,
}

impl OutputPaths {
    /// Output root for tile `index`. Tile 0 writes to `base`; tiles `i >= 1`
    /// write under `base/divided/{i:0width$}` (§4.C4's output-path layout
    /// rule — this holds uniformly across every mode, including
    /// ExcelInvoice/MultiDataTile/SmartTable: a single-row ExcelInvoice
    /// still produces its one tile at the top level, per §8's boundary
    /// behavior). `width` is the configured zero-pad digit count.
    pub fn for_tile(base: &Path, index: usize, divided_dir_digit: usize) -> Self {
        let root = if index == 0 {
            base.to_path_buf()
        } else {
            base.join("divided")
                .join(format!("{index:0width$}", width = divided_dir_digit))
        };
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw(&self) -> PathBuf {
        self.root.join("raw")
    }

    pub fn nonshared_raw(&self) -> PathBuf {
        self.root.join("nonshared_raw")
    }

    pub fn structured(&self) -> PathBuf {
        self.root.join("structured")
    }

    pub fn main_image(&self) -> PathBuf {
        self.root.join("main_image")
    }

    pub fn other_image(&self) -> PathBuf {
        self.root.join("other_image")
    }

    pub fn meta(&self) -> PathBuf {
        self.root.join("meta")
    }

    pub fn thumbnail(&self) -> PathBuf {
        self.root.join("thumbnail")
    }

    pub fn logs(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn invoice(&self) -> PathBuf {
        self.root.join("invoice")
    }

    pub fn invoice_json(&self) -> PathBuf {
        self.invoice().join("invoice.json")
    }

    pub fn invoice_schema_json(&self) -> PathBuf {
        self.root.join("invoice_schema_json")
    }

    pub fn invoice_org(&self) -> PathBuf {
        self.root.join("invoice_org")
    }

    pub fn invoice_org_json(&self) -> PathBuf {
        self.invoice_org().join("invoice.json")
    }

    /// Only present for SmartTable-mode tiles.
    pub fn smarttable_rowfile(&self) -> PathBuf {
        self.root.join("smarttable_rowfile")
    }

    pub fn temp(&self) -> PathBuf {
        self.root.join("temp")
    }

    pub fn invoice_patch(&self) -> PathBuf {
        self.root.join("invoice_patch")
    }

    pub fn attachment(&self) -> PathBuf {
        self.root.join("attachment")
    }

    /// All directories that must exist before any processor writes into
    /// this tile's tree; `temp` is created lazily by the Archive Expander.
    pub fn required_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.raw(),
            self.nonshared_raw(),
            self.structured(),
            self.main_image(),
            self.other_image(),
            self.meta(),
            self.thumbnail(),
            self.logs(),
            self.invoice(),
            self.invoice_schema_json(),
            self.invoice_org(),
            self.invoice_patch(),
            self.attachment(),
        ]
    }

    /// Idempotently create every required directory.
    pub fn ensure_dirs(&self) -> Result<(), IoError> {
        for dir in self.required_dirs() {
            std::fs::create_dir_all(&dir).map_err(|source| IoError::Write {
                path: dir,
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_zero_writes_to_base() {
        let base = Path::new("/data/out");
        let out = OutputPaths::for_tile(base, 0, 4);
        assert_eq!(out.root(), base);
    }

    #[test]
    fn later_tiles_write_to_divided_zero_padded() {
        let base = Path::new("/data/out");
        let out = OutputPaths::for_tile(base, 2, 4);
        assert_eq!(out.root(), Path::new("/data/out/divided/0002"));
    }

    #[test]
    fn divided_digit_width_is_configurable() {
        let base = Path::new("/data/out");
        let out = OutputPaths::for_tile(base, 7, 3);
        assert_eq!(out.root(), Path::new("/data/out/divided/007"));
    }

    #[test]
    fn input_paths_rejects_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        let err = InputPaths::new(tmp.path(), tmp.path(), missing);
        assert!(err.is_err());
    }
}
