//! `TileUnit`: one logical dataset to be produced (`spec.md` §3).

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::paths::OutputPaths;

/// A dataset unit created by the Classifier, mutated only by Tile Pipeline
/// processors, and destroyed on run completion.
#[derive(Debug, Clone)]
pub struct TileUnit {
    /// 0-based position in classifier output order.
    pub index: usize,
    /// Paths bound to this tile, in classifier discovery order.
    pub input_files: Vec<PathBuf>,
    /// Present only for SmartTable-mode tiles: column name → cell string.
    pub smarttable_row: Option<BTreeMap<String, String>>,
    pub output_paths: OutputPaths,
}

impl TileUnit {
    pub fn new(index: usize, input_files: Vec<PathBuf>, output_paths: OutputPaths) -> Self {
        Self {
            index,
            input_files,
            smarttable_row: None,
            output_paths,
        }
    }

    pub fn with_smarttable_row(mut self, row: BTreeMap<String, String>) -> Self {
        self.smarttable_row = Some(row);
        self
    }

    /// The tile's first input file, used by the `${filename}` magic
    /// variable and as the default `basic.dataName` fallback.
    pub fn first_input_file(&self) -> Option<&PathBuf> {
        self.input_files.first()
    }
}
