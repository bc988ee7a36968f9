//! The resolved `Config` and its raw, mergeable on-disk representation
//! (`spec.md` §6's recognized options table).

use rde_protocol::ConfigError;
use serde::{Deserialize, Serialize};

use crate::mode::ExtendedMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracebackFormat {
    Compact,
    Full,
    Duplex,
}

impl TracebackFormat {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw {
            "compact" => Ok(TracebackFormat::Compact),
            "full" => Ok(TracebackFormat::Full),
            "duplex" => Ok(TracebackFormat::Duplex),
            other => Err(ConfigError::InvalidValue {
                field: "traceback.format".to_string(),
                value: other.to_string(),
                allowed: "compact, full, duplex".to_string(),
            }),
        }
    }
}

/// Fully-resolved configuration, with every default already applied.
#[derive(Debug, Clone)]
pub struct Config {
    pub extended_mode: Option<ExtendedMode>,
    pub save_raw: bool,
    pub save_nonshared_raw: bool,
    pub save_thumbnail_image: bool,
    pub magic_variable: bool,
    pub save_invoice_to_structured: bool,
    pub feature_description: bool,
    pub ignore_errors: bool,
    pub divided_dir_digit: usize,
    pub divided_dir_start_number: usize,
    pub smarttable_save_table_file: bool,
    pub traceback_format: TracebackFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extended_mode: None,
            save_raw: true,
            save_nonshared_raw: false,
            save_thumbnail_image: true,
            magic_variable: false,
            save_invoice_to_structured: false,
            feature_description: false,
            ignore_errors: true,
            divided_dir_digit: 4,
            divided_dir_start_number: 0,
            smarttable_save_table_file: false,
            traceback_format: TracebackFormat::Compact,
        }
    }
}

/// Raw on-disk representation. Every field is optional so a document can
/// be a complete config, a partial override, or a `[tool.rdetoolkit]`
/// sub-table — all three merge the same way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub system: RawSystem,
    #[serde(default)]
    pub multidata_tile: RawMultiDataTile,
    #[serde(default)]
    pub smarttable: RawSmartTable,
    #[serde(default)]
    pub traceback: RawTraceback,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSystem {
    #[serde(default)]
    pub extended_mode: Option<String>,
    pub save_raw: Option<bool>,
    pub save_nonshared_raw: Option<bool>,
    pub save_thumbnail_image: Option<bool>,
    pub magic_variable: Option<bool>,
    pub save_invoice_to_structured: Option<bool>,
    pub feature_description: Option<bool>,
    pub ignore_errors: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMultiDataTile {
    pub divided_dir_digit: Option<usize>,
    pub divided_dir_start_number: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSmartTable {
    pub save_table_file: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTraceback {
    pub format: Option<String>,
}

impl RawConfig {
    /// Merge `patch` over `self`, field by field; `patch`'s `Some` values
    /// win. Used to layer a base config document with a caller-supplied
    /// override (e.g. a CLI-provided patch file).
    pub fn merge(mut self, patch: RawConfig) -> RawConfig {
        self.system.extended_mode = patch.system.extended_mode.or(self.system.extended_mode);
        self.system.save_raw = patch.system.save_raw.or(self.system.save_raw);
        self.system.save_nonshared_raw = patch.system.save_nonshared_raw.or(self.system.save_nonshared_raw);
        self.system.save_thumbnail_image =
            patch.system.save_thumbnail_image.or(self.system.save_thumbnail_image);
        self.system.magic_variable = patch.system.magic_variable.or(self.system.magic_variable);
        self.system.save_invoice_to_structured = patch
            .system
            .save_invoice_to_structured
            .or(self.system.save_invoice_to_structured);
        self.system.feature_description =
            patch.system.feature_description.or(self.system.feature_description);
        self.system.ignore_errors = patch.system.ignore_errors.or(self.system.ignore_errors);

        self.multidata_tile.divided_dir_digit = patch
            .multidata_tile
            .divided_dir_digit
            .or(self.multidata_tile.divided_dir_digit);
        self.multidata_tile.divided_dir_start_number = patch
            .multidata_tile
            .divided_dir_start_number
            .or(self.multidata_tile.divided_dir_start_number);

        self.smarttable.save_table_file =
            patch.smarttable.save_table_file.or(self.smarttable.save_table_file);

        self.traceback.format = patch.traceback.format.or(self.traceback.format);

        self
    }

    /// Resolve into a fully-defaulted `Config`, validating `extended_mode`
    /// and `traceback.format` against their closed literal sets.
    pub fn resolve(self) -> Result<Config, ConfigError> {
        let defaults = Config::default();

        let extended_mode = match self.system.extended_mode {
            None => None,
            Some(raw) => ExtendedMode::parse(&raw)?,
        };

        let traceback_format = match self.traceback.format {
            None => defaults.traceback_format,
            Some(raw) => TracebackFormat::parse(&raw)?,
        };

        Ok(Config {
            extended_mode,
            save_raw: self.system.save_raw.unwrap_or(defaults.save_raw),
            save_nonshared_raw: self
                .system
                .save_nonshared_raw
                .unwrap_or(defaults.save_nonshared_raw),
            save_thumbnail_image: self
                .system
                .save_thumbnail_image
                .unwrap_or(defaults.save_thumbnail_image),
            magic_variable: self.system.magic_variable.unwrap_or(defaults.magic_variable),
            save_invoice_to_structured: self
                .system
                .save_invoice_to_structured
                .unwrap_or(defaults.save_invoice_to_structured),
            feature_description: self
                .system
                .feature_description
                .unwrap_or(defaults.feature_description),
            ignore_errors: self.system.ignore_errors.unwrap_or(defaults.ignore_errors),
            divided_dir_digit: self
                .multidata_tile
                .divided_dir_digit
                .unwrap_or(defaults.divided_dir_digit),
            divided_dir_start_number: self
                .multidata_tile
                .divided_dir_start_number
                .unwrap_or(defaults.divided_dir_start_number),
            smarttable_save_table_file: self
                .smarttable
                .save_table_file
                .unwrap_or(defaults.smarttable_save_table_file),
            traceback_format,
        })
    }
}
