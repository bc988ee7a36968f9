//! Loading `RawConfig` from YAML, TOML, or a `pyproject.toml`'s
//! `[tool.rdetoolkit]` sub-table (`spec.md` §6's on-disk layout table).

use std::path::Path;

use rde_protocol::{ConfigError, InputPaths};

use crate::config::{Config, RawConfig};

/// Load configuration for a run: prefers `tasksupport/rdeconfig.yaml`,
/// falling back to `tasksupport/pyproject.toml`'s `[tool.rdetoolkit]`
/// table when the YAML file is absent. Returns fully-resolved defaults
/// when neither is present.
pub fn load_config(input_paths: &InputPaths) -> Result<Config, ConfigError> {
    let yaml_path = input_paths.rdeconfig_yaml();
    if yaml_path.exists() {
        tracing::info!(path = %yaml_path.display(), "loading config from rdeconfig.yaml");
        return load_yaml(&yaml_path)?.resolve();
    }

    let pyproject_path = input_paths.pyproject_toml();
    if pyproject_path.exists() {
        tracing::info!(path = %pyproject_path.display(), "loading config from pyproject.toml");
        return load_pyproject(&pyproject_path)?.resolve();
    }

    tracing::info!("no config file found, using defaults");
    RawConfig::default().resolve()
}

/// Parse a `rdeconfig.yaml` document.
pub fn load_yaml(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        line: e.location().map(|l| l.line()).unwrap_or(0),
        column: e.location().map(|l| l.column()).unwrap_or(0),
        message: e.to_string(),
    })
}

/// Parse a plain `rdeconfig.toml` document (same shape as the YAML form).
pub fn load_toml(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        line: e.span().map(|s| s.start).unwrap_or(0),
        column: 0,
        message: e.to_string(),
    })
}

/// Parse the `[tool.rdetoolkit]` sub-table out of a `pyproject.toml`.
pub fn load_pyproject(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let document: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        line: e.span().map(|s| s.start).unwrap_or(0),
        column: 0,
        message: e.to_string(),
    })?;

    let sub_table = document
        .get("tool")
        .and_then(|tool| tool.get("rdetoolkit"))
        .cloned()
        .unwrap_or(toml::Value::Table(Default::default()));

    sub_table.try_into().map_err(|e: toml::de::Error| ConfigError::Schema {
        field: "tool.rdetoolkit".to_string(),
        message: e.to_string(),
    })
}
