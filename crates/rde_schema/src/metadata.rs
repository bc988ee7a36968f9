//! `MetadataDocument` and its definition (`spec.md` §3, Glossary
//! `MAX_VALUE_SIZE`).

use std::collections::BTreeMap;
use std::path::Path;

use rde_protocol::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upper bound on the serialized length (UTF-8 bytes of the string form)
/// of any single metadata value.
pub const MAX_VALUE_SIZE: usize = 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataValue {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MetadataDocument {
    #[serde(default)]
    pub constant: BTreeMap<String, MetadataValue>,
    #[serde(default)]
    pub variable: Vec<BTreeMap<String, MetadataValue>>,
}

impl MetadataDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let pretty = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, pretty)
    }
}

/// Type/unit declaration for a metadata key, parsed from
/// `tasksupport/metadata-def.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataFieldDef {
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub feature: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataDefinition {
    #[serde(flatten)]
    pub fields: BTreeMap<String, MetadataFieldDef>,
}

impl MetadataDefinition {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&MetadataFieldDef> {
        self.fields.get(name)
    }

    /// Feature-flagged metadata items, transcribed into the invoice
    /// description by the DescriptionUpdater (Glossary).
    pub fn feature_flagged(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, def)| def.feature)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
