//! `InvoiceDocument`: the nested `basic`/`custom`/`sample`/`datasetId`
//! mapping (`spec.md` §3).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Nested invoice mapping. Backed by `serde_json::Value` objects because
/// the schema that governs its shape is itself data (parsed at runtime),
/// matching Design Note 9's guidance to model the untyped tree explicitly
/// rather than chase arbitrary JSON with ad-hoc `Value` indexing at every
/// call site — this wrapper is the one seam where that indexing lives.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct InvoiceDocument {
    #[serde(default)]
    pub basic: Map<String, Value>,
    #[serde(default)]
    pub custom: Map<String, Value>,
    #[serde(default)]
    pub sample: Map<String, Value>,
    #[serde(default, rename = "datasetId")]
    pub dataset_id: Option<String>,
}

impl InvoiceDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    pub fn load(path: &std::path::Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Self::from_json(value).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn save(&self, path: &std::path::Path) -> std::io::Result<()> {
        let value = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let pretty = serde_json::to_string_pretty(&value)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, pretty)
    }

    /// Deep clone, used to protect the base `invoice_org` document when a
    /// new per-tile mutation begins (§3's ownership note: `InvoiceDocument`
    /// instances are cloned before per-tile mutation).
    pub fn deep_clone(&self) -> Self {
        self.clone()
    }

    /// Read a field at a column-path (`basic/fieldName`, `sample/names`,
    /// `sample/generalAttributes/<termId>`, ...). Returns `None` if any
    /// path segment is absent.
    pub fn get_path(&self, column_path: &str) -> Option<&Value> {
        let mut segments = column_path.split('/');
        let section = segments.next()?;
        match section {
            "basic" => get_map_path(&self.basic, segments),
            "custom" => get_map_path(&self.custom, segments),
            "sample" => get_map_path(&self.sample, segments),
            _ => None,
        }
    }

    /// Set a field at a column-path, creating nested objects as needed.
    pub fn set_path(&mut self, column_path: &str, value: Value) {
        let mut segments: Vec<&str> = column_path.split('/').collect();
        if segments.is_empty() {
            return;
        }
        let section = segments.remove(0);
        let map = match section {
            "basic" => &mut self.basic,
            "custom" => &mut self.custom,
            "sample" => &mut self.sample,
            _ => return,
        };
        set_map_path(map, &segments, value);
    }

    /// Remove a field at a column-path. No-op if the path does not exist.
    pub fn remove_path(&mut self, column_path: &str) {
        let mut segments: Vec<&str> = column_path.split('/').collect();
        if segments.is_empty() {
            return;
        }
        let section = segments.remove(0);
        let map = match section {
            "basic" => &mut self.basic,
            "custom" => &mut self.custom,
            "sample" => &mut self.sample,
            _ => return,
        };
        remove_map_path(map, &segments);
    }
}

fn get_map_path<'a>(map: &'a Map<String, Value>, mut segments: std::str::Split<'_, char>) -> Option<&'a Value> {
    let first = segments.next()?;
    let mut current = map.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn set_map_path(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments.len() {
        0 => {}
        1 => {
            map.insert(segments[0].to_string(), value);
        }
        _ => {
            let entry = map
                .entry(segments[0].to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            set_map_path(entry.as_object_mut().unwrap(), &segments[1..], value);
        }
    }
}

fn remove_map_path(map: &mut Map<String, Value>, segments: &[&str]) {
    match segments.len() {
        0 => {}
        1 => {
            map.remove(segments[0]);
        }
        _ => {
            if let Some(entry) = map.get_mut(segments[0]).and_then(|v| v.as_object_mut()) {
                remove_map_path(entry, &segments[1..]);
            }
        }
    }
}
