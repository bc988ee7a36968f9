//! Error taxonomy shared across the pipeline (`spec.md` §7).
//!
//! Each variant carries enough structured context (field path, tile index,
//! processor name) to localize a failure without re-parsing a message
//! string, following the `SchemaValidationError`/`ScoutError` convention
//! of detail-bearing enum variants over stringly-typed errors.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Configuration file not found, parse error, or schema violation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to parse config {path} at line {line}, column {column}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("config field '{field}' has an invalid value '{value}'; allowed: {allowed}")]
    InvalidValue {
        field: String,
        value: String,
        allowed: String,
    },

    #[error("config field '{field}': {message}")]
    Schema { field: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Documentation link surfaced alongside the one-line summary, when one
    /// applies. `None` for errors with no canonical reference page.
    pub fn docs_url(&self) -> Option<&'static str> {
        match self {
            ConfigError::InvalidValue { field, .. } if field == "system.extended_mode" => {
                Some("https://docs.rde-toolkit.example/config/extended-mode")
            }
            _ => None,
        }
    }
}

/// One localized validation failure within a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationItem {
    pub path: String,
    pub kind: ValidationKind,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    Missing,
    TypeMismatch,
    EnumViolation,
    ExtraProperty,
    FormatError,
    SizeExceeded,
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationKind::Missing => "Missing",
            ValidationKind::TypeMismatch => "TypeMismatch",
            ValidationKind::EnumViolation => "EnumViolation",
            ValidationKind::ExtraProperty => "ExtraProperty",
            ValidationKind::FormatError => "FormatError",
            ValidationKind::SizeExceeded => "SizeExceeded",
        };
        write!(f, "{s}")
    }
}

/// A fail-slow collection of validation failures for one document.
///
/// Validation is fail-slow *within* a document (all items are collected)
/// and fail-fast *across* documents (a catastrophic parse error aborts
/// before the next document is attempted).
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} validation error(s): {}", items.len(), summarize(items))]
pub struct ValidationReport {
    pub items: Vec<ValidationItem>,
}

fn summarize(items: &[ValidationItem]) -> String {
    items
        .iter()
        .take(3)
        .map(|i| format!("{} ({} at {})", i.detail, i.kind, i.path))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, kind: ValidationKind, detail: impl Into<String>) {
        self.items.push(ValidationItem {
            path: path.into(),
            kind,
            detail: detail.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.items.extend(other.items);
    }
}

/// Invoice/metadata validation failure with field path and kind. A thin
/// wrapper so call sites can use `?` on a single-item failure while the
/// Validator itself accumulates a full `ValidationReport`.
#[derive(Debug, Error)]
#[error("validation failed at '{}': {} ({})", item.path, item.detail, item.kind)]
pub struct ValidationError {
    pub item: ValidationItem,
}

/// Filesystem / archive-traversal / permission failure.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("archive entry '{entry}' escapes scratch root {scratch_root}")]
    ArchiveTraversal { entry: String, scratch_root: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },
}

/// Magic-variable resolution failure.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unresolved magic variable '{token}' in field '{field}'")]
    UnresolvedField { token: String, field: String },

    #[error("magic variable pattern '{pattern}' is not recognized")]
    UnknownPattern { pattern: String },

    #[error("'${{metadata:variable:{name}}}' is rejected: variable metadata is runtime-varying")]
    VariableMetadataRejected { name: String },
}

/// Identifies which pipeline processor raised a `PipelineError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorKind {
    Initializer,
    MagicVariableSubstitutor,
    Validator,
    RawCopier,
    DescriptionUpdater,
    ThumbnailGenerator,
    StructuredInvoiceSaver,
    UserDatasetFunction,
}

impl fmt::Display for ProcessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessorKind::Initializer => "Initializer",
            ProcessorKind::MagicVariableSubstitutor => "MagicVariableSubstitutor",
            ProcessorKind::Validator => "Validator",
            ProcessorKind::RawCopier => "RawCopier",
            ProcessorKind::DescriptionUpdater => "DescriptionUpdater",
            ProcessorKind::ThumbnailGenerator => "ThumbnailGenerator",
            ProcessorKind::StructuredInvoiceSaver => "StructuredInvoiceSaver",
            ProcessorKind::UserDatasetFunction => "UserDatasetFunction",
        };
        write!(f, "{s}")
    }
}

/// Wraps any fallible-boundary error with `{tile_index, processor}` context.
#[derive(Debug, Error)]
#[error("tile {tile_index} failed in {processor}: {source}")]
pub struct PipelineError {
    pub tile_index: usize,
    pub processor: ProcessorKind,
    #[source]
    pub source: PipelineErrorKind,
}

impl PipelineError {
    pub fn new(tile_index: usize, processor: ProcessorKind, source: PipelineErrorKind) -> Self {
        Self {
            tile_index,
            processor,
            source,
        }
    }

    /// Whether this error must abort the entire run (§7: `FatalError` ⊂
    /// `ConfigError` and schema-level parse failures).
    pub fn is_fatal(&self) -> bool {
        matches!(self.source, PipelineErrorKind::Fatal(_))
    }
}

#[derive(Debug, Error)]
pub enum PipelineErrorKind {
    #[error(transparent)]
    Validation(#[from] ValidationReport),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("user dataset function failed: {0}")]
    UserCallback(String),

    #[error(transparent)]
    Fatal(#[from] FatalError),
}

/// `ConfigError` and schema-level failures — propagate to the top level and
/// terminate the run (exit code 1 or 2), never isolated to a single tile.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("schema parse failure: {0}")]
    SchemaParse(String),
}

impl FatalError {
    /// Documentation link to surface alongside the one-line summary, when
    /// the underlying error has one.
    pub fn docs_url(&self) -> Option<&'static str> {
        match self {
            FatalError::Config(inner) => inner.docs_url(),
            FatalError::SchemaParse(_) => None,
        }
    }
}

/// Control-flow signal raised by a processor to end a tile early with
/// `outcome=success` without running the remaining processors. Not an
/// error — it never appears inside a `PipelineError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipRemainingProcessors;

impl fmt::Display for SkipRemainingProcessors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "remaining processors skipped")
    }
}
