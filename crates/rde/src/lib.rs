//! Facade crate: wires config loading, classification, and the Tile
//! Pipeline into a single [`run`] entry point (`spec.md` §1, §6).
//!
//! Nothing in this crate is itself a core component — it is the thin
//! orchestration layer a caller (the `rde` binary, or an embedder linking
//! this crate directly) goes through to run the pipeline over one input
//! bundle.

use std::path::PathBuf;

use rde_classifier::ClassifyError;
use rde_protocol::error::{ConfigError, FatalError};
use rde_protocol::{InputPaths, InvoiceDocument, RunSummary};
use rde_schema::{InvoiceSchema, MetadataDefinition};

pub use rde_pipeline::{CancellationToken, CopyThumbnailBackend, DatasetFunction, DatasetPaths, ThumbnailBackend};

/// The directory roots one run reads from and writes to.
///
/// `inputdata`/`invoice`/`tasksupport` are `spec.md` §6's three input
/// roots; `output_root` is where tile 0 and `divided/NNNN` siblings land;
/// `scratch_root` is where the Archive Expander unpacks archives (removed
/// at the caller's discretion once the run completes, per §5's "scoped
/// temp-directory acquisition with guaranteed release").
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub inputdata: PathBuf,
    pub invoice: PathBuf,
    pub tasksupport: PathBuf,
    pub output_root: PathBuf,
    pub scratch_root: PathBuf,
}

/// Errors that abort the whole run before or outside any single tile's
/// processing — config/schema problems and a classification stage that
/// produced no tiles at all. Unites `rde_protocol`'s `FatalError` with
/// `rde_classifier`'s `ClassifyError`, which `rde_protocol` cannot name
/// directly without an upward dependency on the classifier crate.
#[derive(Debug, thiserror::Error)]
pub enum RdeError {
    #[error(transparent)]
    Fatal(#[from] FatalError),

    #[error("classification failed: {0}")]
    Classify(#[from] ClassifyError),
}

/// Run the pipeline once over `paths`. Loads configuration, the invoice
/// schema, the optional metadata definition, and `invoice_org`; classifies
/// the input bundle; and dispatches every resulting tile through the Tile
/// Pipeline with the default copy-only thumbnail backend.
///
/// `dataset_function`, if given, runs once per tile after every built-in
/// processor succeeds (`spec.md` §6's user dataset callback).
pub fn run(paths: &RunPaths, dataset_function: Option<&DatasetFunction>) -> Result<RunSummary, RdeError> {
    let input_paths = open_input_paths(paths)?;
    let config = rde_config::load_config(&input_paths)?;

    let schema = InvoiceSchema::load(&input_paths.invoice_schema_json())?;

    let metadata_def_path = input_paths.metadata_def_json();
    let metadata_def = if metadata_def_path.exists() {
        Some(MetadataDefinition::load(&metadata_def_path)?)
    } else {
        None
    };

    let invoice_org = InvoiceDocument::load(&input_paths.invoice_json()).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            FatalError::Config(ConfigError::NotFound {
                path: input_paths.invoice_json(),
            })
        } else {
            FatalError::Config(ConfigError::Parse {
                path: input_paths.invoice_json(),
                line: 0,
                column: 0,
                message: source.to_string(),
            })
        }
    })?;

    let classification = rde_classifier::classify(
        &input_paths,
        &config,
        &paths.output_root,
        &paths.scratch_root,
    )?;

    tracing::info!(
        mode = classification.mode.as_str(),
        tiles = classification.tiles.len(),
        "classification complete"
    );

    let options = rde_pipeline::PipelineOptions {
        thumbnail_backend: CopyThumbnailBackend,
        dataset_function,
    };
    let cancellation = CancellationToken::new();

    let summary = rde_pipeline::run(
        &classification,
        &config,
        &input_paths,
        &schema,
        metadata_def.as_ref(),
        &invoice_org,
        &options,
        &cancellation,
    );

    tracing::info!(
        outcome = ?summary.overall_outcome(),
        exit_code = summary.exit_code(),
        "run complete"
    );

    Ok(summary)
}

fn open_input_paths(paths: &RunPaths) -> Result<InputPaths, FatalError> {
    InputPaths::new(&paths.inputdata, &paths.invoice, &paths.tasksupport).map_err(|err| {
        let path = match err {
            rde_protocol::error::IoError::Read { path, .. } => path,
            rde_protocol::error::IoError::Write { path, .. } => path,
            rde_protocol::error::IoError::PermissionDenied { path } => path,
            rde_protocol::error::IoError::ArchiveTraversal { scratch_root, .. } => scratch_root,
        };
        FatalError::Config(ConfigError::NotFound { path })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scaffold(root: &std::path::Path) -> RunPaths {
        let inputdata = root.join("inputdata");
        let invoice = root.join("invoice");
        let tasksupport = root.join("tasksupport");
        std::fs::create_dir_all(&inputdata).unwrap();
        std::fs::create_dir_all(&invoice).unwrap();
        std::fs::create_dir_all(&tasksupport).unwrap();

        let schema = json!({
            "type": "object",
            "required": ["basic"],
            "properties": {
                "basic": {
                    "type": "object",
                    "required": ["dataName"],
                    "properties": { "dataName": {"type": "string"} }
                }
            }
        });
        std::fs::write(
            tasksupport.join("invoice.schema.json"),
            serde_json::to_string_pretty(&schema).unwrap(),
        )
        .unwrap();
        std::fs::write(
            invoice.join("invoice.json"),
            serde_json::to_string_pretty(&json!({"basic": {"dataName": "placeholder"}})).unwrap(),
        )
        .unwrap();

        RunPaths {
            inputdata,
            invoice,
            tasksupport,
            output_root: root.join("output"),
            scratch_root: root.join("scratch"),
        }
    }

    #[test]
    fn end_to_end_invoice_mode_run_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let paths = scaffold(dir.path());
        std::fs::write(paths.inputdata.join("a.csv"), b"1,2,3").unwrap();

        let summary = run(&paths, None).unwrap();
        assert_eq!(summary.statuses.len(), 1);
        assert_eq!(summary.exit_code(), 0);
        assert!(paths.output_root.join("invoice").join("invoice.json").exists());
    }

    #[test]
    fn missing_input_root_is_a_fatal_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = scaffold(dir.path());
        paths.inputdata = dir.path().join("does-not-exist");

        let err = run(&paths, None).unwrap_err();
        assert!(matches!(err, RdeError::Fatal(_)));
    }

    #[test]
    fn missing_schema_file_is_a_fatal_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = scaffold(dir.path());
        std::fs::remove_file(paths.tasksupport.join("invoice.schema.json")).unwrap();

        let err = run(&paths, None).unwrap_err();
        assert!(matches!(err, RdeError::Fatal(_)));
    }
}
