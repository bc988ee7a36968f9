//! Crate-level end-to-end scenarios spanning the Classifier and the Tile
//! Pipeline together (`spec.md` §8's six concrete scenarios).

use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::Path;

use rde_classifier::ClassificationResult;
use rde_config::{Config, ExtendedMode};
use rde_pipeline::{CancellationToken, CopyThumbnailBackend, PipelineOptions};
use rde_protocol::{InputPaths, InvoiceDocument, Mode, TileUnit, WorkflowOutcome};
use rde_schema::InvoiceSchema;
use serde_json::json;

fn scaffold(root: &Path) -> InputPaths {
    let inputdata = root.join("inputdata");
    let invoice = root.join("invoice");
    let tasksupport = root.join("tasksupport");
    for p in [&inputdata, &invoice, &tasksupport] {
        std::fs::create_dir_all(p).unwrap();
    }
    InputPaths::new(inputdata, invoice, tasksupport).unwrap()
}

fn basic_schema() -> InvoiceSchema {
    InvoiceSchema::from_value(json!({
        "type": "object",
        "required": ["basic"],
        "properties": {
            "basic": {
                "type": "object",
                "required": ["dataName"],
                "properties": { "dataName": {"type": "string"} }
            },
            "custom": {
                "type": "object",
                "properties": { "isPublic": {"type": "boolean"} }
            }
        }
    }))
    .unwrap()
}

fn run_pipeline(
    classification: &ClassificationResult,
    config: &Config,
    input_paths: &InputPaths,
    schema: &InvoiceSchema,
    invoice_org: &InvoiceDocument,
) -> rde_protocol::RunSummary {
    let options = PipelineOptions {
        thumbnail_backend: CopyThumbnailBackend,
        dataset_function: None,
    };
    let cancellation = CancellationToken::new();
    rde_pipeline::run(classification, config, input_paths, schema, None, invoice_org, &options, &cancellation)
}

/// Scenario 1: Invoice, happy path with magic-variable substitution.
#[test]
fn invoice_happy_path_resolves_filename_magic_variable() {
    let dir = tempfile::tempdir().unwrap();
    let input_paths = scaffold(dir.path());
    std::fs::write(input_paths.inputdata().join("a.csv"), b"1,2,3").unwrap();

    let mut config = Config::default();
    config.magic_variable = true;

    let output_root = dir.path().join("output");
    let scratch_root = dir.path().join("scratch");
    let classification =
        rde_classifier::classify(&input_paths, &config, &output_root, &scratch_root).unwrap();
    assert_eq!(classification.mode, Mode::Invoice);

    let mut invoice_org = InvoiceDocument::new();
    invoice_org.set_path("basic/dataName", json!("${filename}"));

    let summary = run_pipeline(&classification, &config, &input_paths, &basic_schema(), &invoice_org);

    assert_eq!(summary.statuses.len(), 1);
    assert_eq!(summary.statuses[0].outcome, WorkflowOutcome::Success);
    let written = InvoiceDocument::load(&output_root.join("invoice").join("invoice.json")).unwrap();
    assert_eq!(written.get_path("basic/dataName"), Some(&json!("a.csv")));
}

/// Scenario 2: SmartTable, an empty cell removes the field rather than
/// inheriting it from a prior row.
#[test]
fn smarttable_empty_cell_leaves_field_absent_not_inherited() {
    let dir = tempfile::tempdir().unwrap();
    let input_paths = scaffold(dir.path());
    std::fs::write(input_paths.inputdata().join("a.csv"), b"1").unwrap();
    std::fs::write(input_paths.inputdata().join("b.csv"), b"2").unwrap();
    std::fs::write(
        input_paths.inputdata().join("smarttable_batch.csv"),
        "inputdata1,basic/description\na.csv,first\nb.csv,\n",
    )
    .unwrap();

    let config = Config::default();
    let output_root = dir.path().join("output");
    let scratch_root = dir.path().join("scratch");
    let classification =
        rde_classifier::classify(&input_paths, &config, &output_root, &scratch_root).unwrap();
    assert_eq!(classification.mode, Mode::SmartTable);

    let invoice_org = InvoiceDocument::new();
    let summary = run_pipeline(&classification, &config, &input_paths, &basic_schema(), &invoice_org);

    assert_eq!(summary.statuses[0].outcome, WorkflowOutcome::Success);
    assert_eq!(summary.statuses[1].outcome, WorkflowOutcome::Success);

    let tile0 = InvoiceDocument::load(&output_root.join("invoice").join("invoice.json")).unwrap();
    assert_eq!(tile0.get_path("basic/description"), Some(&json!("first")));

    let tile1 =
        InvoiceDocument::load(&output_root.join("divided/0001").join("invoice").join("invoice.json")).unwrap();
    assert_eq!(tile1.get_path("basic/description"), None);
}

/// Scenario 3: SmartTable, strict boolean casting. A valid `"FALSE"` cell
/// casts cleanly; an invalid `"No"` cell fails the tile with `TypeMismatch`.
#[test]
fn smarttable_strict_boolean_cast_succeeds_or_fails_the_tile() {
    let dir = tempfile::tempdir().unwrap();
    let input_paths = scaffold(dir.path());
    std::fs::write(input_paths.inputdata().join("a.csv"), b"1").unwrap();
    std::fs::write(input_paths.inputdata().join("b.csv"), b"2").unwrap();
    std::fs::write(
        input_paths.inputdata().join("smarttable_batch.csv"),
        "inputdata1,custom/isPublic\na.csv,FALSE\nb.csv,No\n",
    )
    .unwrap();

    let config = Config::default();
    let output_root = dir.path().join("output");
    let scratch_root = dir.path().join("scratch");
    let classification =
        rde_classifier::classify(&input_paths, &config, &output_root, &scratch_root).unwrap();

    let mut invoice_org = InvoiceDocument::new();
    invoice_org.set_path("basic/dataName", json!("placeholder"));
    let summary = run_pipeline(&classification, &config, &input_paths, &basic_schema(), &invoice_org);

    assert_eq!(summary.statuses[0].outcome, WorkflowOutcome::Success);
    let tile0 = InvoiceDocument::load(&output_root.join("invoice").join("invoice.json")).unwrap();
    assert_eq!(tile0.get_path("custom/isPublic"), Some(&json!(false)));

    assert_eq!(summary.statuses[1].outcome, WorkflowOutcome::Failed);
    let error = summary.statuses[1].error.as_ref().unwrap();
    match &error.source {
        rde_protocol::error::PipelineErrorKind::Validation(report) => {
            assert!(report
                .items
                .iter()
                .any(|i| i.kind == rde_protocol::error::ValidationKind::TypeMismatch));
        }
        other => panic!("expected a Validation error, got {other:?}"),
    }
}

/// Scenario 4: MultiDataTile, failure isolation. Tile 1's invoice is
/// missing the schema's required `basic.dataName`; tiles 0 and 2 still
/// succeed and the run's exit code still reflects the failure.
#[test]
fn multidata_tile_failure_is_isolated_to_one_tile() {
    let dir = tempfile::tempdir().unwrap();
    let input_paths = scaffold(dir.path());
    std::fs::write(input_paths.inputdata().join("a.csv"), b"1").unwrap();
    std::fs::write(input_paths.inputdata().join("b.csv"), b"2").unwrap();
    std::fs::write(input_paths.inputdata().join("c.csv"), b"3").unwrap();

    let mut config = Config::default();
    config.extended_mode = Some(ExtendedMode::MultiDataTile);

    let output_root = dir.path().join("output");
    let scratch_root = dir.path().join("scratch");
    let classification =
        rde_classifier::classify(&input_paths, &config, &output_root, &scratch_root).unwrap();
    assert_eq!(classification.mode, Mode::MultiDataTile);
    assert_eq!(classification.tiles.len(), 3);

    // CopyFromInvoiceOrg fills `basic.dataName` from the tile's first input
    // file when absent, so an invoice_org missing `dataName` entirely still
    // validates for every tile *except* one whose first file doesn't exist
    // on disk — force that by clearing the input files on tile 1 directly.
    let mut classification = classification;
    classification.tiles[1] = TileUnit::new(1, Vec::new(), classification.tiles[1].output_paths.clone());

    let invoice_org = InvoiceDocument::new();
    let summary = run_pipeline(&classification, &config, &input_paths, &basic_schema(), &invoice_org);

    assert_eq!(summary.statuses[0].outcome, WorkflowOutcome::Success);
    assert_eq!(summary.statuses[1].outcome, WorkflowOutcome::Failed);
    assert_eq!(summary.statuses[2].outcome, WorkflowOutcome::Success);
    assert_eq!(summary.exit_code(), 1);

    assert!(output_root.join("invoice").join("invoice.json").exists());
    assert!(output_root.join("divided/0002").join("invoice").join("invoice.json").exists());
    assert!(!output_root.join("divided/0001").join("invoice").join("invoice.json").exists());
}

/// Scenario 5: ExcelInvoice rows referencing files packaged in an archive.
/// Exercises tile construction directly (bypassing a real `.xlsx` parse,
/// which needs a binary fixture `rde_classifier::excel` does not carry) to
/// prove the archive-expansion + by-name binding path `build_excel_invoice_tiles`
/// shares with SmartTable.
#[test]
fn excel_invoice_rows_bind_to_files_inside_an_archive() {
    let dir = tempfile::tempdir().unwrap();
    let input_paths = scaffold(dir.path());

    let zip_path = input_paths.inputdata().join("bundle.zip");
    let file = std::fs::File::create(&zip_path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options: zip::write::FileOptions<()> =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in [("x.csv", b"1" as &[u8]), ("y.csv", b"2")] {
        writer.start_file(name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();

    let config = Config::default();
    let mut row0 = BTreeMap::new();
    row0.insert("basic/dataName".to_string(), "first".to_string());
    let mut row1 = BTreeMap::new();
    row1.insert("basic/dataName".to_string(), "second".to_string());

    let rows = vec![
        rde_classifier::excel::ExcelInvoiceRow {
            file_names: vec!["x.csv".to_string()],
            patch: row0,
        },
        rde_classifier::excel::ExcelInvoiceRow {
            file_names: vec!["y.csv".to_string()],
            patch: row1,
        },
    ];

    let output_root = dir.path().join("output");
    let scratch_root = dir.path().join("scratch");
    let entries = vec![zip_path];
    let tiles = rde_classifier::tiles::build_excel_invoice_tiles(
        rows,
        &entries,
        &output_root,
        &scratch_root,
        &config,
    )
    .unwrap();

    assert_eq!(tiles.len(), 2);
    assert_eq!(tiles[0].input_files, vec![scratch_root.join("bundle/x.csv")]);
    assert_eq!(tiles[1].input_files, vec![scratch_root.join("bundle/y.csv")]);

    let classification = ClassificationResult {
        mode: Mode::ExcelInvoice,
        tiles,
    };
    let invoice_org = InvoiceDocument::new();
    let summary = run_pipeline(&classification, &config, &input_paths, &basic_schema(), &invoice_org);
    assert_eq!(summary.statuses[0].outcome, WorkflowOutcome::Success);
    assert_eq!(summary.statuses[1].outcome, WorkflowOutcome::Success);

    let tile0 = InvoiceDocument::load(&output_root.join("invoice").join("invoice.json")).unwrap();
    assert_eq!(tile0.get_path("basic/dataName"), Some(&json!("first")));
}

/// Scenario 6: magic variable substitution with an empty array segment
/// collapses the introduced `__` down to a single `_`.
#[test]
fn magic_variable_empty_segment_collapses_double_underscore() {
    let dir = tempfile::tempdir().unwrap();
    let input_paths = scaffold(dir.path());
    std::fs::write(input_paths.inputdata().join("a.csv"), b"1").unwrap();

    let mut config = Config::default();
    config.magic_variable = true;

    let output_root = dir.path().join("output");
    let scratch_root = dir.path().join("scratch");
    let classification =
        rde_classifier::classify(&input_paths, &config, &output_root, &scratch_root).unwrap();

    let mut invoice_org = InvoiceDocument::new();
    invoice_org.set_path("basic/experimentId", json!("EXP-1"));
    invoice_org.set_path("sample/names", json!(["", "beta"]));
    invoice_org.set_path(
        "basic/dataName",
        json!("${invoice:basic:experimentId}_${invoice:sample:names}_${filename}"),
    );

    let summary = run_pipeline(&classification, &config, &input_paths, &basic_schema(), &invoice_org);
    assert_eq!(summary.statuses[0].outcome, WorkflowOutcome::Success);

    let tile0 = InvoiceDocument::load(&output_root.join("invoice").join("invoice.json")).unwrap();
    assert_eq!(tile0.get_path("basic/dataName"), Some(&json!("EXP-1_beta_a.csv")));
}
