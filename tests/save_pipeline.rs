// tests/save_pipeline.rs
//! End-to-end tests for the save orchestrator and the projection pipeline:
//! task fan-out, overwrite confirmation, encoder fallback, sanitization,
//! and the delimited round-trip.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

use sheetport::{
    load_delimited, save_delimited, CellOut, Column, ColumnType, Confirmer, EncoderFn,
    EncoderRegistry, ExportError, ExportOptions, LogReporter, ProjectMode, Reporter, Row,
    RowProjector, SaveEngine, SaveTarget, Sheet, SheetOptions,
};

/// One recorded encoder invocation: the target path and the sheet names it
/// received.
#[derive(Debug, Clone, PartialEq)]
struct Invocation {
    path: PathBuf,
    sheets: Vec<String>,
}

fn recording_encoder(record: Arc<Mutex<Vec<Invocation>>>) -> EncoderFn {
    Arc::new(move |target, sheets, _options, _reporter| {
        record.lock().unwrap().push(Invocation {
            path: target.path().to_path_buf(),
            sheets: sheets.iter().map(|s| s.name().to_string()).collect(),
        });
        Ok(())
    })
}

#[derive(Default)]
struct RecordingReporter {
    statuses: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl Reporter for RecordingReporter {
    fn status(&self, message: &str) {
        self.statuses.lock().unwrap().push(message.to_string());
    }
    fn warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }
    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

struct DenyAll;

impl Confirmer for DenyAll {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

fn sheet(name: &str) -> Arc<Sheet> {
    let sheet = Sheet::new(name)
        .with_columns(vec![
            Column::indexed("a", 0, ColumnType::Int),
            Column::indexed("b", 1, ColumnType::Text),
        ])
        .with_rows(vec![
            Row::new(vec![json!(1), json!("x")]),
            Row::new(vec![json!(2), json!("y")]),
        ]);
    sheet.mark_modified();
    Arc::new(sheet)
}

fn engine_with(record: &Arc<Mutex<Vec<Invocation>>>, options: ExportOptions) -> SaveEngine {
    let registry = EncoderRegistry::empty();
    registry.register("tsv", recording_encoder(Arc::clone(record)));
    SaveEngine::new(options).with_registry(registry)
}

#[tokio::test]
async fn plain_target_launches_exactly_one_task_with_all_sheets() {
    let record = Arc::new(Mutex::new(Vec::new()));
    let engine = engine_with(&record, ExportOptions::default());

    let sheets = vec![sheet("one"), sheet("two"), sheet("three")];
    let dir = tempdir().unwrap();
    let target = SaveTarget::from(dir.path().join("combined.tsv"));

    let launched = engine.save_sheets(&target, &sheets).unwrap();
    assert_eq!(launched.task_count(), 1);
    launched.join().await;

    let invocations = record.lock().unwrap();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].sheets, vec!["one", "two", "three"]);
    assert_eq!(invocations[0].path, dir.path().join("combined.tsv"));
}

#[tokio::test]
async fn dir_marker_fans_out_one_task_per_sheet() {
    let record = Arc::new(Mutex::new(Vec::new()));
    let engine = engine_with(&record, ExportOptions::default());

    let sheets = vec![sheet("alpha"), sheet("beta")];
    let dir = tempdir().unwrap();
    let target = SaveTarget::new(format!("{}/", dir.path().join("out").display()));

    let launched = engine.save_sheets(&target, &sheets).unwrap();
    assert_eq!(launched.task_count(), 2);
    launched.join().await;

    let mut invocations = record.lock().unwrap().clone();
    invocations.sort_by(|a, b| a.path.cmp(&b.path));
    assert_eq!(invocations.len(), 2);
    assert_eq!(invocations[0].path, dir.path().join("out").join("alpha.tsv"));
    assert_eq!(invocations[0].sheets, vec!["alpha"]);
    assert_eq!(invocations[1].path, dir.path().join("out").join("beta.tsv"));
    assert_eq!(invocations[1].sheets, vec!["beta"]);
}

#[tokio::test]
async fn duplicate_sheet_names_fan_out_to_distinct_paths() {
    let record = Arc::new(Mutex::new(Vec::new()));
    let engine = engine_with(&record, ExportOptions::default());

    let sheets = vec![sheet("data"), sheet("data")];
    let dir = tempdir().unwrap();
    let target = SaveTarget::new(format!("{}/", dir.path().join("out").display()));

    engine.save_sheets(&target, &sheets).unwrap().join().await;

    let mut paths: Vec<PathBuf> = record
        .lock()
        .unwrap()
        .iter()
        .map(|i| i.path.clone())
        .collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            dir.path().join("out").join("data.tsv"),
            dir.path().join("out").join("data_1.tsv"),
        ]
    );
}

#[tokio::test]
async fn fan_out_to_existing_file_is_fatal() {
    let record = Arc::new(Mutex::new(Vec::new()));
    let engine = engine_with(
        &record,
        ExportOptions {
            confirm_overwrite: false,
            ..Default::default()
        },
    );

    let dir = tempdir().unwrap();
    let blocker = dir.path().join("out");
    std::fs::write(&blocker, "not a directory").unwrap();
    let target = SaveTarget::new(format!("{}/", blocker.display()));

    let err = engine.save_sheets(&target, &[sheet("x")]).unwrap_err();
    assert!(matches!(err, ExportError::NotADirectory(_)));
    assert!(record.lock().unwrap().is_empty());
}

#[tokio::test]
async fn declined_overwrite_launches_nothing_and_mutates_nothing() {
    let record = Arc::new(Mutex::new(Vec::new()));
    let reporter = Arc::new(RecordingReporter::default());
    let engine = engine_with(&record, ExportOptions::default())
        .with_reporter(Arc::clone(&reporter) as Arc<dyn Reporter>)
        .with_confirmer(Arc::new(DenyAll));

    let dir = tempdir().unwrap();
    let existing = dir.path().join("precious.tsv");
    std::fs::write(&existing, "keep me\n").unwrap();

    let sheets = vec![sheet("s")];
    let err = engine
        .save_sheets(&SaveTarget::from(existing.clone()), &sheets)
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(record.lock().unwrap().is_empty());
    assert_eq!(std::fs::read_to_string(&existing).unwrap(), "keep me\n");
    // The save never launched, so the sheet still counts as modified.
    assert!(sheets[0].is_modified());
    let statuses = reporter.statuses.lock().unwrap();
    assert!(statuses.iter().any(|s| s.contains("cancelled")));
}

#[tokio::test]
async fn modified_clears_on_launch() {
    let record = Arc::new(Mutex::new(Vec::new()));
    let engine = engine_with(&record, ExportOptions::default());

    let sheets = vec![sheet("a"), sheet("b")];
    let dir = tempdir().unwrap();
    let target = SaveTarget::from(dir.path().join("out.tsv"));

    let launched = engine.save_sheets(&target, &sheets).unwrap();
    // Cleared at launch time, before the tasks are joined.
    assert!(!sheets[0].is_modified());
    assert!(!sheets[1].is_modified());
    launched.join().await;
}

#[tokio::test]
async fn unsupported_filetype_warns_once_and_uses_fallback() {
    let record = Arc::new(Mutex::new(Vec::new()));
    let reporter = Arc::new(RecordingReporter::default());
    let engine = engine_with(&record, ExportOptions::default())
        .with_reporter(Arc::clone(&reporter) as Arc<dyn Reporter>);

    let dir = tempdir().unwrap();
    let target = SaveTarget::from(dir.path().join("data.xlsx"));

    engine.save_sheets(&target, &[sheet("s")]).unwrap().join().await;

    let warnings = reporter.warnings.lock().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("xlsx"));
    // The fallback encoder still writes to the requested path.
    let invocations = record.lock().unwrap();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].path, dir.path().join("data.xlsx"));
}

#[tokio::test]
async fn status_line_announces_sheet_count_target_and_format() {
    let record = Arc::new(Mutex::new(Vec::new()));
    let reporter = Arc::new(RecordingReporter::default());
    let engine = engine_with(&record, ExportOptions::default())
        .with_reporter(Arc::clone(&reporter) as Arc<dyn Reporter>);

    let dir = tempdir().unwrap();
    let target = SaveTarget::from(dir.path().join("out.tsv"));
    engine
        .save_sheets(&target, &[sheet("a"), sheet("b")])
        .unwrap()
        .join()
        .await;

    let statuses = reporter.statuses.lock().unwrap();
    assert!(statuses
        .iter()
        .any(|s| s.contains("saving 2 sheets") && s.contains("out.tsv") && s.contains("tsv")));
}

#[test]
fn safety_substitution_worked_example() {
    // Rows [{a:1, b:"x\ty"}, {a:2, b:"p\nq"}], delimiter \t, safety on,
    // tab substitute <TAB>, newline substitute <NL>.
    let sheet = Sheet::new("t")
        .with_columns(vec![
            Column::indexed("a", 0, ColumnType::Int),
            Column::indexed("b", 1, ColumnType::Text),
        ])
        .with_rows(vec![
            Row::new(vec![json!(1), json!("x\ty")]),
            Row::new(vec![json!(2), json!("p\nq")]),
        ])
        .with_options(SheetOptions {
            tsv_safe_tab: Some("<TAB>".to_string()),
            tsv_safe_newline: Some("<NL>".to_string()),
            ..Default::default()
        });

    let options = ExportOptions {
        safety_first: true,
        ..Default::default()
    };

    let records: Vec<Vec<CellOut>> =
        RowProjector::over_visible(&sheet, ProjectMode::Display, &options).collect();
    assert_eq!(
        records,
        vec![
            vec![
                CellOut::Text("1".to_string()),
                CellOut::Text("x<TAB>y".to_string()),
            ],
            vec![
                CellOut::Text("2".to_string()),
                CellOut::Text("p<NL>q".to_string()),
            ],
        ]
    );
}

#[test]
fn delimited_round_trip_reproduces_visible_values() {
    let original = Sheet::new("t")
        .with_columns(vec![
            Column::indexed("a", 0, ColumnType::Int),
            Column::indexed("b", 1, ColumnType::Text),
        ])
        .with_rows(vec![
            Row::new(vec![json!(1), json!("x")]),
            Row::new(vec![json!(2), json!("hello world")]),
        ]);

    let dir = tempdir().unwrap();
    let target = SaveTarget::from(dir.path().join("round.txt"));
    let options = ExportOptions::default();
    save_delimited(&target, &[Arc::new(original.clone())], &options, &LogReporter).unwrap();

    let reloaded = load_delimited(target.path(), &options, false).unwrap();

    let before: Vec<Vec<String>> =
        RowProjector::over_visible(&original, ProjectMode::Display, &options)
            .map(|r| r.iter().map(|c| c.display().to_string()).collect())
            .collect();
    let after: Vec<Vec<String>> =
        RowProjector::over_visible(&reloaded, ProjectMode::Display, &options)
            .map(|r| r.iter().map(|c| c.display().to_string()).collect())
            .collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn sheet_type_override_selects_specific_encoder() {
    let general = Arc::new(Mutex::new(Vec::new()));
    let special = Arc::new(Mutex::new(Vec::new()));

    let registry = EncoderRegistry::empty();
    registry.register("tsv", recording_encoder(Arc::clone(&general)));
    registry.register_for_type("pivot", "tsv", recording_encoder(Arc::clone(&special)));
    let engine = SaveEngine::new(ExportOptions::default()).with_registry(registry);

    let pivot = Arc::new(
        Sheet::new("p")
            .with_type_tag("pivot")
            .with_columns(vec![Column::indexed("a", 0, ColumnType::Int)])
            .with_rows(vec![Row::new(vec![json!(1)])]),
    );
    let dir = tempdir().unwrap();
    let target = SaveTarget::from(dir.path().join("p.tsv"));
    engine.save_sheets(&target, &[pivot]).unwrap().join().await;

    assert!(general.lock().unwrap().is_empty());
    assert_eq!(special.lock().unwrap().len(), 1);
}
