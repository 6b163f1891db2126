use crate::{
    app::{self, OutputOverrides, Status},
    config::BenchConfig,
    executors::Executor,
};
use dbbench_analysis::{report::json, BackendKind, BenchmarkResult, ScenarioOutcome, TimingStats};
use std::{fs, path::Path};

const POOL: &str = "pool: { max_size: 2, min_idle: 0, connection_timeout_ms: 200 }";

fn config(output: &Path, targets: &[(&str, &str, &str)]) -> BenchConfig {
    let targets = targets
        .iter()
        .map(|(name, kind, url)| {
            format!("  - {{ name: \"{name}\", kind: {kind}, url: \"{url}\" }}\n")
        })
        .collect::<String>();
    let yaml = format!(
        "{POOL}\noutput: {{ directory: \"{}\" }}\ntargets:\n{targets}",
        output.display()
    );

    BenchConfig::parse(&yaml).unwrap()
}

fn run(config: BenchConfig, console: &mut Vec<u8>) -> Status {
    app::run(config, Executor::Sequential, OutputOverrides::default(), console)
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names = fs::read_dir(dir)
        .map(|entries| {
            entries
                .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[test]
pub fn unreadable_config_is_a_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = Vec::new();

    let status = app::load_and_run(
        &dir.path().join("missing.yaml"),
        Executor::Sequential,
        OutputOverrides::default(),
        &mut console,
    );

    assert_eq!(status, Status::ConfigLoad);
    assert!(console.is_empty());
}

#[test]
pub fn empty_target_list_has_its_own_status() {
    let dir = tempfile::tempdir().unwrap();

    assert_eq!(run(config(dir.path(), &[]), &mut Vec::new()), Status::NoTargets);
}

#[test]
pub fn only_invalid_targets_is_a_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(
        dir.path(),
        &[("Oracle", "oracle", "oracle://localhost"), ("Blank", "sqlite", " ")],
    );

    assert_eq!(run(config, &mut Vec::new()), Status::ConfigLoad);
}

#[test]
pub fn no_results_when_every_target_is_unreachable() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing").join("bench.db");
    let mut console = Vec::new();
    let config = config(
        dir.path(),
        &[("Unreachable", "sqlite", missing.to_str().unwrap())],
    );

    assert_eq!(run(config, &mut console), Status::NoResults);
    assert!(console.is_empty());
}

#[test]
pub fn partial_failure_still_reports() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("reports");
    let missing = dir.path().join("missing").join("bench.db");
    let mut console = Vec::new();
    let config = config(
        &output,
        &[
            ("Healthy", "sqlite", ":memory:"),
            ("Unreachable", "sqlite", missing.to_str().unwrap()),
            ("Oracle", "oracle", "oracle://localhost"),
        ],
    );

    assert_eq!(run(config, &mut console), Status::Success);

    let console = String::from_utf8(console).unwrap();
    assert!(console.contains("Database: Healthy (sqlite)"));
    assert!(!console.contains("Unreachable"));

    let files = files_in(&output);
    assert_eq!(files.len(), 2);
    assert!(files[0].starts_with("benchmark-report-") && files[0].ends_with(".md"));
    assert!(files[1].starts_with("benchmark-results-") && files[1].ends_with(".json"));

    let results = json::read(&output.join(&files[1])).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].target_name, "Healthy");
}

#[test]
pub fn unwritable_reports_keep_the_console_report() {
    let dir = tempfile::tempdir().unwrap();
    // a regular file where the output directory should be
    let blocked = dir.path().join("blocked");
    fs::write(&blocked, "").unwrap();
    let mut console = Vec::new();

    let status = run(
        config(&blocked, &[("Healthy", "sqlite", ":memory:")]),
        &mut console,
    );

    assert_eq!(status, Status::ReportWrite);
    assert!(String::from_utf8(console)
        .unwrap()
        .contains("Database Performance Benchmark Report"));
}

#[test]
pub fn overrides_select_the_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("override");
    let overrides = OutputOverrides {
        directory: Some(output.clone()),
        skip_json: true,
        skip_markdown: false,
    };

    let status = app::run(
        config(&dir.path().join("configured"), &[("Healthy", "sqlite", ":memory:")]),
        Executor::Parallel { threads: None },
        overrides,
        &mut Vec::new(),
    );

    assert_eq!(status, Status::Success);
    assert!(files_in(&dir.path().join("configured")).is_empty());

    let files = files_in(&output);
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with(".md"));
}

#[test]
pub fn rerender_statuses() {
    let dir = tempfile::tempdir().unwrap();
    let results_path = dir.path().join("results.json");
    let empty_path = dir.path().join("empty.json");

    let mut result = BenchmarkResult::new("SQLite", BackendKind::Sqlite);
    result.insert(ScenarioOutcome::success(
        "update",
        "Update",
        TimingStats::from_nanos([2_000_000], 1).unwrap(),
    ));
    json::write(&[result], &results_path).unwrap();
    json::write(&[], &empty_path).unwrap();

    let blocked = dir.path().join("blocked");
    fs::write(&blocked, "").unwrap();
    let mut console = Vec::new();

    assert_eq!(
        app::rerender(&dir.path().join("missing.json"), None, &mut Vec::new()),
        Status::ConfigLoad
    );
    assert_eq!(app::rerender(&empty_path, None, &mut Vec::new()), Status::NoResults);
    assert_eq!(
        app::rerender(&results_path, Some(&blocked.join("report.md")), &mut console),
        Status::ReportWrite
    );
    assert!(String::from_utf8(console).unwrap().contains("Database: SQLite (sqlite)"));

    let markdown = dir.path().join("report.md");
    assert_eq!(
        app::rerender(&results_path, Some(&markdown), &mut Vec::new()),
        Status::Success
    );
    assert!(fs::read_to_string(markdown).unwrap().contains("| Update |"));
}
