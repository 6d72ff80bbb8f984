use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tarmac_prof::domain::SetupError;
use tarmac_prof::pipeline::{run, RunConfig, RunSummary};
use tarmac_prof::profiling::CancellationToken;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn config(dir: &TempDir, trace: &str, output: &str) -> RunConfig {
    RunConfig {
        symbols: fixture("image.sym"),
        trace: fixture(trace),
        output: dir.path().join(output),
        coverage: dir.path().join("coverage"),
        coverage_details: false,
        flush_open_frames: false,
        quiet: true,
    }
}

fn run_to_completion(config: &RunConfig) -> RunSummary {
    run(config, &CancellationToken::new()).unwrap()
}

fn read_events(path: &Path) -> Vec<Value> {
    let text = fs::read_to_string(path).unwrap();
    match serde_json::from_str::<Value>(&text).unwrap() {
        Value::Array(events) => events,
        other => panic!("expected a JSON array, got {other}"),
    }
}

fn approx(actual: &Value, expected: f64) -> bool {
    actual.as_f64().is_some_and(|value| (value - expected).abs() < 1e-6)
}

#[test]
fn test_flame_graph_events_in_return_order() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "fvp_trace.log", "trace.json");

    let summary = run_to_completion(&config);
    let events = read_events(&config.output);

    assert_eq!(events.len(), 3);

    // Marker on the returning instruction is written before the frames it closes
    assert_eq!(events[0]["name"], "DBG conv done");
    assert_eq!(events[0]["cat"], "dbg");
    assert_eq!(events[0]["ph"], "I");
    assert_eq!(events[0]["s"], "p");
    assert!(approx(&events[0]["ts"], 7.0));

    assert_eq!(events[1]["name"], "mac_loop");
    assert_eq!(events[1]["cat"], "arm");
    assert_eq!(events[1]["ph"], "X");
    assert!(approx(&events[1]["ts"], 5.0));
    assert!(approx(&events[1]["dur"], 2.0));
    assert_eq!(events[1]["pid"], 1);
    assert_eq!(events[1]["tid"], 1);

    assert_eq!(events[2]["name"], "conv");
    assert!(approx(&events[2]["ts"], 3.0));
    assert!(approx(&events[2]["dur"], 5.0));

    assert_eq!(summary.format, Some("IpssFVP"));
    assert!(!summary.interrupted);
    assert_eq!(summary.stats.lines, 11);
    assert_eq!(summary.stats.decoded, 8);
    assert_eq!(summary.stats.resolved, 8);
    assert_eq!(summary.stats.invocations, 2);
    assert_eq!(summary.stats.markers, 1);
}

#[test]
fn test_open_frames_flushed_on_request() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir, "fvp_trace.log", "trace.json");
    config.flush_open_frames = true;

    run_to_completion(&config);
    let events = read_events(&config.output);

    assert_eq!(events.len(), 4);
    assert_eq!(events[3]["name"], "main");
    assert!(approx(&events[3]["ts"], 1.0));
    assert!(approx(&events[3]["dur"], 7.0));
}

#[test]
fn test_statistics_table() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "fvp_trace.log", "stats.csv");

    run_to_completion(&config);
    let text = fs::read_to_string(&config.output).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("function, start time, duration, instructions count"));
    assert_eq!(lines[1], "//  <- DBG conv done -> //");
    assert_eq!(lines[2], "mac_loop, 5.000000, 2.000000, 2, 0, 0, 0, 0, 0, 0, 1, 0, 0");
    assert_eq!(lines[3], "conv, 3.000000, 5.000000, 3, 0, 0, 0, 0, 2, 1, 2, 1, 0");
}

#[test]
fn test_coverage_report() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "fvp_trace.log", "trace.json");

    run_to_completion(&config);
    let report = fs::read_to_string(&config.coverage).unwrap();
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(
        lines,
        [
            "func, size, size covered, coverage (%), inst, (t16,t32), <address/hit-count details>",
            "main, 64, 8, 12.50, 3, (2, 1), \"..no details..\"",
            "conv, 32, 6, 18.75, 3, (3, 0), \"..no details..\"",
            "mac_loop, 16, 4, 25.00, 2, (2, 0), \"..no details..\"",
        ]
    );
}

#[test]
fn test_detailed_coverage_marks_jumps() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir, "fvp_trace.log", "trace.json");
    config.coverage_details = true;

    run_to_completion(&config);
    let report = fs::read_to_string(&config.coverage).unwrap();

    assert!(report.contains(
        "main, 64, 8, 12.50, 3, (2, 1), \"(0x1000, 1), (0x1002, 1), (0x100a, 1) [<-jump 8->]\""
    ));
    assert!(report.contains("\"(0x2000, 1), (0x2002, 1), (0x2004, 1)\""));
}

#[test]
fn test_mdk_trace_time_scale() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "mdk_trace.csv", "trace.json");

    let summary = run_to_completion(&config);
    let events = read_events(&config.output);

    assert_eq!(summary.format, Some("MDK ETM"));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["name"], "conv");
    assert!(approx(&events[0]["ts"], 30.0));
    assert!(approx(&events[0]["dur"], 50.0));
}

#[test]
fn test_repeated_runs_produce_identical_output() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "fvp_trace.log", "trace.json");

    run_to_completion(&config);
    let first = (fs::read(&config.output).unwrap(), fs::read(&config.coverage).unwrap());
    run_to_completion(&config);
    let second = (fs::read(&config.output).unwrap(), fs::read(&config.coverage).unwrap());

    assert_eq!(first, second);
}

#[test]
fn test_cancelled_run_still_finalizes_outputs() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "fvp_trace.log", "trace.json");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = run(&config, &cancel).unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.percent, 0.0);
    assert_eq!(summary.stats.lines, 0);
    assert!(read_events(&config.output).is_empty());

    let report = fs::read_to_string(&config.coverage).unwrap();
    assert_eq!(report.lines().count(), 1);
}

#[test]
fn test_unrecognized_trace_yields_empty_timeline() {
    let dir = TempDir::new().unwrap();
    let trace = dir.path().join("junk.log");
    let junk: String = (0..150).map(|i| format!("simulator banner line {i}\n")).collect();
    fs::write(&trace, junk).unwrap();

    let mut config = config(&dir, "fvp_trace.log", "trace.json");
    config.trace = trace;

    let summary = run_to_completion(&config);

    assert_eq!(summary.format, None);
    assert_eq!(summary.stats.lines, 150);
    assert!(read_events(&config.output).is_empty());
}

#[test]
fn test_missing_symbol_file_is_setup_error() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir, "fvp_trace.log", "trace.json");
    config.symbols = dir.path().join("missing.sym");

    let err = run(&config, &CancellationToken::new()).unwrap_err();

    assert!(matches!(err.downcast_ref::<SetupError>(), Some(SetupError::SymbolFile { .. })));
    assert!(!config.output.exists());
}

#[test]
fn test_missing_trace_file_is_setup_error() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir, "fvp_trace.log", "trace.json");
    config.trace = dir.path().join("missing.log");

    let err = run(&config, &CancellationToken::new()).unwrap_err();

    assert!(matches!(err.downcast_ref::<SetupError>(), Some(SetupError::TraceFile { .. })));
}
