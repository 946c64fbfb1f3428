use serde_json::Value;
use skyknit_topology::TableSources;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "skyknit-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Runs inside `cwd` so a stray `skyknit.toml` never leaks into a test.
fn run_skyknit<I, S>(cwd: &Path, args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_skyknit");
    Command::new(bin)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("skyknit command should execute")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn assert_exit_code(output: &Output, code: i32) {
    if output.status.code() != Some(code) {
        panic!(
            "expected exit code {code}, got {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "expected valid JSON stdout, got error: {e}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn fixture_bundle(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../skyknit-checker/tests/fixtures")
        .join(name)
        .join("bundle.json")
}

fn read_fixture_bundle(name: &str) -> Value {
    let bytes = fs::read(fixture_bundle(name)).expect("fixture bundle should be readable");
    serde_json::from_slice(&bytes).expect("fixture bundle should parse")
}

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_vec_pretty(value).expect("json should render"))
        .expect("json file should be written");
}

#[test]
fn check_golden_bundle_passes() {
    let tmp = TempDirGuard::new("check-golden");
    let bundle = fixture_bundle("golden_raglan_yoke");
    let output = run_skyknit(
        tmp.path(),
        [OsStr::new("check"), OsStr::new("--bundle"), bundle.as_os_str(), OsStr::new("--json")],
    );
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["passed"], true);
    assert_eq!(payload["errors"], Value::Array(Vec::new()));
}

#[test]
fn check_rejected_bundle_exits_one_with_classified_errors() {
    let tmp = TempDirGuard::new("check-rejected");
    let bundle = fixture_bundle("adversarial_ending_mismatch");
    let output = run_skyknit(
        tmp.path(),
        [OsStr::new("check"), OsStr::new("--bundle"), bundle.as_os_str(), OsStr::new("--json")],
    );
    assert_exit_code(&output, 1);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["passed"], false);
    assert_eq!(payload["errors"][0]["componentName"], "swatch");
    assert_eq!(payload["errors"][0]["errorType"], "filler_origin");
    assert_eq!(payload["errors"][0]["operationIndex"], Value::Null);
}

#[test]
fn check_human_output_lists_errors() {
    let tmp = TempDirGuard::new("check-human");
    let bundle = fixture_bundle("adversarial_three_needle_unequal");
    let output = run_skyknit(
        tmp.path(),
        [OsStr::new("check"), OsStr::new("--bundle"), bundle.as_os_str()],
    );
    assert_exit_code(&output, 1);
    let text = stdout_text(&output);
    assert!(text.contains("skyknit check"));
    assert!(text.contains("Result: rejected"));
    assert!(text.contains("Geometric origin: 1"));
    assert!(text.contains("[geometric_origin] front"));
}

#[test]
fn check_missing_bundle_is_a_usage_error() {
    let tmp = TempDirGuard::new("check-missing");
    let output = run_skyknit(tmp.path(), ["check", "--bundle", "nope.json"]);
    assert_exit_code(&output, 2);
    assert!(stderr_text(&output).contains("failed to read check bundle"));
}

#[test]
fn simulate_reports_the_final_state() {
    let tmp = TempDirGuard::new("simulate");
    let bundle = read_fixture_bundle("adversarial_ending_mismatch");
    let ir_path = tmp.path().join("swatch.json");
    write_json(&ir_path, &bundle["irs"]["swatch"]);

    let output = run_skyknit(
        tmp.path(),
        [OsStr::new("simulate"), OsStr::new("--ir"), ir_path.as_os_str(), OsStr::new("--json")],
    );
    assert_exit_code(&output, 1);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["componentName"], "swatch");
    assert_eq!(payload["finalState"]["liveStitchCount"], 0);
    assert_eq!(payload["finalState"]["rowCounter"], 20);
    assert_eq!(payload["finalState"]["operationsApplied"], 3);
    assert_eq!(payload["errors"][0]["errorType"], "filler_origin");
}

#[test]
fn simulate_rejects_an_unnamed_component_at_parse_time() {
    let tmp = TempDirGuard::new("simulate-unnamed");
    let mut ir = read_fixture_bundle("adversarial_ending_mismatch")["irs"]["swatch"].clone();
    ir["componentName"] = Value::from("");
    let ir_path = tmp.path().join("unnamed.json");
    write_json(&ir_path, &ir);

    let output = run_skyknit(
        tmp.path(),
        [OsStr::new("simulate"), OsStr::new("--ir"), ir_path.as_os_str()],
    );
    assert_exit_code(&output, 2);
    assert!(stdout_text(&output).is_empty());
    assert!(stderr_text(&output).contains("component name must not be empty"));
}

#[test]
fn validate_manifest_passes_a_consistent_manifest() {
    let tmp = TempDirGuard::new("validate-ok");
    let bundle = read_fixture_bundle("golden_raglan_yoke");
    let manifest_path = tmp.path().join("manifest.json");
    write_json(&manifest_path, &bundle["manifest"]);

    let output = run_skyknit(
        tmp.path(),
        [
            OsStr::new("validate-manifest"),
            OsStr::new("--manifest"),
            manifest_path.as_os_str(),
            OsStr::new("--json"),
        ],
    );
    assert_success(&output);
    assert_eq!(parse_json_stdout(&output)["passed"], true);
}

#[test]
fn validate_manifest_rejects_a_dangling_join_ref() {
    let tmp = TempDirGuard::new("validate-dangling");
    let mut manifest = read_fixture_bundle("golden_raglan_yoke")["manifest"].clone();
    manifest["components"][1]["edges"][1]["joinRef"] = Value::from("j_missing");
    let manifest_path = tmp.path().join("manifest.json");
    write_json(&manifest_path, &manifest);

    let output = run_skyknit(
        tmp.path(),
        [
            OsStr::new("validate-manifest"),
            OsStr::new("--manifest"),
            manifest_path.as_os_str(),
            OsStr::new("--json"),
        ],
    );
    assert_exit_code(&output, 1);
    let payload = parse_json_stdout(&output);
    let issues = payload["issues"].as_array().expect("issues array");
    assert!(issues.iter().any(|issue| {
        issue["severity"] == "error" && issue["message"] == "join_ref `j_missing` names no join"
    }));
}

#[test]
fn registry_summarizes_builtin_tables() {
    let tmp = TempDirGuard::new("registry");
    let output = run_skyknit(tmp.path(), ["registry", "--json"]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    let digest = payload["digest"].as_str().expect("digest string");
    assert!(digest.starts_with("topo1_"));
    assert!(payload["compatibilityEntries"].as_u64().unwrap_or(0) > 0);
}

#[test]
fn registry_from_data_dir_matches_builtin_digest() {
    let tmp = TempDirGuard::new("registry-dir");
    let tables = tmp.path().join("tables");
    fs::create_dir_all(&tables).expect("tables dir should be created");
    for (file, source) in TableSources::builtin().iter() {
        fs::write(tables.join(file), &source.text).expect("table should be written");
    }

    let builtin = parse_json_stdout(&run_skyknit(tmp.path(), ["registry", "--json"]));
    let output = run_skyknit(
        tmp.path(),
        [
            OsStr::new("registry"),
            OsStr::new("--data-dir"),
            tables.as_os_str(),
            OsStr::new("--json"),
        ],
    );
    assert_success(&output);
    assert_eq!(parse_json_stdout(&output)["digest"], builtin["digest"]);
}

#[test]
fn unloadable_tables_abort_before_checking() {
    let tmp = TempDirGuard::new("registry-broken");
    let bundle = fixture_bundle("golden_raglan_yoke");
    let empty = tmp.path().join("empty");
    fs::create_dir_all(&empty).expect("empty dir should be created");

    let output = run_skyknit(
        tmp.path(),
        [
            OsStr::new("check"),
            OsStr::new("--bundle"),
            bundle.as_os_str(),
            OsStr::new("--data-dir"),
            empty.as_os_str(),
        ],
    );
    assert_exit_code(&output, 2);
    assert!(stdout_text(&output).is_empty());
    assert!(stderr_text(&output).contains("failed to read topology table"));
}

#[test]
fn select_count_breaks_ties_upward() {
    let tmp = TempDirGuard::new("select-tie");
    let output = run_skyknit(
        tmp.path(),
        [
            "select-count",
            "--length-mm",
            "254",
            "--spi",
            "5",
            "--rpi",
            "7",
            "--stitch-repeat",
            "4",
            "--tolerance-mm",
            "10.16",
            "--json",
        ],
    );
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["validCounts"], serde_json::json!([48, 52]));
    assert_eq!(payload["selected"], 52);
    assert_eq!(payload["escalate"], false);
}

#[test]
fn select_count_escalates_when_nothing_fits() {
    let tmp = TempDirGuard::new("select-escalate");
    let output = run_skyknit(
        tmp.path(),
        [
            "select-count",
            "--length-mm",
            "254",
            "--spi",
            "5",
            "--rpi",
            "7",
            "--stitch-repeat",
            "4",
            "--json",
        ],
    );
    assert_exit_code(&output, 1);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["selected"], Value::Null);
    assert_eq!(payload["escalate"], true);
}

#[test]
fn select_count_handles_a_very_wide_band() {
    let tmp = TempDirGuard::new("select-wide");
    let output = run_skyknit(
        tmp.path(),
        [
            "select-count",
            "--length-mm",
            "254",
            "--spi",
            "5",
            "--rpi",
            "7",
            "--tolerance-mm",
            "5e9",
            "--json",
        ],
    );
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["selected"], 50);
    assert_eq!(payload["validCounts"], Value::Null);
}

#[test]
fn select_count_rejects_out_of_range_ease() {
    let tmp = TempDirGuard::new("select-ease");
    let output = run_skyknit(
        tmp.path(),
        ["select-count", "--length-mm", "254", "--spi", "5", "--rpi", "7", "--ease", "3"],
    );
    assert_exit_code(&output, 2);
    assert!(stderr_text(&output).contains("ease_multiplier"));
}

#[test]
fn shaping_accepts_negative_delta() {
    let tmp = TempDirGuard::new("shaping");
    let output = run_skyknit(tmp.path(), ["shaping", "--delta", "-20", "--rows", "43", "--json"]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(
        payload["intervals"],
        serde_json::json!([
            {"action": "decrease", "everyNRows": 4, "times": 7, "stitchesPerAction": 2},
            {"action": "decrease", "everyNRows": 5, "times": 3, "stitchesPerAction": 2}
        ])
    );
}

#[test]
fn shaping_rejects_indivisible_delta() {
    let tmp = TempDirGuard::new("shaping-odd");
    let output = run_skyknit(tmp.path(), ["shaping", "--delta", "7", "--rows", "20"]);
    assert_exit_code(&output, 2);
    assert!(stderr_text(&output).contains("divisible"));
}

#[test]
fn tolerance_combines_ease_and_precision() {
    let tmp = TempDirGuard::new("tolerance");
    let output = run_skyknit(
        tmp.path(),
        ["tolerance", "--spi", "5", "--rpi", "7", "--ease", "1.5", "--precision", "low", "--json"],
    );
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    let tolerance = payload["toleranceMm"].as_f64().expect("toleranceMm number");
    assert!((tolerance - 11.43).abs() < 1e-9);
    assert_eq!(payload["precision"], "low");
}

#[test]
fn config_file_supplies_tolerance_defaults() {
    let tmp = TempDirGuard::new("config-defaults");
    fs::write(
        tmp.path().join("skyknit.toml"),
        "[tolerance]\nease_multiplier = 2.0\nprecision = \"high\"\n",
    )
    .expect("config should be written");

    let output = run_skyknit(tmp.path(), ["tolerance", "--spi", "5", "--rpi", "7", "--json"]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    let tolerance = payload["toleranceMm"].as_f64().expect("toleranceMm number");
    assert!((tolerance - 7.62).abs() < 1e-9);

    let flagged = run_skyknit(
        tmp.path(),
        ["tolerance", "--spi", "5", "--rpi", "7", "--ease", "1", "--precision", "medium", "--json"],
    );
    let tolerance = parse_json_stdout(&flagged)["toleranceMm"]
        .as_f64()
        .expect("toleranceMm number");
    assert!((tolerance - 5.08).abs() < 1e-9);
}

#[test]
fn bad_config_is_a_usage_error() {
    let tmp = TempDirGuard::new("config-bad");
    fs::write(tmp.path().join("skyknit.toml"), "[tolerance]\nease = 1.5\n")
        .expect("config should be written");
    let output = run_skyknit(tmp.path(), ["tolerance", "--spi", "5", "--rpi", "7"]);
    assert_exit_code(&output, 2);
    assert!(stderr_text(&output).contains("invalid config"));

    let missing = run_skyknit(
        tmp.path(),
        ["--config", "elsewhere.toml", "tolerance", "--spi", "5", "--rpi", "7"],
    );
    assert_exit_code(&missing, 2);
    assert!(stderr_text(&missing).contains("failed to read config"));
}
