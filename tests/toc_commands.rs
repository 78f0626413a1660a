mod service_stub;

use std::collections::HashMap;
use std::fs;

use predicates::prelude::*;
use serde_json::Value;
use service_stub::{ServiceStub, StubReply, sample_toc_response};

fn write_response(temp: &tempfile::TempDir, value: &Value) -> anyhow::Result<String> {
    let path = temp.path().join("toc.json");
    fs::write(&path, serde_json::to_vec_pretty(value)?)?;
    Ok(path.to_string_lossy().to_string())
}

#[test]
fn show_prints_outline_and_summary() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let response = write_response(&temp, &sample_toc_response())?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coursegen");
    cmd.args(["toc", "show", "--response", &response])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: Python Programming"))
        .stdout(predicate::str::contains("Getting Started"))
        .stdout(predicate::str::contains("    - macOS"))
        .stdout(predicate::str::contains("1.2"))
        .stdout(predicate::str::contains("Maintopics: 2\n"))
        .stdout(predicate::str::contains("Subtopics: 3\n"))
        .stdout(predicate::str::contains("Subnodes: 2\n"))
        .stdout(predicate::str::contains("Total Duration: 10.0h\n"));
    Ok(())
}

#[test]
fn show_course_hours_flag_overrides_metadata() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let response = write_response(&temp, &sample_toc_response())?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coursegen");
    cmd.args(["toc", "show", "--response", &response, "--course-hours", "2.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Duration: 2.5h\n"));
    Ok(())
}

#[test]
fn show_json_exposes_rows_and_summary() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let response = write_response(&temp, &sample_toc_response())?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coursegen");
    let output = cmd
        .args(["toc", "show", "--response", &response, "--format", "json"])
        .output()?;
    assert!(output.status.success());

    let parsed: Value = serde_json::from_slice(&output.stdout)?;
    let rows = parsed["rows"].as_array().expect("rows array");
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0]["level"], "maintopic");
    assert_eq!(rows[0]["difficulty"], "Beginner");
    assert_eq!(rows[5]["number"], "2");
    assert_eq!(parsed["summary"]["maintopics"], 2);
    assert_eq!(parsed["summary"]["total_duration"]["hours"], 10.0);
    assert!(parsed.get("no_data").is_none());
    Ok(())
}

#[test]
fn show_without_maintopics_reports_no_data() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let response = write_response(&temp, &serde_json::json!({"toc": {"status": "pending"}}))?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coursegen");
    cmd.args(["toc", "show", "--response", &response])
        .assert()
        .success()
        .stdout(predicate::str::contains("No TOC data available"))
        .stdout(predicate::str::contains("\"status\": \"pending\""))
        .stderr(predicate::str::contains("no usable main topics"));
    Ok(())
}

#[test]
fn subtopics_list_uses_default_duration() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let response = write_response(&temp, &sample_toc_response())?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coursegen");
    let output = cmd
        .args([
            "toc",
            "subtopics",
            "--response",
            &response,
            "--format",
            "json",
            "--default-duration",
            "7",
        ])
        .output()?;
    assert!(output.status.success());

    let parsed: Value = serde_json::from_slice(&output.stdout)?;
    let selectors = parsed.as_array().expect("selector array");
    let names = selectors
        .iter()
        .map(|s| s["display_name"].as_str().unwrap_or_default())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            "1.1 - Installing Python",
            "1.2 - First Program",
            "2.1 - Numbers"
        ]
    );
    assert_eq!(selectors[1]["duration"], 7);
    assert_eq!(selectors[0]["subnodes"], serde_json::json!(["Windows", "macOS"]));
    Ok(())
}

#[test]
fn subnodes_table_lists_every_subnode() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let response = write_response(&temp, &sample_toc_response())?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coursegen");
    cmd.args(["toc", "subnodes", "--response", &response])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 sub-nodes"))
        .stdout(predicate::str::contains("1.1.2"))
        .stdout(predicate::str::contains("2.1.1"))
        .stdout(predicate::str::contains("Integers"));
    Ok(())
}

#[test]
fn create_posts_form_and_saves_response() -> anyhow::Result<()> {
    let stub = ServiceStub::spawn(HashMap::from([(
        "create-course-sync",
        StubReply {
            status: 200,
            body: sample_toc_response(),
        },
    )]));
    let temp = tempfile::TempDir::new()?;
    let out = temp.path().join("saved").join("toc.json");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coursegen");
    cmd.args([
        "--toc-url",
        &stub.base_url,
        "toc",
        "create",
        "--topic",
        "Rust",
        "--course-hours",
        "12",
        "--learner-path",
        "beginner",
        "--objectives",
        "Ownership\nTraits",
        "--out",
    ])
    .arg(&out)
    .assert()
    .success()
    .stdout(predicate::str::contains("Cost: $0.0421"))
    .stdout(predicate::str::contains("Execution Time: 42.5s"))
    .stdout(predicate::str::contains("Table of Contents"));

    let received = stub.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].path, "create-course-sync");
    let body = &received[0].body;
    assert_eq!(body["topic"], "Rust");
    assert_eq!(body["course_hours"], 12);
    assert_eq!(body["learner_path"], "Beginner");
    assert_eq!(body["objective"], serde_json::json!(["Ownership", "Traits"]));
    assert_eq!(body["course_subtopics"], serde_json::json!([]));
    assert_eq!(body["callback_url"], Value::Null);

    let saved: Value = serde_json::from_slice(&fs::read(&out)?)?;
    assert_eq!(saved, sample_toc_response());
    Ok(())
}

#[test]
fn create_refuses_to_overwrite_without_force() -> anyhow::Result<()> {
    let stub = ServiceStub::spawn(HashMap::from([(
        "create-course-sync",
        StubReply {
            status: 200,
            body: sample_toc_response(),
        },
    )]));
    let temp = tempfile::TempDir::new()?;
    let out = temp.path().join("toc.json");
    fs::write(&out, "{}")?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coursegen");
    cmd.args(["--toc-url", &stub.base_url, "toc", "create", "--out"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(&out)?, "{}");
    Ok(())
}

#[test]
fn create_reports_service_errors() {
    let stub = ServiceStub::spawn(HashMap::from([(
        "create-course-sync",
        StubReply {
            status: 500,
            body: serde_json::json!({"detail": "model overloaded"}),
        },
    )]));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coursegen");
    cmd.args(["--toc-url", &stub.base_url, "toc", "create"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("status 500"))
        .stderr(predicate::str::contains("model overloaded"));
}

#[test]
fn start_sends_callback_url_and_accepts_202() {
    let stub = ServiceStub::spawn(HashMap::from([(
        "create-course",
        StubReply {
            status: 202,
            body: serde_json::json!({"status": "accepted", "job_id": "job_1"}),
        },
    )]));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coursegen");
    cmd.args([
        "--toc-url",
        &stub.base_url,
        "toc",
        "start",
        "--callback-url",
        "http://hooks.local/toc",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("202 Accepted"))
    .stdout(predicate::str::contains("job_1"));

    let received = stub.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].body["callback_url"], "http://hooks.local/toc");
    assert_eq!(received[0].body["topic"], "Python Programming");
}

#[test]
fn update_forwards_payload_file() -> anyhow::Result<()> {
    let stub = ServiceStub::spawn(HashMap::from([(
        "update-toc",
        StubReply {
            status: 200,
            body: sample_toc_response(),
        },
    )]));
    let temp = tempfile::TempDir::new()?;
    let payload = temp.path().join("update.json");
    fs::write(
        &payload,
        r#"{"project_id": "proj_001", "feedback": "Add a chapter on testing"}"#,
    )?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coursegen");
    cmd.args(["--toc-url", &stub.base_url, "toc", "update", "--payload"])
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("Data Types"));

    let received = stub.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].body["feedback"], "Add a chapter on testing");
    Ok(())
}

#[test]
fn invalid_service_url_is_rejected() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coursegen");
    cmd.args(["--toc-url", "ftp://toc.local", "toc", "create"])
        .assert()
        .failure();
}

#[test]
fn rust_log_debug_emits_parsed_cli_to_stderr() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let response = write_response(&temp, &sample_toc_response())?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coursegen");
    cmd.env("RUST_LOG", "debug")
        .args(["toc", "subtopics", "--response", &response])
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
    Ok(())
}

#[test]
fn offline_commands_ignore_broken_service_env() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let response = write_response(&temp, &sample_toc_response())?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coursegen");
    cmd.env("COURSEGEN_TOC_URL", "toc.internal:3000")
        .env("COURSEGEN_SCRIPT_URL", "not a url")
        .args(["toc", "show", "--response", &response])
        .assert()
        .success()
        .stdout(predicate::str::contains("Getting Started"));
    Ok(())
}

#[test]
fn toc_url_flag_overrides_broken_env() {
    let stub = ServiceStub::spawn(HashMap::from([(
        "create-course",
        StubReply {
            status: 202,
            body: serde_json::json!({"status": "accepted"}),
        },
    )]));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coursegen");
    cmd.env("COURSEGEN_TOC_URL", "toc.internal:3000")
        .args(["--toc-url", &stub.base_url, "toc", "start"])
        .assert()
        .success()
        .stdout(predicate::str::contains("202 Accepted"));
    assert_eq!(stub.received().len(), 1);
}

#[test]
fn broken_toc_env_fails_only_when_the_service_is_called() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coursegen");
    cmd.env("COURSEGEN_TOC_URL", "toc.internal:3000")
        .args(["toc", "create"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("toc service url"));
}
