use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_egraded");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn egraded");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_raw(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn result_of(value: serde_json::Value, method: &str) -> serde_json::Value {
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> &str {
    assert_eq!(value.get("ok").and_then(|v| v.as_bool()), Some(false));
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .expect("error code")
}

#[test]
fn teacher_dashboard_welcomes_by_id() {
    let workspace = temp_dir("egrade-teacher-dashboard");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request_raw(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = result_of(resp, "workspace.select");

    let resp = request_raw(
        &mut stdin,
        &mut reader,
        "2",
        "teachers.create",
        json!({ "displayName": "R. Jayasuriya" }),
    );
    let teacher = result_of(resp, "teachers.create");
    let teacher_id = teacher
        .get("teacherId")
        .and_then(|v| v.as_str())
        .expect("teacherId")
        .to_string();

    let resp = request_raw(
        &mut stdin,
        &mut reader,
        "3",
        "dashboard.teacher",
        json!({ "teacherId": &teacher_id }),
    );
    let dash = result_of(resp, "dashboard.teacher");
    assert_eq!(
        dash.get("title").and_then(|v| v.as_str()),
        Some("eGrade - Teacher Dashboard")
    );
    assert_eq!(
        dash.get("welcome").and_then(|v| v.as_str()),
        Some(format!("Welcome, Teacher (ID: {})", teacher_id).as_str())
    );
    assert_eq!(
        dash.get("displayName").and_then(|v| v.as_str()),
        Some("R. Jayasuriya")
    );

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn requests_fail_cleanly_without_workspace_or_method() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request_raw(
        &mut stdin,
        &mut reader,
        "1",
        "dashboard.parent",
        json!({ "guardianId": "nobody" }),
    );
    assert_eq!(error_code(&resp), "no_workspace");

    let resp = request_raw(
        &mut stdin,
        &mut reader,
        "2",
        "dashboards.unknown",
        json!({}),
    );
    assert_eq!(error_code(&resp), "not_implemented");

    let workspace = temp_dir("egrade-bad-params");
    let resp = request_raw(
        &mut stdin,
        &mut reader,
        "3",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = result_of(resp, "workspace.select");

    let resp = request_raw(&mut stdin, &mut reader, "4", "dashboard.parent", json!({}));
    assert_eq!(error_code(&resp), "bad_params");

    let resp = request_raw(
        &mut stdin,
        &mut reader,
        "5",
        "grades.record",
        json!({ "studentId": "s", "subjectId": "x", "score": "95" }),
    );
    assert_eq!(error_code(&resp), "bad_params");

    drop(stdin);
    let _ = child.wait();
}
