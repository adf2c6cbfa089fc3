use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_portald");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn portald");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn load(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    submissions: serde_json::Value,
) {
    let snapshot = json!({
        "assignments": [
            {
                "assignmentId": "hard-deadline",
                "title": "Worksheet 3",
                "course": "Math",
                "studentOpen": true,
                "assistantOpen": true,
                "studentDeadline": "2025-09-10"
            },
            {
                "assignmentId": "grace-window",
                "title": "Worksheet 4",
                "course": "Math",
                "studentOpen": true,
                "assistantOpen": true,
                "studentDeadline": "2025-09-10",
                "assistantDeadline": "2025-09-20"
            }
        ],
        "students": [
            { "studentId": "s1", "studentName": "Omar Hassan", "course": "Math" }
        ],
        "submissions": submissions,
        "checks": [],
        "branding": { "dateFormat": "d MMM yyyy" }
    });
    let _ = request_ok(stdin, reader, "load", "snapshot.load", json!({ "snapshot": snapshot }));
}

fn submission_key(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    assignment_id: &str,
    now: &str,
) -> String {
    let result = request_ok(
        stdin,
        reader,
        id,
        "status.single",
        json!({ "assignmentId": assignment_id, "studentId": "s1", "now": now }),
    );
    result
        .pointer("/submission/key")
        .and_then(|v| v.as_str())
        .expect("submission key")
        .to_string()
}

#[test]
fn missing_after_deadline_without_grace_window() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    load(&mut stdin, &mut reader, json!([]));

    let key = submission_key(&mut stdin, &mut reader, "a", "hard-deadline", "2025-09-11");
    assert_eq!(key, "missing");
    // Before the deadline the same pair is still pending.
    let key = submission_key(&mut stdin, &mut reader, "b", "hard-deadline", "2025-09-09");
    assert_eq!(key, "pending");
}

#[test]
fn grace_window_keeps_the_pair_pending_until_it_closes() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    load(&mut stdin, &mut reader, json!([]));

    let key = submission_key(&mut stdin, &mut reader, "a", "grace-window", "2025-09-15");
    assert_eq!(key, "pending");
    let key = submission_key(&mut stdin, &mut reader, "b", "grace-window", "2025-09-21");
    assert_eq!(key, "missing");
}

#[test]
fn submission_timing_splits_submitted_and_late() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    load(
        &mut stdin,
        &mut reader,
        json!([
            {
                "submissionId": "u1",
                "assignmentId": "hard-deadline",
                "studentId": "s1",
                "submittedAt": "2025-09-09"
            },
            {
                "submissionId": "u2",
                "assignmentId": "grace-window",
                "studentId": "s1",
                "submittedAt": "2025-09-12"
            }
        ]),
    );

    let key = submission_key(&mut stdin, &mut reader, "a", "hard-deadline", "2025-09-15");
    assert_eq!(key, "submitted");
    let key = submission_key(&mut stdin, &mut reader, "b", "grace-window", "2025-09-15");
    assert_eq!(key, "late");
}

#[test]
fn student_board_reflects_windows_and_branding() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    load(
        &mut stdin,
        &mut reader,
        json!([
            {
                "submissionId": "u2",
                "assignmentId": "grace-window",
                "studentId": "s1",
                "submittedAt": "2025-09-12",
                "fileUrl": "https://files.example/u2.pdf"
            }
        ]),
    );

    let board = request_ok(
        &mut stdin,
        &mut reader,
        "board",
        "status.studentBoard",
        json!({ "studentId": "s1", "now": "2025-09-15" }),
    );
    let rows = board
        .get("rows")
        .and_then(|v| v.as_array())
        .expect("rows")
        .clone();
    assert_eq!(rows.len(), 2);

    let hard = rows
        .iter()
        .find(|r| r["assignmentId"] == "hard-deadline")
        .expect("hard-deadline row");
    assert_eq!(hard.pointer("/status/key"), Some(&json!("missing")));
    // Deadline passed, no redo: the upload control stays dead.
    assert_eq!(hard.pointer("/uploadOpen"), Some(&json!(false)));
    assert_eq!(hard.pointer("/studentDeadline"), Some(&json!("10 Sep 2025")));

    let grace = rows
        .iter()
        .find(|r| r["assignmentId"] == "grace-window")
        .expect("grace-window row");
    assert_eq!(grace.pointer("/status/key"), Some(&json!("late")));
    assert_eq!(
        grace.pointer("/status/label"),
        Some(&json!("Submitted Late"))
    );
    assert_eq!(
        grace.pointer("/myFileUrl"),
        Some(&json!("https://files.example/u2.pdf"))
    );
}
