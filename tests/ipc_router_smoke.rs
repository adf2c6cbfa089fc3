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

fn request(
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

fn seed_snapshot() -> serde_json::Value {
    json!({
        "assignments": [
            {
                "assignmentId": "as1",
                "title": "Homework 5",
                "course": "Math",
                "unit": "U1",
                "requireGrade": true,
                "studentOpen": true,
                "assistantOpen": true,
                "studentDeadline": "2025-09-10",
                "assistantDeadline": "2025-09-12"
            }
        ],
        "students": [
            { "studentId": "s1", "studentName": "Omar Hassan", "course": "Math", "assistantId": "u7" }
        ],
        "assistants": [
            { "userId": "u7", "displayName": "Dina Farouk" }
        ],
        "submissions": [],
        "checks": [],
        "branding": { "dateFormat": "d MMM yyyy" }
    })
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(
        health.pointer("/result/snapshotLoaded"),
        Some(&json!(false))
    );

    // Every snapshot-backed method refuses to run before a load.
    let early = request(
        &mut stdin,
        &mut reader,
        "2",
        "status.single",
        json!({ "assignmentId": "as1", "studentId": "s1" }),
    );
    assert_eq!(
        early.pointer("/error/code").and_then(|v| v.as_str()),
        Some("no_snapshot")
    );

    let loaded = request(
        &mut stdin,
        &mut reader,
        "3",
        "snapshot.load",
        json!({ "snapshot": seed_snapshot() }),
    );
    assert_eq!(loaded.pointer("/result/assignments"), Some(&json!(1)));

    for (id, method, params) in [
        (
            "4",
            "status.single",
            json!({ "assignmentId": "as1", "studentId": "s1", "now": "2025-09-01" }),
        ),
        (
            "5",
            "status.assignmentTable",
            json!({ "assignmentId": "as1", "now": "2025-09-01" }),
        ),
        (
            "6",
            "status.studentBoard",
            json!({ "studentId": "s1", "now": "2025-09-01" }),
        ),
        (
            "7",
            "windows.state",
            json!({ "assignmentId": "as1", "now": "2025-09-01" }),
        ),
        (
            "8",
            "submissions.record",
            json!({ "assignmentId": "as1", "studentId": "s1", "now": "2025-09-01" }),
        ),
        (
            "9",
            "checks.save",
            json!({
                "assignmentId": "as1",
                "studentId": "s1",
                "status": "Checked",
                "grade": "18/20",
                "now": "2025-09-02"
            }),
        ),
        (
            "10",
            "summary.kpis",
            json!({ "role": "student", "studentId": "s1", "now": "2025-09-02" }),
        ),
        ("11", "summary.statusBuckets", json!({ "now": "2025-09-02" })),
        (
            "12",
            "checks.eligibleStudents",
            json!({ "assignmentId": "as1" }),
        ),
    ] {
        let value = request(&mut stdin, &mut reader, id, method, params);
        assert_eq!(
            value.get("ok").and_then(|v| v.as_bool()),
            Some(true),
            "{} failed: {}",
            method,
            value
        );
    }

    let _ = request(&mut stdin, &mut reader, "13", "snapshot.reset", json!({}));
    let after_reset = request(
        &mut stdin,
        &mut reader,
        "14",
        "status.studentBoard",
        json!({ "studentId": "s1" }),
    );
    assert_eq!(
        after_reset.pointer("/error/code").and_then(|v| v.as_str()),
        Some("no_snapshot")
    );

    let unknown = request(&mut stdin, &mut reader, "15", "nope.nothing", json!({}));
    assert_eq!(
        unknown.pointer("/error/code").and_then(|v| v.as_str()),
        Some("not_implemented")
    );

    drop(stdin);
    let _ = child.wait();
}
