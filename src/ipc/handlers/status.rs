use serde_json::json;

use crate::dates::format_date_display;
use crate::ipc::handlers::params::{now_from, required_str, ParamErr};
use crate::ipc::handlers::with_snapshot;
use crate::ipc::types::{AppState, Request};
use crate::records::{latest_check, latest_submission};
use crate::snapshot::Snapshot;
use crate::status::{
    badge_for_key, redo_override_active, resolve_checking_status, resolve_combined_status,
    resolve_submission_status, submission_window_open,
};

pub(super) fn badge_json(key: &str) -> serde_json::Value {
    let b = badge_for_key(key);
    json!({ "key": b.key, "label": b.label, "tone": b.tone })
}

fn not_found(what: &str) -> ParamErr {
    ParamErr {
        code: "not_found",
        message: format!("{} not found", what),
        details: None,
    }
}

/// One (assignment, student) pair, fully classified.
fn status_single(snap: &Snapshot, params: &serde_json::Value) -> Result<serde_json::Value, ParamErr> {
    let assignment_id = required_str(params, "assignmentId")?;
    let student_id = required_str(params, "studentId")?;
    let now = now_from(params)?;
    let asg = snap
        .assignment(&assignment_id)
        .ok_or_else(|| not_found("assignment"))?;

    let sub = latest_submission(&snap.submissions, &assignment_id, &student_id);
    let chk = latest_check(&snap.checks, &assignment_id, &student_id);

    let submission = resolve_submission_status(asg, sub, chk, now);
    let checking = resolve_checking_status(asg, chk, sub.is_some(), now);
    let combined = resolve_combined_status(asg, sub, chk, now);

    Ok(json!({
        "assignmentId": assignment_id,
        "studentId": student_id,
        "submission": badge_json(submission.key()),
        "checking": badge_json(checking.key()),
        "combined": combined.key(),
        "redoOverride": redo_override_active(&snap.checks, &assignment_id, &student_id),
    }))
}

/// Per-student rows for one assignment, the table a checker works from.
fn status_assignment_table(
    snap: &Snapshot,
    params: &serde_json::Value,
) -> Result<serde_json::Value, ParamErr> {
    let assignment_id = required_str(params, "assignmentId")?;
    let now = now_from(params)?;
    let asg = snap
        .assignment(&assignment_id)
        .ok_or_else(|| not_found("assignment"))?;

    let rows: Vec<serde_json::Value> = snap
        .students_for_assignment(asg)
        .iter()
        .map(|st| {
            let sub = latest_submission(&snap.submissions, &assignment_id, &st.student_id);
            let chk = latest_check(&snap.checks, &assignment_id, &st.student_id);
            let submission = resolve_submission_status(asg, sub, chk, now);
            let checking = resolve_checking_status(asg, chk, sub.is_some(), now);
            let combined = resolve_combined_status(asg, sub, chk, now);
            json!({
                "studentId": st.student_id,
                "studentName": st.student_name,
                "assistantId": st.assistant_id,
                "submission": badge_json(submission.key()),
                "checking": badge_json(checking.key()),
                "combined": combined.key(),
                "grade": chk.and_then(|c| c.grade.clone()),
                "comment": chk.and_then(|c| c.comment.clone()),
                "checkFileUrl": chk.and_then(|c| c.file_url.clone()),
                "submittedAt": sub.and_then(|s| s.timestamp()).map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
                "fileUrl": sub.map(|s| s.file_url.clone()),
            })
        })
        .collect();

    Ok(json!({
        "assignmentId": assignment_id,
        "title": asg.title,
        "course": asg.course,
        "rows": rows,
    }))
}

/// Per-assignment rows for one student, the view the student portal
/// rendered: status badge, feedback, display deadlines, and whether the
/// upload control should be live.
fn status_student_board(
    snap: &Snapshot,
    params: &serde_json::Value,
) -> Result<serde_json::Value, ParamErr> {
    let student_id = required_str(params, "studentId")?;
    let now = now_from(params)?;
    let student = snap.student(&student_id).ok_or_else(|| not_found("student"))?;
    let fmt = snap.date_format();

    let rows: Vec<serde_json::Value> = snap
        .assignments
        .iter()
        .filter(|a| a.course == student.course)
        .map(|asg| {
            let sub = latest_submission(&snap.submissions, &asg.assignment_id, &student_id);
            let chk = latest_check(&snap.checks, &asg.assignment_id, &student_id);
            let submission = resolve_submission_status(asg, sub, chk, now);
            let redo = redo_override_active(&snap.checks, &asg.assignment_id, &student_id);
            let upload_open = submission_window_open(asg, now) || redo;
            json!({
                "assignmentId": asg.assignment_id,
                "title": asg.title,
                "course": asg.course,
                "unit": asg.unit,
                "status": badge_json(submission.key()),
                "grade": chk.and_then(|c| c.grade.clone()),
                "comment": chk.and_then(|c| c.comment.clone()),
                "checkFileUrl": chk.and_then(|c| c.file_url.clone()),
                "myFileUrl": sub.map(|s| s.file_url.clone()),
                "studentDeadline": format_date_display(asg.student_deadline_raw(), fmt),
                "assistantDeadline": format_date_display(
                    asg.assistant_deadline.as_deref().unwrap_or(""),
                    fmt,
                ),
                "uploadOpen": upload_open,
            })
        })
        .collect();

    Ok(json!({
        "studentId": student_id,
        "studentName": student.student_name,
        "course": student.course,
        "schoolName": snap.branding.school_name,
        "rows": rows,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "status.single" => Some(with_snapshot(state, req, status_single)),
        "status.assignmentTable" => Some(with_snapshot(state, req, status_assignment_table)),
        "status.studentBoard" => Some(with_snapshot(state, req, status_student_board)),
        _ => None,
    }
}
