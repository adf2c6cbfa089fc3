use serde_json::json;
use uuid::Uuid;

use super::status::badge_json;
use crate::ipc::handlers::params::{now_from, optional_bool, optional_str, required_str, ParamErr};
use crate::ipc::handlers::with_snapshot_mut;
use crate::ipc::types::{AppState, Request};
use crate::records::{latest_check, latest_submission, Check, CheckVerdict, Submission};
use crate::snapshot::Snapshot;
use crate::status::{
    checking_policy_notes, checking_window_open, grade_policy, redo_override_active,
    resolve_checking_status, resolve_submission_status, submission_window_open,
};

fn not_found(what: &str) -> ParamErr {
    ParamErr {
        code: "not_found",
        message: format!("{} not found", what),
        details: None,
    }
}

fn stamp(t: chrono::NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Record a student upload. The submission window gates this, except
/// when the latest check asks for a redo: that request re-opens the
/// upload until a newer submission supersedes it.
fn submissions_record(
    snap: &mut Snapshot,
    params: &serde_json::Value,
) -> Result<serde_json::Value, ParamErr> {
    let assignment_id = required_str(params, "assignmentId")?;
    let student_id = required_str(params, "studentId")?;
    let now = now_from(params)?;
    let asg = snap
        .assignment(&assignment_id)
        .ok_or_else(|| not_found("assignment"))?
        .clone();
    if snap.student(&student_id).is_none() {
        return Err(not_found("student"));
    }

    let redo = redo_override_active(&snap.checks, &assignment_id, &student_id);
    if !submission_window_open(&asg, now) && !redo {
        return Err(ParamErr {
            code: "window_closed",
            message: "Submission window is closed.".to_string(),
            details: None,
        });
    }

    let submission_id = Uuid::new_v4().to_string();
    snap.push_submission(Submission {
        submission_id: Some(submission_id.clone()),
        assignment_id: assignment_id.clone(),
        student_id: student_id.clone(),
        file_url: optional_str(params, "fileUrl").unwrap_or_default(),
        submitted_at: Some(stamp(now)),
        submitted_at_iso: None,
        created_at: Some(stamp(now)),
        updated_at: None,
    });

    // Recompute so the caller can re-render without a second round trip.
    let sub = latest_submission(&snap.submissions, &assignment_id, &student_id);
    let chk = latest_check(&snap.checks, &assignment_id, &student_id);
    let status = resolve_submission_status(&asg, sub, chk, now);

    Ok(json!({
        "submissionId": submission_id,
        "status": badge_json(status.key()),
        "redoOverrideUsed": redo && !submission_window_open(&asg, now),
    }))
}

/// Save assistant or head feedback. Assistants are blocked once the
/// checking window closes; heads may pass `headOverride` and save anyway.
/// The grade is dropped whenever the grade policy disables the field.
fn checks_save(snap: &mut Snapshot, params: &serde_json::Value) -> Result<serde_json::Value, ParamErr> {
    let assignment_id = required_str(params, "assignmentId")?;
    let student_id = required_str(params, "studentId")?;
    let raw_status = required_str(params, "status")?;
    let now = now_from(params)?;
    let head = optional_bool(params, "headOverride");
    let asg = snap
        .assignment(&assignment_id)
        .ok_or_else(|| not_found("assignment"))?
        .clone();
    if snap.student(&student_id).is_none() {
        return Err(not_found("student"));
    }

    if !checking_window_open(&asg, now) && !head {
        return Err(ParamErr {
            code: "window_closed",
            message: "Assistant submissions are closed.".to_string(),
            details: Some(json!({ "notes": checking_policy_notes(&asg, now, false) })),
        });
    }

    let verdict = CheckVerdict::from_raw(&raw_status);
    let policy = grade_policy(&asg, &verdict);
    let grade = if policy.enabled {
        optional_str(params, "grade")
    } else {
        None
    };

    let check_id = Uuid::new_v4().to_string();
    snap.push_check(Check {
        check_id: Some(check_id.clone()),
        assignment_id: assignment_id.clone(),
        student_id: student_id.clone(),
        status: verdict.clone(),
        grade: grade.clone(),
        comment: optional_str(params, "comment"),
        file_url: optional_str(params, "fileUrl"),
        assistant_id: optional_str(params, "assistantId"),
        updated_at: Some(stamp(now)),
        created_at: Some(stamp(now)),
    });

    let sub = latest_submission(&snap.submissions, &assignment_id, &student_id);
    let chk = latest_check(&snap.checks, &assignment_id, &student_id);
    let submission = resolve_submission_status(&asg, sub, chk, now);
    let checking = resolve_checking_status(&asg, chk, sub.is_some(), now);

    Ok(json!({
        "checkId": check_id,
        "checking": badge_json(checking.key()),
        "submission": badge_json(submission.key()),
        "gradeStored": grade.is_some(),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "submissions.record" => Some(with_snapshot_mut(state, req, submissions_record)),
        "checks.save" => Some(with_snapshot_mut(state, req, checks_save)),
        _ => None,
    }
}
