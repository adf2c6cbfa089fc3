use chrono::{Duration, NaiveDateTime};
use serde_json::json;

use crate::ipc::handlers::params::{now_from, optional_str, required_str, ParamErr};
use crate::ipc::handlers::with_snapshot;
use crate::ipc::types::{AppState, Request};
use crate::records::{latest_check, latest_submission, Assignment, CheckVerdict};
use crate::snapshot::Snapshot;
use crate::status::{
    checking_window_open, resolve_combined_status, submission_window_open, CombinedStatus,
};

fn not_found(what: &str) -> ParamErr {
    ParamErr {
        code: "not_found",
        message: format!("{} not found", what),
        details: None,
    }
}

fn within_last_week(t: Option<NaiveDateTime>, now: NaiveDateTime) -> bool {
    match t {
        Some(t) => t <= now && now - t < Duration::days(7),
        None => false,
    }
}

/// Home-tab counters. Students get their own board's numbers; assistants
/// get caseload-wide ones, optionally scoped to one assistant.
fn summary_kpis(snap: &Snapshot, params: &serde_json::Value) -> Result<serde_json::Value, ParamErr> {
    let role = required_str(params, "role")?;
    let now = now_from(params)?;

    match role.as_str() {
        "student" => {
            let student_id = required_str(params, "studentId")?;
            let student = snap.student(&student_id).ok_or_else(|| not_found("student"))?;
            let course_assignments: Vec<&Assignment> = snap
                .assignments
                .iter()
                .filter(|a| a.course == student.course)
                .collect();

            let open = course_assignments
                .iter()
                .filter(|a| submission_window_open(a, now))
                .count();
            let submitted_this_week = snap
                .submissions
                .iter()
                .filter(|s| s.student_id == student_id)
                .filter(|s| within_last_week(s.timestamp(), now))
                .count();
            let missing_now = course_assignments
                .iter()
                .filter(|a| {
                    let past = a.student_deadline_at().map(|dl| now > dl).unwrap_or(false);
                    past && !snap.submission_exists(&a.assignment_id, &student_id)
                })
                .count();

            Ok(json!({
                "openAssignments": open,
                "submittedThisWeek": submitted_this_week,
                "missingNow": missing_now,
            }))
        }
        "assistant" => {
            let assistant_id = optional_str(params, "assistantId");
            let students = snap
                .students
                .iter()
                .filter(|s| match &assistant_id {
                    Some(id) => s.assistant_id.as_deref() == Some(id.as_str()),
                    None => true,
                })
                .count();
            let open = snap
                .assignments
                .iter()
                .filter(|a| checking_window_open(a, now))
                .count();
            let checked_this_week = snap
                .checks
                .iter()
                .filter(|c| match &assistant_id {
                    Some(id) => c.assistant_id.as_deref() == Some(id.as_str()),
                    None => true,
                })
                .filter(|c| c.status == CheckVerdict::Checked)
                .filter(|c| within_last_week(c.timestamp(), now))
                .count();

            Ok(json!({
                "students": students,
                "openAssignments": open,
                "checkedThisWeek": checked_this_week,
            }))
        }
        other => Err(ParamErr::bad(format!("unknown role: {}", other))),
    }
}

/// Status-breakdown buckets for the dashboard donut. One bucket per
/// (assignment, student) pair; unknown check verdicts land in pending.
fn summary_status_buckets(
    snap: &Snapshot,
    params: &serde_json::Value,
) -> Result<serde_json::Value, ParamErr> {
    let now = now_from(params)?;
    let scope: Vec<&Assignment> = match optional_str(params, "assignmentId") {
        Some(id) => vec![snap.assignment(&id).ok_or_else(|| not_found("assignment"))?],
        None => snap.assignments.iter().collect(),
    };

    let mut submitted = 0_u64;
    let mut late = 0_u64;
    let mut resubmitted = 0_u64;
    let mut missing = 0_u64;
    let mut pending = 0_u64;
    let mut checked = 0_u64;
    let mut redo = 0_u64;

    for asg in scope {
        for st in snap.students_for_assignment(asg) {
            let sub = latest_submission(&snap.submissions, &asg.assignment_id, &st.student_id);
            let chk = latest_check(&snap.checks, &asg.assignment_id, &st.student_id);
            match resolve_combined_status(asg, sub, chk, now) {
                CombinedStatus::Submitted => submitted += 1,
                CombinedStatus::Late => late += 1,
                CombinedStatus::Resubmitted => resubmitted += 1,
                CombinedStatus::Missing => missing += 1,
                CombinedStatus::Checked => checked += 1,
                CombinedStatus::Redo => redo += 1,
                CombinedStatus::Pending | CombinedStatus::Other(_) => pending += 1,
            }
        }
    }

    Ok(json!({
        "submitted": submitted,
        "late": late,
        "resubmitted": resubmitted,
        "missing": missing,
        "pending": pending,
        "checked": checked,
        "redo": redo,
    }))
}

/// Students a checker can still act on for an assignment: no check yet,
/// or the latest one asks for a redo. Optionally filtered by assigned
/// assistant (`all`, `unassigned`, or an assistant id).
fn checks_eligible_students(
    snap: &Snapshot,
    params: &serde_json::Value,
) -> Result<serde_json::Value, ParamErr> {
    let assignment_id = required_str(params, "assignmentId")?;
    let filter = optional_str(params, "assistantFilter").unwrap_or_else(|| "all".to_string());
    let asg = snap
        .assignment(&assignment_id)
        .ok_or_else(|| not_found("assignment"))?;

    let rows: Vec<serde_json::Value> = snap
        .students_for_assignment(asg)
        .iter()
        .filter(|st| match filter.as_str() {
            "all" => true,
            "unassigned" => st.assistant_id.is_none(),
            id => st.assistant_id.as_deref() == Some(id),
        })
        .filter_map(|st| {
            let outstanding_redo = match latest_check(&snap.checks, &assignment_id, &st.student_id) {
                None => false,
                Some(c) if c.status == CheckVerdict::Redo => true,
                Some(_) => return None,
            };
            Some(json!({
                "studentId": st.student_id,
                "studentName": st.student_name,
                "assistantId": st.assistant_id,
                "assistantName": st
                    .assistant_id
                    .as_deref()
                    .and_then(|id| snap.assistant_name(id)),
                "outstandingRedo": outstanding_redo,
            }))
        })
        .collect();

    Ok(json!({ "assignmentId": assignment_id, "students": rows }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "summary.kpis" => Some(with_snapshot(state, req, summary_kpis)),
        "summary.statusBuckets" => Some(with_snapshot(state, req, summary_status_buckets)),
        "checks.eligibleStudents" => Some(with_snapshot(state, req, checks_eligible_students)),
        _ => None,
    }
}
