use serde_json::json;

use super::status::badge_json;
use crate::dates::format_date_for_input;
use crate::ipc::handlers::params::{now_from, optional_bool, optional_str, required_str, ParamErr};
use crate::ipc::handlers::with_snapshot;
use crate::ipc::types::{AppState, Request};
use crate::records::CheckVerdict;
use crate::snapshot::Snapshot;
use crate::status::{checking_policy_notes, checking_window_open, grade_policy, submission_window_open};

/// Both window gates for one assignment, plus the form policy the portal
/// derived from them: blocking notes and the grade-input rules. Heads get
/// the override wording and are never blocked by a closed window.
fn windows_state(snap: &Snapshot, params: &serde_json::Value) -> Result<serde_json::Value, ParamErr> {
    let assignment_id = required_str(params, "assignmentId")?;
    let now = now_from(params)?;
    let head = optional_bool(params, "headOverride");
    let asg = snap.assignment(&assignment_id).ok_or(ParamErr {
        code: "not_found",
        message: "assignment not found".to_string(),
        details: None,
    })?;

    let submission_open = submission_window_open(asg, now);
    let checking_open = checking_window_open(asg, now);

    // Grade rules depend on the verdict being entered; default to Checked.
    let verdict = CheckVerdict::from_raw(&optional_str(params, "status").unwrap_or_default());
    let verdict = match verdict {
        CheckVerdict::Other(ref s) if s.is_empty() => CheckVerdict::Checked,
        v => v,
    };

    Ok(json!({
        "assignmentId": assignment_id,
        "submissionWindow": {
            "open": submission_open,
            "badge": badge_json(if submission_open { "open" } else { "closed" }),
        },
        "checkingWindow": {
            "open": checking_open,
            "badge": badge_json(if checking_open { "open" } else { "closed" }),
        },
        "saveBlocked": !checking_open && !head,
        "notes": checking_policy_notes(asg, now, head),
        "gradePolicy": grade_policy(asg, &verdict),
        // yyyy-mm-dd values for date input prefills
        "deadlineInputs": {
            "student": format_date_for_input(asg.student_deadline_raw()),
            "assistant": format_date_for_input(asg.assistant_deadline.as_deref().unwrap_or("")),
        },
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "windows.state" => Some(with_snapshot(state, req, windows_state)),
        _ => None,
    }
}
