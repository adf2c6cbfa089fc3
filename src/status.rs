use chrono::NaiveDateTime;
use serde::Serialize;

use crate::records::{latest_check, Assignment, Check, CheckVerdict, Submission};

/// Student-facing submission status for one (assignment, student) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Pending,
    Submitted,
    Late,
    Missing,
    PendingRedo,
    Resubmitted,
}

impl SubmissionStatus {
    pub fn key(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Late => "late",
            SubmissionStatus::Missing => "missing",
            SubmissionStatus::PendingRedo => "pending-redo",
            SubmissionStatus::Resubmitted => "resubmitted",
        }
    }
}

/// Assistant-facing checking status. `NothingToCheck` is the portal's
/// bare dash: the window closed and there was never anything to grade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckingStatus {
    Pending,
    Checked,
    Missing,
    Redo,
    Unchecked,
    NothingToCheck,
    Other(String),
}

impl CheckingStatus {
    pub fn key(&self) -> &str {
        match self {
            CheckingStatus::Pending => "pending",
            CheckingStatus::Checked => "checked",
            CheckingStatus::Missing => "missing",
            CheckingStatus::Redo => "redo",
            CheckingStatus::Unchecked => "unchecked",
            CheckingStatus::NothingToCheck => "-",
            CheckingStatus::Other(s) => s,
        }
    }
}

/// Dashboard bucket merging the check overlay into the submission view.
/// This is what the status-breakdown donut counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombinedStatus {
    Pending,
    Submitted,
    Late,
    Missing,
    Checked,
    Redo,
    Resubmitted,
    Other(String),
}

impl CombinedStatus {
    pub fn key(&self) -> &str {
        match self {
            CombinedStatus::Pending => "pending",
            CombinedStatus::Submitted => "submitted",
            CombinedStatus::Late => "late",
            CombinedStatus::Missing => "missing",
            CombinedStatus::Checked => "checked",
            CombinedStatus::Redo => "redo",
            CombinedStatus::Resubmitted => "resubmitted",
            CombinedStatus::Other(s) => s,
        }
    }
}

/// The student may submit while their side is open and the student
/// deadline (if any) has not passed.
pub fn submission_window_open(asg: &Assignment, now: NaiveDateTime) -> bool {
    if !asg.student_open {
        return false;
    }
    match asg.student_deadline_at() {
        Some(dl) => now <= dl,
        None => true,
    }
}

/// Same gate over the assistant side.
pub fn checking_window_open(asg: &Assignment, now: NaiveDateTime) -> bool {
    if !asg.assistant_open {
        return false;
    }
    match asg.assistant_deadline_at() {
        Some(dl) => now <= dl,
        None => true,
    }
}

/// Classify the pair's submission state. Priority order, first match wins:
/// an outstanding redo overlay, then the submission against the student
/// deadline, then the deadline state alone (with the late grace window
/// between student and assistant deadlines still counting as pending).
pub fn resolve_submission_status(
    asg: &Assignment,
    submission: Option<&Submission>,
    check: Option<&Check>,
    now: NaiveDateTime,
) -> SubmissionStatus {
    let sub_time = submission.and_then(|s| s.timestamp());

    if let Some(chk) = check {
        if chk.status == CheckVerdict::Redo {
            let chk_time = chk.timestamp();
            if let (Some(t_sub), Some(t_chk)) = (sub_time, chk_time) {
                if t_sub > t_chk {
                    return SubmissionStatus::Resubmitted;
                }
            }
            return SubmissionStatus::PendingRedo;
        }
    }

    if submission.is_some() {
        if let (Some(dl), Some(t)) = (asg.student_deadline_at(), sub_time) {
            if t > dl {
                return SubmissionStatus::Late;
            }
        }
        return SubmissionStatus::Submitted;
    }

    if let Some(dl) = asg.student_deadline_at() {
        if now > dl {
            if let Some(asst_dl) = asg.assistant_deadline_at() {
                if now <= asst_dl {
                    return SubmissionStatus::Pending;
                }
            }
            return SubmissionStatus::Missing;
        }
    }
    SubmissionStatus::Pending
}

/// Checking status: an existing check speaks for itself (unknown verdicts
/// pass through lower-cased); otherwise the answer depends on whether a
/// submission exists and whether the assistant deadline has passed.
/// `unchecked` flags work that was submitted but never graded in time.
pub fn resolve_checking_status(
    asg: &Assignment,
    check: Option<&Check>,
    submission_exists: bool,
    now: NaiveDateTime,
) -> CheckingStatus {
    if let Some(chk) = check {
        return match &chk.status {
            CheckVerdict::Checked => CheckingStatus::Checked,
            CheckVerdict::Missing => CheckingStatus::Missing,
            CheckVerdict::Redo => CheckingStatus::Redo,
            CheckVerdict::Other(s) => CheckingStatus::Other(s.clone()),
        };
    }

    let deadline_passed = asg
        .assistant_deadline_at()
        .map(|dl| now > dl)
        .unwrap_or(false);

    if !submission_exists {
        if deadline_passed {
            return CheckingStatus::NothingToCheck;
        }
        return CheckingStatus::Pending;
    }
    if deadline_passed {
        return CheckingStatus::Unchecked;
    }
    CheckingStatus::Pending
}

/// One bucket per pair for the dashboard breakdown: the latest check wins
/// when present (a redo with a newer submission counts as resubmitted),
/// otherwise the plain submission classification.
pub fn resolve_combined_status(
    asg: &Assignment,
    submission: Option<&Submission>,
    check: Option<&Check>,
    now: NaiveDateTime,
) -> CombinedStatus {
    if let Some(chk) = check {
        match &chk.status {
            CheckVerdict::Checked => return CombinedStatus::Checked,
            CheckVerdict::Missing => return CombinedStatus::Missing,
            CheckVerdict::Redo => {
                let sub_time = submission.and_then(|s| s.timestamp());
                if let (Some(t_sub), Some(t_chk)) = (sub_time, chk.timestamp()) {
                    if t_sub > t_chk {
                        return CombinedStatus::Resubmitted;
                    }
                }
                return CombinedStatus::Redo;
            }
            CheckVerdict::Other(s) => {
                if s.is_empty() {
                    return CombinedStatus::Pending;
                }
                return CombinedStatus::Other(s.clone());
            }
        }
    }

    match resolve_submission_status(asg, submission, None, now) {
        SubmissionStatus::Submitted => CombinedStatus::Submitted,
        SubmissionStatus::Late => CombinedStatus::Late,
        SubmissionStatus::Missing => CombinedStatus::Missing,
        _ => CombinedStatus::Pending,
    }
}

/// True when the latest check for the pair asks for a redo. This is the
/// one place deadline gating is bypassed: the student may resubmit past a
/// closed window until a newer submission supersedes the request.
pub fn redo_override_active(checks: &[Check], assignment_id: &str, student_id: &str) -> bool {
    latest_check(checks, assignment_id, student_id)
        .map(|c| c.status == CheckVerdict::Redo)
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Ok,
    Warn,
    Danger,
    Info,
    Muted,
    Neutral,
}

#[derive(Debug, Clone, Serialize)]
pub struct Badge {
    pub key: String,
    pub label: String,
    pub tone: Tone,
}

/// Display catalogue for every status key the portal rendered as a badge.
/// Unknown keys fall back to a neutral dash.
pub fn badge_for_key(key: &str) -> Badge {
    let k = key.trim().to_ascii_lowercase();
    let (label, tone) = match k.as_str() {
        "submitted" => ("Submitted", Tone::Ok),
        "late" => ("Submitted Late", Tone::Warn),
        "missing" => ("Missing", Tone::Danger),
        "pending" => ("Pending", Tone::Info),
        "checked" => ("Checked", Tone::Ok),
        "redo" => ("Redo", Tone::Warn),
        "unchecked" => ("Unchecked", Tone::Danger),
        "open" => ("Open", Tone::Ok),
        "closed" => ("Closed", Tone::Warn),
        "pending-redo" => ("Pending Redo", Tone::Warn),
        "resubmitted" => ("Resubmitted", Tone::Ok),
        "-" => ("—", Tone::Muted),
        _ => ("—", Tone::Neutral),
    };
    Badge {
        key: k,
        label: label.to_string(),
        tone,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradePolicy {
    pub enabled: bool,
    pub placeholder: String,
}

/// Grade input rules: disabled outright when the assignment does not
/// require grades, disabled for a Missing verdict, free text otherwise.
pub fn grade_policy(asg: &Assignment, verdict: &CheckVerdict) -> GradePolicy {
    if !asg.require_grade {
        return GradePolicy {
            enabled: false,
            placeholder: "Disabled for this assignment".to_string(),
        };
    }
    if *verdict == CheckVerdict::Missing {
        return GradePolicy {
            enabled: false,
            placeholder: "Disabled for Missing".to_string(),
        };
    }
    GradePolicy {
        enabled: true,
        placeholder: "e.g. 18/20 or 90%".to_string(),
    }
}

/// Human-readable notes for a blocked or degraded checking form. Heads
/// may save past a closed window, so their notes say so.
pub fn checking_policy_notes(asg: &Assignment, now: NaiveDateTime, head_override: bool) -> Vec<String> {
    let mut notes = Vec::new();
    if !asg.assistant_open {
        notes.push(if head_override {
            "Assistant window is closed (head override allowed).".to_string()
        } else {
            "Assistant submissions are closed.".to_string()
        });
    }
    if let Some(dl) = asg.assistant_deadline_at() {
        if now > dl {
            notes.push(if head_override {
                "Assistant deadline has passed (head override allowed).".to_string()
            } else {
                "Assistant deadline has passed.".to_string()
            });
        }
    }
    if !asg.require_grade {
        notes.push("Grades are disabled for this assignment.".to_string());
    }
    notes
}
