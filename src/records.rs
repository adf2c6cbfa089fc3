use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::dates::parse_maybe_iso;

/// Closed set of check verdicts. The portal stored these as free-form
/// strings (`"Checked"`, `" redo "`, ...); normalization happens once,
/// at deserialization, instead of at every call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckVerdict {
    Checked,
    Missing,
    Redo,
    Other(String),
}

impl CheckVerdict {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "checked" => CheckVerdict::Checked,
            "missing" => CheckVerdict::Missing,
            "redo" => CheckVerdict::Redo,
            other => CheckVerdict::Other(other.to_string()),
        }
    }

    /// Canonical display casing for known verdicts.
    pub fn display(&self) -> String {
        match self {
            CheckVerdict::Checked => "Checked".to_string(),
            CheckVerdict::Missing => "Missing".to_string(),
            CheckVerdict::Redo => "Redo".to_string(),
            CheckVerdict::Other(s) => s.clone(),
        }
    }
}

impl<'de> Deserialize<'de> for CheckVerdict {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(de)?;
        Ok(CheckVerdict::from_raw(&raw))
    }
}

impl Serialize for CheckVerdict {
    fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&self.display())
    }
}

/// The portal sent open flags as either `true` or `"true"`.
fn bool_ish<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    let v = serde_json::Value::deserialize(de)?;
    Ok(match v {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn opt_string_nonempty<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let v: Option<String> = Option::deserialize(de)?;
    Ok(v.filter(|s| !s.trim().is_empty()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub assignment_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "bool_ish")]
    pub require_grade: bool,
    #[serde(default, deserialize_with = "bool_ish")]
    pub student_open: bool,
    #[serde(default, deserialize_with = "bool_ish")]
    pub assistant_open: bool,
    #[serde(default, deserialize_with = "opt_string_nonempty")]
    pub student_deadline: Option<String>,
    // Legacy field kept by older assignments; studentDeadline wins when both exist.
    #[serde(default, deserialize_with = "opt_string_nonempty")]
    pub deadline: Option<String>,
    #[serde(default, deserialize_with = "opt_string_nonempty")]
    pub assistant_deadline: Option<String>,
}

impl Assignment {
    pub fn student_deadline_at(&self) -> Option<NaiveDateTime> {
        self.student_deadline
            .as_deref()
            .or(self.deadline.as_deref())
            .and_then(parse_maybe_iso)
    }

    pub fn assistant_deadline_at(&self) -> Option<NaiveDateTime> {
        self.assistant_deadline.as_deref().and_then(parse_maybe_iso)
    }

    pub fn student_deadline_raw(&self) -> &str {
        self.student_deadline
            .as_deref()
            .or(self.deadline.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default, deserialize_with = "opt_string_nonempty")]
    pub submission_id: Option<String>,
    pub assignment_id: String,
    pub student_id: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default, deserialize_with = "opt_string_nonempty")]
    pub submitted_at: Option<String>,
    #[serde(
        rename = "submittedAtISO",
        default,
        deserialize_with = "opt_string_nonempty"
    )]
    pub submitted_at_iso: Option<String>,
    #[serde(default, deserialize_with = "opt_string_nonempty")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "opt_string_nonempty")]
    pub updated_at: Option<String>,
}

impl Submission {
    /// Canonical timestamp precedence for submissions.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.submitted_at
            .as_deref()
            .or(self.submitted_at_iso.as_deref())
            .or(self.created_at.as_deref())
            .or(self.updated_at.as_deref())
            .and_then(parse_maybe_iso)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    #[serde(default, deserialize_with = "opt_string_nonempty")]
    pub check_id: Option<String>,
    pub assignment_id: String,
    pub student_id: String,
    pub status: CheckVerdict,
    #[serde(default, deserialize_with = "opt_string_nonempty")]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "opt_string_nonempty")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "opt_string_nonempty")]
    pub file_url: Option<String>,
    #[serde(default, deserialize_with = "opt_string_nonempty")]
    pub assistant_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string_nonempty")]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "opt_string_nonempty")]
    pub created_at: Option<String>,
}

impl Check {
    /// Canonical timestamp precedence for checks.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.updated_at
            .as_deref()
            .or(self.created_at.as_deref())
            .and_then(parse_maybe_iso)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub student_id: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub course: String,
    #[serde(default, deserialize_with = "opt_string_nonempty")]
    pub assistant_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assistant {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
}

// The portal picked the latest record with an ad-hoc sort at each call
// site; here there is one reducer per record kind. Max by timestamp,
// missing timestamps sort lowest; equal timestamps fall back to the
// greater record id so the result is stable across snapshot reloads.
fn later(a: (Option<NaiveDateTime>, &str), b: (Option<NaiveDateTime>, &str)) -> bool {
    match (a.0, b.0) {
        (Some(x), Some(y)) if x != y => x > y,
        (Some(_), None) => true,
        (None, Some(_)) => false,
        _ => a.1 > b.1,
    }
}

pub fn latest_submission<'a>(
    records: &'a [Submission],
    assignment_id: &str,
    student_id: &str,
) -> Option<&'a Submission> {
    let mut best: Option<&Submission> = None;
    for s in records {
        if s.assignment_id != assignment_id || s.student_id != student_id {
            continue;
        }
        match best {
            None => best = Some(s),
            Some(b) => {
                let sid = s.submission_id.as_deref().unwrap_or("");
                let bid = b.submission_id.as_deref().unwrap_or("");
                if later((s.timestamp(), sid), (b.timestamp(), bid)) {
                    best = Some(s);
                }
            }
        }
    }
    best
}

pub fn latest_check<'a>(
    records: &'a [Check],
    assignment_id: &str,
    student_id: &str,
) -> Option<&'a Check> {
    let mut best: Option<&Check> = None;
    for c in records {
        if c.assignment_id != assignment_id || c.student_id != student_id {
            continue;
        }
        match best {
            None => best = Some(c),
            Some(b) => {
                let cid = c.check_id.as_deref().unwrap_or("");
                let bid = b.check_id.as_deref().unwrap_or("");
                if later((c.timestamp(), cid), (b.timestamp(), bid)) {
                    best = Some(c);
                }
            }
        }
    }
    best
}
