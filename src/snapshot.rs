use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::records::{Assignment, Assistant, Check, Student, Submission};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Branding {
    pub school_name: Option<String>,
    pub date_format: Option<String>,
}

/// One dashboard's worth of portal data, held in memory and replaced
/// wholesale on load. Record appends are the only mutations; statuses are
/// recomputed from scratch on every query.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub assignments: Vec<Assignment>,
    pub submissions: Vec<Submission>,
    pub checks: Vec<Check>,
    pub students: Vec<Student>,
    pub assistants: Vec<Assistant>,
    pub branding: Branding,
}

impl Snapshot {
    pub fn from_value(v: serde_json::Value) -> anyhow::Result<Self> {
        serde_json::from_value(v).context("snapshot payload did not match the portal shape")
    }

    pub fn assignment(&self, assignment_id: &str) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.assignment_id == assignment_id)
    }

    pub fn student(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.student_id == student_id)
    }

    /// Students in the same course as the assignment, in snapshot order.
    pub fn students_for_assignment<'a>(&'a self, asg: &'a Assignment) -> Vec<&'a Student> {
        self.students
            .iter()
            .filter(|s| s.course == asg.course)
            .collect()
    }

    pub fn submission_exists(&self, assignment_id: &str, student_id: &str) -> bool {
        self.submissions
            .iter()
            .any(|s| s.assignment_id == assignment_id && s.student_id == student_id)
    }

    pub fn date_format(&self) -> Option<&str> {
        self.branding.date_format.as_deref()
    }

    pub fn assistant_name(&self, assistant_id: &str) -> Option<&str> {
        self.assistants
            .iter()
            .find(|a| a.user_id == assistant_id)
            .map(|a| a.display_name.as_str())
    }

    pub fn push_submission(&mut self, submission: Submission) {
        self.submissions.push(submission);
    }

    pub fn push_check(&mut self, check: Check) {
        self.checks.push(check);
    }

    pub fn counts(&self) -> (usize, usize, usize, usize) {
        (
            self.assignments.len(),
            self.submissions.len(),
            self.checks.len(),
            self.students.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_a_partial_snapshot_with_defaults() {
        let snap = Snapshot::from_value(json!({
            "assignments": [
                { "assignmentId": "as1", "title": "Homework 5", "course": "Math" }
            ],
            "students": [
                { "studentId": "s1", "studentName": "Omar Hassan", "course": "Math" },
                { "studentId": "s2", "studentName": "Lina Aziz", "course": "Physics" }
            ]
        }))
        .expect("snapshot");
        assert_eq!(snap.counts(), (1, 0, 0, 2));
        assert!(snap.branding.date_format.is_none());

        let asg = snap.assignment("as1").expect("assignment");
        let in_course = snap.students_for_assignment(asg);
        assert_eq!(in_course.len(), 1);
        assert_eq!(in_course[0].student_id, "s1");
    }

    #[test]
    fn rejects_a_malformed_snapshot() {
        let got = Snapshot::from_value(json!({ "assignments": [{ "title": 7 }] }));
        assert!(got.is_err());
    }
}
