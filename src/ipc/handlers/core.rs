use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::snapshot::Snapshot;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    let counts = state.snapshot.as_ref().map(|s| {
        let (assignments, submissions, checks, students) = s.counts();
        json!({
            "assignments": assignments,
            "submissions": submissions,
            "checks": checks,
            "students": students,
        })
    });
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "snapshotLoaded": state.snapshot.is_some(),
            "counts": counts,
        }),
    )
}

fn handle_snapshot_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(payload) = req.params.get("snapshot").cloned() else {
        return err(&req.id, "bad_params", "missing params.snapshot", None);
    };
    match Snapshot::from_value(payload) {
        Ok(snap) => {
            let (assignments, submissions, checks, students) = snap.counts();
            state.snapshot = Some(snap);
            ok(
                &req.id,
                json!({
                    "assignments": assignments,
                    "submissions": submissions,
                    "checks": checks,
                    "students": students,
                }),
            )
        }
        Err(e) => err(&req.id, "bad_snapshot", format!("{e:#}"), None),
    }
}

fn handle_snapshot_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.snapshot = None;
    ok(&req.id, json!({ "cleared": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "snapshot.load" => Some(handle_snapshot_load(state, req)),
        "snapshot.reset" => Some(handle_snapshot_reset(state, req)),
        _ => None,
    }
}
