pub mod core;
pub mod records;
pub mod status;
pub mod summary;
pub mod windows;

mod params;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::snapshot::Snapshot;
use params::ParamErr;

fn with_snapshot(
    state: &AppState,
    req: &Request,
    f: impl Fn(&Snapshot, &serde_json::Value) -> Result<serde_json::Value, ParamErr>,
) -> serde_json::Value {
    let Some(snap) = state.snapshot.as_ref() else {
        return err(&req.id, "no_snapshot", "load a snapshot first", None);
    };
    match f(snap, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn with_snapshot_mut(
    state: &mut AppState,
    req: &Request,
    f: impl Fn(&mut Snapshot, &serde_json::Value) -> Result<serde_json::Value, ParamErr>,
) -> serde_json::Value {
    let Some(snap) = state.snapshot.as_mut() else {
        return err(&req.id, "no_snapshot", "load a snapshot first", None);
    };
    match f(snap, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}
