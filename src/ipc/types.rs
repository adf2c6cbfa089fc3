use serde::Deserialize;

use crate::snapshot::Snapshot;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// All state lives here and is passed explicitly into every handler.
/// No snapshot means no dashboard has been loaded yet.
#[derive(Default)]
pub struct AppState {
    pub snapshot: Option<Snapshot>,
}
