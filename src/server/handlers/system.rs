//! System handlers: health, refresh status and server info

use crate::registry::StoreStatus;
use crate::server::protocol::SystemInfo;
use crate::server::ServerState;
use axum::extract::State;
use axum::Json;

/// Liveness check
pub async fn health() -> &'static str {
    "OK"
}

/// Refresh metadata of the snapshot store
pub async fn status(State(state): State<ServerState>) -> Json<StoreStatus> {
    Json(state.lens.status())
}

pub async fn info(State(state): State<ServerState>) -> Json<SystemInfo> {
    Json(state.info.as_ref().clone())
}
