//! Domain lookup handlers
//!
//! - `GET /domains` - every record, keyed by domain name
//! - `GET /domains/:name` - one record
//! - `GET /domains/:name/state-or-local` - state/local classification
//! - `GET /search` - filtered listing (`DomainSearchArgs` as query parameters)

use crate::lens::domain::DomainSearchArgs;
use crate::registry::{normalize_domain, RegistrationRecord};
use crate::server::protocol::{ErrorCode, ErrorData};
use crate::server::ServerState;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

/// All records of the current snapshot
pub async fn list_domains(State(state): State<ServerState>) -> Response {
    let snapshot = state.lens.get_all();
    // serialize straight from the shared snapshot instead of cloning the map
    match serde_json::to_vec(snapshot.records()) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => ErrorData::new(ErrorCode::InternalError, e.to_string()).into_response(),
    }
}

pub async fn get_domain(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<RegistrationRecord>, ErrorData> {
    state
        .lens
        .get_by_domain(&name)
        .map(Json)
        .ok_or_else(|| ErrorData::not_found(&normalize_domain(&name)))
}

pub async fn state_or_local(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<crate::lens::domain::StateOrLocalResult>, ErrorData> {
    state
        .lens
        .state_or_local(&name)
        .map(Json)
        .ok_or_else(|| ErrorData::not_found(&normalize_domain(&name)))
}

pub async fn search(
    State(state): State<ServerState>,
    Query(args): Query<DomainSearchArgs>,
) -> Result<Json<Vec<RegistrationRecord>>, ErrorData> {
    state
        .lens
        .search(&args)
        .map(Json)
        .map_err(|e| ErrorData::invalid_params(e.to_string()))
}
