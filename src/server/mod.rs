//! HTTP server module for isitgov
//!
//! A thin, read-only REST layer over [`DomainLens`]. The server never
//! triggers refreshes itself; it serves whatever snapshot the refresh
//! scheduler last published.
//!
//! - `protocol` - error bodies and system info types
//! - `handlers` - route handlers
//!
//! # Usage
//!
//! ```rust,ignore
//! use isitgov::server::{start_server, ServerConfig, ServerState};
//!
//! let state = ServerState::new(DomainLens::new(store.clone()), info);
//! start_server(state, ServerConfig::default(), cancel.clone()).await?;
//! ```

pub mod handlers;
pub mod protocol;

pub use protocol::{ErrorCode, ErrorData, SystemInfo};

use crate::lens::domain::DomainLens;
use axum::{routing::get, Router as AxumRouter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

// =============================================================================
// Server Configuration
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub address: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Get the full bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

// =============================================================================
// Server State
// =============================================================================

/// Shared server state
#[derive(Clone)]
pub struct ServerState {
    pub lens: DomainLens,
    pub info: Arc<SystemInfo>,
}

impl ServerState {
    pub fn new(lens: DomainLens, info: SystemInfo) -> Self {
        Self {
            lens,
            info: Arc::new(info),
        }
    }
}

// =============================================================================
// Axum Router Creation
// =============================================================================

/// Create the Axum router with all routes registered
pub fn create_axum_router(state: ServerState) -> AxumRouter {
    use handlers::{domain, system};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    AxumRouter::new()
        .route("/health", get(system::health))
        .route("/status", get(system::status))
        .route("/info", get(system::info))
        .route("/domains", get(domain::list_domains))
        .route("/domains/:name", get(domain::get_domain))
        .route("/domains/:name/state-or-local", get(domain::state_or_local))
        .route("/search", get(domain::search))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Server Startup
// =============================================================================

/// Serve the HTTP API until `cancel` fires
pub async fn start_server(
    state: ServerState,
    config: ServerConfig,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let app = create_axum_router(state);

    let bind_address = config.bind_address();
    tracing::info!("Starting HTTP server on {}", bind_address);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{build_snapshot, SnapshotStore};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use tower::ServiceExt;

    const DOC: &str = "Domain Name,Domain Type,Agency,Organization,City,State
LBL.GOV,Federal,Department of Energy,Lawrence Berkeley National Laboratory,Berkeley,CA
AUSTINTEXAS.GOV,City,Non-Federal Agency,City of Austin,Austin,TX";

    fn app(populated: bool) -> AxumRouter {
        let store = Arc::new(SnapshotStore::new());
        if populated {
            store.publish(build_snapshot(DOC, None, Utc::now()).snapshot, 0, None);
        }
        let info = SystemInfo {
            server_version: "test".to_string(),
            source: "memory".to_string(),
            refresh_interval: "14days".to_string(),
        };
        create_axum_router(ServerState::new(DomainLens::new(store), info))
    }

    async fn get_json(app: AxumRouter, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[test]
    fn test_server_config_builder() {
        let config = ServerConfig::new().with_address("0.0.0.0").with_port(9000);
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(ServerConfig::default().bind_address(), "127.0.0.1:8080");
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(false)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_get_domain_case_insensitive() {
        let (status, value) = get_json(app(true), "/domains/lbl.gov").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["domain_name"], "LBL.GOV");
        assert_eq!(value["city"], "Berkeley");
        assert_eq!(value["is_state_or_local"], false);

        let (status, upper) = get_json(app(true), "/domains/LBL.GOV").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(upper["organization"], value["organization"]);
    }

    #[tokio::test]
    async fn test_get_domain_not_found() {
        let (status, value) = get_json(app(true), "/domains/nope.gov").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["code"], "NOT_FOUND");
        assert!(value["message"].as_str().unwrap().contains("NOPE.GOV"));
    }

    #[tokio::test]
    async fn test_state_or_local() {
        let (status, value) = get_json(app(true), "/domains/austintexas.gov/state-or-local").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["domain"], "AUSTINTEXAS.GOV");
        assert_eq!(value["is_state_or_local"], true);

        let (status, _) = get_json(app(true), "/domains/nope.gov/state-or-local").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_domains() {
        let (status, value) = get_json(app(true), "/domains").await;
        assert_eq!(status, StatusCode::OK);
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["AUSTINTEXAS.GOV"]["state"], "TX");

        let (status, value) = get_json(app(false), "/domains").await;
        assert_eq!(status, StatusCode::OK);
        assert!(value.as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search() {
        let (status, value) = get_json(app(true), "/search?state=tx").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value.as_array().unwrap().len(), 1);

        let (status, value) =
            get_json(app(true), "/search?federal_only=true&state_or_local_only=true").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["code"], "INVALID_PARAMS");
    }

    #[tokio::test]
    async fn test_status_and_info() {
        let (status, value) = get_json(app(true), "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["records"], 2);
        assert_eq!(value["refresh_count"], 1);

        let (status, value) = get_json(app(false), "/info").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["refresh_interval"], "14days");
    }
}
