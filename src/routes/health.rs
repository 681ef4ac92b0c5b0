//! Health check endpoints
//!
//! - /health, /healthz - Liveness probe (is the service running?)
//! - /ready, /readyz - Readiness probe (is the database reachable?)
//! - /version - Build information for deployment verification
//!
//! Liveness always answers 200; readiness answers 503 until a database
//! connection exists, so load balancers keep traffic away from instances
//! that would answer every data request with DB_UNAVAILABLE.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::envelope::ApiBody;
use crate::server::AppState;

/// Health response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall health status (true if the service is running)
    pub healthy: bool,
    /// 'online' when the database is connected, 'degraded' otherwise
    pub status: &'static str,
    /// Service version
    pub version: &'static str,
    /// Current timestamp
    pub timestamp: String,
    /// Node identifier
    pub node_id: String,
    /// Database connection status
    pub database: DatabaseHealth,
}

/// Database connection details
#[derive(Serialize)]
pub struct DatabaseHealth {
    /// Whether MONGODB_URI and MONGODB_DB are both set
    pub configured: bool,
    /// Whether a connection was established at startup
    pub connected: bool,
}

fn build_health_response(state: &AppState) -> HealthResponse {
    let configured = state.args.database_config().is_some();
    let connected = state.mongo.is_some();

    HealthResponse {
        healthy: true,
        status: if connected { "online" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        node_id: state.args.node_id.to_string(),
        database: DatabaseHealth {
            configured,
            connected,
        },
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<ApiBody> {
    let json = serde_json::to_string(body)
        .unwrap_or_else(|_| r#"{"healthy":false,"error":"Serialization failed"}"#.to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(json)))
        .unwrap()
}

/// Handle liveness probe (/health, /healthz)
pub fn health_check(state: &AppState) -> Response<ApiBody> {
    let response = build_health_response(state);

    // Liveness probe: always return 200 if the service is running
    json_response(StatusCode::OK, &response)
}

/// Handle readiness probe (/ready, /readyz)
pub fn readiness_check(state: &AppState) -> Response<ApiBody> {
    let response = build_health_response(state);

    let status = if response.database.connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    json_response(status, &response)
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    /// Cargo package version
    pub version: &'static str,
    /// Git commit hash (short)
    pub commit: &'static str,
    /// Build timestamp
    pub build_time: &'static str,
    /// Service name
    pub service: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<ApiBody> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "annuaire",
    };

    json_response(StatusCode::OK, &response)
}
