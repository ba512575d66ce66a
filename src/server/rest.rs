// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! REST API server implementation using axum.
//!
//! # Endpoints
//!
//! - `POST /oracle` - Run a hybrid routine
//! - `GET /health` - Health check
//! - `GET /version` - Get server version
//! - `GET /providers` - Provider credential presence
//!
//! Every failure of `POST /oracle` is reported as `500 {"detail": ...}`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::ServerState;
use crate::config::{CorsConfig, ServerConfig};
use crate::device::{DeviceInfo, DeviceSelector, HealthStatus, QpuMode};
use crate::error::{Error, Result};
use crate::hybrid::{dispatch, RunContext};
use crate::provider::{has_provider_key, Provider, PROVIDERS};

/// REST server for the oracle.
pub struct RestServer {
    state: Arc<ServerState>,
}

impl RestServer {
    /// Create a new REST server.
    pub fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }

    /// Start the REST server.
    pub async fn serve(self, config: &ServerConfig) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address: {}", e)))?;

        info!(address = %addr, "Starting REST server");

        let app = router(self.state.clone());
        let mut shutdown_rx = self.state.shutdown_receiver();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Server(format!("Failed to bind REST server: {}", e)))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
                info!("REST server shutting down");
            })
            .await
            .map_err(|e| Error::Server(format!("REST server error: {}", e)))?;

        Ok(())
    }
}

/// Build the router with CORS and request tracing.
pub fn router(state: Arc<ServerState>) -> Router {
    let cors = cors_layer(&state.config.server.cors);
    Router::new()
        .route("/oracle", post(oracle))
        .route("/health", get(health_check))
        .route("/version", get(get_version))
        .route("/providers", get(list_providers))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.allow_all {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

// =============================================================================
// Request/Response types
// =============================================================================

/// Oracle request.
#[derive(Debug, Deserialize)]
struct OracleRequest {
    mode: String,
    #[serde(default)]
    params: Map<String, Value>,
    qpu_mode: Option<String>,
    provider: Option<String>,
}

/// Oracle response.
#[derive(Debug, Serialize)]
struct OracleResponse {
    result: Value,
}

/// Error response.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    /// Device a request with default fields would run on
    device: Option<DeviceInfo>,
    device_status: Option<HealthStatus>,
}

/// Version response.
#[derive(Debug, Serialize)]
struct VersionResponse {
    version: String,
    name: String,
}

/// Provider list response.
#[derive(Debug, Serialize)]
struct ProvidersResponse {
    providers: Vec<ProviderStatus>,
    default_provider: Option<Provider>,
    default_qpu_mode: QpuMode,
    force_free_qpu: bool,
}

/// Credential presence for one provider.
#[derive(Debug, Serialize)]
struct ProviderStatus {
    name: Provider,
    configured: bool,
    required_keys: Vec<&'static str>,
}

/// Any oracle failure, rendered as `500 {"detail": ...}`.
struct OracleError(Error);

impl From<Error> for OracleError {
    fn from(e: Error) -> Self {
        OracleError(e)
    }
}

impl IntoResponse for OracleError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                detail: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Oracle endpoint.
async fn oracle(
    State(state): State<Arc<ServerState>>,
    payload: std::result::Result<Json<OracleRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let result = match payload {
        Ok(Json(req)) => run_oracle(&state, &request_id, req).await,
        Err(rejection) => Err(Error::Serialization(rejection.body_text())),
    };

    let mut response = match result {
        Ok(result) => Json(OracleResponse { result }).into_response(),
        Err(e) => {
            error!(request_id = %request_id, kind = e.kind(), error = %e, "Oracle request failed");
            OracleError::from(e).into_response()
        }
    };
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

async fn run_oracle(state: &ServerState, request_id: &str, req: OracleRequest) -> Result<Value> {
    let config = &state.config;

    let qpu_mode = match req.qpu_mode.as_deref() {
        Some(mode) => mode.parse::<QpuMode>()?,
        None => config.defaults.qpu_mode,
    };
    let provider = match req.provider.as_deref() {
        Some(name) => Some(name.parse::<Provider>()?),
        None => config.defaults.provider,
    };

    debug!(
        request_id = %request_id,
        mode = %req.mode,
        qpu_mode = %qpu_mode,
        provider = ?provider,
        "Oracle request"
    );

    let selection = DeviceSelector::new(&config.providers, &config.vqe).select(qpu_mode, provider)?;
    for skip in &selection.fallbacks {
        debug!(request_id = %request_id, tier = %skip.tier, provider = ?skip.provider, reason = %skip.reason, "Tier skipped");
    }

    let ctx = RunContext::new(selection.device, &config.vqe, &config.limits);
    let result = dispatch(state.solver.as_ref(), &ctx, &req.mode, &req.params).await?;

    info!(
        request_id = %request_id,
        mode = %req.mode,
        device = %ctx.device.name(),
        tier = %selection.tier,
        "Oracle request completed"
    );
    Ok(result)
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    let config = &state.config;
    let selection = DeviceSelector::new(&config.providers, &config.vqe)
        .select(config.defaults.qpu_mode, config.defaults.provider);

    let (device, device_status) = match selection {
        Ok(selection) => {
            let status = match selection.device.health_check().await {
                Ok(status) => status,
                Err(e) => {
                    warn!(error = %e, "Default device health check failed");
                    HealthStatus::Unavailable
                }
            };
            (Some(selection.device.info()), Some(status))
        }
        Err(e) => {
            warn!(error = %e, "No default device");
            (None, None)
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        device,
        device_status,
    })
}

/// Get version endpoint.
async fn get_version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        name: "Quantum Oracle".to_string(),
    })
}

/// Provider list endpoint.
async fn list_providers(State(state): State<Arc<ServerState>>) -> Json<ProvidersResponse> {
    let config = &state.config;
    let providers = PROVIDERS
        .iter()
        .map(|&p| ProviderStatus {
            name: p,
            configured: has_provider_key(&config.providers, p),
            required_keys: p.required_keys().to_vec(),
        })
        .collect();

    Json(ProvidersResponse {
        providers,
        default_provider: config.defaults.provider,
        default_qpu_mode: config.defaults.qpu_mode,
        force_free_qpu: config.providers.force_free_qpu,
    })
}
