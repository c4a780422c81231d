//! HTTP boundary for thermosense.
//!
//! Thin routing layer over `thermosense-core`:
//!
//! - `GET /` — liveness message
//! - `GET /system_stats` — live [`SensorReading`] as JSON
//! - `POST /advisory` — advisory pipeline over a JSON input
//!
//! The advisory engine is fitted before the listener binds, so no request
//! is ever served by a half-warmed model. The trained engine is read-only
//! and shared across handlers without locking.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::Response,
    routing::{get, post},
};
use serde::Serialize;

use thermosense_core::{
    AdvisoryEngine, AdvisoryInput, AdvisoryResult, SensorReading, SystemCommands, probe,
};

/// Shared server state: the warmed-up engine plus the diagnostic-command
/// capability used by the probe endpoint.
pub struct AppState {
    engine: AdvisoryEngine,
    commands: SystemCommands,
}

impl AppState {
    pub fn new(engine: AdvisoryEngine) -> Self {
        Self {
            engine,
            commands: SystemCommands::default(),
        }
    }
}

#[derive(Serialize)]
struct IndexResponse {
    message: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

async fn handle_index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "ThermoSense API is running",
        version: thermosense_core::VERSION,
    })
}

/// Probe host telemetry. The probe blocks for its CPU sampling window and
/// spawns short-lived subprocesses, so it runs on the blocking pool. The
/// join only fails if the probe panicked; that surfaces as a 500.
async fn handle_system_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SensorReading>, (StatusCode, Json<ErrorResponse>)> {
    let commands = state.commands.clone();
    match tokio::task::spawn_blocking(move || probe(&commands)).await {
        Ok(reading) => Ok(Json(reading)),
        Err(e) => {
            log::error!("telemetry probe task failed: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "telemetry probe failed".to_string(),
                }),
            ))
        }
    }
}

async fn handle_advisory(
    State(state): State<Arc<AppState>>,
    Json(input): Json<AdvisoryInput>,
) -> Result<Json<AdvisoryResult>, (StatusCode, Json<ErrorResponse>)> {
    match state.engine.advise(&input) {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            // Generation failure is fatal to this request only; surface it
            // rather than inventing a placeholder tip.
            log::error!("advisory request failed: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

/// Allow the dashboard frontend (any origin) to call the API.
async fn allow_cors(response: Response) -> Response {
    let mut response = response;
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

/// Build the axum router around a warmed-up engine.
pub fn build_router(engine: AdvisoryEngine) -> Router {
    let state = Arc::new(AppState::new(engine));

    Router::new()
        .route("/", get(handle_index))
        .route("/system_stats", get(handle_system_stats))
        .route("/advisory", post(handle_advisory))
        .layer(axum::middleware::map_response(allow_cors))
        .with_state(state)
}

/// Run the HTTP server. Returns only on bind/serve failure.
pub async fn run_server(
    engine: AdvisoryEngine,
    host: &str,
    port: u16,
) -> Result<(), std::io::Error> {
    let app = build_router(engine);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("thermosense server listening on {addr}");
    axum::serve(listener, app).await
}
