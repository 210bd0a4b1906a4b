#![deny(warnings)]

//! HTTP+JSON API for the simulations: settings, simulation documents and
//! order snapshots over SQLite.

pub mod config;

pub use config::ServerConfig;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use sim_core::{OutcomeSnapshot, SimulationUpdate, ValidationError};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, warn, Instrument};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<ServerConfig>,
    request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

/// Error body mirroring the client's expectations: `message`, plus the raw
/// cause under `error` for failures.
#[derive(Debug)]
pub enum ApiError {
    NotFound(&'static str),
    BadRequest { message: &'static str, error: String },
    Internal { message: &'static str, error: anyhow::Error },
}

impl ApiError {
    /// Map a persistence failure: validation problems are the caller's fault.
    fn from_store(message: &'static str, err: anyhow::Error) -> Self {
        match err.downcast_ref::<ValidationError>() {
            Some(v) => ApiError::BadRequest {
                message: "Invalid request body",
                error: v.to_string(),
            },
            None => ApiError::Internal {
                message,
                error: err,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": format!("{what} not found") })),
            )
                .into_response(),
            ApiError::BadRequest { message, error } => {
                warn!(%error, "{message}");
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "message": message, "error": error })),
                )
                    .into_response()
            }
            ApiError::Internal { message, error } => {
                error!(error = %format!("{error:#}"), "{message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": message, "error": error.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

/// Ids that do not parse cannot exist.
fn parse_id(raw: &str, what: &'static str) -> Result<i64, ApiError> {
    raw.trim().parse::<i64>().map_err(|_| ApiError::NotFound(what))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/config/getConfig", get(get_config))
        .route("/api/simulations", post(create_simulation))
        .route(
            "/api/simulations/:id",
            put(update_simulation).get(get_simulation),
        )
        .route("/api/orders", post(create_order))
        .route("/api/orders/:id", get(get_order))
        .layer(from_fn_with_state(state.clone(), cors_middleware))
        .layer(from_fn_with_state(state.clone(), request_tracing_middleware))
        .with_state(state)
}

async fn root() -> &'static str {
    "Hello Server is running"
}

async fn get_config(State(state): State<AppState>) -> Result<Response, ApiError> {
    let settings = persistence::get_settings(&state.pool)
        .await
        .map_err(|e| ApiError::from_store("Error fetching config", e))?;
    Ok(Json(settings).into_response())
}

async fn create_simulation(
    State(state): State<AppState>,
    Json(body): Json<SimulationUpdate>,
) -> Result<Response, ApiError> {
    let record = persistence::create_simulation(&state.pool, &body)
        .await
        .map_err(|e| ApiError::from_store("Error creating simulation", e))?;
    Ok((StatusCode::CREATED, Json(record)).into_response())
}

async fn update_simulation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SimulationUpdate>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "Simulation")?;
    persistence::update_simulation(&state.pool, id, &body)
        .await
        .map_err(|e| ApiError::from_store("Error updating simulation", e))?
        .map(|record| Json(record).into_response())
        .ok_or(ApiError::NotFound("Simulation"))
}

async fn get_simulation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "Simulation")?;
    persistence::get_simulation(&state.pool, id)
        .await
        .map_err(|e| ApiError::from_store("Error fetching simulation", e))?
        .map(|record| Json(record).into_response())
        .ok_or(ApiError::NotFound("Simulation"))
}

async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<OutcomeSnapshot>,
) -> Result<Response, ApiError> {
    let record = persistence::create_order(&state.pool, &body)
        .await
        .map_err(|e| ApiError::from_store("Error saving order details", e))?;
    Ok((StatusCode::CREATED, Json(record)).into_response())
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "Order")?;
    persistence::get_order(&state.pool, id)
        .await
        .map_err(|e| ApiError::from_store("Error fetching order details", e))?
        .map(|record| Json(record).into_response())
        .ok_or(ApiError::NotFound("Order"))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(ToString::to_string)
}

async fn request_tracing_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let request_id = header_value(request.headers(), "x-request-id").unwrap_or_else(|| {
        let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
        format!("req-{id:016x}")
    });
    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %request.method(),
        route = %request.uri().path(),
    );
    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

fn allowed_origin(state: &AppState, headers: &HeaderMap) -> Option<HeaderValue> {
    let origin = header_value(headers, "origin")?;
    if state.config.cors_allowed_origins.iter().any(|o| o == &origin) {
        HeaderValue::from_str(&origin).ok()
    } else {
        None
    }
}

async fn cors_middleware(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    let origin = allowed_origin(&state, req.headers());
    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        if let Some(origin) = origin {
            let headers = resp.headers_mut();
            headers.insert("access-control-allow-origin", origin);
            headers.insert(
                "access-control-allow-methods",
                HeaderValue::from_static("GET,POST,PUT,OPTIONS"),
            );
            headers.insert(
                "access-control-allow-headers",
                HeaderValue::from_static("content-type,authorization,x-request-id"),
            );
            headers.insert(
                "access-control-allow-credentials",
                HeaderValue::from_static("true"),
            );
            headers.insert("vary", HeaderValue::from_static("Origin"));
        }
        return resp;
    }

    let mut resp = next.run(req).await;
    if let Some(origin) = origin {
        let headers = resp.headers_mut();
        headers.insert("access-control-allow-origin", origin);
        headers.insert(
            "access-control-allow-credentials",
            HeaderValue::from_static("true"),
        );
        headers.insert("vary", HeaderValue::from_static("Origin"));
    }
    resp
}
