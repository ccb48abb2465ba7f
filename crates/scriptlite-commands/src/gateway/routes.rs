//! Route table and handlers.

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use scriptlite_env::versions::{available_versions, normalize_requested};

use super::error::{outcome_status, ApiError, ApiResult};
use super::{AppState, MAX_RUN_TIMEOUT};
use crate::store::{SaveOutcome, SaveRequest};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/versions", get(versions))
        .route("/api/scripts", get(list_scripts).post(save_script))
        // legacy form endpoint
        .route("/save-script", post(save_script))
        .route("/api/scripts/:name", get(show_script))
        .route("/api/scripts/:name/run", post(run_script))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub hostname: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        hostname: hostname(),
    })
}

#[cfg(unix)]
fn hostname() -> String {
    nix::unistd::gethostname()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(hostname_from_env)
}

#[cfg(not(unix))]
fn hostname() -> String {
    hostname_from_env()
}

fn hostname_from_env() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .ok()
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .map(|s| s.trim().to_string())
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

async fn versions(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let source = state.versions.clone();
    let versions = tokio::task::spawn_blocking(move || available_versions(source.as_ref())).await?;
    Ok(Json(json!({
        "versions": versions,
        "default": state.default_python,
    })))
}

/// Body of a save. `filename` is also accepted as `name`.
#[derive(Debug, Deserialize)]
pub struct SaveBody {
    #[serde(alias = "name")]
    pub filename: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "python_version")]
    pub version: Option<String>,
    #[serde(default)]
    pub overwrite: bool,
}

async fn save_script(
    State(state): State<AppState>,
    Json(body): Json<SaveBody>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let name = body
        .filename
        .ok_or_else(|| ApiError::BadRequest("missing 'filename'".to_string()))?;
    let req = SaveRequest {
        name,
        content: body.content,
        python_version: normalize_requested(body.version.as_deref(), &state.default_python),
        overwrite: body.overwrite,
    };

    let store = state.store.clone();
    let outcome = tokio::task::spawn_blocking(move || store.save(&req)).await??;
    let report = outcome.outcome();
    let script = match &outcome {
        SaveOutcome::Saved(s) => Some(s),
        SaveOutcome::Conflict { .. } => None,
    };
    Ok((
        outcome_status(report.status),
        Json(json!({
            "status": report.status,
            "message": report.message,
            "script": script,
        })),
    ))
}

async fn list_scripts(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let catalog = state.catalog.clone();
    let scripts = tokio::task::spawn_blocking(move || catalog.list()).await??;
    Ok(Json(json!({ "scripts": scripts })))
}

async fn show_script(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    let catalog = state.catalog.clone();
    let (entry, content) = tokio::task::spawn_blocking(move || {
        let entry = catalog.record(&name)?;
        let content = catalog.read(&name)?;
        Ok::<_, scriptlite_core::script::ScriptError>((entry, content))
    })
    .await??;
    Ok(Json(json!({ "script": entry, "content": content })))
}

#[derive(Debug, Default, Deserialize)]
pub struct RunBody {
    #[serde(default)]
    pub args: Vec<String>,
    pub timeout_secs: Option<u64>,
}

impl RunBody {
    /// An empty body means "no args, default timeout"; anything else must
    /// be a valid JSON object.
    fn parse(raw: &[u8]) -> Result<Self, ApiError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(raw)
            .map_err(|e| ApiError::BadRequest(format!("invalid run body: {}", e)))
    }
}

async fn run_script(
    State(state): State<AppState>,
    Path(name): Path<String>,
    raw: Bytes,
) -> ApiResult<Json<Value>> {
    let body = RunBody::parse(&raw)?;
    let timeout = body
        .timeout_secs
        .map(|s| Duration::from_secs(s).min(MAX_RUN_TIMEOUT));
    let runner = state.runner.clone();
    let report =
        tokio::task::spawn_blocking(move || runner.run(&name, &body.args, timeout)).await??;
    Ok(Json(json!({ "run": report })))
}
