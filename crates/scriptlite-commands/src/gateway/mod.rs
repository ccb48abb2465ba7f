//! JSON HTTP gateway over the script store (`scriptlite serve`).
//!
//! Handlers are thin: they decode the request, hand the blocking work to
//! `spawn_blocking`, and map the outcome tag to a status code.

pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use scriptlite_core::script::ScriptCatalog;
use scriptlite_env::versions::VersionSource;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::runner::ScriptRunner;
use crate::store::ScriptStore;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ScriptStore>,
    pub catalog: Arc<ScriptCatalog>,
    pub runner: Arc<ScriptRunner>,
    pub versions: Arc<dyn VersionSource>,
    pub default_python: String,
}

impl AppState {
    pub fn from_context(ctx: &AppContext) -> Result<Self> {
        Ok(Self {
            store: Arc::new(ctx.store()?),
            catalog: Arc::new(ctx.catalog()),
            runner: Arc::new(ctx.runner()?),
            versions: ctx.version_source(),
            default_python: ctx.tools.default_python.clone(),
        })
    }
}

pub fn router(state: AppState) -> Router {
    routes::routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `listen` and serve until Ctrl-C.
pub async fn serve(state: AppState, listen: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {}", listen))?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, root = %state.catalog.layout().root().display(), "Gateway listening");
    eprintln!("🚀 ScriptLite gateway on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Gateway server error")?;
    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
}

/// `scriptlite serve [--listen <addr>]`
pub fn cmd_serve(listen: Option<&str>) -> Result<()> {
    let ctx = AppContext::load()?;
    let listen = listen
        .map(str::to_string)
        .unwrap_or_else(|| scriptlite_core::config::ServerConfig::from_env().listen);
    let state = AppState::from_context(&ctx)?;
    std::fs::create_dir_all(&ctx.paths.script_root).with_context(|| {
        format!(
            "Failed to create script root: {}",
            ctx.paths.script_root.display()
        )
    })?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    rt.block_on(serve(state, &listen))
}

/// Upper bound for a single run requested over HTTP.
pub(crate) const MAX_RUN_TIMEOUT: Duration = Duration::from_secs(3600);
