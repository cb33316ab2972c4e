// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use super::analyze::{analyze_api_handler, analyze_form_handler};
use super::pages::index_handler;
use crate::analysis::AnalysisHandler;
use crate::config::AnalyzerConfig;
use crate::version;

#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<AnalysisHandler>,
    /// Model name reported by the health endpoint
    pub model: String,
}

impl AppState {
    pub fn new(handler: AnalysisHandler, model: impl Into<String>) -> Self {
        Self {
            handler: Arc::new(handler),
            model: model.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub inference_configured: bool,
    pub model: String,
    pub version: String,
}

pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_form_handler))
        .route("/v1/analyze", post(analyze_api_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: &AnalyzerConfig, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = config.listen_addr.parse()?;
    let app = create_router(state, config.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let configured = state.handler.is_configured();
    Json(HealthResponse {
        status: if configured { "healthy" } else { "degraded" }.to_string(),
        inference_configured: configured,
        model: state.model.clone(),
        version: version::VERSION_NUMBER.to_string(),
    })
}
