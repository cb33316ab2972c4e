// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use std::{env, sync::Arc};
use tracing::{info, warn};
use tuber_gall_analyzer::{
    api::{start_server, AppState},
    cli::Args,
    config::AnalyzerConfig,
    inference::{GeminiClient, InferenceCollaborator},
    version, AnalysisHandler,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    info!("Starting {}", version::get_version_string());
    info!("Features: {}", version::FEATURES.join(", "));

    let mut config = AnalyzerConfig::from_env();
    args.apply(&mut config);
    config.validate()?;

    let collaborator: Option<Arc<dyn InferenceCollaborator>> =
        match GeminiClient::from_config(&config) {
            Ok(client) => {
                info!("Inference configured with model {}", client.model_name());
                Some(Arc::new(client))
            }
            Err(e) => {
                warn!("AI service not configured: {}", e);
                None
            }
        };

    let handler = AnalysisHandler::from_config(&config, collaborator);
    let state = AppState::new(handler, config.gemini_model.clone());

    start_server(&config, state).await
}
