// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;

use crate::config::AnalyzerConfig;

/// Dahlia tuber gall analyzer
#[derive(Parser, Debug, Default)]
#[command(name = "tuber-gall-analyzer")]
#[command(version)]
#[command(about = "Web service that checks dahlia tuber photos for gall disease", long_about = None)]
pub struct Args {
    /// Address to listen on (overrides LISTEN_ADDR)
    #[arg(long)]
    pub listen_addr: Option<String>,

    /// Gemini model name (overrides GEMINI_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Inference timeout in seconds (overrides INFERENCE_TIMEOUT_SECS)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Longest edge of photos sent to the model (overrides MAX_IMAGE_DIMENSION)
    #[arg(long)]
    pub max_dimension: Option<u32>,
}

impl Args {
    /// Apply command line overrides on top of the environment
    pub fn apply(&self, config: &mut AnalyzerConfig) {
        if let Some(addr) = &self.listen_addr {
            config.listen_addr = addr.clone();
        }
        if let Some(model) = &self.model {
            config.gemini_model = model.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.inference_timeout_secs = secs;
        }
        if let Some(dimension) = self.max_dimension {
            config.max_image_dimension = dimension;
        }
    }
}
