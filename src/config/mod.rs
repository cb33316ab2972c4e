// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the analyzer service

use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::vision::DEFAULT_MAX_DIMENSION;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_INFERENCE_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Errors detected while loading configuration or building the inference client
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Runtime configuration for the analyzer
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Gemini API key; `None` keeps the service up but every analysis returns
    /// the configuration error result
    pub gemini_api_key: Option<String>,
    /// Model used for analysis
    pub gemini_model: String,
    /// Base URL of the Gemini REST API
    pub gemini_api_base: String,
    /// Upper bound for a single inference call, in seconds
    pub inference_timeout_secs: u64,
    /// Maximum width and height of photos sent to the model
    pub max_image_dimension: u32,
    /// Request body limit for uploads
    pub max_upload_bytes: usize,
    /// HTTP listen address
    pub listen_addr: String,
}

impl AnalyzerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            gemini_api_key: lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()),
            gemini_model: lookup("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_api_base: lookup("GEMINI_API_BASE").unwrap_or(defaults.gemini_api_base),
            inference_timeout_secs: lookup("INFERENCE_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.inference_timeout_secs),
            max_image_dimension: lookup("MAX_IMAGE_DIMENSION")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_image_dimension),
            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            listen_addr: lookup("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inference_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "INFERENCE_TIMEOUT_SECS",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.max_image_dimension == 0 {
            return Err(ConfigError::Invalid {
                field: "MAX_IMAGE_DIMENSION",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "MAX_UPLOAD_BYTES",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.gemini_model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "GEMINI_MODEL",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Check whether the inference credential is present
    pub fn has_api_key(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            inference_timeout_secs: DEFAULT_INFERENCE_TIMEOUT_SECS,
            max_image_dimension: DEFAULT_MAX_DIMENSION,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }
}
