// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gemini client for tuber analysis via the `generateContent` REST API

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::collaborator::{InferenceCollaborator, InferenceFailure, InferenceFailureKind};
use super::prompt::{AnalysisRequest, ContentPart};
use crate::config::{AnalyzerConfig, ConfigError};
use crate::vision::encode_jpeg_base64;

// --- Gemini serde structs ---

#[derive(serde::Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(serde::Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(serde::Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(serde::Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(serde::Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the Gemini multimodal API
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model_name: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(
        endpoint: &str,
        api_key: &str,
        model_name: &str,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "Gemini client configured: endpoint={}, model={}",
            endpoint, model_name
        );

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.trim().to_string(),
            model_name: model_name.to_string(),
            timeout,
        })
    }

    /// Build a client from the analyzer configuration. Fails when the API key
    /// is absent.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .gemini_api_key
            .as_deref()
            .ok_or(ConfigError::MissingApiKey)?;
        Self::new(
            &config.gemini_api_base,
            api_key,
            &config.gemini_model,
            config.inference_timeout(),
        )
    }

    /// Get the model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model_name
        )
    }

    fn build_body(request: &AnalysisRequest) -> Result<GenerateContentRequest, InferenceFailure> {
        let mut parts = Vec::with_capacity(request.image_count() + 1);
        for part in request.parts() {
            match part {
                ContentPart::Text(text) => parts.push(Part::Text {
                    text: text.to_string(),
                }),
                ContentPart::Image(image) => {
                    let data = encode_jpeg_base64(&image.image).map_err(|e| {
                        InferenceFailure::new(
                            InferenceFailureKind::MalformedRequest,
                            format!("could not encode {}: {}", image.filename, e),
                        )
                    })?;
                    parts.push(Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/jpeg",
                            data,
                        },
                    });
                }
            }
        }

        Ok(GenerateContentRequest {
            contents: vec![Content { role: "user", parts }],
        })
    }

    /// Build the request body on the blocking pool; JPEG encoding is CPU-bound.
    async fn encode_body(
        request: AnalysisRequest,
    ) -> Result<GenerateContentRequest, InferenceFailure> {
        tokio::task::spawn_blocking(move || Self::build_body(&request))
            .await
            .map_err(|e| {
                InferenceFailure::new(
                    InferenceFailureKind::MalformedRequest,
                    format!("image encoding task failed: {}", e),
                )
            })?
    }

    fn transport_failure(&self, e: reqwest::Error) -> InferenceFailure {
        if e.is_timeout() {
            InferenceFailure::new(
                InferenceFailureKind::Timeout,
                format!("no answer after {}s", self.timeout.as_secs()),
            )
        } else if e.is_connect() || e.is_request() {
            InferenceFailure::new(InferenceFailureKind::Network, e.to_string())
        } else {
            InferenceFailure::new(InferenceFailureKind::Provider, e.to_string())
        }
    }
}

/// Map a non-success HTTP status to a failure kind
fn classify_status(status: StatusCode) -> InferenceFailureKind {
    match status.as_u16() {
        401 | 403 => InferenceFailureKind::Auth,
        429 => InferenceFailureKind::Quota,
        400 | 404 | 413 => InferenceFailureKind::MalformedRequest,
        _ => InferenceFailureKind::Provider,
    }
}

/// Pull the provider's message out of an error body, falling back to the raw text
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("{} - {}", status.as_u16(), envelope.error.message),
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => format!("{} - {}", status.as_u16(), body.trim()),
    }
}

/// Concatenate the text parts of the first candidate
fn response_text(response: GenerateContentResponse) -> Result<String, InferenceFailure> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(InferenceFailure::new(
            InferenceFailureKind::Provider,
            format!("prompt blocked: {}", reason),
        ));
    }

    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        InferenceFailure::new(InferenceFailureKind::Provider, "model returned no candidates")
    })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(InferenceFailure::new(
            InferenceFailureKind::Provider,
            format!("model returned no text (finish reason: {})", reason),
        ));
    }

    Ok(text)
}

#[async_trait]
impl InferenceCollaborator for GeminiClient {
    async fn invoke(&self, request: AnalysisRequest) -> Result<String, InferenceFailure> {
        let start = std::time::Instant::now();
        let body = Self::encode_body(request).await?;

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    debug!("Could not read Gemini error body: {}", e);
                    String::new()
                }
            };
            let kind = classify_status(status);
            warn!("Gemini request failed ({}): {}", kind, status);
            return Err(InferenceFailure::new(kind, error_message(status, &text)));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            InferenceFailure::new(
                InferenceFailureKind::Provider,
                format!("unreadable response: {}", e),
            )
        })?;

        let tokens_used = parsed
            .usage_metadata
            .as_ref()
            .and_then(|u| u.total_token_count)
            .unwrap_or(0);
        let text = response_text(parsed)?;

        debug!(
            "Gemini analysis complete: {} chars, {} tokens, {}ms (model: {})",
            text.len(),
            tokens_used,
            start.elapsed().as_millis(),
            self.model_name
        );

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
