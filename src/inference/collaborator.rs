// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inference collaborator trait definition

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use super::prompt::AnalysisRequest;

/// Category of an inference failure, used to pick the diagnostic shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceFailureKind {
    /// Credential rejected by the provider
    Auth,
    /// Rate limit or usage quota exhausted
    Quota,
    /// Connection could not be established or was dropped
    Network,
    /// No answer within the configured bound
    Timeout,
    /// Provider refused the request shape
    MalformedRequest,
    /// Any other provider-side error, including empty answers
    Provider,
}

impl InferenceFailureKind {
    fn hint(self) -> &'static str {
        match self {
            InferenceFailureKind::Auth => {
                "Please check that GEMINI_API_KEY is set to a valid API key."
            }
            InferenceFailureKind::Quota => {
                "The usage quota for the AI service is exhausted. Please check your usage quota or try again later."
            }
            InferenceFailureKind::Network => {
                "The AI service could not be reached. Please check the network connection and try again."
            }
            InferenceFailureKind::Timeout => {
                "The AI service did not answer in time. Please try again with fewer or smaller photos."
            }
            InferenceFailureKind::MalformedRequest => {
                "The AI service rejected the request. Please try different photos."
            }
            InferenceFailureKind::Provider => "The AI service reported an error. Please try again.",
        }
    }
}

impl fmt::Display for InferenceFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InferenceFailureKind::Auth => "authentication failure",
            InferenceFailureKind::Quota => "quota exceeded",
            InferenceFailureKind::Network => "network error",
            InferenceFailureKind::Timeout => "timeout",
            InferenceFailureKind::MalformedRequest => "malformed request",
            InferenceFailureKind::Provider => "provider error",
        };
        f.write_str(label)
    }
}

/// Failure reported by an inference collaborator
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct InferenceFailure {
    pub kind: InferenceFailureKind,
    pub message: String,
}

impl InferenceFailure {
    pub fn new(kind: InferenceFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Human-readable text for the result page
    pub fn diagnostic(&self) -> String {
        format!(
            "Critical Error during AI Analysis ({}): {}. {}",
            self.kind,
            self.message.trim_end_matches('.'),
            self.kind.hint()
        )
    }
}

/// External multimodal model that turns an [`AnalysisRequest`] into free text
///
/// Implementations must be cheap to share behind an `Arc`; the request
/// handler holds one instance for the lifetime of the process.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceCollaborator: Send + Sync {
    /// Send the instruction and photos, returning the model's raw text.
    async fn invoke(&self, request: AnalysisRequest) -> Result<String, InferenceFailure>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
