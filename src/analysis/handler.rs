// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request orchestration: preprocess, prompt, invoke, normalize

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::AnalyzerConfig;
use crate::inference::{
    InferenceCollaborator, InferenceFailure, InferenceFailureKind, NormalizedResult,
    PromptBuilder, ResponseNormalizer,
};
use crate::vision::{ImagePreprocessor, PreprocessOutcome, SkippedUpload, UploadedImage};

/// Body of the result returned while no inference credential is configured
pub const NOT_CONFIGURED_MESSAGE: &str =
    "ERROR: AI service not configured. Check GEMINI_API_KEY environment variable.";

/// Request-level failures that are not rendered as an analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Nothing survived preprocessing; the user has to upload again
    #[error("no usable image in upload ({} file(s) could not be read)", .skipped.len())]
    NoUsableInput { skipped: Vec<SkippedUpload> },
}

/// Runs one analysis per call. Holds no per-request state, so a single
/// instance is shared across concurrent requests.
pub struct AnalysisHandler {
    collaborator: Option<Arc<dyn InferenceCollaborator>>,
    preprocessor: ImagePreprocessor,
    prompt_builder: PromptBuilder,
    normalizer: ResponseNormalizer,
    inference_timeout: Duration,
}

impl AnalysisHandler {
    /// `collaborator` is `None` when the credential was missing at startup.
    pub fn new(
        collaborator: Option<Arc<dyn InferenceCollaborator>>,
        preprocessor: ImagePreprocessor,
        inference_timeout: Duration,
    ) -> Self {
        Self {
            collaborator,
            preprocessor,
            prompt_builder: PromptBuilder::new(),
            normalizer: ResponseNormalizer::new(),
            inference_timeout,
        }
    }

    pub fn from_config(
        config: &AnalyzerConfig,
        collaborator: Option<Arc<dyn InferenceCollaborator>>,
    ) -> Self {
        Self::new(
            collaborator,
            ImagePreprocessor::new(config.max_image_dimension, config.max_image_dimension),
            config.inference_timeout(),
        )
    }

    /// Whether an inference collaborator is available
    pub fn is_configured(&self) -> bool {
        self.collaborator.is_some()
    }

    /// Analyze uploaded photos.
    ///
    /// Every outcome except "no usable image" is a [`NormalizedResult`]:
    /// missing configuration and inference failures come back as
    /// `Error`-labelled results with a diagnostic body.
    pub async fn analyze(
        &self,
        uploads: Vec<UploadedImage>,
    ) -> Result<NormalizedResult, AnalysisError> {
        let Some(collaborator) = self.collaborator.as_ref() else {
            warn!("Analysis requested but the AI service is not configured");
            return Ok(NormalizedResult::error(NOT_CONFIGURED_MESSAGE));
        };

        let outcome = self.preprocess(uploads).await;
        if !outcome.skipped.is_empty() {
            info!("{} upload(s) skipped during preprocessing", outcome.skipped.len());
        }

        let PreprocessOutcome { images, skipped } = outcome;
        let request = self
            .prompt_builder
            .build(images)
            .ok_or(AnalysisError::NoUsableInput { skipped })?;

        info!(
            "Sending {} image(s) to {} for analysis",
            request.image_count(),
            collaborator.name()
        );

        let text = match timeout(self.inference_timeout, collaborator.invoke(request)).await {
            Ok(Ok(text)) => text,
            Ok(Err(failure)) => return Ok(failure_result(&failure)),
            Err(_) => {
                let failure = InferenceFailure::new(
                    InferenceFailureKind::Timeout,
                    format!("no answer after {:?}", self.inference_timeout),
                );
                return Ok(failure_result(&failure));
            }
        };

        let result = self.normalizer.normalize(&text);
        debug!(
            "Normalized response: verdict={:?}, confidence={}%",
            result.verdict, result.confidence
        );
        Ok(result)
    }

    /// Decoding and resizing are CPU-bound; keep them off the async workers.
    async fn preprocess(&self, uploads: Vec<UploadedImage>) -> PreprocessOutcome {
        let preprocessor = self.preprocessor;
        match tokio::task::spawn_blocking(move || preprocessor.preprocess_all(&uploads)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Image preprocessing task failed: {}", e);
                PreprocessOutcome::default()
            }
        }
    }
}

fn failure_result(failure: &InferenceFailure) -> NormalizedResult {
    let diagnostic = failure.diagnostic();
    error!("{}", diagnostic);
    NormalizedResult::error(diagnostic)
}
