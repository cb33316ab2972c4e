// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod inference;
pub mod version;
pub mod vision;

pub use analysis::{AnalysisError, AnalysisHandler};
pub use config::{AnalyzerConfig, ConfigError};
pub use inference::{
    GeminiClient, InferenceCollaborator, InferenceFailure, InferenceFailureKind,
    NormalizedResult, ResponseNormalizer, Verdict,
};
pub use vision::{ImagePreprocessor, UploadedImage};
