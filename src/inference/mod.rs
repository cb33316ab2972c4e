// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model-facing side of the analysis: prompt, collaborator seam, Gemini
//! client and response normalization.

pub mod collaborator;
pub mod gemini;
pub mod normalizer;
pub mod prompt;

pub use collaborator::{InferenceCollaborator, InferenceFailure, InferenceFailureKind};
pub use gemini::GeminiClient;
pub use normalizer::{
    classify_verdict, normalize, parse_confidence, ExtractedVerdict, NormalizedResult,
    ResponseNormalizer, Verdict, ERROR_VERDICT_LINE,
};
pub use prompt::{AnalysisRequest, ContentPart, PromptBuilder, GALL_ANALYSIS_PROMPT};
