// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze response types

use serde::{Deserialize, Serialize};

use crate::inference::{NormalizedResult, Verdict};

/// JSON transport of one analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub verdict: Verdict,
    /// Integer percentage, 0-100
    pub confidence: u8,
    /// Cleaned analysis text with `<h4>` section headings
    pub body: String,
    /// Verdict line as the model wrote it
    pub verdict_line: String,
    pub request_id: String,
}

impl AnalyzeResponse {
    pub fn new(result: NormalizedResult, request_id: impl Into<String>) -> Self {
        Self {
            verdict: result.verdict,
            confidence: result.confidence,
            body: result.body,
            verdict_line: result.verdict_line,
            request_id: request_id.into(),
        }
    }
}
