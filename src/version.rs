// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the tuber gall analyzer

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Full version string with feature description
pub const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"), "-gemini-vision");

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "multi-image-upload",
    "gemini-inference",
    "verdict-normalization",
    "html-results",
    "json-api",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Tuber Gall Analyzer {}", VERSION)
}
