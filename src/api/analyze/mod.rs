// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze endpoints
//!
//! `POST /analyze` renders the results page for the upload form.
//! `POST /v1/analyze` returns the same result as JSON.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{analyze_api_handler, analyze_form_handler};
pub use request::{collect_uploads, PHOTOS_FIELD};
pub use response::AnalyzeResponse;
