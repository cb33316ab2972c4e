// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analyze;
pub mod errors;
pub mod http_server;
pub mod pages;

pub use analyze::{analyze_api_handler, analyze_form_handler, AnalyzeResponse};
pub use errors::{ApiError, ApiErrorResponse, ErrorResponse};
pub use http_server::{create_router, start_server, AppState, HealthResponse};
