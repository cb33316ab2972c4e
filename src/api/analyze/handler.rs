// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze endpoint handlers

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::Multipart;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::request::{collect_uploads, PHOTOS_FIELD};
use super::response::AnalyzeResponse;
use crate::analysis::AnalysisError;
use crate::api::errors::{ApiError, ApiErrorResponse};
use crate::api::http_server::AppState;
use crate::api::pages::render_results;

/// POST /analyze - Analyze uploaded photos and render the results page
///
/// Redirects back to the upload form when no photo could be read.
pub async fn analyze_form_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("analyze_form", %request_id);

    async move {
        let uploads = match collect_uploads(multipart).await {
            Ok(uploads) => uploads,
            Err(e) => return ApiErrorResponse::new(e, request_id).into_response(),
        };
        info!("Form upload with {} file(s)", uploads.len());

        match state.handler.analyze(uploads).await {
            Ok(result) => Html(render_results(&result)).into_response(),
            Err(e @ AnalysisError::NoUsableInput { .. }) => {
                warn!("{}", e);
                Redirect::to("/").into_response()
            }
        }
    }
    .instrument(span)
    .await
}

/// POST /v1/analyze - Analyze uploaded photos and return JSON
///
/// Inference failures are still 200 responses with an `error` verdict;
/// only an upload without a readable photo is rejected.
pub async fn analyze_api_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiErrorResponse> {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("analyze_api", %request_id);

    async move {
        let uploads = match collect_uploads(multipart).await {
            Ok(uploads) => uploads,
            Err(e) => return Err(ApiErrorResponse::new(e, request_id)),
        };
        info!("API upload with {} file(s)", uploads.len());

        match state.handler.analyze(uploads).await {
            Ok(result) => Ok(Json(AnalyzeResponse::new(result, request_id))),
            Err(e @ AnalysisError::NoUsableInput { .. }) => {
                warn!("{}", e);
                Err(ApiErrorResponse::new(
                    ApiError::ValidationError {
                        field: PHOTOS_FIELD.to_string(),
                        message: e.to_string(),
                    },
                    request_id,
                ))
            }
        }
    }
    .instrument(span)
    .await
}
