// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload extraction

use axum::http::StatusCode;
use axum_extra::extract::Multipart;
use tracing::debug;

use crate::api::errors::ApiError;
use crate::vision::UploadedImage;

/// Form field carrying the photos
pub const PHOTOS_FIELD: &str = "photos";

/// Read every `photos` part from the form.
///
/// Other fields are ignored. Parts without a filename are what browsers send
/// for an empty file input, so they are dropped here rather than reported.
pub async fn collect_uploads(mut multipart: Multipart) -> Result<Vec<UploadedImage>, ApiError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(PHOTOS_FIELD) {
            continue;
        }

        let filename = match field.file_name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => continue,
        };

        let bytes = field.bytes().await.map_err(multipart_error)?;
        debug!("Received upload '{}' ({} bytes)", filename, bytes.len());
        uploads.push(UploadedImage::new(filename, bytes.to_vec()));
    }

    Ok(uploads)
}

fn multipart_error(e: axum_extra::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::InvalidRequest(format!("Malformed multipart body: {}", e.body_text()))
    }
}
