// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! AnalysisHandler tests with fake collaborators
//!
//! Covers the request pipeline outside the HTTP layer:
//! - Photos are bounded before they reach the collaborator
//! - Empty or unreadable uploads never reach the collaborator
//! - Failures and timeouts turn into error results

use std::sync::Arc;
use std::time::Duration;
use tuber_gall_analyzer::{
    analysis::{AnalysisError, NOT_CONFIGURED_MESSAGE},
    config::AnalyzerConfig,
    inference::{InferenceFailure, InferenceFailureKind, Verdict},
    vision::{ImagePreprocessor, UploadedImage},
    AnalysisHandler,
};

use crate::common::{png_bytes, FakeCollaborator};

fn handler(fake: Arc<FakeCollaborator>, timeout: Duration) -> AnalysisHandler {
    AnalysisHandler::new(Some(fake), ImagePreprocessor::default(), timeout)
}

#[tokio::test]
async fn test_quota_failure_mentions_quota() {
    let fake = FakeCollaborator::failing(InferenceFailure::new(
        InferenceFailureKind::Quota,
        "429 Too Many Requests",
    ));
    let handler = handler(fake.clone(), Duration::from_secs(60));

    let result = handler
        .analyze(vec![UploadedImage::new("tuber.png", png_bytes(20, 20))])
        .await
        .unwrap();

    assert_eq!(result.verdict, Verdict::Error);
    assert_eq!(result.confidence, 0);
    assert!(result.body.contains("quota"));
    assert!(result.body.starts_with("Critical Error during AI Analysis"));
    assert_eq!(fake.calls(), 1);
}

#[tokio::test]
async fn test_auth_failure_points_at_credential() {
    let fake = FakeCollaborator::failing(InferenceFailure::new(
        InferenceFailureKind::Auth,
        "API key not valid",
    ));
    let handler = handler(fake, Duration::from_secs(60));

    let result = handler
        .analyze(vec![UploadedImage::new("tuber.png", png_bytes(20, 20))])
        .await
        .unwrap();

    assert!(result.is_error());
    assert!(result.body.contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn test_no_readable_photo_skips_inference() {
    let fake = FakeCollaborator::replying("[VERDICT: Gall Present] [CONFIDENCE: 90%]");
    let handler = handler(fake.clone(), Duration::from_secs(60));

    let err = handler
        .analyze(vec![
            UploadedImage::new("empty.png", Vec::new()),
            UploadedImage::new("notes.txt", b"no pixels here".to_vec()),
        ])
        .await
        .unwrap_err();

    let AnalysisError::NoUsableInput { skipped } = err;
    assert_eq!(skipped.len(), 2);
    assert_eq!(fake.calls(), 0);
}

#[tokio::test]
async fn test_unreadable_files_are_dropped_from_batch() {
    let fake = FakeCollaborator::replying("Clean. [VERDICT: Gall Disease Not Present] [CONFIDENCE: 64%]");
    let handler = handler(fake.clone(), Duration::from_secs(60));

    let result = handler
        .analyze(vec![
            UploadedImage::new("a.png", png_bytes(10, 10)),
            UploadedImage::new("broken.jpg", vec![0xFF, 0xD8, 0xFF, 0x00]),
            UploadedImage::new("b.png", png_bytes(12, 12)),
        ])
        .await
        .unwrap();

    assert_eq!(result.verdict, Verdict::NotPresent);
    assert_eq!(result.confidence, 64);
    assert_eq!(result.body, "Clean.");
    assert_eq!(fake.images_seen(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_slow_collaborator_times_out() {
    let fake = FakeCollaborator::stalling(Duration::from_secs(600));
    let handler = handler(fake.clone(), Duration::from_secs(30));

    let result = handler
        .analyze(vec![UploadedImage::new("tuber.png", png_bytes(8, 8))])
        .await
        .unwrap();

    assert_eq!(result.verdict, Verdict::Error);
    assert!(result.body.contains("(timeout)"));
    assert_eq!(fake.calls(), 1);
}

#[tokio::test]
async fn test_unconfigured_handler_reports_missing_key() {
    let config = AnalyzerConfig::default();
    let handler = AnalysisHandler::from_config(&config, None);

    let result = handler
        .analyze(vec![UploadedImage::new("tuber.png", png_bytes(8, 8))])
        .await
        .unwrap();

    assert_eq!(result.verdict, Verdict::Error);
    assert_eq!(result.confidence, 0);
    assert_eq!(result.body, NOT_CONFIGURED_MESSAGE);
}
