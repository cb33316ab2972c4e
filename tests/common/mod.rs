// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, Rgba};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tuber_gall_analyzer::inference::{AnalysisRequest, InferenceCollaborator, InferenceFailure};

pub const BOUNDARY: &str = "----tubergallboundary";

/// Collaborator that answers with a canned reply and counts calls
pub struct FakeCollaborator {
    reply: Result<String, InferenceFailure>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    images_seen: AtomicUsize,
}

impl FakeCollaborator {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
            images_seen: AtomicUsize::new(0),
        })
    }

    pub fn failing(failure: InferenceFailure) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(failure),
            delay: None,
            calls: AtomicUsize::new(0),
            images_seen: AtomicUsize::new(0),
        })
    }

    pub fn stalling(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok("late answer".to_string()),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
            images_seen: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn images_seen(&self) -> usize {
        self.images_seen.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceCollaborator for FakeCollaborator {
    async fn invoke(&self, request: AnalysisRequest) -> Result<String, InferenceFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.images_seen
            .fetch_add(request.image_count(), Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Solid-colour RGB photo encoded as PNG
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_fn(width, height, |_, _| Rgb([120u8, 90u8, 40u8]));
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)
}

/// Photo with an alpha channel
pub fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_fn(width, height, |_, _| Rgba([120u8, 90u8, 40u8, 200u8]));
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_fn(width, height, |x, _| Rgb([(x % 255) as u8, 60u8, 30u8]));
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

/// One part of a multipart body: field name, optional filename, content
pub struct Part<'a> {
    pub field: &'a str,
    pub filename: Option<&'a str>,
    pub content: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn photo(filename: &'a str, content: &'a [u8]) -> Self {
        Self {
            field: "photos",
            filename: Some(filename),
            content,
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        part.field, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.field)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
