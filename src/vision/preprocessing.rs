// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload preprocessing: decode, bound the dimensions and flatten to RGB
//!
//! Every uploaded photo goes through [`ImagePreprocessor`] before it is sent
//! to the model. Files that cannot be decoded are skipped individually so a
//! single bad attachment never fails the whole analysis.

use image::{imageops::FilterType, ColorType, DynamicImage};
use tracing::{debug, warn};

use super::image_utils::{decode_image_bytes, ImageError};

/// Default bound for both width and height
pub const DEFAULT_MAX_DIMENSION: u32 = 1024;

/// A raw file part received from the upload form
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Declared filename from the multipart part
    pub filename: String,
    /// Raw file bytes
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// A decoded image bounded to the configured size and stored as RGB8
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// Filename the image was uploaded under
    pub filename: String,
    /// Decoded bitmap, always `ImageRgb8`
    pub image: DynamicImage,
    /// Width before any downsampling
    pub original_width: u32,
    /// Height before any downsampling
    pub original_height: u32,
}

impl NormalizedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// An upload that was dropped during preprocessing
#[derive(Debug, Clone)]
pub struct SkippedUpload {
    pub filename: String,
    pub reason: String,
}

/// Result of preprocessing a batch of uploads
#[derive(Debug, Default)]
pub struct PreprocessOutcome {
    /// Surviving images, in upload order
    pub images: Vec<NormalizedImage>,
    /// Uploads that failed to decode
    pub skipped: Vec<SkippedUpload>,
}

/// Decodes and normalizes uploaded photos
#[derive(Debug, Clone, Copy)]
pub struct ImagePreprocessor {
    max_width: u32,
    max_height: u32,
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DIMENSION, DEFAULT_MAX_DIMENSION)
    }
}

impl ImagePreprocessor {
    /// Create a preprocessor bounding images to `max_width` x `max_height`.
    /// Zero bounds are raised to 1.
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width: max_width.max(1),
            max_height: max_height.max(1),
        }
    }

    pub fn max_dimensions(&self) -> (u32, u32) {
        (self.max_width, self.max_height)
    }

    /// Decode a single upload and normalize it.
    pub fn normalize(&self, upload: &UploadedImage) -> Result<NormalizedImage, ImageError> {
        let (image, info) = decode_image_bytes(&upload.bytes)?;

        let image = self.bound(image);
        let image = to_rgb(image);

        debug!(
            "Normalized {}: {:?} {}x{} -> {}x{}",
            upload.filename,
            info.format,
            info.width,
            info.height,
            image.width(),
            image.height()
        );

        Ok(NormalizedImage {
            filename: upload.filename.clone(),
            image,
            original_width: info.width,
            original_height: info.height,
        })
    }

    /// Normalize a batch of uploads, skipping entries with an empty filename
    /// and entries that fail to decode.
    pub fn preprocess_all(&self, uploads: &[UploadedImage]) -> PreprocessOutcome {
        let mut outcome = PreprocessOutcome::default();

        for upload in uploads {
            if upload.filename.is_empty() {
                continue;
            }

            match self.normalize(upload) {
                Ok(image) => outcome.images.push(image),
                Err(e) => {
                    warn!(
                        "Skipping non-image file or failed to process: {}. Error: {}",
                        upload.filename, e
                    );
                    outcome.skipped.push(SkippedUpload {
                        filename: upload.filename.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        outcome
    }

    /// Downsample only when a dimension exceeds the bound. `resize` keeps the
    /// aspect ratio and fits the result inside the box.
    fn bound(&self, image: DynamicImage) -> DynamicImage {
        if image.width() > self.max_width || image.height() > self.max_height {
            image.resize(self.max_width, self.max_height, FilterType::Lanczos3)
        } else {
            image
        }
    }
}

fn to_rgb(image: DynamicImage) -> DynamicImage {
    if image.color() == ColorType::Rgb8 {
        image
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    }
}
