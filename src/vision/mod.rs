// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision input handling for uploaded tuber photos
//!
//! This module provides:
//! - Format sniffing and decoding of raw upload bytes
//! - Bounding and RGB normalization before the photos are sent to the model

pub mod image_utils;
pub mod preprocessing;

pub use image_utils::{decode_image_bytes, detect_format, encode_jpeg_base64, ImageError, ImageInfo};
pub use preprocessing::{
    ImagePreprocessor, NormalizedImage, PreprocessOutcome, SkippedUpload, UploadedImage,
    DEFAULT_MAX_DIMENSION,
};
