// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Upload pipeline tests: decode, bound, convert, then build the request

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ColorType;
use tuber_gall_analyzer::{
    inference::{ContentPart, PromptBuilder, GALL_ANALYSIS_PROMPT},
    vision::{encode_jpeg_base64, ImagePreprocessor, UploadedImage},
};

use crate::common::{jpeg_bytes, png_bytes, rgba_png_bytes};

#[test]
fn test_large_photo_is_bounded_with_aspect_ratio() {
    let pre = ImagePreprocessor::default();
    let out = pre
        .normalize(&UploadedImage::new("wide.jpg", jpeg_bytes(3000, 1500)))
        .unwrap();

    assert_eq!((out.width(), out.height()), (1024, 512));
    assert_eq!((out.original_width, out.original_height), (3000, 1500));
}

#[test]
fn test_alpha_channel_is_removed() {
    let pre = ImagePreprocessor::default();
    let out = pre
        .normalize(&UploadedImage::new("alpha.png", rgba_png_bytes(40, 30)))
        .unwrap();

    assert_eq!(out.image.color(), ColorType::Rgb8);
    assert_eq!((out.width(), out.height()), (40, 30));
}

#[test]
fn test_batch_feeds_prompt_in_upload_order() {
    let pre = ImagePreprocessor::new(100, 100);
    let outcome = pre.preprocess_all(&[
        UploadedImage::new("first.png", png_bytes(300, 200)),
        UploadedImage::new("", png_bytes(10, 10)),
        UploadedImage::new("readme.md", b"# notes".to_vec()),
        UploadedImage::new("second.jpg", jpeg_bytes(50, 80)),
    ]);

    assert_eq!(outcome.images.len(), 2);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].filename, "readme.md");

    let request = PromptBuilder::new().build(outcome.images).unwrap();
    let parts: Vec<ContentPart<'_>> = request.parts().collect();
    assert_eq!(parts.len(), 3);
    assert!(matches!(parts[0], ContentPart::Text(text) if text == GALL_ANALYSIS_PROMPT));
    match (&parts[1], &parts[2]) {
        (ContentPart::Image(a), ContentPart::Image(b)) => {
            assert_eq!(a.filename, "first.png");
            assert_eq!((a.width(), a.height()), (100, 67));
            assert_eq!(b.filename, "second.jpg");
            assert_eq!((b.width(), b.height()), (50, 80));
        }
        other => panic!("expected two image parts, got {:?}", other),
    }
}

#[test]
fn test_normalized_photo_encodes_as_jpeg() {
    let pre = ImagePreprocessor::default();
    let out = pre
        .normalize(&UploadedImage::new("tuber.png", rgba_png_bytes(64, 48)))
        .unwrap();

    let encoded = encode_jpeg_base64(&out.image).unwrap();
    let bytes = STANDARD.decode(encoded).unwrap();
    assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);

    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (64, 48));
}
