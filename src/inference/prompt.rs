// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fixed analysis instruction and request assembly

use crate::vision::NormalizedImage;

/// Instruction sent ahead of the photos. The verdict grammar at the end must
/// stay in sync with `normalizer::extract_verdict`.
pub const GALL_ANALYSIS_PROMPT: &str = "\
Analyze the attached image(s) of a dahlia tuber. Act as a certified plant pathology expert.
Your response must consist only of the analysis and the final verdict line.

**Identify Growths:** Determine if there are any abnormal growths, tumors, or distorted tissue present, specifically looking for signs of Crown Gall (Agrobacterium tumefaciens) and Leafy Gall (Rhodococcus fascians).
**Describe Findings:** Describe the visual evidence found, noting if the growths are hard and tumor-like (Crown Gall) or bushy and distorted (Leafy Gall). If no gall is present, describe the healthy appearance.

Crucially, format your final verdict on a single line using ONLY this exact structure: [VERDICT: Gall Disease Present / Gall Disease Not Present] [CONFIDENCE: X%]
";

/// One element of the ordered content sequence sent to the model
#[derive(Debug, Clone, Copy)]
pub enum ContentPart<'a> {
    Text(&'a str),
    Image(&'a NormalizedImage),
}

/// Instruction plus photos, in upload order. Built once and consumed by a
/// single inference call.
#[derive(Debug)]
pub struct AnalysisRequest {
    instruction: &'static str,
    images: Vec<NormalizedImage>,
}

impl AnalysisRequest {
    pub fn instruction(&self) -> &str {
        self.instruction
    }

    pub fn images(&self) -> &[NormalizedImage] {
        &self.images
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// The instruction first, then each image.
    pub fn parts(&self) -> impl Iterator<Item = ContentPart<'_>> {
        std::iter::once(ContentPart::Text(self.instruction))
            .chain(self.images.iter().map(ContentPart::Image))
    }
}

/// Assembles [`AnalysisRequest`]s around the fixed instruction
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn instruction(&self) -> &'static str {
        GALL_ANALYSIS_PROMPT
    }

    /// Returns `None` when there are no images; a prompt without photos must
    /// never reach the model.
    pub fn build(&self, images: Vec<NormalizedImage>) -> Option<AnalysisRequest> {
        if images.is_empty() {
            return None;
        }

        Some(AnalysisRequest {
            instruction: GALL_ANALYSIS_PROMPT,
            images,
        })
    }
}
