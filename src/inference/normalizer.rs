// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Response normalization: raw model text to `{verdict, confidence, body}`
//!
//! The model is asked for a single verdict line but nothing guarantees it
//! complies, so every step here degrades instead of failing. The pipeline
//! runs in a fixed order:
//!
//! 1. Strip anything that looks like an HTML tag.
//! 2. Extract the `[VERDICT: ...] [CONFIDENCE: ...%]` line and remove it from the body.
//! 3. Classify the verdict text and parse the confidence.
//! 4. Drop echoed instruction headings and the "Provide a Verdict" filler.
//! 5. Promote remaining `**Label**:` headings to `<h4>` markers.
//! 6. Collapse blank-line runs and trim.
//!
//! The output body contains no markup besides the `<h4>` markers from step 5.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Verdict line used whenever no well-formed line can be extracted
pub const ERROR_VERDICT_LINE: &str = "[VERDICT: Error] [CONFIDENCE: 0%]";

/// Upper bound for confidence percentages
pub const MAX_CONFIDENCE: u8 = 100;

/// Classification extracted from the verdict line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Verdict {
    Present,
    NotPresent,
    Error,
}

impl Verdict {
    /// Heading shown on the result page
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Present => "Gall Disease Present",
            Verdict::NotPresent => "Gall Disease Not Present",
            Verdict::Error => "Analysis Error",
        }
    }
}

/// Display-ready analysis result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    /// Classified verdict, `Error` when extraction failed
    pub verdict: Verdict,
    /// Confidence percentage in `0..=100`
    pub confidence: u8,
    /// Cleaned analysis text with `<h4>` heading markers
    pub body: String,
    /// Verdict line as the model wrote it, or [`ERROR_VERDICT_LINE`]
    pub verdict_line: String,
}

impl NormalizedResult {
    /// Uniform error result carrying a diagnostic body
    pub fn error(body: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Error,
            confidence: 0,
            body: body.into(),
            verdict_line: ERROR_VERDICT_LINE.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.verdict == Verdict::Error
    }
}

/// A verdict line located in the model output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedVerdict<'a> {
    /// The whole matched line, verbatim
    pub line: &'a str,
    /// Free text between `[VERDICT:` and `]`
    pub verdict_text: &'a str,
    /// Raw value between `[CONFIDENCE:` and `%]`
    pub confidence_text: &'a str,
}

/// Compiled patterns for the normalization pipeline.
///
/// Holds no mutable state; one instance can serve any number of requests.
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    tag: Regex,
    verdict: Regex,
    numbered_heading: Regex,
    filler_heading: Regex,
    bold_heading: Regex,
    blank_runs: Regex,
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseNormalizer {
    pub fn new() -> Self {
        Self {
            tag: Regex::new(r"<[^>]+>").expect("tag pattern is valid"),
            verdict: Regex::new(
                r"\[VERDICT:[ \t]*(?P<verdict>[^\]]*?)[ \t]*\]\s*\[CONFIDENCE:[ \t]*(?P<confidence>[^\]%]*?)[ \t]*%\]",
            )
            .expect("verdict pattern is valid"),
            numbered_heading: Regex::new(r"(?m)^[ \t]*\d+\.[ \t]+\*\*[^*\n]+?(?::\*\*|\*\*:)[ \t]*")
                .expect("numbered heading pattern is valid"),
            filler_heading: Regex::new(r"\*\*Provide a Verdict(?::\*\*|\*\*:)[ \t]*")
                .expect("filler heading pattern is valid"),
            bold_heading: Regex::new(r"\*\*(?P<label>[^*\n]+?)(?::\*\*|\*\*:)[ \t]*")
                .expect("bold heading pattern is valid"),
            blank_runs: Regex::new(r"\n{3,}").expect("blank run pattern is valid"),
        }
    }

    /// Run the full pipeline. Never fails; unparseable input yields an
    /// `Error` verdict with the cleaned text kept as the body.
    pub fn normalize(&self, raw: &str) -> NormalizedResult {
        let text = self.escape_stray_brackets(&self.strip_tags(raw));

        let (verdict, confidence, verdict_line, body) = match self.extract_verdict(&text) {
            Some(found) => (
                classify_verdict(found.verdict_text),
                parse_confidence(found.confidence_text),
                found.line.to_string(),
                self.remove_verdict_lines(&text),
            ),
            None => (Verdict::Error, 0, ERROR_VERDICT_LINE.to_string(), text.clone()),
        };

        let body = self.cleanup_structure(&body);
        let body = self.promote_headings(&body);
        let body = self.normalize_whitespace(&body);

        NormalizedResult {
            verdict,
            confidence,
            body,
            verdict_line,
        }
    }

    /// Remove every `<...>` tag-like substring.
    pub fn strip_tags(&self, text: &str) -> String {
        self.tag.replace_all(text, "").into_owned()
    }

    /// Entity-escape angle brackets left over after tag stripping. Only the
    /// heading markers inserted later may form tags.
    pub fn escape_stray_brackets(&self, text: &str) -> String {
        text.replace('<', "&lt;").replace('>', "&gt;")
    }

    /// Locate the first verdict line. The two bracket groups may be separated
    /// by any whitespace, including a line break.
    pub fn extract_verdict<'a>(&self, text: &'a str) -> Option<ExtractedVerdict<'a>> {
        let caps = self.verdict.captures(text)?;
        let line = caps.get(0)?.as_str();
        let verdict_text = caps.name("verdict").map(|m| m.as_str()).unwrap_or_default();
        let confidence_text = caps
            .name("confidence")
            .map(|m| m.as_str())
            .unwrap_or_default();

        Some(ExtractedVerdict {
            line,
            verdict_text,
            confidence_text,
        })
    }

    /// Remove all verdict lines so none is duplicated in the body.
    pub fn remove_verdict_lines(&self, text: &str) -> String {
        self.verdict.replace_all(text, "").into_owned()
    }

    /// Drop numbered echoes of the instruction headings (`1. **Label**:`) and
    /// the "Provide a Verdict" filler heading.
    pub fn cleanup_structure(&self, text: &str) -> String {
        let text = self.numbered_heading.replace_all(text, "");
        self.filler_heading.replace_all(&text, "").into_owned()
    }

    /// Turn `**Label**:` and `**Label:**` into `<h4>Label</h4>` followed by a
    /// line break.
    pub fn promote_headings(&self, text: &str) -> String {
        self.bold_heading
            .replace_all(text, |caps: &regex::Captures<'_>| {
                format!("<h4>{}</h4>\n", caps["label"].trim())
            })
            .into_owned()
    }

    /// Normalize line endings, drop trailing spaces, collapse runs of blank
    /// lines to a single blank line and trim. Idempotent.
    pub fn normalize_whitespace(&self, text: &str) -> String {
        let unified = text.replace("\r\n", "\n").replace('\r', "\n");
        let trimmed_lines: Vec<&str> = unified.lines().map(str::trim_end).collect();
        let joined = trimmed_lines.join("\n");
        self.blank_runs
            .replace_all(&joined, "\n\n")
            .trim()
            .to_string()
    }
}

/// Classify free verdict text. Both options echoed from the instruction
/// template ("Present / Not Present") count as no verdict.
pub fn classify_verdict(text: &str) -> Verdict {
    let lower = text.to_lowercase();
    let negated = lower.matches("not present").count();
    let total = lower.matches("present").count();

    match (negated, total) {
        (_, 0) => Verdict::Error,
        (0, _) => Verdict::Present,
        (n, t) if t > n => Verdict::Error,
        _ => Verdict::NotPresent,
    }
}

/// Parse a confidence value. Accepts ASCII digits with an optional fractional
/// part (truncated); anything else, including signs, yields 0. Values above
/// 100 clamp to 100.
pub fn parse_confidence(text: &str) -> u8 {
    let text = text.trim();
    let integer = match text.split_once('.') {
        Some((int, frac)) if !frac.is_empty() && frac.bytes().all(|b| b.is_ascii_digit()) => int,
        Some(_) => return 0,
        None => text,
    };

    if integer.is_empty() || !integer.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }

    match integer.parse::<u64>() {
        Ok(value) => value.min(MAX_CONFIDENCE as u64) as u8,
        // All digits, so the only failure is overflow
        Err(_) => MAX_CONFIDENCE,
    }
}

/// Normalize with a process-wide shared [`ResponseNormalizer`].
pub fn normalize(raw: &str) -> NormalizedResult {
    static NORMALIZER: OnceLock<ResponseNormalizer> = OnceLock::new();
    NORMALIZER.get_or_init(ResponseNormalizer::new).normalize(raw)
}
