// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server-rendered HTML pages

use axum::response::Html;

use crate::api::analyze::PHOTOS_FIELD;
use crate::inference::{NormalizedResult, Verdict};

const PAGE_STYLE: &str = r#"
body { font-family: sans-serif; max-width: 46rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
h1 { font-size: 1.6rem; }
.verdict { padding: 0.8rem 1rem; border-radius: 6px; font-weight: bold; }
.verdict-present { background: #fde2e1; color: #8a1c14; }
.verdict-clear { background: #e0f4e3; color: #1d5e2a; }
.verdict-error { background: #eeeeee; color: #444444; }
.analysis h4 { margin-bottom: 0.3rem; }
"#;

/// GET / - Upload form
pub async fn index_handler() -> Html<String> {
    Html(render_index())
}

pub fn render_index() -> String {
    let content = format!(
        r#"<h1>Dahlia Tuber Gall Check</h1>
<p>Upload one or more photos of a dahlia tuber. The photos are analyzed for crown gall and leafy gall.</p>
<form action="/analyze" method="post" enctype="multipart/form-data">
  <input type="file" name="{field}" accept="image/*" multiple required>
  <button type="submit">Analyze</button>
</form>"#,
        field = PHOTOS_FIELD
    );
    page("Dahlia Tuber Gall Check", &content)
}

/// Results page for one analysis
pub fn render_results(result: &NormalizedResult) -> String {
    let content = format!(
        r#"<h1>Analysis Result</h1>
<p class="verdict {class}">{verdict_line}</p>
<p>Verdict: {label}<br>Confidence: {confidence}%</p>
<div class="analysis">
{body}
</div>
<p><a href="/">Analyze another tuber</a></p>"#,
        class = verdict_class(result.verdict),
        verdict_line = html_escape(&result.verdict_line),
        label = result.verdict.label(),
        confidence = result.confidence,
        body = body_to_html(&result.body),
    );
    page("Analysis Result", &content)
}

/// CSS class used to colour the verdict banner
pub fn verdict_class(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Present => "verdict-present",
        Verdict::NotPresent => "verdict-clear",
        Verdict::Error => "verdict-error",
    }
}

/// Turn a normalized body into sanitized markup.
///
/// Blank lines separate paragraphs, single newlines become `<br>`, and
/// heading lines stay as `<h4>`. Anything else that looks like markup is
/// escaped or dropped by the sanitizer.
pub fn body_to_html(body: &str) -> String {
    let mut html = String::new();

    for paragraph in body.split("\n\n").filter(|p| !p.trim().is_empty()) {
        let mut text_lines: Vec<&str> = Vec::new();
        for line in paragraph.lines() {
            if is_heading(line) {
                flush_paragraph(&mut html, &mut text_lines);
                html.push_str(line.trim());
                html.push('\n');
            } else {
                text_lines.push(line);
            }
        }
        flush_paragraph(&mut html, &mut text_lines);
    }

    ammonia::Builder::empty()
        .add_tags(&["h4", "p", "br"])
        .clean(&html)
        .to_string()
}

fn is_heading(line: &str) -> bool {
    let line = line.trim();
    line.starts_with("<h4>") && line.ends_with("</h4>")
}

fn flush_paragraph(html: &mut String, lines: &mut Vec<&str>) {
    if lines.is_empty() {
        return;
    }
    html.push_str("<p>");
    html.push_str(&lines.join("<br>"));
    html.push_str("</p>\n");
    lines.clear();
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
{content}
</body>
</html>"#,
        title = title,
        style = PAGE_STYLE,
        content = content
    )
}
