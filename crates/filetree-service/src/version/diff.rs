//! Character diff between two versions and its HTML rendering.
//!
//! The diff is Myers' algorithm from `similar`, run at character granularity
//! under a deadline. Past the deadline the unresolved middle is reported as
//! one removal followed by one insertion.

use std::time::Duration;

use serde::Serialize;
use similar::{Algorithm, ChangeTag, TextDiff};

/// Kind of a diff span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffOp {
    /// Text present in both versions.
    Equal,
    /// Text only in the newer version.
    Insert,
    /// Text only in the older version.
    Delete,
}

/// A run of text with a single [`DiffOp`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffSpan {
    /// What happened to the text.
    pub op: DiffOp,
    /// The text itself.
    pub text: String,
}

impl DiffSpan {
    fn new(op: DiffOp, text: &str) -> Self {
        Self {
            op,
            text: text.to_string(),
        }
    }
}

/// Diff `old` against `new`, producing ordered spans. Adjacent spans never
/// share an op, and no span is empty.
pub fn diff(old: &str, new: &str, timeout: Duration) -> Vec<DiffSpan> {
    let text_diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .timeout(timeout)
        .diff_chars(old, new);

    let mut spans = Vec::new();
    for change in text_diff.iter_all_changes() {
        let op = match change.tag() {
            ChangeTag::Equal => DiffOp::Equal,
            ChangeTag::Insert => DiffOp::Insert,
            ChangeTag::Delete => DiffOp::Delete,
        };
        push(&mut spans, op, change.value());
    }
    spans
}

/// Render spans as HTML: inserted and removed runs get their own classes,
/// text is escaped and line breaks are drawn as `↲` followed by `<br>`.
pub fn render_html(spans: &[DiffSpan]) -> String {
    let mut out = String::new();
    for span in spans {
        let open = match span.op {
            DiffOp::Insert => "<span class='webix_docmanager_diff_insert'>",
            DiffOp::Delete => "<span class='webix_docmanager_diff_remove'>",
            DiffOp::Equal => "<span>",
        };
        out.push_str(open);
        out.push_str(&escape_html(&span.text).replace('\r', "").replace('\n', "&#8626;<br>"));
        out.push_str("</span>");
    }
    out
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            _ => out.push(c),
        }
    }
    out
}

/// Append to `spans`, merging with the last span when the op matches.
fn push(spans: &mut Vec<DiffSpan>, op: DiffOp, text: &str) {
    if text.is_empty() {
        return;
    }
    match spans.last_mut() {
        Some(last) if last.op == op => last.text.push_str(text),
        _ => spans.push(DiffSpan::new(op, text)),
    }
}
