//! Pre-render passes over raw tutorial Markdown.
//!
//! Each pass is a function `&str -> String` applied in sequence before the
//! text reaches the CommonMark parser.

use std::sync::LazyLock;

use regex::Regex;

/// Run all pre-render passes on raw Markdown text.
pub(crate) fn run_pipeline(md: &str) -> String {
    let mut result = strip_bom(md).to_string();

    result = normalize_line_endings(&result);
    result = strip_frontmatter(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Byte-order mark
// ---------------------------------------------------------------------------

fn strip_bom(md: &str) -> &str {
    md.strip_prefix('\u{feff}').unwrap_or(md)
}

// ---------------------------------------------------------------------------
// Pass 2: Line endings
// ---------------------------------------------------------------------------

/// Convert CRLF and lone CR line endings to LF.
fn normalize_line_endings(md: &str) -> String {
    if !md.contains('\r') {
        return md.to_string();
    }
    md.replace("\r\n", "\n").replace('\r', "\n")
}

// ---------------------------------------------------------------------------
// Pass 3: YAML frontmatter
// ---------------------------------------------------------------------------

/// Drop a leading `---` delimited YAML block.
///
/// A document that opens with `---` but never closes it is left untouched
/// (CommonMark reads that as a thematic break).
pub(crate) fn strip_frontmatter(md: &str) -> String {
    static FRONTMATTER_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)\A---[ \t]*\n.*?\n---[ \t]*(?:\n|\z)").expect("valid regex")
    });

    match FRONTMATTER_RE.find(md) {
        Some(m) => md[m.end()..].trim_start_matches('\n').to_string(),
        None => md.to_string(),
    }
}
