//! Markdown-to-HTML render pipeline.
//!
//! Converts raw tutorial Markdown into HTML using `pulldown-cmark`, after a
//! small set of pre-render passes (BOM, line endings, frontmatter).
//! Rendering is pure and total: malformed input degrades to best-effort
//! output, never to an error.

mod prepare;

use std::sync::{Arc, LazyLock};

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use tracing::{debug, instrument};

use monotone_shared::RenderConfig;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Options for Markdown rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub tables: bool,
    pub strikethrough: bool,
    pub footnotes: bool,
    pub task_lists: bool,
    pub smart_punctuation: bool,
    /// Emit raw HTML blocks and inline HTML as escaped text.
    pub escape_raw_html: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        Self {
            tables: config.tables,
            strikethrough: config.strikethrough,
            footnotes: config.footnotes,
            task_lists: config.task_lists,
            smart_punctuation: config.smart_punctuation,
            escape_raw_html: config.escape_raw_html,
        }
    }
}

/// A rendered tutorial body plus metadata derived from the same source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// The HTML output.
    pub html: String,
    /// Text of the first H1, if any.
    pub title: Option<String>,
    /// Approximate prose word count (code excluded).
    pub word_count: usize,
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Stateless Markdown renderer.
///
/// Holds only immutable options, so one instance can be shared by reference
/// across any number of concurrent load cycles.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    opts: RenderOptions,
    parser_options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl MarkdownRenderer {
    pub fn new(opts: RenderOptions) -> Self {
        let mut parser_options = Options::empty();
        parser_options.set(Options::ENABLE_TABLES, opts.tables);
        parser_options.set(Options::ENABLE_STRIKETHROUGH, opts.strikethrough);
        parser_options.set(Options::ENABLE_FOOTNOTES, opts.footnotes);
        parser_options.set(Options::ENABLE_TASKLISTS, opts.task_lists);
        parser_options.set(Options::ENABLE_SMART_PUNCTUATION, opts.smart_punctuation);

        Self {
            opts,
            parser_options,
        }
    }

    /// Render Markdown text to an HTML string.
    #[instrument(skip_all, fields(len = markdown.len()))]
    pub fn render(&self, markdown: &str) -> String {
        let prepared = prepare::run_pipeline(markdown);
        let html = self.render_prepared(&prepared, &mut DocumentStats::default());
        debug!(html_len = html.len(), "render complete");
        html
    }

    /// Render Markdown text and derive title and word count in the same pass.
    pub fn render_document(&self, markdown: &str) -> RenderedDocument {
        let prepared = prepare::run_pipeline(markdown);
        let mut stats = DocumentStats::default();
        let html = self.render_prepared(&prepared, &mut stats);
        RenderedDocument {
            html,
            title: stats.title,
            word_count: stats.words,
        }
    }

    fn render_prepared(&self, markdown: &str, stats: &mut DocumentStats) -> String {
        let escape = self.opts.escape_raw_html;
        let events = Parser::new_ext(markdown, self.parser_options).map(|event| {
            stats.observe(&event);
            match event {
                Event::Html(raw) | Event::InlineHtml(raw) if escape => Event::Text(raw),
                other => other,
            }
        });

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events);
        out
    }
}

/// Process-wide renderer built from default options.
pub fn default_renderer() -> Arc<MarkdownRenderer> {
    static DEFAULT: LazyLock<Arc<MarkdownRenderer>> =
        LazyLock::new(|| Arc::new(MarkdownRenderer::new(RenderOptions::default())));
    Arc::clone(&DEFAULT)
}

/// Renderer for `opts`, sharing the process-wide instance when the options
/// are the defaults.
pub fn renderer_for(opts: RenderOptions) -> Arc<MarkdownRenderer> {
    if opts == RenderOptions::default() {
        default_renderer()
    } else {
        Arc::new(MarkdownRenderer::new(opts))
    }
}

// ---------------------------------------------------------------------------
// Metadata helpers
// ---------------------------------------------------------------------------

/// Title and word count gathered from a stream of parser events.
#[derive(Debug, Default)]
struct DocumentStats {
    title: Option<String>,
    /// Text of the H1 being read, until a title is found.
    heading: Option<String>,
    in_code: bool,
    words: usize,
}

impl DocumentStats {
    fn of(md: &str) -> Self {
        let mut stats = Self::default();
        for event in Parser::new(md) {
            stats.observe(&event);
        }
        stats
    }

    fn observe(&mut self, event: &Event<'_>) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) if self.title.is_none() => self.heading = Some(String::new()),
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                if let Some(text) = self.heading.take() {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        self.title = Some(trimmed.to_string());
                    }
                }
            }
            Event::Start(Tag::CodeBlock(_)) => self.in_code = true,
            Event::End(TagEnd::CodeBlock) => self.in_code = false,
            Event::Text(text) if !self.in_code => {
                self.words += text.split_whitespace().count();
                if let Some(heading) = self.heading.as_mut() {
                    heading.push_str(text);
                }
            }
            Event::Code(text) if !self.in_code => {
                self.words += 1;
                if let Some(heading) = self.heading.as_mut() {
                    heading.push_str(text);
                }
            }
            _ => {}
        }
    }
}

/// Extract the text of the first non-empty H1 heading.
pub fn extract_title(md: &str) -> Option<String> {
    DocumentStats::of(md).title
}

/// Count prose words, excluding fenced and indented code.
pub fn count_words(md: &str) -> usize {
    DocumentStats::of(md).words
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> MarkdownRenderer {
        MarkdownRenderer::new(RenderOptions::default())
    }

    #[test]
    fn render_heading() {
        let html = renderer().render("# Hi");
        assert_eq!(html, "<h1>Hi</h1>\n");
    }

    #[test]
    fn render_is_repeatable() {
        let r = renderer();
        let input = "## Background\n\nSome *text* with `code`.\n\n- a\n- b\n";
        assert_eq!(r.render(input), r.render(input));
    }

    #[test]
    fn render_code_block_with_language() {
        let html = renderer().render("```sql\nSELECT 1;\n```\n");
        assert!(html.contains("<pre><code class=\"language-sql\">"));
        assert!(html.contains("SELECT 1;"));
    }

    #[test]
    fn render_tables_when_enabled() {
        let md = "| a | b |\n|---|---|\n| 1 | 2 |\n";
        assert!(renderer().render(md).contains("<table>"));

        let plain = MarkdownRenderer::new(RenderOptions {
            tables: false,
            ..RenderOptions::default()
        });
        assert!(!plain.render(md).contains("<table>"));
    }

    #[test]
    fn render_malformed_markdown_degrades() {
        let html = renderer().render("**unclosed *emphasis\n\n```\nno closing fence");
        assert!(html.contains("unclosed"));
        assert!(html.contains("no closing fence"));
    }

    #[test]
    fn render_empty_input() {
        assert_eq!(renderer().render(""), "");
    }

    #[test]
    fn raw_html_passes_through_by_default() {
        let html = renderer().render("<div class=\"note\">hi</div>\n");
        assert!(html.contains("<div class=\"note\">"));
    }

    #[test]
    fn raw_html_escaped_when_configured() {
        let r = MarkdownRenderer::new(RenderOptions {
            escape_raw_html: true,
            ..RenderOptions::default()
        });
        let html = r.render("<script>alert(1)</script>\n\ninline <b>bold</b>\n");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;b&gt;"));
    }

    #[test]
    fn render_skips_frontmatter() {
        let html = renderer().render("---\ntitle: x\n---\n# Body\n");
        assert_eq!(html, "<h1>Body</h1>\n");
    }

    #[test]
    fn extract_title_first_h1() {
        let md = "Intro\n\n# Using indexes in PostgreSQL\n\n# Second\n";
        assert_eq!(extract_title(md), Some("Using indexes in PostgreSQL".into()));
    }

    #[test]
    fn extract_title_ignores_code_blocks() {
        let md = "```bash\n# not a title\n```\n\n## Only h2\n";
        assert_eq!(extract_title(md), None);
    }

    #[test]
    fn extract_title_keeps_inline_code() {
        assert_eq!(
            extract_title("# The `EXPLAIN` command"),
            Some("The EXPLAIN command".into())
        );
    }

    #[test]
    fn word_count_excludes_code_blocks() {
        let md = "# Title\n\nOne two three.\n\n```sql\nSELECT a, b, c FROM t;\n```\n";
        assert_eq!(count_words(md), 4);
    }

    #[test]
    fn render_document_collects_metadata() {
        let doc = renderer().render_document("# Hi\n\nHello world\n");
        assert_eq!(doc.title.as_deref(), Some("Hi"));
        assert_eq!(doc.word_count, 3);
        assert!(doc.html.starts_with("<h1>Hi</h1>"));
    }

    #[test]
    fn render_document_matches_standalone_helpers() {
        let md = "# \n\n# Partial `WHERE` indexes\n\nIndex only hot rows.\n\n```sql\n# not a title\n```\n";
        let doc = renderer().render_document(md);
        assert_eq!(doc.title, extract_title(md));
        assert_eq!(doc.word_count, count_words(md));
        assert_eq!(doc.title.as_deref(), Some("Partial WHERE indexes"));
        assert_eq!(doc.word_count, 8);
    }

    #[test]
    fn default_renderer_is_shared() {
        let a = default_renderer();
        let b = default_renderer();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn renderer_for_reuses_default_only_for_default_options() {
        let shared = renderer_for(RenderOptions::default());
        assert!(Arc::ptr_eq(&shared, &default_renderer()));

        let custom = renderer_for(RenderOptions {
            escape_raw_html: true,
            ..RenderOptions::default()
        });
        assert!(!Arc::ptr_eq(&custom, &default_renderer()));
        assert_eq!(custom.render("<b>x</b>\n"), "<p>&lt;b&gt;x&lt;/b&gt;</p>\n");
    }
}
