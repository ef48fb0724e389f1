//! Rendered tutorial HTML as styled terminal lines.
//!
//! Walks the fragment produced by the Markdown renderer and maps the block
//! and inline elements it emits onto `ratatui` spans. Unknown elements are
//! transparent: their children are rendered in the surrounding style.

use ratatui::prelude::*;
use scraper::{ElementRef, Html};

/// Convert an HTML fragment into display lines.
pub(crate) fn html_to_lines(html: &str) -> Vec<Line<'static>> {
    let fragment = Html::parse_fragment(html);
    let mut builder = LineBuilder::default();
    builder.walk(fragment.root_element());
    builder.finish()
}

/// A line prefix whose first occurrence may differ (list markers).
struct Prefix {
    first: String,
    rest: String,
    used: bool,
}

impl Prefix {
    fn uniform(s: &str) -> Self {
        Self {
            first: s.to_string(),
            rest: s.to_string(),
            used: false,
        }
    }

    fn marker(marker: String) -> Self {
        let rest = " ".repeat(marker.chars().count());
        Self {
            first: marker,
            rest,
            used: false,
        }
    }
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    /// Line prefixes, innermost last (blockquotes, code blocks, list items).
    prefixes: Vec<Prefix>,
    /// Counters for open lists; `None` for unordered.
    lists: Vec<Option<u64>>,
    in_pre: bool,
}

impl LineBuilder {
    fn style(&self) -> Style {
        self.styles.iter().fold(Style::default(), |acc, s| acc.patch(*s))
    }

    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            if let Some(el) = ElementRef::wrap(child) {
                self.element(el);
            } else if let Some(text) = child.value().as_text() {
                self.text(text);
            }
        }
    }

    fn with_style(&mut self, style: Style, element: ElementRef<'_>) {
        self.styles.push(style);
        self.walk(element);
        self.styles.pop();
    }

    fn element(&mut self, el: ElementRef<'_>) {
        match el.value().name() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.flush();
                let mut style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
                if el.value().name() == "h1" {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                self.with_style(style, el);
                self.end_block();
            }
            "p" => {
                self.flush();
                self.walk(el);
                self.end_block();
            }
            "em" | "i" => self.with_style(Style::default().add_modifier(Modifier::ITALIC), el),
            "strong" | "b" => self.with_style(Style::default().add_modifier(Modifier::BOLD), el),
            "del" | "s" => {
                self.with_style(Style::default().add_modifier(Modifier::CROSSED_OUT), el);
            }
            "code" if !self.in_pre => self.with_style(Style::default().fg(Color::Yellow), el),
            "a" => self.with_style(
                Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                el,
            ),
            "pre" => {
                self.flush();
                self.in_pre = true;
                self.prefixes.push(Prefix::uniform("    "));
                self.with_style(Style::default().fg(Color::Green), el);
                self.flush();
                self.prefixes.pop();
                self.in_pre = false;
                self.end_block();
            }
            "blockquote" => {
                self.flush();
                self.prefixes.push(Prefix::uniform("│ "));
                self.with_style(Style::default().fg(Color::Gray), el);
                self.flush();
                self.prefixes.pop();
            }
            "ul" | "ol" => {
                self.flush();
                let start = if el.value().name() == "ol" {
                    Some(el.value().attr("start").and_then(|s| s.parse().ok()).unwrap_or(1))
                } else {
                    None
                };
                self.lists.push(start);
                self.walk(el);
                self.lists.pop();
                if self.lists.is_empty() {
                    self.end_block();
                }
            }
            "li" => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.prefixes.push(Prefix::marker(marker));
                self.walk(el);
                self.flush();
                self.prefixes.pop();
            }
            "input" if el.value().attr("type") == Some("checkbox") => {
                let mark = if el.value().attr("checked").is_some() { "[x] " } else { "[ ] " };
                self.current.push(Span::raw(mark));
            }
            "hr" => {
                self.flush();
                self.lines.push(Line::from("─".repeat(40)).style(Style::default().fg(Color::DarkGray)));
                self.end_block();
            }
            "br" => self.flush(),
            "tr" => {
                self.flush();
                self.walk(el);
                self.flush();
            }
            "th" => {
                self.cell_separator();
                self.with_style(Style::default().add_modifier(Modifier::BOLD), el);
            }
            "td" => {
                self.cell_separator();
                self.walk(el);
            }
            "table" => {
                self.flush();
                self.walk(el);
                self.end_block();
            }
            _ => self.walk(el),
        }
    }

    fn cell_separator(&mut self) {
        if !self.current.is_empty() {
            self.current.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
        }
    }

    fn text(&mut self, text: &str) {
        let style = self.style();
        if self.in_pre {
            let mut parts = text.split('\n').peekable();
            while let Some(part) = parts.next() {
                if !part.is_empty() {
                    self.current.push(Span::styled(part.to_string(), style));
                }
                if parts.peek().is_some() {
                    self.flush_line();
                }
            }
            return;
        }

        let collapsed = collapse_whitespace(text);
        if collapsed.trim().is_empty() {
            if !self.current.is_empty() && !collapsed.is_empty() {
                self.current.push(Span::styled(" ", style));
            }
            return;
        }
        let collapsed = if self.current.is_empty() {
            collapsed.trim_start().to_string()
        } else {
            collapsed
        };
        self.current.push(Span::styled(collapsed, style));
    }

    /// End the current line if it has content.
    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.flush_line();
        }
    }

    fn flush_line(&mut self) {
        let mut spans = Vec::with_capacity(self.current.len() + 1);
        let mut prefix = String::new();
        for p in &mut self.prefixes {
            prefix.push_str(if p.used { &p.rest } else { &p.first });
            p.used = true;
        }
        if !prefix.is_empty() {
            spans.push(Span::styled(prefix, Style::default().fg(Color::DarkGray)));
        }
        spans.append(&mut self.current);
        if let Some(last) = spans.last_mut() {
            let trimmed = last.content.trim_end().to_string();
            last.content = trimmed.into();
        }
        self.lines.push(Line::from(spans));
    }

    /// Separate blocks by one blank line.
    fn end_block(&mut self) {
        self.flush();
        if self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(c);
            last_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn heading_is_bold() {
        let lines = html_to_lines("<h1>Hi</h1>\n");
        assert_eq!(plain(&lines), vec!["Hi"]);
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn paragraphs_separated_by_blank_line() {
        let lines = html_to_lines("<p>one\ntwo</p>\n<p>three <em>four</em></p>\n");
        assert_eq!(plain(&lines), vec!["one two", "", "three four"]);
        let em = &lines[2].spans[1];
        assert_eq!(em.content, "four");
        assert!(em.style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn lists_get_markers() {
        let lines = html_to_lines("<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n<ol start=\"3\">\n<li>c</li>\n</ol>\n");
        assert_eq!(plain(&lines), vec!["• a", "• b", "", "3. c"]);
    }

    #[test]
    fn code_block_keeps_lines() {
        let lines = html_to_lines("<pre><code>SELECT 1;\nSELECT 2;\n</code></pre>\n");
        assert_eq!(plain(&lines), vec!["    SELECT 1;", "    SELECT 2;"]);
    }

    #[test]
    fn blockquote_is_prefixed() {
        let lines = html_to_lines("<blockquote>\n<p>quoted</p>\n</blockquote>\n");
        assert_eq!(plain(&lines)[0], "│ quoted");
    }

    #[test]
    fn table_cells_are_separated() {
        let html = "<table><thead><tr><th>a</th><th>b</th></tr></thead>\
                    <tbody><tr><td>1</td><td>2</td></tr></tbody></table>\n";
        assert_eq!(plain(&html_to_lines(html)), vec!["a │ b", "1 │ 2"]);
    }

    #[test]
    fn empty_input_has_no_lines() {
        assert!(html_to_lines("").is_empty());
    }
}
