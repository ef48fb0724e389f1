//! Tutorial page screen.
//!
//! Owns one [`RouteLoader`] for as long as the page is open. Moving to the
//! next or previous tutorial re-points the same loader; leaving the page
//! tears it down.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyModifiers};
use monotone_core::{LoadState, LoaderStatus, RenderedContent, RouteLoader, TutorialIndex};
use monotone_markdown::RenderedDocument;
use monotone_shared::RouteParam;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tracing::debug;

use super::ScreenAction;
use crate::html_view::html_to_lines;
use crate::widgets::status_color;

const PAGE_STEP: u16 = 10;

pub(crate) struct PageScreen {
    loader: RouteLoader,
    param: RouteParam,
    scroll: u16,
    /// Last published state, refreshed on every tick.
    state: LoadState,
    /// Display lines for the document currently shown.
    rendered: Option<(Arc<RenderedDocument>, Vec<Line<'static>>)>,
}

impl PageScreen {
    /// Open a page on `param` using `loader`.
    pub(crate) fn open(loader: RouteLoader, param: RouteParam) -> Self {
        let mut screen = Self {
            state: loader.state(),
            loader,
            param: param.clone(),
            scroll: 0,
            rendered: None,
        };
        screen.navigate(param);
        screen
    }

    pub(crate) fn param(&self) -> &RouteParam {
        &self.param
    }

    pub(crate) fn status(&self) -> LoaderStatus {
        self.loader.status()
    }

    /// Follow a new route parameter with the same loader.
    fn navigate(&mut self, param: RouteParam) {
        debug!(%param, "page navigate");
        self.scroll = 0;
        self.param = param.clone();
        self.loader.set_route(Some(param));
        self.sync();
    }

    /// Pull the latest published state from the loader.
    pub(crate) fn sync(&mut self) {
        self.state = self.loader.state();
        if let RenderedContent::Loaded { document, .. } = &self.state.content {
            let fresh = match &self.rendered {
                Some((shown, _)) => !Arc::ptr_eq(shown, document),
                None => true,
            };
            if fresh {
                self.rendered = Some((Arc::clone(document), html_to_lines(&document.html)));
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn subscribe(&self) -> tokio::sync::watch::Receiver<LoadState> {
        self.loader.subscribe()
    }

    /// Tear the loader down. Nothing is published after this.
    pub(crate) fn close(self) {
        self.loader.teardown();
    }

    /// Document loaded for the current parameter, if any.
    fn current_document(&self) -> Option<&RenderedDocument> {
        match &self.state.content {
            RenderedContent::Loaded { param, document } if *param == self.param => {
                Some(document.as_ref())
            }
            _ => None,
        }
    }

    /// Header text: title and description from the index, else the
    /// document's own H1.
    pub(crate) fn heading(&self, index: &TutorialIndex) -> (String, String) {
        let entry = self.param.tutorial_id().and_then(|id| index.get(id));
        if let Some(entry) = entry {
            return (entry.title.clone(), entry.description.clone());
        }
        let title = self
            .current_document()
            .and_then(|doc| doc.title.clone())
            .unwrap_or_else(|| format!("Tutorial {}", self.param));
        (title, String::new())
    }

    /// Word count of the current document, e.g. `"42 words"`.
    fn word_label(&self) -> Option<String> {
        self.current_document().map(|doc| match doc.word_count {
            1 => "1 word".to_string(),
            n => format!("{n} words"),
        })
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let status = self.status();
        let mut spans = vec![
            Span::raw(format!(" #/tutorial/{} ", self.param)),
            Span::styled(format!("[{status}] "), Style::default().fg(status_color(status))),
        ];
        if let Some(words) = self.word_label() {
            spans.push(Span::styled(format!("{words} "), Style::default().fg(Color::DarkGray)));
        }
        let title = Line::from(spans);
        let block = Block::default().borders(Borders::ALL).title(title);

        let body: Paragraph = match &self.state.content {
            RenderedContent::Placeholder => Paragraph::new("Loading…")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            RenderedContent::Loaded { param, .. } => {
                let lines = self
                    .rendered
                    .as_ref()
                    .map(|(_, lines)| lines.clone())
                    .unwrap_or_default();
                // Previous tutorial stays visible while the next one loads.
                let style = if *param == self.param {
                    Style::default()
                } else {
                    Style::default().add_modifier(Modifier::DIM)
                };
                Paragraph::new(lines).style(style).scroll((self.scroll, 0))
            }
            RenderedContent::NotFound { param } => {
                Paragraph::new(format!("No tutorial found for '{param}'."))
                    .style(Style::default().fg(Color::Red))
                    .alignment(Alignment::Center)
            }
            RenderedContent::Failed { param, message } => Paragraph::new(vec![
                Line::from(format!("Could not load tutorial '{param}'."))
                    .style(Style::default().fg(Color::Red)),
                Line::from(""),
                Line::from(message.as_str()),
                Line::from(""),
                Line::from("Press 'r' to retry.").style(Style::default().fg(Color::DarkGray)),
            ])
            .alignment(Alignment::Center),
        };

        f.render_widget(body.wrap(Wrap { trim: false }).block(block), area);
    }

    pub(crate) fn handle_key(
        &mut self,
        code: KeyCode,
        _modifiers: KeyModifiers,
        index: &TutorialIndex,
    ) -> ScreenAction {
        match code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') => ScreenAction::Back,
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                ScreenAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1).min(self.max_scroll());
                ScreenAction::None
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(PAGE_STEP);
                ScreenAction::None
            }
            KeyCode::PageDown | KeyCode::Char(' ') => {
                self.scroll = self.scroll.saturating_add(PAGE_STEP).min(self.max_scroll());
                ScreenAction::None
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.scroll = 0;
                ScreenAction::None
            }
            KeyCode::Char('n') => self.step(index, true),
            KeyCode::Char('p') => self.step(index, false),
            KeyCode::Char('r') => match self.loader.reload() {
                Some(_) => {
                    self.sync();
                    ScreenAction::Status(format!("Reloading tutorial {}…", self.param))
                }
                None => ScreenAction::None,
            },
            _ => ScreenAction::None,
        }
    }

    fn step(&mut self, index: &TutorialIndex, forward: bool) -> ScreenAction {
        let Some(id) = self.param.tutorial_id() else {
            return ScreenAction::Status("Not a listed tutorial.".to_string());
        };
        let (prev, next) = index.neighbours(id);
        let target = if forward { next } else { prev };
        match target {
            Some(entry) => {
                self.navigate(RouteParam::from(entry.id));
                ScreenAction::Status(entry.title.clone())
            }
            None if forward => ScreenAction::Status("Last tutorial.".to_string()),
            None => ScreenAction::Status("First tutorial.".to_string()),
        }
    }

    fn max_scroll(&self) -> u16 {
        let lines = self.rendered.as_ref().map_or(0, |(_, lines)| lines.len());
        u16::try_from(lines.saturating_sub(1)).unwrap_or(u16::MAX)
    }
}

#[cfg(test)]
mod tests {
    use monotone_content::MemoryResolver;
    use monotone_core::CycleOutcome;
    use monotone_markdown::MarkdownRenderer;
    use monotone_shared::{TutorialId, TutorialSummary};

    use super::*;

    fn index() -> TutorialIndex {
        let created_at = "2022-01-01T00:00:00Z".parse().unwrap();
        TutorialIndex::new(
            [(1, "One"), (2, "Two")]
                .into_iter()
                .map(|(id, title)| TutorialSummary {
                    id: TutorialId(id),
                    title: title.to_string(),
                    description: format!("about {title}"),
                    created_at,
                })
                .collect(),
        )
        .unwrap()
    }

    fn loader() -> RouteLoader {
        let resolver = MemoryResolver::new()
            .with(1_u32, "# One\n\nfirst body\n")
            .with(2_u32, "# Two\n\nsecond body\n")
            .with(5_u32, "# Unlisted notes\n\nnot in the index\n");
        RouteLoader::new(Arc::new(resolver), Arc::new(MarkdownRenderer::default()))
    }

    async fn settle(page: &mut PageScreen) {
        let mut rx = page.loader.subscribe();
        rx.wait_for(|s| !s.loading).await.unwrap();
        page.sync();
    }

    fn press(page: &mut PageScreen, code: KeyCode, index: &TutorialIndex) -> ScreenAction {
        page.handle_key(code, KeyModifiers::NONE, index)
    }

    #[tokio::test]
    async fn opens_and_renders() {
        let mut page = PageScreen::open(loader(), RouteParam::new("1"));
        settle(&mut page).await;
        assert_eq!(page.status(), LoaderStatus::Loaded);
        let (_, lines) = page.rendered.as_ref().expect("rendered");
        assert_eq!(lines[0].spans[0].content, "One");
    }

    #[tokio::test]
    async fn next_and_previous_reuse_loader() {
        let index = index();
        let mut page = PageScreen::open(loader(), RouteParam::new("1"));
        settle(&mut page).await;

        assert_eq!(press(&mut page, KeyCode::Char('n'), &index), ScreenAction::Status("Two".into()));
        assert_eq!(page.loader.route(), Some(RouteParam::new("2")));
        settle(&mut page).await;
        assert!(matches!(
            &page.state.content,
            RenderedContent::Loaded { param, .. } if param.as_str() == "2"
        ));

        assert_eq!(
            press(&mut page, KeyCode::Char('n'), &index),
            ScreenAction::Status("Last tutorial.".into())
        );
        press(&mut page, KeyCode::Char('p'), &index);
        assert_eq!(page.param().as_str(), "1");
    }

    #[tokio::test]
    async fn unknown_param_shows_not_found() {
        let index = index();
        let mut page = PageScreen::open(loader(), RouteParam::new("abc"));
        settle(&mut page).await;
        assert_eq!(page.status(), LoaderStatus::NotFound);
        assert!(matches!(press(&mut page, KeyCode::Char('n'), &index), ScreenAction::Status(_)));
        assert_eq!(page.heading(&index).0, "Tutorial abc");
    }

    #[tokio::test]
    async fn word_count_follows_current_document() {
        let index = index();
        let mut page = PageScreen::open(loader(), RouteParam::new("1"));
        assert_eq!(page.word_label(), None);
        settle(&mut page).await;
        assert_eq!(page.word_label().as_deref(), Some("3 words"));

        press(&mut page, KeyCode::Char('n'), &index);
        // Previous document is still shown but no longer counted.
        assert_eq!(page.word_label(), None);
        settle(&mut page).await;
        assert_eq!(page.word_label().as_deref(), Some("3 words"));
    }

    #[tokio::test]
    async fn unlisted_page_uses_document_title() {
        let index = index();
        let mut page = PageScreen::open(loader(), RouteParam::new("5"));
        assert_eq!(page.heading(&index).0, "Tutorial 5");
        settle(&mut page).await;
        assert_eq!(page.heading(&index), ("Unlisted notes".to_string(), String::new()));
        assert_eq!(page.word_label().as_deref(), Some("6 words"));

        let listed = PageScreen::open(loader(), RouteParam::new("1"));
        assert_eq!(listed.heading(&index).0, "One");
    }

    #[tokio::test]
    async fn reload_starts_new_cycle() {
        let index = index();
        let mut page = PageScreen::open(loader(), RouteParam::new("2"));
        settle(&mut page).await;
        assert!(matches!(press(&mut page, KeyCode::Char('r'), &index), ScreenAction::Status(_)));
        settle(&mut page).await;
        assert_eq!(page.status(), LoaderStatus::Loaded);
    }

    #[tokio::test]
    async fn close_tears_loader_down() {
        let mut page = PageScreen::open(loader(), RouteParam::new("1"));
        let handle = page.loader.reload().expect("cycle");
        let mut rx = page.loader.subscribe();
        page.close();
        assert_eq!(handle.wait().await, CycleOutcome::Superseded);
        assert!(!rx.has_changed().unwrap_or(false));
    }

    #[tokio::test]
    async fn scroll_is_clamped() {
        let index = index();
        let mut page = PageScreen::open(loader(), RouteParam::new("1"));
        settle(&mut page).await;
        press(&mut page, KeyCode::Up, &index);
        assert_eq!(page.scroll, 0);
        for _ in 0..50 {
            press(&mut page, KeyCode::Down, &index);
        }
        assert_eq!(page.scroll, page.max_scroll());
        assert_eq!(press(&mut page, KeyCode::Esc, &index), ScreenAction::Back);
    }
}
