//! Core TUI application state and event loop.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use monotone_content::{ContentResolver, resolver_from_config};
use monotone_core::{Route, RouteLoader, TutorialIndex};
use monotone_markdown::{MarkdownRenderer, RenderOptions, renderer_for};
use monotone_shared::{AppConfig, RouteParam};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tracing::info;

use crate::screens::{ListScreen, PageScreen, ScreenAction, ScreenId};
use crate::widgets::{header, status_bar};

/// Application state.
pub(crate) struct App {
    index: TutorialIndex,
    resolver: Arc<dyn ContentResolver>,
    renderer: Arc<MarkdownRenderer>,
    /// Currently active screen.
    pub screen: ScreenId,
    list: ListScreen,
    /// Present only while a tutorial is open.
    page: Option<PageScreen>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: String,
    /// Whether help overlay is visible.
    pub show_help: bool,
}

impl App {
    pub(crate) fn new(
        index: TutorialIndex,
        resolver: Arc<dyn ContentResolver>,
        renderer: Arc<MarkdownRenderer>,
    ) -> Self {
        let list = ListScreen::new(index.list().to_vec());
        Self {
            index,
            resolver,
            renderer,
            screen: ScreenId::List,
            list,
            page: None,
            should_quit: false,
            status: "Ready — press ? for help".to_string(),
            show_help: false,
        }
    }

    /// Build the app from configuration.
    pub(crate) fn from_config(config: &AppConfig) -> Result<Self> {
        let index = TutorialIndex::from_config(&config.content)?;
        let resolver = resolver_from_config(&config.content)?;
        let renderer = renderer_for(RenderOptions::from(&config.render));
        info!(resolver = resolver.name(), entries = index.len(), "tui starting");
        Ok(Self::new(index, resolver, renderer))
    }

    /// Navigate to a location fragment.
    pub(crate) fn go_to(&mut self, location: &str) {
        match Route::parse(location) {
            Route::Home => self.close_page(),
            Route::Tutorial(param) => self.open_page(param),
            Route::Unknown(raw) => self.status = format!("Unknown route '{raw}'"),
        }
    }

    fn open_page(&mut self, param: RouteParam) {
        // Re-opening replaces the page and its loader.
        if let Some(old) = self.page.take() {
            old.close();
        }
        self.list.select_param(&param);
        let loader = RouteLoader::new(Arc::clone(&self.resolver), Arc::clone(&self.renderer));
        self.status = format!("Opened {}", Route::Tutorial(param.clone()));
        self.page = Some(PageScreen::open(loader, param));
        self.screen = ScreenId::Page;
    }

    fn close_page(&mut self) {
        if let Some(page) = self.page.take() {
            self.list.select_param(page.param());
            page.close();
        }
        self.screen = ScreenId::List;
        self.status = format!("{}", self.screen);
    }

    /// Refresh per-tick state.
    pub(crate) fn tick(&mut self) {
        if let Some(page) = self.page.as_mut() {
            page.sync();
        }
    }

    fn apply(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::None => {}
            ScreenAction::Open(param) => self.open_page(param),
            ScreenAction::Back => self.close_page(),
            ScreenAction::Status(msg) => self.status = msg,
        }
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        // Global keybindings (always active)
        match code {
            KeyCode::Char('q') | KeyCode::Char('c')
                if modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
                return;
            }
            KeyCode::Esc if self.show_help => {
                self.show_help = false;
                return;
            }
            _ => {}
        }

        // If help is showing, consume any key to dismiss
        if self.show_help {
            self.show_help = false;
            return;
        }

        let action = match (self.screen, self.page.as_mut()) {
            (ScreenId::Page, Some(page)) => page.handle_key(code, modifiers, &self.index),
            _ => self.list.handle_key(code, modifiers),
        };
        self.apply(action);
    }
}

/// Entry point: sets up terminal, runs event loop, restores terminal.
pub(crate) fn run(config: AppConfig, initial_route: Option<&str>) -> Result<()> {
    let mut app = App::from_config(&config)?;
    if let Some(location) = initial_route {
        app.go_to(location);
    }
    let tick = Duration::from_millis(config.ui.tick_ms);

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app, tick);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.close_page();
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick: Duration,
) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| draw(f, app))?;

        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let (title, subtitle) = match (&app.screen, &app.page) {
        (ScreenId::Page, Some(page)) => page.heading(&app.index),
        _ => (
            "Tutorials".to_string(),
            "Miscellaneous tutorials. Enter to read.".to_string(),
        ),
    };
    f.render_widget(header(&title, &subtitle), chunks[0]);

    match (&app.screen, &app.page) {
        (ScreenId::Page, Some(page)) => page.draw(f, chunks[1]),
        _ => app.list.draw(f, chunks[1]),
    }

    let status = match (&app.screen, &app.page) {
        (ScreenId::Page, Some(page)) => format!(
            "{} · {} · n/p next/prev · r reload · Esc back",
            page.status(),
            app.status
        ),
        _ => app.status.clone(),
    };
    f.render_widget(status_bar(&status), chunks[2]);

    // Help overlay
    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("Tutorial list:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  ↑/↓ j/k      Move selection"),
        Line::from("  Enter        Open tutorial"),
        Line::from(""),
        Line::from("Tutorial page:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  ↑/↓ PgUp/PgDn  Scroll"),
        Line::from("  n / p        Next / previous tutorial"),
        Line::from("  r            Reload"),
        Line::from("  Esc          Back to list"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help — press any key to close ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use monotone_content::BundledResolver;
    use monotone_core::LoaderStatus;
    use ratatui::backend::TestBackend;

    use super::*;

    fn app() -> App {
        App::new(
            TutorialIndex::bundled().unwrap(),
            Arc::new(BundledResolver),
            Arc::new(MarkdownRenderer::default()),
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(code, KeyModifiers::NONE);
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[tokio::test]
    async fn enter_opens_page_and_esc_returns() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, ScreenId::Page);
        assert!(app.page.is_some());

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, ScreenId::List);
        assert!(app.page.is_none());
    }

    #[tokio::test]
    async fn help_toggles_and_swallows_next_key() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Enter);
        assert!(!app.show_help);
        assert_eq!(app.screen, ScreenId::List);
    }

    #[tokio::test]
    async fn go_to_route() {
        let mut app = app();
        app.go_to("#/tutorial/2");
        assert_eq!(app.page.as_ref().map(|p| p.param().as_str()), Some("2"));

        app.go_to("#/tutorial/3");
        assert_eq!(app.page.as_ref().map(|p| p.param().as_str()), Some("3"));

        app.go_to("#/nowhere");
        assert!(app.status.contains("Unknown route"));
        assert_eq!(app.screen, ScreenId::Page);

        app.go_to("#/");
        assert_eq!(app.screen, ScreenId::List);
    }

    #[tokio::test]
    async fn draws_list_and_loaded_page() {
        let mut app = app();
        assert!(screen_text(&app).contains("Using indexes in PostgreSQL"));

        app.go_to("#/tutorial/3");
        let mut rx = app.page.as_ref().map(|p| p.subscribe()).unwrap();
        rx.wait_for(|s| !s.loading).await.unwrap();
        app.tick();

        assert_eq!(app.page.as_ref().map(PageScreen::status), Some(LoaderStatus::Loaded));
        let text = screen_text(&app);
        assert!(text.contains("Partial indexes"));
        assert!(text.contains("loaded"));
    }

    #[tokio::test]
    async fn q_quits() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
