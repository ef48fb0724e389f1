//! Reusable TUI widgets.

use monotone_core::LoaderStatus;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Bottom status bar.
pub(crate) fn status_bar(msg: &str) -> Paragraph<'_> {
    Paragraph::new(format!(" {msg}"))
        .style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White),
        )
}

/// Title block shown above the current screen.
pub(crate) fn header<'a>(title: &'a str, subtitle: &'a str) -> Paragraph<'a> {
    let lines = vec![
        Line::from(title).style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Line::from(subtitle).style(Style::default().fg(Color::Gray)),
    ];
    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Monotone "))
}

/// Colour for a loader status label.
pub(crate) fn status_color(status: LoaderStatus) -> Color {
    match status {
        LoaderStatus::Loading => Color::Yellow,
        LoaderStatus::Loaded => Color::Green,
        LoaderStatus::NotFound | LoaderStatus::Failed => Color::Red,
        LoaderStatus::Idle | LoaderStatus::TornDown => Color::Gray,
    }
}
