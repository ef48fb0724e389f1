//! Tutorial list screen.

use crossterm::event::{KeyCode, KeyModifiers};
use monotone_shared::{RouteParam, TutorialSummary};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use super::ScreenAction;

pub(crate) struct ListScreen {
    entries: Vec<TutorialSummary>,
    selected: usize,
}

impl ListScreen {
    pub(crate) fn new(entries: Vec<TutorialSummary>) -> Self {
        Self {
            entries,
            selected: 0,
        }
    }

    pub(crate) fn selected(&self) -> Option<&TutorialSummary> {
        self.entries.get(self.selected)
    }

    /// Move the selection to the entry with this route parameter, if listed.
    pub(crate) fn select_param(&mut self, param: &RouteParam) {
        if let Some(i) = param
            .tutorial_id()
            .and_then(|id| self.entries.iter().position(|e| e.id == id))
        {
            self.selected = i;
        }
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        if self.entries.is_empty() {
            let empty = Paragraph::new("No tutorials in the index.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(" Tutorials "));
            f.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if i == self.selected {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let prefix = if i == self.selected { "▸ " } else { "  " };
                ListItem::new(vec![
                    Line::from(format!(
                        "{prefix}{}  ({})",
                        entry.title,
                        entry.created_at.format("%Y-%m-%d")
                    ))
                    .style(style),
                    Line::from(format!("    {}", entry.description))
                        .style(Style::default().fg(Color::DarkGray)),
                ])
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Tutorials ({}) ", self.entries.len())),
        );
        f.render_widget(list, area);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> ScreenAction {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                ScreenAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.entries.len() {
                    self.selected += 1;
                }
                ScreenAction::None
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.selected = 0;
                ScreenAction::None
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.selected = self.entries.len().saturating_sub(1);
                ScreenAction::None
            }
            KeyCode::Enter => match self.selected() {
                Some(entry) => ScreenAction::Open(RouteParam::from(entry.id)),
                None => ScreenAction::Status("Nothing to open.".to_string()),
            },
            _ => ScreenAction::None,
        }
    }
}
