//! Filter bar widget: one chip per filter dimension, plus the key that cycles it.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, Clone)]
pub struct FilterOption {
    pub key: &'static str,
    pub label: String,
    /// Whether the filter narrows the list (anything but "all").
    pub active: bool,
}

impl FilterOption {
    pub fn new(key: &'static str, label: impl Into<String>, active: bool) -> Self {
        Self {
            key,
            label: label.into(),
            active,
        }
    }
}

pub struct FilterBar<'a> {
    pub title: &'a str,
    pub filters: &'a [FilterOption],
    pub active_style: Style,
    pub inactive_style: Style,
}

impl<'a> FilterBar<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let mut spans = Vec::with_capacity(self.filters.len() * 2);
        for filter in self.filters {
            let style = if filter.active {
                self.active_style.add_modifier(Modifier::BOLD)
            } else {
                self.inactive_style
            };
            spans.push(Span::styled(format!("[{}] ", filter.key), self.inactive_style));
            spans.push(Span::styled(format!("{}   ", filter.label), style));
        }

        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().title(self.title).borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }
}
