//! Stat card widget for dashboard counters.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct StatCard {
    pub title: String,
    pub value: String,
    pub style: Style,
}

impl StatCard {
    pub fn new(title: impl Into<String>, value: impl Into<String>, style: Style) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            style,
        }
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let paragraph = Paragraph::new(self.value.as_str())
            .style(self.style.add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(self.title.as_str())
                    .borders(Borders::ALL),
            );
        f.render_widget(paragraph, area);
    }
}
