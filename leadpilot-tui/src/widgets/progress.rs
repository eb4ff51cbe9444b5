//! Plan usage meter.

use crate::theme::{usage_color, Theme};
use leadpilot_core::{Usage, UsageLevel};
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Gauge},
    Frame,
};

pub struct UsageMeter<'a> {
    pub usage: Option<&'a Usage>,
    pub theme: &'a Theme,
}

impl<'a> UsageMeter<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let block = Block::default().title("Usage").borders(Borders::ALL);
        let Some(usage) = self.usage else {
            let gauge = Gauge::default()
                .block(block)
                .gauge_style(Style::default().fg(self.theme.text_dim))
                .label("loading...")
                .ratio(0.0);
            f.render_widget(gauge, area);
            return;
        };

        let level = usage.level();
        let label = match level {
            UsageLevel::Reached => format!("{} (limit reached)", usage.summary()),
            _ => usage.summary(),
        };
        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(usage_color(level, self.theme)))
            .label(label)
            .ratio(usage.ratio());
        f.render_widget(gauge, area);
    }
}
