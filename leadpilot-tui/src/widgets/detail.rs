//! Detail panel widget for showing field/value pairs of the item under the cursor.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub struct DetailPanel<'a> {
    pub title: &'a str,
    pub fields: Vec<(&'a str, String)>,
    pub label_style: Style,
    /// Shown when `fields` is empty.
    pub placeholder: &'a str,
}

impl<'a> DetailPanel<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let text = if self.fields.is_empty() {
            Text::from(Line::from(Span::styled(self.placeholder, self.label_style)))
        } else {
            Text::from(
                self.fields
                    .iter()
                    .map(|(label, value)| {
                        Line::from(vec![
                            Span::styled(format!("{label}: "), self.label_style),
                            Span::raw(value.clone()),
                        ])
                    })
                    .collect::<Vec<_>>(),
            )
        };
        let widget = Paragraph::new(text)
            .block(Block::default().title(self.title).borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        f.render_widget(widget, area);
    }
}
