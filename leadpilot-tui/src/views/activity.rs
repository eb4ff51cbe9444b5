//! Activity log with kind chips, a date range and summary cards for the
//! filtered rows.

use crate::queries::QueryKind;
use crate::state::App;
use crate::views::helpers::or_dash;
use crate::views::{table_state, titled};
use crate::widgets::{FilterBar, FilterOption, StatCard};
use leadpilot_core::ActivityKind;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let filter = &app.activity_view.filter;
    let mut chips: Vec<FilterOption> = ActivityKind::all()
        .iter()
        .map(|kind| FilterOption::new("f", kind.label(), *kind == filter.kind))
        .collect();
    let day = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map_or_else(|| "...".to_string(), |t| t.format("%Y-%m-%d").to_string())
    };
    chips.push(FilterOption::new(
        "/",
        format!("{} to {}", day(filter.from), day(filter.to)),
        filter.from.is_some() || filter.to.is_some(),
    ));
    FilterBar {
        title: "Filters",
        filters: &chips,
        active_style: Style::default().fg(app.theme.primary),
        inactive_style: Style::default().fg(app.theme.text_dim),
    }
    .render(f, rows[0]);
    render_summary(f, app, rows[1]);

    let items = app.visible_activity();
    let table_rows: Vec<Row> = items
        .iter()
        .map(|item| {
            let status_color = match item.status.as_str() {
                "success" | "sent" | "completed" => app.theme.success,
                "failed" | "error" => app.theme.error,
                _ => app.theme.text_dim,
            };
            Row::new(vec![
                Cell::from(item.timestamp.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(item.action.clone()),
                Cell::from(or_dash(item.lead.as_deref())),
                Cell::from(or_dash(item.campaign.as_deref())),
                Cell::from(item.status.clone()).style(Style::default().fg(status_color)),
                Cell::from(or_dash(item.message.as_deref())),
            ])
        })
        .collect();
    let widths = [
        Constraint::Length(16),
        Constraint::Percentage(20),
        Constraint::Percentage(16),
        Constraint::Percentage(16),
        Constraint::Length(10),
        Constraint::Percentage(30),
    ];
    let table = Table::new(table_rows, widths)
        .header(
            Row::new(vec!["When", "Action", "Lead", "Campaign", "Status", "Message"])
                .style(Style::default().fg(app.theme.secondary)),
        )
        .block(
            Block::default()
                .title(format!(
                    "{} [{}]",
                    titled(app, "Activity", QueryKind::Activity),
                    items.len()
                ))
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .bg(app.theme.bg_highlight)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = table_state(app.activity_view.cursor, items.len());
    f.render_stateful_widget(table, rows[2], &mut state);
}

fn render_summary(f: &mut Frame<'_>, app: &App, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let summary = app.activity_summary();
    let theme = &app.theme;
    let specs = [
        ("Enrichments", summary.enrichments.to_string(), theme.info),
        ("Emails sent", summary.emails_sent.to_string(), theme.primary),
        (
            "Delivery rate",
            format!("{}%", summary.delivery_rate()),
            theme.secondary,
        ),
        ("Replies", summary.replies.to_string(), theme.success),
    ];
    for ((title, value, color), card_area) in specs.into_iter().zip(cards.iter()) {
        StatCard::new(title, value, Style::default().fg(color)).render(f, *card_area);
    }
}
