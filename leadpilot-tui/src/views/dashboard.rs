//! Dashboard: stat cards, usage banner, recent activity and campaigns.

use crate::queries::QueryKind;
use crate::state::{App, RECENT_LIMIT};
use crate::theme::campaign_status_color;
use crate::views::titled;
use crate::widgets::StatCard;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    render_stats(f, app, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    render_recent_activity(f, app, columns[0]);
    render_recent_campaigns(f, app, columns[1]);
}

fn render_stats(f: &mut Frame<'_>, app: &App, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(area);

    let stats = app.stats();
    let count = |value: Option<u64>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
    let theme = &app.theme;
    let specs = [
        ("Total leads", count(stats.map(|s| s.total())), theme.text),
        ("Accepted", count(stats.map(|s| s.accepted)), theme.info),
        ("Replied", count(stats.map(|s| s.replied)), theme.success),
        ("Failed", count(stats.map(|s| s.failed)), theme.error),
        (
            "Response rate",
            stats.map_or_else(|| "-".to_string(), |s| format!("{:.1}%", s.response_rate())),
            theme.secondary,
        ),
    ];
    for ((title, value, color), card_area) in specs.into_iter().zip(cards.iter()) {
        StatCard::new(title, value, Style::default().fg(color)).render(f, *card_area);
    }
}

fn render_recent_activity(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut activity = app.activity();
    activity.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let items: Vec<ListItem> = activity
        .iter()
        .take(RECENT_LIMIT)
        .map(|item| {
            let subject = item
                .lead
                .as_deref()
                .or(item.campaign.as_deref())
                .unwrap_or("");
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} ", item.timestamp.format("%Y-%m-%d %H:%M")),
                    Style::default().fg(app.theme.text_dim),
                ),
                Span::raw(format!("{} {}", item.action, subject)),
            ]))
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .title(titled(app, "Recent activity", QueryKind::Activity))
            .borders(Borders::ALL),
    );
    f.render_widget(list, area);
}

fn render_recent_campaigns(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut campaigns = app.campaigns();
    campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let items: Vec<ListItem> = campaigns
        .iter()
        .take(RECENT_LIMIT)
        .map(|campaign| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", campaign.name)),
                Span::styled(
                    format!("[{}]", campaign.status),
                    Style::default().fg(campaign_status_color(&campaign.status, &app.theme)),
                ),
            ]))
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .title(titled(app, "Recent campaigns", QueryKind::Campaigns))
            .borders(Borders::ALL),
    );
    f.render_widget(list, area);
}
