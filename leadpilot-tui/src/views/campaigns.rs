//! Email campaign manager: list, details, send logs and performance.

use crate::queries::QueryKind;
use crate::state::App;
use crate::theme::campaign_status_color;
use crate::views::helpers::or_dash;
use crate::views::{table_state, titled, two_column};
use crate::widgets::{DetailPanel, FilterBar, FilterOption};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

/// Days of performance history shown under the logs.
const PERFORMANCE_DAYS: usize = 7;

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);
    render_filters(f, app, rows[0]);

    let (list_area, side_area) = two_column(rows[1], 50);
    render_table(f, app, list_area);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9),
            Constraint::Min(5),
            Constraint::Length(PERFORMANCE_DAYS as u16 + 3),
        ])
        .split(side_area);
    render_detail(f, app, side[0]);
    render_logs(f, app, side[1]);
    render_performance(f, app, side[2]);
}

fn render_filters(f: &mut Frame<'_>, app: &App, area: Rect) {
    let filter = &app.campaigns_view.filter;
    let search = if filter.search.is_empty() {
        "Search: -".to_string()
    } else {
        format!("Search: {}", filter.search)
    };
    let status = filter
        .status
        .as_ref()
        .map_or_else(|| "Status: all".to_string(), |s| format!("Status: {s}"));
    let filters = [
        FilterOption::new("/", search, !filter.search.is_empty()),
        FilterOption::new("f", status, filter.status.is_some()),
    ];
    FilterBar {
        title: "Filters",
        filters: &filters,
        active_style: Style::default().fg(app.theme.primary),
        inactive_style: Style::default().fg(app.theme.text_dim),
    }
    .render(f, area);
}

fn render_table(f: &mut Frame<'_>, app: &App, area: Rect) {
    let campaigns = app.visible_campaigns();
    let rows: Vec<Row> = campaigns
        .iter()
        .map(|campaign| {
            Row::new(vec![
                Cell::from(campaign.name.clone()),
                Cell::from(campaign.subject.clone()),
                Cell::from(campaign.status.to_string()).style(
                    Style::default().fg(campaign_status_color(&campaign.status, &app.theme)),
                ),
                Cell::from(campaign.created_at.format("%Y-%m-%d").to_string()),
            ])
        })
        .collect();
    let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(35),
        Constraint::Length(10),
        Constraint::Length(10),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Name", "Subject", "Status", "Created"])
                .style(Style::default().fg(app.theme.secondary)),
        )
        .block(
            Block::default()
                .title(titled(app, "Campaigns", QueryKind::Campaigns))
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .bg(app.theme.bg_highlight)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = table_state(app.campaigns_view.cursor, campaigns.len());
    f.render_stateful_widget(table, area, &mut state);
}

fn render_detail(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut fields = Vec::new();
    if let Some(campaign) = app.cursor_campaign() {
        fields.push(("Name", campaign.name.clone()));
        fields.push(("Subject", campaign.subject.clone()));
        fields.push(("Status", campaign.status.to_string()));
        if let Some(scheduled) = campaign.scheduled_at {
            fields.push(("Scheduled", scheduled.format("%Y-%m-%d %H:%M").to_string()));
        }
        fields.push(("Body", campaign.body.clone()));
    }
    DetailPanel {
        title: "Campaign",
        fields,
        label_style: Style::default().fg(app.theme.secondary),
        placeholder: "No campaigns yet. Press n to create one.",
    }
    .render(f, area);
}

fn render_logs(f: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(campaign) = app.cursor_campaign() else {
        f.render_widget(
            Block::default().title("Send log").borders(Borders::ALL),
            area,
        );
        return;
    };
    let logs = app.campaign_logs(campaign.id);
    let rows: Vec<Row> = logs
        .iter()
        .map(|log| {
            let style = if log.error.is_some() {
                Style::default().fg(app.theme.error)
            } else {
                Style::default().fg(app.theme.text)
            };
            Row::new(vec![
                Cell::from(or_dash(log.lead_name.as_deref())),
                Cell::from(log.to_email.clone()),
                Cell::from(log.status.clone()),
                Cell::from(
                    log.sent_at
                        .map(|t| t.format("%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ])
            .style(style)
        })
        .collect();
    let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(40),
        Constraint::Length(8),
        Constraint::Length(11),
    ];
    let title = titled(app, "Send log", QueryKind::CampaignLogs(campaign.id));
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Lead", "Email", "Status", "Sent"])
                .style(Style::default().fg(app.theme.secondary)),
        )
        .block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(table, area);
}

fn render_performance(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut points = app.performance();
    points.sort_by(|a, b| b.date.cmp(&a.date));
    let rows: Vec<Row> = points
        .iter()
        .take(PERFORMANCE_DAYS)
        .map(|point| {
            Row::new(vec![
                point.date.format("%Y-%m-%d").to_string(),
                point.sent.to_string(),
                point.responses.to_string(),
            ])
        })
        .collect();
    let widths = [
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(10),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Date", "Sent", "Responses"])
                .style(Style::default().fg(app.theme.secondary)),
        )
        .block(
            Block::default()
                .title(titled(app, "Performance", QueryKind::CampaignPerformance))
                .borders(Borders::ALL),
        );
    f.render_widget(table, area);
}
