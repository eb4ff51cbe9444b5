//! Lead table with filters, selection and the usage banner.

use crate::queries::QueryKind;
use crate::state::App;
use crate::theme::{lead_status_color, usage_color};
use crate::views::helpers::or_dash;
use crate::views::{table_state, titled, two_column};
use crate::widgets::{DetailPanel, FilterBar, FilterOption};
use leadpilot_core::{EnrichmentFilter, UsageLevel};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let banner = usage_banner(app);
    let banner_height = if banner.is_some() { 3 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    if let Some((text, style)) = banner {
        let paragraph =
            Paragraph::new(text).block(Block::default().borders(Borders::ALL).border_style(style));
        f.render_widget(paragraph.style(style), rows[0]);
    }
    render_filters(f, app, rows[1]);

    let (table_area, detail_area) = two_column(rows[2], 65);
    render_table(f, app, table_area);
    render_detail(f, app, detail_area);
}

/// Banner text once usage crosses the warning threshold.
fn usage_banner(app: &App) -> Option<(String, Style)> {
    let usage = app.usage()?;
    let level = usage.level();
    let style = Style::default().fg(usage_color(level, &app.theme));
    match level {
        UsageLevel::Normal => None,
        UsageLevel::Approaching => Some((
            format!(
                "Approaching your lead limit: {}. Upgrade on the Pricing tab.",
                usage.summary()
            ),
            style,
        )),
        UsageLevel::Reached => Some((
            format!(
                "Lead limit reached: {}. New leads are blocked until you upgrade.",
                usage.summary()
            ),
            style,
        )),
    }
}

fn render_filters(f: &mut Frame<'_>, app: &App, area: Rect) {
    let view = &app.leads_view;
    let search = if view.filter.search.is_empty() {
        "Search: -".to_string()
    } else {
        format!("Search: {}", view.filter.search)
    };
    let status = view
        .filter
        .status
        .as_ref()
        .map_or_else(|| "Status: all".to_string(), |s| format!("Status: {s}"));
    let filters = [
        FilterOption::new("/", search, !view.filter.search.is_empty()),
        FilterOption::new("f", status, view.filter.status.is_some()),
        FilterOption::new(
            "F",
            view.filter.enrichment.label(),
            view.filter.enrichment != EnrichmentFilter::All,
        ),
        FilterOption::new(
            "u",
            if view.show_unassigned {
                "Unassigned only"
            } else {
                "All campaigns"
            },
            view.show_unassigned,
        ),
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
    let leads = app.visible_leads();
    let selected = &app.leads_view.selected;
    let rows: Vec<Row> = leads
        .iter()
        .map(|lead| {
            let mark = if selected.contains(&lead.id) { "[x]" } else { "[ ]" };
            Row::new(vec![
                Cell::from(mark),
                Cell::from(lead.full_name()),
                Cell::from(lead.company.clone()),
                Cell::from(lead.job_title.clone()),
                Cell::from(lead.status.to_string())
                    .style(Style::default().fg(lead_status_color(&lead.status, &app.theme))),
                Cell::from(or_dash(lead.email.as_deref())),
            ])
        })
        .collect();

    let kind = QueryKind::Leads {
        unassigned: app.leads_view.show_unassigned,
    };
    let title = format!(
        "{} [{} shown, {} selected]",
        titled(app, "Leads", kind),
        leads.len(),
        selected.len()
    );
    let widths = [
        Constraint::Length(3),
        Constraint::Percentage(24),
        Constraint::Percentage(20),
        Constraint::Percentage(22),
        Constraint::Length(10),
        Constraint::Percentage(24),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["", "Name", "Company", "Title", "Status", "Email"])
                .style(Style::default().fg(app.theme.secondary)),
        )
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(app.theme.bg_highlight)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = table_state(app.leads_view.cursor, leads.len());
    f.render_stateful_widget(table, area, &mut state);
}

fn render_detail(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut fields = Vec::new();
    if let Some(lead) = app.cursor_lead() {
        let campaign = lead.campaign_id.map(|id| {
            app.campaigns()
                .into_iter()
                .find(|c| c.id == id)
                .map_or_else(|| format!("#{id}"), |c| c.name)
        });
        fields.push(("Name", lead.full_name()));
        fields.push(("Title", lead.job_title.clone()));
        fields.push(("Company", lead.company.clone()));
        fields.push(("Status", lead.status.to_string()));
        fields.push(("Email", or_dash(lead.email.as_deref())));
        if let Some(confidence) = lead.email_confidence {
            fields.push(("Confidence", format!("{confidence}%")));
        }
        fields.push(("Campaign", or_dash(campaign.as_deref())));
        fields.push(("Profile", lead.profile_url.clone()));
        if let Some(message) = &lead.message_text {
            fields.push(("Message", message.clone()));
        }
    }
    DetailPanel {
        title: "Lead",
        fields,
        label_style: Style::default().fg(app.theme.secondary),
        placeholder: "No lead selected. Press i to import a CSV or n to scrape LinkedIn.",
    }
    .render(f, area);
}
