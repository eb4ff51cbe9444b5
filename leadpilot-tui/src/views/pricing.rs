//! Plans, the current subscription and checkout.

use crate::queries::QueryKind;
use crate::state::App;
use crate::views::{table_state, titled, two_column};
use crate::widgets::DetailPanel;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Row, Table},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (plans_area, current_area) = two_column(area, 60);

    let current_tier = app
        .current_subscription()
        .map(|current| current.tier.to_ascii_lowercase());
    let plans = app.plans();
    let rows: Vec<Row> = plans
        .iter()
        .map(|plan| {
            let is_current = current_tier.as_deref() == Some(plan.name.to_ascii_lowercase().as_str());
            let style = if is_current {
                Style::default().fg(app.theme.success)
            } else {
                Style::default().fg(app.theme.text)
            };
            Row::new(vec![
                format!("{}{}", plan.name, if is_current { " (current)" } else { "" }),
                format!("{:.2} {}", plan.price, plan.currency.to_uppercase()),
                format!("{} leads", plan.leads_limit),
                plan.description.clone(),
            ])
            .style(style)
        })
        .collect();
    let widths = [
        Constraint::Length(22),
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Plan", "Price", "Limit", "Description"])
                .style(Style::default().fg(app.theme.secondary)),
        )
        .block(
            Block::default()
                .title(titled(app, "Plans", QueryKind::Plans))
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .bg(app.theme.bg_highlight)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = table_state(app.pricing_view.cursor, plans.len());
    f.render_stateful_widget(table, plans_area, &mut state);

    let mut fields = Vec::new();
    if let Some(current) = app.current_subscription() {
        fields.push(("Plan", current.plan.name.clone()));
        fields.push(("Tier", current.tier.clone()));
        fields.push((
            "Status",
            current.status.clone().unwrap_or_else(|| {
                if current.is_active { "active" } else { "inactive" }.to_string()
            }),
        ));
        if let Some(expires) = current.expires_at {
            fields.push(("Renews", expires.format("%Y-%m-%d").to_string()));
        }
        fields.push(("Lead limit", current.plan.leads_limit.to_string()));
    }
    if let Some(usage) = app.usage() {
        fields.push(("Used", usage.current_usage.to_string()));
        fields.push(("Remaining", usage.remaining().to_string()));
    }
    let title = titled(app, "Subscription", QueryKind::CurrentSubscription);
    DetailPanel {
        title: &title,
        fields,
        label_style: Style::default().fg(app.theme.secondary),
        placeholder: "No subscription information yet.",
    }
    .render(f, current_area);
}
