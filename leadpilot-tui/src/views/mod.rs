//! View rendering dispatch.

pub mod activity;
pub mod campaigns;
pub mod dashboard;
pub mod helpers;
pub mod leads;
pub mod pricing;

pub use helpers::{centered_rect, table_state, titled, two_column};

use crate::nav::View;
use crate::notifications::NotificationLevel;
use crate::state::{App, Form};
use crate::theme::notification_color;
use crate::widgets::UsageMeter;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);
    match app.active_view {
        View::Dashboard => dashboard::render(f, app, layout[1]),
        View::Leads => leads::render(f, app, layout[1]),
        View::Campaigns => campaigns::render(f, app, layout[1]),
        View::Activity => activity::render(f, app, layout[1]),
        View::Pricing => pricing::render(f, app, layout[1]),
    }
    render_footer(f, app, layout[2]);

    if let Some(form) = &app.form {
        render_form(f, app, form);
    } else if let Some(confirm) = &app.confirm {
        render_dialog(f, app, "Confirm", &confirm.message, "Enter confirm • Esc cancel");
    } else if let Some(modal) = &app.modal {
        render_dialog(f, app, &modal.title, &modal.message, "Enter/Esc close");
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(48)])
        .split(area);

    let titles: Vec<Line> = View::all()
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("{} {}", i + 1, view.title())))
        .collect();
    let pending = if app.pending_mutations > 0 {
        format!(" | {} pending", app.pending_mutations)
    } else {
        String::new()
    };
    let tabs = Tabs::new(titles)
        .select(app.active_view.index())
        .block(Block::default().borders(Borders::ALL).title(Span::styled(
            format!("LeadPilot{pending}"),
            Style::default().fg(app.theme.primary),
        )))
        .style(Style::default().fg(app.theme.text_dim))
        .highlight_style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, chunks[0]);

    let usage = app.usage();
    UsageMeter {
        usage: usage.as_ref(),
        theme: &app.theme,
    }
    .render(f, chunks[1]);
}

fn footer_help(view: View) -> &'static str {
    match view {
        View::Dashboard => "Tab/1-5 views • g AI message • Ctrl-R refresh • q quit",
        View::Leads => {
            "j/k move • space select • A all • / search • f status • F enrichment • u unassigned • s status • m enrich • a assign • i import • x export • n scrape • d delete"
        }
        View::Campaigns => {
            "j/k move • / search • f status • n new • e edit • t pause/resume • s send • d delete"
        }
        View::Activity => "j/k move • f filter • / date range • x export • Ctrl-R refresh",
        View::Pricing => "j/k move • p checkout • Ctrl-R refresh",
    }
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (text, style) = match app.toasts.latest() {
        Some(note) => (
            format!("{}: {}", note.level.label(), note.message),
            Style::default().fg(notification_color(note.level, &app.theme)),
        ),
        None => (
            footer_help(app.active_view).to_string(),
            Style::default().fg(app.theme.text_dim),
        ),
    };
    let border = match app.toasts.latest().map(|n| n.level) {
        Some(NotificationLevel::Error) => app.theme.error,
        _ => app.theme.border,
    };
    let footer = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        )
        .style(style);
    f.render_widget(footer, area);
}

fn render_dialog(f: &mut Frame<'_>, app: &App, title: &str, message: &str, hint: &str) {
    let area = centered_rect(60, 40, f.size());
    let mut lines: Vec<Line> = message.lines().map(|l| Line::from(l.to_string())).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        hint.to_string(),
        Style::default().fg(app.theme.text_dim),
    )));
    let dialog = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border_focus)),
        );
    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn render_form(f: &mut Frame<'_>, app: &App, form: &Form) {
    let height = (form.fields.len() as u16 * 3 + 4).min(f.size().height);
    let outer = centered_rect(70, 100, f.size());
    let area = Rect {
        y: outer.y + outer.height.saturating_sub(height) / 2,
        height,
        ..outer
    };
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(form.title.clone())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_focus));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut constraints: Vec<Constraint> = form.fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Min(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let border = if focused {
            app.theme.border_focus
        } else {
            app.theme.border
        };
        let value = if focused {
            format!("{}_", field.value)
        } else {
            field.value.clone()
        };
        let input = Paragraph::new(value).block(
            Block::default()
                .title(field.label)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
        f.render_widget(input, rows[i]);
    }
    let hint = Paragraph::new("Tab next field • Enter submit on last field • Esc cancel")
        .style(Style::default().fg(app.theme.text_dim));
    f.render_widget(hint, rows[form.fields.len()]);
}
