//! Common view rendering helpers.

use crate::queries::QueryKind;
use crate::state::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::TableState,
};

/// Panel title with a loading marker while the first load is in flight,
/// or a refresh marker while stale data is being replaced.
pub fn titled(app: &App, title: &str, kind: QueryKind) -> String {
    match app.entry(kind) {
        Some(entry) if entry.is_refreshing() => format!("{title} (refreshing)"),
        Some(entry) if entry.is_loading() => format!("{title} (loading...)"),
        Some(entry) if entry.is_error() && entry.data.is_none() => {
            format!("{title} (failed, Ctrl-R to retry)")
        }
        _ => title.to_string(),
    }
}

/// Left list, right detail.
pub fn two_column(area: Rect, left_percent: u16) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(left_percent),
            Constraint::Percentage(100 - left_percent),
        ])
        .split(area);
    (chunks[0], chunks[1])
}

/// Rect of the given size centered in `area`, in percent.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

pub fn table_state(cursor: usize, len: usize) -> TableState {
    let mut state = TableState::default();
    if len > 0 {
        state.select(Some(cursor.min(len - 1)));
    }
    state
}

pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}
