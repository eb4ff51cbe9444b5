//! Keybinding definitions for the TUI.
//!
//! Letter keys are mapped to intents here; which intents a view honors is
//! decided by the view state, so the same key may mean "send campaign" on
//! the campaigns page and "cycle status" on the leads page.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextView,
    PrevView,
    SwitchView(usize),
    MoveUp,
    MoveDown,
    Select,
    SelectAll,
    OpenSearch,
    CycleFilter,
    ToggleUnassigned,
    NewItem,
    EditItem,
    DeleteItem,
    Send,
    ToggleStatus,
    CycleEnrichment,
    Enrich,
    Assign,
    ImportCsv,
    ExportCsv,
    GenerateMessage,
    Checkout,
    Refresh,
    Confirm,
    Cancel,
}

pub fn map_key(event: KeyEvent) -> Option<Action> {
    let KeyEvent { code, modifiers, .. } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        };
    }

    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Tab => Some(Action::NextView),
        KeyCode::BackTab => Some(Action::PrevView),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Char(' ') => Some(Action::Select),
        KeyCode::Char('A') => Some(Action::SelectAll),
        KeyCode::Char('/') => Some(Action::OpenSearch),
        KeyCode::Char('f') => Some(Action::CycleFilter),
        KeyCode::Char('F') => Some(Action::CycleEnrichment),
        KeyCode::Char('u') => Some(Action::ToggleUnassigned),
        KeyCode::Char('n') => Some(Action::NewItem),
        KeyCode::Char('e') => Some(Action::EditItem),
        KeyCode::Char('d') => Some(Action::DeleteItem),
        KeyCode::Char('s') => Some(Action::Send),
        KeyCode::Char('t') => Some(Action::ToggleStatus),
        KeyCode::Char('m') => Some(Action::Enrich),
        KeyCode::Char('a') => Some(Action::Assign),
        KeyCode::Char('i') => Some(Action::ImportCsv),
        KeyCode::Char('x') => Some(Action::ExportCsv),
        KeyCode::Char('g') => Some(Action::GenerateMessage),
        KeyCode::Char('p') => Some(Action::Checkout),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Char(c @ '1'..='5') => Some(Action::SwitchView(c as usize - '1' as usize)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn digits_switch_views() {
        assert_eq!(map_key(key(KeyCode::Char('1'))), Some(Action::SwitchView(0)));
        assert_eq!(map_key(key(KeyCode::Char('5'))), Some(Action::SwitchView(4)));
        assert_eq!(map_key(key(KeyCode::Char('6'))), None);
    }

    #[test]
    fn control_keys() {
        let refresh = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(map_key(refresh), Some(Action::Refresh));
        let quit = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(quit), Some(Action::Quit));
        let other = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(map_key(other), None);
    }

    #[test]
    fn action_letters() {
        assert_eq!(map_key(key(KeyCode::Char('m'))), Some(Action::Enrich));
        assert_eq!(map_key(key(KeyCode::Char('x'))), Some(Action::ExportCsv));
        assert_eq!(map_key(key(KeyCode::Char('p'))), Some(Action::Checkout));
        assert_eq!(map_key(key(KeyCode::Esc)), Some(Action::Cancel));
        assert_eq!(map_key(key(KeyCode::Char('t'))), Some(Action::ToggleStatus));
        assert_eq!(map_key(key(KeyCode::Char('F'))), Some(Action::CycleEnrichment));
        assert_eq!(map_key(key(KeyCode::Char('A'))), Some(Action::SelectAll));
        assert_eq!(map_key(key(KeyCode::Char('a'))), Some(Action::Assign));
    }
}
