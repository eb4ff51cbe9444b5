use leadpilot_core::{CampaignDraft, CampaignStatus, LeadFilter, LeadStatus};
use leadpilot_test_utils::generators::{arb_campaign_status, arb_lead, arb_lead_status};
use leadpilot_test_utils::fixtures;
use leadpilot_tui::config::TuiConfig;
use leadpilot_tui::keys::{map_key, Action};
use leadpilot_tui::mutations::Mutation;
use leadpilot_tui::nav::View;
use leadpilot_tui::notifications::{Notification, NotificationLevel, Toasts, MAX_TOASTS};
use leadpilot_tui::queries::{all_prefixes, campaigns_prefix, leads_prefix, QueryKind};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use proptest::prelude::*;

fn base_config() -> TuiConfig {
    TuiConfig::parse(
        r#"
api_base_url = "http://localhost:8000"
request_timeout_ms = 10000
refresh_interval_ms = 1000
usage_poll_interval_ms = 30000
token_path = "tmp/leadpilot/token.json"
state_path = "tmp/leadpilot/state.json"
export_dir = "tmp/leadpilot/exports"
log_path = "tmp/leadpilot/leadpilot.log"
log_format = "text"

[theme]
name = "light"
"#,
    )
    .expect("base config should parse")
}

#[test]
fn base_config_is_valid() {
    assert!(base_config().validate().is_ok());
}

#[test]
fn config_rejects_empty_paths() {
    let mut config = base_config();
    config.export_dir = "".into();
    assert!(config.validate().is_err());
}

#[test]
fn every_query_is_covered_by_a_refresh_prefix() {
    let prefixes = all_prefixes();
    for kind in [
        QueryKind::Leads { unassigned: true },
        QueryKind::Leads { unassigned: false },
        QueryKind::Campaigns,
        QueryKind::CampaignLogs(12),
        QueryKind::CampaignPerformance,
        QueryKind::CampaignStats,
        QueryKind::Activity,
        QueryKind::Usage,
        QueryKind::Plans,
        QueryKind::CurrentSubscription,
    ] {
        let key = kind.key();
        assert!(
            prefixes.iter().any(|p| key.starts_with(p)),
            "{key} is not refreshed by any prefix"
        );
    }
}

proptest! {
    #[test]
    fn keybinding_digit_switches_view(digit in 0u8..=9u8) {
        let ch = char::from(b'0' + digit);
        let event = KeyEvent {
            code: KeyCode::Char(ch),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        };
        let action = map_key(event);
        match ch {
            '1'..='5' => {
                let index = digit as usize - 1;
                prop_assert_eq!(action, Some(Action::SwitchView(index)));
                prop_assert!(View::from_index(index).is_some());
            }
            _ => prop_assert!(action.is_none()),
        }
    }

    #[test]
    fn navigation_keys_consistent(use_vim in prop::bool::ANY, down in prop::bool::ANY) {
        let code = match (use_vim, down) {
            (true, true) => KeyCode::Char('j'),
            (true, false) => KeyCode::Char('k'),
            (false, true) => KeyCode::Down,
            (false, false) => KeyCode::Up,
        };
        let expected = if down { Action::MoveDown } else { Action::MoveUp };
        prop_assert_eq!(map_key(KeyEvent::new(code, KeyModifiers::NONE)), Some(expected));
    }

    #[test]
    fn all_action_keys_mapped(key_char in "[qfFundestmaixgpA/ ]") {
        let ch = key_char.chars().next().unwrap_or('q');
        let event = KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE);
        prop_assert!(map_key(event).is_some(), "Key '{}' should map to an action", ch);
    }

    #[test]
    fn view_cycle_wraps(index in 0usize..5, steps in 0usize..20) {
        let start = View::from_index(index).unwrap_or_default();
        let mut view = start;
        for _ in 0..steps {
            view = view.next();
        }
        prop_assert_eq!(view.index(), (index + steps) % View::all().len());
        for _ in 0..steps {
            view = view.previous();
        }
        prop_assert_eq!(view, start);
    }

    #[test]
    fn toasts_never_exceed_capacity(count in 0usize..20) {
        let mut toasts = Toasts::default();
        for i in 0..count {
            toasts.push(Notification::new(NotificationLevel::Info, format!("toast {i}")));
        }
        prop_assert_eq!(toasts.len(), count.min(MAX_TOASTS));
        if count > 0 {
            let latest = toasts.latest().map(|n| n.message.clone());
            prop_assert_eq!(latest, Some(format!("toast {}", count - 1)));
        }
    }

    #[test]
    fn poll_interval_below_refresh_is_rejected(refresh in 1u64..10_000, delta in 1u64..10_000) {
        let mut config = base_config();
        config.refresh_interval_ms = refresh;
        config.usage_poll_interval_ms = refresh + delta;
        prop_assert!(config.validate().is_ok());
        config.usage_poll_interval_ms = refresh - 1;
        prop_assert!(config.validate().is_err());
    }

    #[test]
    fn lead_filter_returns_subset(
        leads in prop::collection::vec(arb_lead(), 0..20),
        status in proptest::option::of(arb_lead_status()),
        search in "[a-z]{0,3}",
    ) {
        let filter = LeadFilter { search, status, ..LeadFilter::default() };
        let filtered = filter.apply(&leads);
        prop_assert!(filtered.len() <= leads.len());
        for lead in filtered {
            prop_assert!(filter.matches(lead));
        }
        prop_assert_eq!(LeadFilter::default().apply(&leads).len(), leads.len());
    }

    #[test]
    fn lead_queries_fall_under_leads_prefix(unassigned in prop::bool::ANY) {
        let key = QueryKind::Leads { unassigned }.key();
        prop_assert!(key.starts_with(&leads_prefix()));
        prop_assert!(!key.starts_with(&campaigns_prefix()));
    }

    #[test]
    fn campaign_writes_refresh_every_campaign_read(id in 1i64..10_000, status in arb_campaign_status()) {
        let mutations = [
            Mutation::SetCampaignStatus { id, status },
            Mutation::DeleteCampaign(id),
            Mutation::UpdateCampaign {
                id,
                draft: CampaignDraft {
                    name: "Launch".to_string(),
                    subject: "Hello".to_string(),
                    body: "Hi".to_string(),
                },
            },
        ];
        for mutation in &mutations {
            let prefixes = mutation.invalidates();
            for key in [QueryKind::Campaigns.key(), QueryKind::CampaignLogs(id).key()] {
                prop_assert!(prefixes.iter().any(|p| key.starts_with(p)));
            }
            prop_assert!(!prefixes.iter().any(|p| QueryKind::Usage.key().starts_with(p)));
        }
    }

    #[test]
    fn lead_writes_refresh_usage(id in 1i64..10_000, status in arb_lead_status()) {
        let prefixes = Mutation::UpdateLeadStatus { lead_id: id, status }.invalidates();
        prop_assert!(prefixes.iter().any(|p| QueryKind::Usage.key().starts_with(p)));
        for unassigned in [true, false] {
            let key = QueryKind::Leads { unassigned }.key();
            prop_assert!(prefixes.iter().any(|p| key.starts_with(p)));
        }
    }
}

#[test]
fn send_refreshes_only_its_own_logs() {
    let prefixes = Mutation::SendCampaign {
        id: 3,
        lead_ids: vec![fixtures::lead(1, "Ada", LeadStatus::Pending).id],
    }
    .invalidates();
    assert!(prefixes
        .iter()
        .any(|p| QueryKind::CampaignLogs(3).key().starts_with(p)));
    assert!(!prefixes
        .iter()
        .any(|p| QueryKind::CampaignLogs(4).key().starts_with(p)));
    assert!(!prefixes
        .iter()
        .any(|p| QueryKind::Campaigns.key().starts_with(p)));
    assert_ne!(CampaignStatus::Draft.toggled(), CampaignStatus::Draft);
}
