//! Application state and view state definitions.
//!
//! `App` owns the query cache handle and the subscriptions of the active
//! view. Views never fetch on their own: they read whatever the cache holds
//! for the keys `App` keeps subscribed, and redraw when a
//! [`TuiEvent::QueryUpdated`] arrives.

use crate::api_client::ApiClient;
use crate::config::TuiConfig;
use crate::events::TuiEvent;
use crate::keys::{map_key, Action};
use crate::mutations::{run_mutation, Mutation, MutationOutcome};
use crate::nav::View;
use crate::notifications::{Notification, NotificationLevel, Toasts};
use crate::persistence::PersistedState;
use crate::queries::{all_prefixes, ApiData, AppCache, QueryKind};
use crate::theme::Theme;
use chrono::{DateTime, NaiveDate, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use leadpilot_core::{
    activity_csv, ActivityFilter, ActivityItem, ActivitySummary, AssignToCampaign, CampaignFilter, CampaignId, CampaignStats,
    ClientError, CurrentSubscription, EmailCampaign, EmailLog, GenerateMessageRequest, Lead,
    LeadFilter, LeadId, PerformancePoint, Plan, PlanTier, ScrapeLeadsRequest, Usage,
    ValidationError,
};
use leadpilot_query::{listener, CacheEntry, CacheKey, MutationRunner, Subscription};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Number of items shown in the dashboard's recent lists.
pub const RECENT_LIMIT: usize = 5;

const DEFAULT_TONE: &str = "professional";

pub struct App {
    pub config: TuiConfig,
    pub theme: Theme,
    pub api: ApiClient,
    pub cache: AppCache,
    events: mpsc::Sender<TuiEvent>,
    subscriptions: HashMap<QueryKind, Subscription<ApiData, ClientError>>,
    pub active_view: View,

    pub leads_view: LeadsViewState,
    pub campaigns_view: CampaignsViewState,
    pub activity_view: ActivityViewState,
    pub pricing_view: PricingViewState,

    pub toasts: Toasts,
    pub modal: Option<Modal>,
    pub confirm: Option<Confirm>,
    pub form: Option<Form>,
    pub pending_mutations: usize,
}

impl App {
    /// Must be called inside a tokio runtime: subscribing may start loads.
    pub fn new(
        config: TuiConfig,
        api: ApiClient,
        cache: AppCache,
        events: mpsc::Sender<TuiEvent>,
    ) -> Self {
        let theme = Theme::by_name(&config.theme.name).unwrap_or_else(Theme::dark);
        let mut app = Self {
            config,
            theme,
            api,
            cache,
            events,
            subscriptions: HashMap::new(),
            active_view: View::default(),
            leads_view: LeadsViewState::default(),
            campaigns_view: CampaignsViewState::default(),
            activity_view: ActivityViewState::default(),
            pricing_view: PricingViewState::default(),
            toasts: Toasts::default(),
            modal: None,
            confirm: None,
            form: None,
            pending_mutations: 0,
        };
        app.sync_subscriptions();
        app
    }

    pub fn restore(&mut self, state: &PersistedState) {
        self.active_view = state.active_view;
        self.leads_view.show_unassigned = state.show_unassigned;
        self.leads_view.filter.enrichment = state.enrichment;
        self.sync_subscriptions();
    }

    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            active_view: self.active_view,
            show_unassigned: self.leads_view.show_unassigned,
            enrichment: self.leads_view.filter.enrichment,
        }
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.toasts.push(Notification::new(level, message));
    }

    fn notify_error(&mut self, context: &str, err: &ClientError) {
        let message = if err.is_unauthorized() {
            format!("{context}: {err}. Start with --token <access token> to sign in.")
        } else {
            format!("{context}: {err}")
        };
        self.notify(NotificationLevel::Error, message);
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Keys the active view reads. Usage is always included for the header meter.
    pub fn desired_queries(&self) -> Vec<QueryKind> {
        let mut kinds = vec![QueryKind::Usage];
        match self.active_view {
            View::Dashboard => kinds.extend([
                QueryKind::CampaignStats,
                QueryKind::Activity,
                QueryKind::Campaigns,
            ]),
            View::Leads => kinds.extend([
                QueryKind::Leads {
                    unassigned: self.leads_view.show_unassigned,
                },
                QueryKind::Campaigns,
            ]),
            View::Campaigns => {
                kinds.extend([
                    QueryKind::Campaigns,
                    QueryKind::CampaignPerformance,
                    QueryKind::Leads { unassigned: false },
                ]);
                if let Some(campaign) = self.cursor_campaign() {
                    kinds.push(QueryKind::CampaignLogs(campaign.id));
                }
            }
            View::Activity => kinds.push(QueryKind::Activity),
            View::Pricing => kinds.extend([QueryKind::Plans, QueryKind::CurrentSubscription]),
        }
        kinds
    }

    /// Drop subscriptions the active view no longer needs and add missing ones.
    pub fn sync_subscriptions(&mut self) {
        let desired = self.desired_queries();
        self.subscriptions.retain(|kind, _| desired.contains(kind));
        for kind in desired {
            if !self.subscriptions.contains_key(&kind) {
                let subscription = self.subscribe(kind);
                self.subscriptions.insert(kind, subscription);
            }
        }
    }

    pub fn is_subscribed(&self, kind: QueryKind) -> bool {
        self.subscriptions.contains_key(&kind)
    }

    fn subscribe(&self, kind: QueryKind) -> Subscription<ApiData, ClientError> {
        debug!(key = %kind.key(), "Subscribing");
        let events = self.events.clone();
        let on_change = listener(move |entry: CacheEntry<ApiData, ClientError>| {
            forward_update(&events, entry);
        });
        self.cache
            .subscribe(kind.key(), kind.loader(&self.api), on_change)
    }

    pub fn handle_query_update(&mut self, key: &CacheKey, error: Option<ClientError>) {
        if let Some(err) = error {
            self.notify_error(&format!("Failed to load {key}"), &err);
        }
        self.clamp_cursors();
        // The campaign logs key follows the cursor, which depends on the list.
        self.sync_subscriptions();
    }

    /// Mark the usage key stale; it reloads because the header keeps it subscribed.
    pub fn poll_usage(&self) {
        self.cache.invalidate(&[QueryKind::Usage.key()]);
    }

    pub fn refresh(&mut self) {
        let report = self.cache.invalidate(&all_prefixes());
        debug!(
            refetched = report.refetched.len(),
            dropped = report.dropped.len(),
            "Manual refresh"
        );
        self.notify(NotificationLevel::Info, "Refreshing...");
    }

    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.toasts.prune(now);
    }

    // ========================================================================
    // Cached data
    // ========================================================================

    pub fn query(&self, kind: QueryKind) -> Option<ApiData> {
        self.cache.data(&kind.key())
    }

    pub fn entry(&self, kind: QueryKind) -> Option<CacheEntry<ApiData, ClientError>> {
        self.cache.peek(&kind.key())
    }

    /// Loading with nothing to show yet.
    pub fn is_loading(&self, kind: QueryKind) -> bool {
        self.entry(kind)
            .map_or(false, |entry| entry.is_loading() && entry.data.is_none())
    }

    pub fn leads(&self) -> Vec<Lead> {
        let kind = QueryKind::Leads {
            unassigned: self.leads_view.show_unassigned,
        };
        self.query(kind)
            .and_then(|d| d.leads().map(<[Lead]>::to_vec))
            .unwrap_or_default()
    }

    /// Every lead, regardless of the unassigned toggle.
    pub fn all_leads(&self) -> Vec<Lead> {
        self.query(QueryKind::Leads { unassigned: false })
            .and_then(|d| d.leads().map(<[Lead]>::to_vec))
            .unwrap_or_default()
    }

    pub fn campaigns(&self) -> Vec<EmailCampaign> {
        self.query(QueryKind::Campaigns)
            .and_then(|d| d.campaigns().map(<[EmailCampaign]>::to_vec))
            .unwrap_or_default()
    }

    pub fn campaign_logs(&self, id: CampaignId) -> Vec<EmailLog> {
        self.query(QueryKind::CampaignLogs(id))
            .and_then(|d| d.campaign_logs().map(<[EmailLog]>::to_vec))
            .unwrap_or_default()
    }

    pub fn performance(&self) -> Vec<PerformancePoint> {
        self.query(QueryKind::CampaignPerformance)
            .and_then(|d| d.performance().map(<[PerformancePoint]>::to_vec))
            .unwrap_or_default()
    }

    pub fn stats(&self) -> Option<CampaignStats> {
        self.query(QueryKind::CampaignStats)
            .and_then(|d| d.stats().copied())
    }

    pub fn activity(&self) -> Vec<ActivityItem> {
        self.query(QueryKind::Activity)
            .and_then(|d| d.activity().map(<[ActivityItem]>::to_vec))
            .unwrap_or_default()
    }

    pub fn usage(&self) -> Option<Usage> {
        self.query(QueryKind::Usage).and_then(|d| d.usage().cloned())
    }

    pub fn plans(&self) -> Vec<Plan> {
        self.query(QueryKind::Plans)
            .and_then(|d| d.plans().map(<[Plan]>::to_vec))
            .unwrap_or_default()
    }

    pub fn current_subscription(&self) -> Option<CurrentSubscription> {
        self.query(QueryKind::CurrentSubscription)
            .and_then(|d| d.current_subscription().cloned())
    }

    pub fn visible_leads(&self) -> Vec<Lead> {
        self.leads()
            .into_iter()
            .filter(|lead| self.leads_view.filter.matches(lead))
            .collect()
    }

    pub fn visible_campaigns(&self) -> Vec<EmailCampaign> {
        self.campaigns()
            .into_iter()
            .filter(|campaign| self.campaigns_view.filter.matches(campaign))
            .collect()
    }

    pub fn visible_activity(&self) -> Vec<ActivityItem> {
        self.activity()
            .into_iter()
            .filter(|item| self.activity_view.filter.matches(item))
            .collect()
    }

    pub fn activity_summary(&self) -> ActivitySummary {
        ActivitySummary::from_items(&self.visible_activity())
    }

    pub fn cursor_lead(&self) -> Option<Lead> {
        self.visible_leads().into_iter().nth(self.leads_view.cursor)
    }

    pub fn cursor_campaign(&self) -> Option<EmailCampaign> {
        self.visible_campaigns()
            .into_iter()
            .nth(self.campaigns_view.cursor)
    }

    pub fn cursor_plan(&self) -> Option<Plan> {
        self.plans().into_iter().nth(self.pricing_view.cursor)
    }

    fn clamp_cursors(&mut self) {
        self.leads_view.cursor = clamp(self.leads_view.cursor, self.visible_leads().len());
        self.campaigns_view.cursor =
            clamp(self.campaigns_view.cursor, self.visible_campaigns().len());
        self.activity_view.cursor =
            clamp(self.activity_view.cursor, self.visible_activity().len());
        self.pricing_view.cursor = clamp(self.pricing_view.cursor, self.plans().len());
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Run `mutation` on its own task with its own runner.
    pub fn spawn_mutation(&mut self, mutation: Mutation) {
        let label = mutation.label();
        let runner = MutationRunner::new(self.cache.clone());
        let api = self.api.clone();
        let events = self.events.clone();
        self.pending_mutations += 1;
        debug!(label, "Spawning mutation");
        tokio::spawn(async move {
            let result = run_mutation(&runner, &api, &mutation).await;
            let _ = events
                .send(TuiEvent::MutationFinished { label, result })
                .await;
        });
    }

    pub fn handle_mutation_finished(
        &mut self,
        label: &'static str,
        result: Result<MutationOutcome, ClientError>,
    ) {
        self.pending_mutations = self.pending_mutations.saturating_sub(1);
        match result {
            Ok(MutationOutcome::Checkout(url)) => {
                self.modal = Some(Modal {
                    title: "Checkout".to_string(),
                    message: format!("Open this link to complete payment:\n\n{url}"),
                });
            }
            Ok(MutationOutcome::Generated(message)) => {
                self.modal = Some(Modal {
                    title: "Generated message".to_string(),
                    message,
                });
            }
            Ok(outcome) => {
                if let Some(notification) = outcome.notification(label) {
                    self.toasts.push(notification);
                }
            }
            Err(err) => self.notify_error(&format!("{label} failed"), &err),
        }
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Route a key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.form.is_some() {
            self.handle_form_key(key);
            return false;
        }
        match map_key(key) {
            Some(action) => self.handle_action(action),
            None => false,
        }
    }

    pub fn handle_action(&mut self, action: Action) -> bool {
        if action == Action::Quit {
            return true;
        }
        if self.confirm.is_some() || self.modal.is_some() {
            match action {
                Action::Confirm => {
                    if let Some(confirm) = self.confirm.take() {
                        self.spawn_mutation(confirm.mutation);
                    } else {
                        self.modal = None;
                    }
                }
                Action::Cancel => {
                    self.confirm = None;
                    self.modal = None;
                }
                _ => {}
            }
            return false;
        }

        match action {
            Action::NextView => self.set_view(self.active_view.next()),
            Action::PrevView => self.set_view(self.active_view.previous()),
            Action::SwitchView(index) => {
                if let Some(view) = View::from_index(index) {
                    self.set_view(view);
                }
            }
            Action::Refresh => self.refresh(),
            Action::GenerateMessage => self.open_generate_form(),
            _ => match self.active_view {
                View::Dashboard => {}
                View::Leads => self.handle_leads_action(action),
                View::Campaigns => self.handle_campaigns_action(action),
                View::Activity => self.handle_activity_action(action),
                View::Pricing => self.handle_pricing_action(action),
            },
        }
        false
    }

    pub fn set_view(&mut self, view: View) {
        self.active_view = view;
        self.sync_subscriptions();
    }

    fn handle_leads_action(&mut self, action: Action) {
        let len = self.visible_leads().len();
        match action {
            Action::MoveDown => self.leads_view.cursor = step_down(self.leads_view.cursor, len),
            Action::MoveUp => self.leads_view.cursor = self.leads_view.cursor.saturating_sub(1),
            Action::Select => {
                if let Some(lead) = self.cursor_lead() {
                    if !self.leads_view.selected.remove(&lead.id) {
                        self.leads_view.selected.insert(lead.id);
                    }
                }
            }
            Action::SelectAll => {
                let visible: BTreeSet<LeadId> =
                    self.visible_leads().iter().map(|lead| lead.id).collect();
                let all_selected =
                    !visible.is_empty() && visible.is_subset(&self.leads_view.selected);
                self.leads_view.selected = if all_selected {
                    BTreeSet::new()
                } else {
                    visible
                };
            }
            Action::OpenSearch => {
                let current = self.leads_view.filter.search.clone();
                self.form = Some(Form::search(current));
            }
            Action::CycleFilter => {
                self.leads_view.filter.cycle_status();
                self.leads_view.cursor = 0;
            }
            Action::CycleEnrichment => {
                self.leads_view.filter.enrichment = self.leads_view.filter.enrichment.next();
                self.leads_view.cursor = 0;
            }
            Action::ToggleUnassigned => {
                self.leads_view.show_unassigned = !self.leads_view.show_unassigned;
                self.leads_view.cursor = 0;
                self.leads_view.selected.clear();
                self.sync_subscriptions();
            }
            Action::Send | Action::ToggleStatus => {
                if let Some(lead) = self.cursor_lead() {
                    self.spawn_mutation(Mutation::UpdateLeadStatus {
                        lead_id: lead.id,
                        status: lead.status.next(),
                    });
                }
            }
            Action::DeleteItem => {
                if let Some(lead) = self.cursor_lead() {
                    self.confirm = Some(Confirm {
                        message: format!("Delete lead {}?", lead.full_name()),
                        mutation: Mutation::DeleteLead(lead.id),
                    });
                }
            }
            Action::Enrich => {
                if let Some(lead) = self.cursor_lead() {
                    self.spawn_mutation(Mutation::EnrichEmail(lead.id));
                }
            }
            Action::Assign => {
                let campaign = self.default_campaign_id();
                self.form = Some(Form::new(
                    FormKind::AssignToCampaign,
                    format!("Assign {} lead(s)", self.leads_view.selected.len()),
                    vec![FormField::new("Campaign ID", campaign)],
                ));
            }
            Action::ImportCsv => {
                let campaign = self.default_campaign_id();
                self.form = Some(Form::new(
                    FormKind::ImportCsv,
                    "Upload CSV",
                    vec![
                        FormField::new("CSV file path", ""),
                        FormField::new("Campaign ID", campaign),
                    ],
                ));
            }
            Action::ExportCsv => {
                let mutation = Mutation::ExportLeads {
                    unassigned: self.leads_view.show_unassigned,
                    dir: self.config.export_dir.clone(),
                };
                self.spawn_mutation(mutation);
            }
            Action::NewItem => {
                self.form = Some(Form::new(
                    FormKind::Scrape,
                    "Scrape LinkedIn leads",
                    vec![
                        FormField::new("Keywords", ""),
                        FormField::new("Industry", ""),
                        FormField::new("Location", ""),
                        FormField::new("Current company", ""),
                        FormField::new("Job title", ""),
                    ],
                ));
            }
            _ => {}
        }
    }

    fn handle_campaigns_action(&mut self, action: Action) {
        let len = self.visible_campaigns().len();
        match action {
            Action::MoveDown => {
                self.campaigns_view.cursor = step_down(self.campaigns_view.cursor, len);
                self.sync_subscriptions();
            }
            Action::MoveUp => {
                self.campaigns_view.cursor = self.campaigns_view.cursor.saturating_sub(1);
                self.sync_subscriptions();
            }
            Action::OpenSearch => {
                let current = self.campaigns_view.filter.search.clone();
                self.form = Some(Form::search(current));
            }
            Action::CycleFilter => {
                self.campaigns_view.filter.cycle_status();
                self.campaigns_view.cursor = 0;
                self.sync_subscriptions();
            }
            Action::NewItem => {
                self.form = Some(Form::campaign(FormKind::NewCampaign, "New campaign", None));
            }
            Action::EditItem => {
                if let Some(campaign) = self.cursor_campaign() {
                    self.form = Some(Form::campaign(
                        FormKind::EditCampaign(campaign.id),
                        "Edit campaign",
                        Some(&campaign),
                    ));
                }
            }
            Action::ToggleStatus | Action::Select => {
                if let Some(campaign) = self.cursor_campaign() {
                    self.spawn_mutation(Mutation::SetCampaignStatus {
                        id: campaign.id,
                        status: campaign.status.toggled(),
                    });
                }
            }
            Action::DeleteItem => {
                if let Some(campaign) = self.cursor_campaign() {
                    self.confirm = Some(Confirm {
                        message: format!("Delete campaign \"{}\"?", campaign.name),
                        mutation: Mutation::DeleteCampaign(campaign.id),
                    });
                }
            }
            Action::Send => {
                if let Some(campaign) = self.cursor_campaign() {
                    let lead_ids: Vec<LeadId> =
                        self.all_leads().iter().map(|lead| lead.id).collect();
                    self.confirm = Some(Confirm {
                        message: format!(
                            "Send \"{}\" to {} lead(s)?",
                            campaign.name,
                            lead_ids.len()
                        ),
                        mutation: Mutation::SendCampaign {
                            id: campaign.id,
                            lead_ids,
                        },
                    });
                }
            }
            _ => {}
        }
    }

    fn handle_activity_action(&mut self, action: Action) {
        let len = self.visible_activity().len();
        match action {
            Action::MoveDown => {
                self.activity_view.cursor = step_down(self.activity_view.cursor, len)
            }
            Action::MoveUp => {
                self.activity_view.cursor = self.activity_view.cursor.saturating_sub(1)
            }
            Action::CycleFilter => {
                self.activity_view.filter.kind = self.activity_view.filter.kind.next();
                self.activity_view.cursor = 0;
            }
            Action::ExportCsv => {
                let csv = activity_csv(&self.visible_activity());
                self.spawn_mutation(Mutation::ExportActivity {
                    csv,
                    dir: self.config.export_dir.clone(),
                });
            }
            Action::OpenSearch => {
                let filter = &self.activity_view.filter;
                let fmt = |ts: Option<DateTime<Utc>>| {
                    ts.map(|t| t.format("%Y-%m-%d").to_string())
                        .unwrap_or_default()
                };
                self.form = Some(Form::new(
                    FormKind::DateRange,
                    "Date range (YYYY-MM-DD, blank for open)",
                    vec![
                        FormField::new("From", fmt(filter.from)),
                        FormField::new("To", fmt(filter.to)),
                    ],
                ));
            }
            _ => {}
        }
    }

    fn handle_pricing_action(&mut self, action: Action) {
        let len = self.plans().len();
        match action {
            Action::MoveDown => self.pricing_view.cursor = step_down(self.pricing_view.cursor, len),
            Action::MoveUp => self.pricing_view.cursor = self.pricing_view.cursor.saturating_sub(1),
            Action::Checkout | Action::Select => {
                if let Some(plan) = self.cursor_plan() {
                    let plan_tier = PlanTier::from_name(&plan.name)
                        .map(|tier| tier.as_str().to_string())
                        .unwrap_or_else(|| plan.name.trim().to_ascii_lowercase());
                    self.spawn_mutation(Mutation::CreatePayment { plan_tier });
                }
            }
            _ => {}
        }
    }

    fn default_campaign_id(&self) -> String {
        self.campaigns()
            .first()
            .map(|c| c.id.to_string())
            .unwrap_or_default()
    }

    fn open_generate_form(&mut self) {
        let lead_info = match (self.active_view, self.cursor_lead()) {
            (View::Leads, Some(lead)) => {
                format!("{}, {} at {}", lead.full_name(), lead.job_title, lead.company)
            }
            _ => String::new(),
        };
        self.form = Some(Form::new(
            FormKind::GenerateMessage,
            "Generate AI message",
            vec![
                FormField::new("Lead info", lead_info),
                FormField::new("Tone", DEFAULT_TONE),
            ],
        ));
    }

    // ========================================================================
    // Forms
    // ========================================================================

    fn handle_form_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return;
        }
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.form = None,
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.input(c),
            KeyCode::Enter => {
                if form.on_last_field() {
                    if let Some(form) = self.form.take() {
                        self.submit_form(form);
                    }
                } else {
                    form.next_field();
                }
            }
            _ => {}
        }
    }

    pub fn submit_form(&mut self, form: Form) {
        match self.build_form_mutation(&form) {
            Ok(Some(mutation)) => self.spawn_mutation(mutation),
            Ok(None) => {}
            Err(err) => self.notify_error(&form.title, &ClientError::from(err)),
        }
    }

    /// Apply local forms and turn the others into a mutation.
    fn build_form_mutation(&mut self, form: &Form) -> Result<Option<Mutation>, ValidationError> {
        let mutation = match form.kind {
            FormKind::Search => {
                let query = form.value(0).to_string();
                match self.active_view {
                    View::Leads => {
                        self.leads_view.filter.search = query;
                        self.leads_view.cursor = 0;
                    }
                    View::Campaigns => {
                        self.campaigns_view.filter.search = query;
                        self.campaigns_view.cursor = 0;
                        self.sync_subscriptions();
                    }
                    _ => {}
                }
                return Ok(None);
            }
            FormKind::DateRange => {
                self.activity_view.filter.from = parse_day(form.value(0), "From", false)?;
                self.activity_view.filter.to = parse_day(form.value(1), "To", true)?;
                self.activity_view.cursor = 0;
                return Ok(None);
            }
            FormKind::NewCampaign => Mutation::CreateCampaign(form.campaign_draft()),
            FormKind::EditCampaign(id) => Mutation::UpdateCampaign {
                id,
                draft: form.campaign_draft(),
            },
            FormKind::ImportCsv => Mutation::ImportCsv {
                path: PathBuf::from(form.value(0).trim()),
                campaign_id: parse_id(form.value(1), "Campaign ID")?,
            },
            FormKind::AssignToCampaign => Mutation::AssignToCampaign(AssignToCampaign {
                lead_ids: self.leads_view.selected.iter().copied().collect(),
                campaign_id: parse_id(form.value(0), "Campaign ID")?,
            }),
            FormKind::Scrape => Mutation::ScrapeLeads(ScrapeLeadsRequest {
                keywords: form.value(0).trim().to_string(),
                industry: form.value(1).trim().to_string(),
                location: form.value(2).trim().to_string(),
                current_company: form.value(3).trim().to_string(),
                job_title: form.value(4).trim().to_string(),
            }),
            FormKind::GenerateMessage => Mutation::GenerateMessage(GenerateMessageRequest {
                lead_info: form.value(0).trim().to_string(),
                tone: form.value(1).trim().to_string(),
            }),
        };
        Ok(Some(mutation))
    }
}

/// Hand a cache change to the event loop. Returns `false` when the event
/// was dropped because the channel is full or closed.
fn forward_update(
    events: &mpsc::Sender<TuiEvent>,
    entry: CacheEntry<ApiData, ClientError>,
) -> bool {
    let error = if entry.is_error() { entry.error } else { None };
    let key = entry.key;
    let failed = error.is_some();
    match events.try_send(TuiEvent::QueryUpdated {
        key: key.clone(),
        error,
    }) {
        Ok(()) => true,
        Err(err) => {
            warn!(key = %key, failed, error = %err, "Dropped query update");
            false
        }
    }
}

fn clamp(cursor: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        cursor.min(len - 1)
    }
}

fn step_down(cursor: usize, len: usize) -> usize {
    if cursor + 1 < len {
        cursor + 1
    } else {
        cursor
    }
}

fn parse_id(raw: &str, field: &str) -> Result<i64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::required(field));
    }
    raw.parse()
        .map_err(|_| ValidationError::invalid(field, "must be a number"))
}

/// Day bound for the activity filter. `end_of_day` makes the bound inclusive.
fn parse_day(
    raw: &str,
    field: &str,
    end_of_day: bool,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::invalid(field, "expected YYYY-MM-DD"))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    let time = time.ok_or_else(|| ValidationError::invalid(field, "out of range"))?;
    Ok(Some(time.and_utc()))
}

// ============================================================================
// View states
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct LeadsViewState {
    pub filter: LeadFilter,
    pub show_unassigned: bool,
    pub cursor: usize,
    pub selected: BTreeSet<LeadId>,
}

#[derive(Debug, Clone, Default)]
pub struct CampaignsViewState {
    pub filter: CampaignFilter,
    pub cursor: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityViewState {
    pub filter: ActivityFilter,
    pub cursor: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PricingViewState {
    pub cursor: usize,
}

#[derive(Debug, Clone)]
pub struct Modal {
    pub title: String,
    pub message: String,
}

/// A destructive action waiting for Enter.
#[derive(Debug, Clone)]
pub struct Confirm {
    pub message: String,
    pub mutation: Mutation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Search,
    DateRange,
    NewCampaign,
    EditCampaign(CampaignId),
    ImportCsv,
    AssignToCampaign,
    Scrape,
    GenerateMessage,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
}

impl FormField {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub title: String,
    pub fields: Vec<FormField>,
    pub focus: usize,
}

impl Form {
    pub fn new(kind: FormKind, title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            title: title.into(),
            fields,
            focus: 0,
        }
    }

    fn search(current: String) -> Self {
        Self::new(
            FormKind::Search,
            "Search",
            vec![FormField::new("Query", current)],
        )
    }

    fn campaign(kind: FormKind, title: &str, existing: Option<&EmailCampaign>) -> Self {
        let (name, subject, body) = existing
            .map(|c| (c.name.clone(), c.subject.clone(), c.body.clone()))
            .unwrap_or_default();
        Self::new(
            kind,
            title,
            vec![
                FormField::new("Name", name),
                FormField::new("Subject", subject),
                FormField::new("Body", body),
            ],
        )
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    fn campaign_draft(&self) -> leadpilot_core::CampaignDraft {
        leadpilot_core::CampaignDraft {
            name: self.value(0).trim().to_string(),
            subject: self.value(1).trim().to_string(),
            body: self.value(2).to_string(),
        }
    }

    pub fn input(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn on_last_field(&self) -> bool {
        self.focus + 1 >= self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadpilot_core::{CampaignStatus, EnrichmentFilter, LeadStatus};
    use leadpilot_query::{loader, CacheConfig, QueryCache};
    use leadpilot_test_utils::fixtures;
    use std::time::Duration;

    const CONFIG: &str = r#"
api_base_url = "http://127.0.0.1:9"
request_timeout_ms = 200
refresh_interval_ms = 250
usage_poll_interval_ms = 30000
token_path = "/tmp/leadpilot-test/token.json"
state_path = "/tmp/leadpilot-test/state.json"
export_dir = "/tmp/leadpilot-test/exports"
log_path = "/tmp/leadpilot-test/leadpilot.log"
log_format = "text"

[theme]
name = "dark"
"#;

    fn test_app() -> (App, mpsc::Receiver<TuiEvent>) {
        let config = TuiConfig::parse(CONFIG).expect("config");
        let api = ApiClient::new(&config.api_base_url, None, Duration::from_millis(200))
            .expect("client");
        let cache: AppCache = QueryCache::new(CacheConfig::new());
        let (tx, rx) = mpsc::channel(256);
        (App::new(config, api, cache, tx), rx)
    }

    async fn seed(cache: &AppCache, kind: QueryKind, data: ApiData) {
        cache
            .fetch(
                kind.key(),
                loader(move || {
                    let data = data.clone();
                    async move { Ok::<_, ClientError>(data) }
                }),
            )
            .await
            .expect("seed");
    }

    async fn next_mutation(
        rx: &mut mpsc::Receiver<TuiEvent>,
    ) -> (&'static str, Result<MutationOutcome, ClientError>) {
        loop {
            match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
                Ok(Some(TuiEvent::MutationFinished { label, result })) => return (label, result),
                Ok(Some(_)) => continue,
                other => panic!("no mutation result: {other:?}"),
            }
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[tokio::test]
    async fn switching_views_moves_subscriptions() {
        let (mut app, _rx) = test_app();
        assert!(app.is_subscribed(QueryKind::CampaignStats));
        assert!(app.is_subscribed(QueryKind::Usage));

        app.set_view(View::Pricing);
        assert!(app.is_subscribed(QueryKind::Plans));
        assert!(app.is_subscribed(QueryKind::CurrentSubscription));
        assert!(app.is_subscribed(QueryKind::Usage));
        assert!(!app.is_subscribed(QueryKind::CampaignStats));
        assert_eq!(app.cache.subscriber_count(&QueryKind::CampaignStats.key()), 0);
        assert_eq!(app.cache.subscriber_count(&QueryKind::Plans.key()), 1);
    }

    #[tokio::test]
    async fn unassigned_toggle_resubscribes_with_new_key() {
        let (mut app, _rx) = test_app();
        app.set_view(View::Leads);
        assert!(app.is_subscribed(QueryKind::Leads { unassigned: false }));

        app.handle_action(Action::ToggleUnassigned);
        assert!(app.leads_view.show_unassigned);
        assert!(app.is_subscribed(QueryKind::Leads { unassigned: true }));
        assert!(!app.is_subscribed(QueryKind::Leads { unassigned: false }));
    }

    #[tokio::test]
    async fn lead_selection_and_filters() {
        let (mut app, _rx) = test_app();
        let leads = vec![
            fixtures::lead(1, "Ada", LeadStatus::Pending),
            fixtures::enriched_lead(2, "Grace"),
            fixtures::lead(3, "Linus", LeadStatus::Replied),
        ];
        seed(
            &app.cache,
            QueryKind::Leads { unassigned: false },
            ApiData::Leads(leads),
        )
        .await;
        app.set_view(View::Leads);
        assert_eq!(app.visible_leads().len(), 3);

        app.handle_action(Action::MoveDown);
        app.handle_action(Action::Select);
        assert_eq!(
            app.leads_view.selected.iter().copied().collect::<Vec<_>>(),
            vec![2]
        );
        app.handle_action(Action::Select);
        assert!(app.leads_view.selected.is_empty());

        app.handle_action(Action::CycleEnrichment);
        assert_eq!(app.leads_view.filter.enrichment, EnrichmentFilter::Enriched);
        assert_eq!(app.visible_leads().len(), 1);
        assert_eq!(app.leads_view.cursor, 0);

        app.handle_action(Action::CycleEnrichment);
        app.handle_action(Action::CycleEnrichment);
        app.handle_action(Action::OpenSearch);
        type_text(&mut app, "lin");
        press(&mut app, KeyCode::Enter);
        assert!(app.form.is_none());
        assert_eq!(app.visible_leads().len(), 1);
        assert_eq!(app.cursor_lead().map(|l| l.id), Some(3));
    }

    #[tokio::test]
    async fn select_all_toggles_the_visible_leads() {
        let (mut app, _rx) = test_app();
        seed(
            &app.cache,
            QueryKind::Leads { unassigned: false },
            ApiData::Leads(vec![
                fixtures::lead(1, "Ada", LeadStatus::Pending),
                fixtures::enriched_lead(2, "Grace"),
                fixtures::lead(3, "Linus", LeadStatus::Replied),
            ]),
        )
        .await;
        app.set_view(View::Leads);

        app.handle_action(Action::SelectAll);
        assert_eq!(app.leads_view.selected.len(), 3);
        app.handle_action(Action::SelectAll);
        assert!(app.leads_view.selected.is_empty());

        app.handle_action(Action::Select);
        app.handle_action(Action::CycleEnrichment);
        app.handle_action(Action::SelectAll);
        assert_eq!(
            app.leads_view.selected.iter().copied().collect::<Vec<_>>(),
            vec![2]
        );
        app.handle_action(Action::SelectAll);
        assert!(app.leads_view.selected.is_empty());
    }

    #[tokio::test]
    async fn delete_asks_for_confirmation() {
        let (mut app, _rx) = test_app();
        seed(
            &app.cache,
            QueryKind::Leads { unassigned: false },
            ApiData::Leads(vec![fixtures::lead(9, "Ada", LeadStatus::Pending)]),
        )
        .await;
        app.set_view(View::Leads);

        app.handle_action(Action::DeleteItem);
        let confirm = app.confirm.as_ref().expect("confirm");
        assert_eq!(confirm.mutation, Mutation::DeleteLead(9));

        // Navigation is blocked while the prompt is open.
        app.handle_action(Action::NextView);
        assert_eq!(app.active_view, View::Leads);

        app.handle_action(Action::Cancel);
        assert!(app.confirm.is_none());
        assert_eq!(app.pending_mutations, 0);
    }

    #[tokio::test]
    async fn invalid_campaign_form_is_never_sent() {
        let (mut app, mut rx) = test_app();
        app.set_view(View::Campaigns);
        app.handle_action(Action::NewItem);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Hello");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Body text");
        press(&mut app, KeyCode::Enter);
        assert!(app.form.is_none());
        assert_eq!(app.pending_mutations, 1);

        let (label, result) = next_mutation(&mut rx).await;
        assert_eq!(label, "Create campaign");
        assert_eq!(
            result,
            Err(ClientError::Validation(ValidationError::required(
                "Campaign name"
            )))
        );
        app.handle_mutation_finished(label, result);
        assert_eq!(app.pending_mutations, 0);
        let toast = app.toasts.latest().expect("toast");
        assert_eq!(toast.level, NotificationLevel::Error);
        assert!(toast.message.contains("Campaign name is required"));
    }

    #[tokio::test]
    async fn non_numeric_campaign_id_is_rejected_locally() {
        let (mut app, _rx) = test_app();
        app.set_view(View::Leads);
        app.handle_action(Action::ImportCsv);
        type_text(&mut app, "/tmp/leads.csv");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "abc");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.pending_mutations, 0);
        assert_eq!(
            app.toasts.latest().map(|t| t.level),
            Some(NotificationLevel::Error)
        );
    }

    #[tokio::test]
    async fn date_range_form_sets_inclusive_bounds() {
        let (mut app, _rx) = test_app();
        app.set_view(View::Activity);
        app.handle_action(Action::OpenSearch);
        type_text(&mut app, "2025-06-01");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2025-06-02");
        press(&mut app, KeyCode::Enter);

        let from = app.activity_view.filter.from.expect("from");
        let to = app.activity_view.filter.to.expect("to");
        assert_eq!(from.to_rfc3339(), "2025-06-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2025-06-02T23:59:59+00:00");
    }

    #[tokio::test]
    async fn activity_summary_and_export_follow_the_filter() {
        let (mut app, mut rx) = test_app();
        let dir = tempfile::tempdir().expect("tempdir");
        app.config.export_dir = dir.path().join("exports");
        let mut bounced = fixtures::activity("a3", "Email bounced", 3);
        bounced.status = "failed".to_string();
        seed(
            &app.cache,
            QueryKind::Activity,
            ApiData::Activity(vec![
                fixtures::activity("a1", "Email sent", 1),
                fixtures::activity("a2", "Lead enriched", 2),
                bounced,
                fixtures::activity("a4", "Message sent", 4),
            ]),
        )
        .await;
        app.set_view(View::Activity);

        let summary = app.activity_summary();
        assert_eq!(summary.enrichments, 1);
        assert_eq!(summary.emails_sent, 1);
        assert_eq!(summary.delivery_rate(), 50);

        app.handle_action(Action::CycleFilter);
        assert_eq!(app.activity_summary(), ActivitySummary::default());
        app.handle_action(Action::ExportCsv);
        let (label, result) = next_mutation(&mut rx).await;
        assert_eq!(label, "Export activity");
        let path = match result {
            Ok(MutationOutcome::Exported(path)) => path,
            other => panic!("unexpected result: {other:?}"),
        };
        let csv = std::fs::read_to_string(path).expect("read export");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("Message sent,success,"));
    }

    #[test]
    fn full_event_channel_drops_updates_without_panicking() {
        let (tx, mut rx) = mpsc::channel(1);
        let entry = CacheEntry::idle(QueryKind::Usage.key());
        assert!(forward_update(&tx, entry.clone()));
        assert!(!forward_update(&tx, entry));
        assert!(matches!(
            rx.try_recv(),
            Ok(TuiEvent::QueryUpdated { error: None, .. })
        ));
        drop(rx);
        assert!(!forward_update(&tx, CacheEntry::idle(QueryKind::Plans.key())));
    }

    #[tokio::test]
    async fn campaign_logs_follow_the_cursor() {
        let (mut app, _rx) = test_app();
        seed(
            &app.cache,
            QueryKind::Campaigns,
            ApiData::Campaigns(vec![
                fixtures::campaign(1, "Launch", CampaignStatus::Active),
                fixtures::campaign(2, "Follow up", CampaignStatus::Draft),
            ]),
        )
        .await;
        app.set_view(View::Campaigns);
        assert!(app.is_subscribed(QueryKind::CampaignLogs(1)));

        app.handle_action(Action::MoveDown);
        assert!(app.is_subscribed(QueryKind::CampaignLogs(2)));
        assert!(!app.is_subscribed(QueryKind::CampaignLogs(1)));
    }

    #[tokio::test]
    async fn checkout_and_generated_messages_open_modals() {
        let (mut app, _rx) = test_app();
        app.pending_mutations = 1;
        app.handle_mutation_finished(
            "Checkout",
            Ok(MutationOutcome::Checkout("https://pay.example/s/1".into())),
        );
        let modal = app.modal.as_ref().expect("modal");
        assert!(modal.message.contains("https://pay.example/s/1"));

        app.handle_action(Action::Confirm);
        assert!(app.modal.is_none());

        app.handle_mutation_finished(
            "Generate message",
            Ok(MutationOutcome::Generated("Hi Ada".into())),
        );
        assert_eq!(app.modal.as_ref().map(|m| m.message.as_str()), Some("Hi Ada"));
    }

    #[tokio::test]
    async fn unauthorized_errors_explain_how_to_sign_in() {
        let (mut app, _rx) = test_app();
        app.handle_query_update(&QueryKind::Usage.key(), Some(ClientError::MissingToken));
        let toast = app.toasts.latest().expect("toast");
        assert!(toast.message.contains("--token"));
    }

    #[tokio::test]
    async fn persisted_state_round_trips_into_app() {
        let (mut app, _rx) = test_app();
        let state = PersistedState {
            active_view: View::Leads,
            show_unassigned: true,
            enrichment: EnrichmentFilter::Enriched,
        };
        app.restore(&state);
        assert_eq!(app.persisted_state(), state);
        assert!(app.is_subscribed(QueryKind::Leads { unassigned: true }));
    }
}
