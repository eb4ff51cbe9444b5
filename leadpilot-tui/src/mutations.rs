//! Write-side bindings: every user action that changes server state.
//!
//! Each [`Mutation`] knows how to validate itself, which request to send and
//! which cache keys go stale once the server accepts it. [`run_mutation`]
//! glues those together through a [`MutationRunner`].

use crate::api_client::ApiClient;
use crate::notifications::{Notification, NotificationLevel};
use crate::queries::{campaign_logs_key, campaigns_prefix, leads_prefix, ApiData, QueryKind};
use leadpilot_core::{
    AssignToCampaign, CampaignDraft, CampaignId, CampaignStatus, CampaignStatusUpdate,
    ClientError, ClientResult, CreatePayment, EnrichEmail, GenerateMessageRequest, LeadId,
    LeadStatus, LeadStatusUpdate, ScrapeLeadsRequest, SendCampaign, UploadLeads, UsageWarning,
    Validate, ValidationError,
};
use leadpilot_query::{CacheKey, MutationRunner};
use std::path::PathBuf;

/// File name written by the CSV export.
pub const EXPORT_FILE_NAME: &str = "leads.csv";

/// File name written by the activity analytics export.
pub const ACTIVITY_EXPORT_FILE_NAME: &str = "activity-analytics.csv";

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Read a CSV file from disk and upload it into a campaign.
    ImportCsv {
        path: PathBuf,
        campaign_id: CampaignId,
    },
    UpdateLeadStatus {
        lead_id: LeadId,
        status: LeadStatus,
    },
    DeleteLead(LeadId),
    EnrichEmail(LeadId),
    AssignToCampaign(AssignToCampaign),
    ScrapeLeads(ScrapeLeadsRequest),
    ExportLeads {
        unassigned: bool,
        dir: PathBuf,
    },
    /// Write already rendered activity CSV to disk. Nothing is sent.
    ExportActivity {
        csv: String,
        dir: PathBuf,
    },
    CreateCampaign(CampaignDraft),
    UpdateCampaign {
        id: CampaignId,
        draft: CampaignDraft,
    },
    SetCampaignStatus {
        id: CampaignId,
        status: CampaignStatus,
    },
    DeleteCampaign(CampaignId),
    SendCampaign {
        id: CampaignId,
        lead_ids: Vec<LeadId>,
    },
    CreatePayment {
        plan_tier: String,
    },
    GenerateMessage(GenerateMessageRequest),
}

/// What a successful mutation hands back to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Done(String),
    /// The write went through but the plan is at or near its limit.
    UsageWarning {
        warning: UsageWarning,
        message: String,
    },
    Enriched {
        email: Option<String>,
        message: String,
    },
    Exported(PathBuf),
    Checkout(String),
    Generated(String),
}

impl MutationOutcome {
    /// Toast for outcomes that do not open a modal.
    pub fn notification(&self, label: &str) -> Option<Notification> {
        match self {
            MutationOutcome::Done(message) => Some(Notification::new(
                NotificationLevel::Success,
                if message.is_empty() {
                    format!("{label}: done")
                } else {
                    message.clone()
                },
            )),
            MutationOutcome::UsageWarning { warning, message } => {
                let (level, text) = match warning {
                    UsageWarning::LimitReached => (
                        NotificationLevel::Error,
                        "Lead limit reached. Upgrade your plan to add more leads.",
                    ),
                    UsageWarning::ApproachingLimit => (
                        NotificationLevel::Warning,
                        "You are approaching your plan's lead limit.",
                    ),
                    UsageWarning::Unknown => (NotificationLevel::Warning, message.as_str()),
                };
                Some(Notification::new(level, text))
            }
            MutationOutcome::Enriched { email, message } => {
                let text = match email {
                    Some(email) => format!("Email found: {email}"),
                    None if !message.is_empty() => message.clone(),
                    None => "No email found".to_string(),
                };
                Some(Notification::new(NotificationLevel::Success, text))
            }
            MutationOutcome::Exported(path) => Some(Notification::new(
                NotificationLevel::Success,
                format!("Exported to {}", path.display()),
            )),
            MutationOutcome::Checkout(_) | MutationOutcome::Generated(_) => None,
        }
    }
}

impl Mutation {
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::ImportCsv { .. } => "Upload leads",
            Mutation::UpdateLeadStatus { .. } => "Update lead status",
            Mutation::DeleteLead(_) => "Delete lead",
            Mutation::EnrichEmail(_) => "Enrich email",
            Mutation::AssignToCampaign(_) => "Assign to campaign",
            Mutation::ScrapeLeads(_) => "Scrape LinkedIn",
            Mutation::ExportLeads { .. } => "Export leads",
            Mutation::ExportActivity { .. } => "Export activity",
            Mutation::CreateCampaign(_) => "Create campaign",
            Mutation::UpdateCampaign { .. } => "Update campaign",
            Mutation::SetCampaignStatus { .. } => "Change campaign status",
            Mutation::DeleteCampaign(_) => "Delete campaign",
            Mutation::SendCampaign { .. } => "Send campaign",
            Mutation::CreatePayment { .. } => "Checkout",
            Mutation::GenerateMessage(_) => "Generate message",
        }
    }

    /// Client-side checks. A mutation that fails here is never sent.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Mutation::ImportCsv { path, .. } => {
                if path.as_os_str().is_empty() {
                    return Err(ValidationError::required("CSV file"));
                }
                Ok(())
            }
            Mutation::AssignToCampaign(req) => req.validate(),
            Mutation::ScrapeLeads(req) => req.validate(),
            Mutation::CreateCampaign(draft) | Mutation::UpdateCampaign { draft, .. } => {
                draft.validate()
            }
            Mutation::SendCampaign { lead_ids, .. } => SendCampaign {
                lead_ids: lead_ids.clone(),
            }
            .validate(),
            Mutation::CreatePayment { plan_tier } => {
                if plan_tier.trim().is_empty() {
                    return Err(ValidationError::required("Plan"));
                }
                Ok(())
            }
            Mutation::GenerateMessage(req) => req.validate(),
            Mutation::UpdateLeadStatus { .. }
            | Mutation::DeleteLead(_)
            | Mutation::EnrichEmail(_)
            | Mutation::ExportLeads { .. }
            | Mutation::ExportActivity { .. }
            | Mutation::SetCampaignStatus { .. }
            | Mutation::DeleteCampaign(_) => Ok(()),
        }
    }

    /// Keys that go stale once the server accepts this mutation.
    pub fn invalidates(&self) -> Vec<CacheKey> {
        match self {
            Mutation::ImportCsv { .. } => vec![
                leads_prefix(),
                QueryKind::CampaignStats.key(),
                QueryKind::Activity.key(),
                QueryKind::Usage.key(),
            ],
            Mutation::UpdateLeadStatus { .. } | Mutation::DeleteLead(_) => {
                vec![leads_prefix(), QueryKind::Usage.key()]
            }
            Mutation::EnrichEmail(_) | Mutation::AssignToCampaign(_) => vec![leads_prefix()],
            Mutation::CreateCampaign(_)
            | Mutation::UpdateCampaign { .. }
            | Mutation::SetCampaignStatus { .. }
            | Mutation::DeleteCampaign(_) => vec![campaigns_prefix()],
            Mutation::SendCampaign { id, .. } => vec![
                campaign_logs_key(*id),
                QueryKind::CampaignStats.key(),
                QueryKind::Activity.key(),
            ],
            Mutation::ScrapeLeads(_)
            | Mutation::ExportLeads { .. }
            | Mutation::ExportActivity { .. }
            | Mutation::CreatePayment { .. }
            | Mutation::GenerateMessage(_) => Vec::new(),
        }
    }

    /// Issue the request. Validation is the caller's job.
    pub async fn execute(&self, api: &ApiClient) -> ClientResult<MutationOutcome> {
        match self {
            Mutation::ImportCsv { path, campaign_id } => {
                let csv_data = tokio::fs::read_to_string(path).await?;
                let req = UploadLeads {
                    campaign_id: *campaign_id,
                    csv_data,
                };
                req.validate()?;
                let response = api.upload_leads(&req).await?;
                Ok(update_outcome(response.message, response.warning))
            }
            Mutation::UpdateLeadStatus { lead_id, status } => {
                let req = LeadStatusUpdate {
                    status: status.clone(),
                };
                let response = api.update_lead_status(*lead_id, &req).await?;
                Ok(update_outcome(response.message, response.warning))
            }
            Mutation::DeleteLead(id) => {
                let response = api.delete_lead(*id).await?;
                Ok(MutationOutcome::Done(response.message))
            }
            Mutation::EnrichEmail(lead_id) => {
                let response = api
                    .enrich_email(&EnrichEmail { lead_id: *lead_id })
                    .await?;
                Ok(MutationOutcome::Enriched {
                    email: response.email.filter(|e| !e.is_empty()),
                    message: response.message.unwrap_or_default(),
                })
            }
            Mutation::AssignToCampaign(req) => {
                let response = api.assign_to_campaign(req).await?;
                Ok(MutationOutcome::Done(response.message))
            }
            Mutation::ScrapeLeads(req) => {
                let response = api.scrape_leads(req).await?;
                Ok(MutationOutcome::Done(response.message))
            }
            Mutation::ExportLeads { unassigned, dir } => {
                let csv = api.export_leads(*unassigned).await?;
                tokio::fs::create_dir_all(dir).await?;
                let path = dir.join(EXPORT_FILE_NAME);
                tokio::fs::write(&path, csv).await?;
                Ok(MutationOutcome::Exported(path))
            }
            Mutation::ExportActivity { csv, dir } => {
                tokio::fs::create_dir_all(dir).await?;
                let path = dir.join(ACTIVITY_EXPORT_FILE_NAME);
                tokio::fs::write(&path, csv).await?;
                Ok(MutationOutcome::Exported(path))
            }
            Mutation::CreateCampaign(draft) => {
                let response = api.create_campaign(draft).await?;
                Ok(MutationOutcome::Done(
                    response
                        .message
                        .unwrap_or_else(|| format!("Campaign {} created", response.id)),
                ))
            }
            Mutation::UpdateCampaign { id, draft } => {
                let response = api.update_campaign(*id, draft).await?;
                Ok(MutationOutcome::Done(response.message))
            }
            Mutation::SetCampaignStatus { id, status } => {
                let req = CampaignStatusUpdate {
                    status: status.clone(),
                };
                let response = api.set_campaign_status(*id, &req).await?;
                Ok(MutationOutcome::Done(response.message))
            }
            Mutation::DeleteCampaign(id) => {
                let response = api.delete_campaign(*id).await?;
                Ok(MutationOutcome::Done(response.message))
            }
            Mutation::SendCampaign { id, lead_ids } => {
                let req = SendCampaign {
                    lead_ids: lead_ids.clone(),
                };
                let response = api.send_campaign(*id, &req).await?;
                Ok(MutationOutcome::Done(response.message))
            }
            Mutation::CreatePayment { plan_tier } => {
                let req = CreatePayment {
                    plan_tier: plan_tier.clone(),
                };
                let session = api.create_payment(&req).await?;
                Ok(MutationOutcome::Checkout(session.checkout_url))
            }
            Mutation::GenerateMessage(req) => {
                let generated = api.generate_message(req).await?;
                Ok(MutationOutcome::Generated(generated.message))
            }
        }
    }
}

fn update_outcome(message: Option<String>, warning: Option<UsageWarning>) -> MutationOutcome {
    let message = message.unwrap_or_default();
    match warning {
        Some(warning) => MutationOutcome::UsageWarning { warning, message },
        None => MutationOutcome::Done(message),
    }
}

/// Validate, send and invalidate.
///
/// Returns as soon as the server answers; any refetches triggered by the
/// invalidation run on their own tasks.
pub async fn run_mutation(
    runner: &MutationRunner<ApiData, ClientError>,
    api: &ApiClient,
    mutation: &Mutation,
) -> ClientResult<MutationOutcome> {
    let invalidates = mutation.invalidates();
    runner
        .run(
            || async {
                mutation.validate()?;
                mutation.execute(api).await
            },
            &invalidates,
        )
        .await
}
