//! Request and response schemas for the LeadPilot REST API.
//!
//! Every endpoint the client talks to has an explicit type here. Responses
//! are decoded strictly at the transport boundary; a body that does not
//! match surfaces as a decode error instead of leaking missing fields into
//! the views.

use crate::enums::{CampaignStatus, LeadStatus, UsageWarning};
use crate::time::{self, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type LeadId = i64;
pub type CampaignId = i64;

// ============================================================================
// LEADS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    pub company: String,
    pub profile_url: String,
    pub status: LeadStatus,
    pub message_text: Option<String>,
    pub email: Option<String>,
    pub email_confidence: Option<i64>,
    pub campaign_id: Option<CampaignId>,
}

impl Lead {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// A lead counts as enriched once the server has found an email for it.
    pub fn is_enriched(&self) -> bool {
        self.email.as_deref().is_some_and(|email| !email.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadListResponse {
    pub leads: Vec<Lead>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadStatusUpdate {
    pub status: LeadStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LeadUpdateResponse {
    pub message: Option<String>,
    pub warning: Option<UsageWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadLeads {
    pub campaign_id: CampaignId,
    pub csv_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignToCampaign {
    pub lead_ids: Vec<LeadId>,
    pub campaign_id: CampaignId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichEmail {
    pub lead_id: LeadId,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnrichEmailResponse {
    pub email: Option<String>,
    pub confidence: Option<i64>,
    pub message: Option<String>,
}

/// Search filters for a LinkedIn scrape job. The server runs the job in the
/// background; the response only acknowledges it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeLeadsRequest {
    pub keywords: String,
    pub industry: String,
    pub location: String,
    pub current_company: String,
    #[serde(rename = "job_title")]
    pub job_title: String,
}

// ============================================================================
// EMAIL CAMPAIGNS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailCampaign {
    pub id: CampaignId,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub status: CampaignStatus,
    #[serde(default, with = "time::option")]
    pub scheduled_at: Option<Timestamp>,
    #[serde(with = "time")]
    pub created_at: Timestamp,
}

/// Body for creating or editing a campaign.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CampaignDraft {
    pub name: String,
    pub subject: String,
    pub body: String,
}

impl From<&EmailCampaign> for CampaignDraft {
    fn from(campaign: &EmailCampaign) -> Self {
        Self {
            name: campaign.name.clone(),
            subject: campaign.subject.clone(),
            body: campaign.body.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignStatusUpdate {
    pub status: CampaignStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCampaign {
    pub lead_ids: Vec<LeadId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailLog {
    pub lead_id: LeadId,
    pub lead_name: Option<String>,
    pub to_email: String,
    pub status: String,
    #[serde(default, with = "time::option")]
    pub sent_at: Option<Timestamp>,
    #[serde(default, with = "time::option")]
    pub opened_at: Option<Timestamp>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    pub date: NaiveDate,
    pub sent: u64,
    pub responses: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CampaignStats {
    pub sent: u64,
    pub accepted: u64,
    pub replied: u64,
    pub failed: u64,
}

impl CampaignStats {
    pub fn total(&self) -> u64 {
        self.sent + self.accepted + self.replied + self.failed
    }

    /// Replies as a percentage of all tracked leads, `0.0` when there are none.
    pub fn response_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.replied as f64 / total as f64 * 100.0
    }
}

// ============================================================================
// ACTIVITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityItem {
    pub id: String,
    pub action: String,
    pub lead: Option<String>,
    pub campaign: Option<String>,
    #[serde(with = "time")]
    pub timestamp: Timestamp,
    pub status: String,
    pub message: Option<String>,
}

// ============================================================================
// SUBSCRIPTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub current_usage: u64,
    pub limit: u64,
    pub remaining: Option<u64>,
    pub tier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub leads_limit: u64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentSubscription {
    pub tier: String,
    pub status: Option<String>,
    #[serde(default, with = "time::option")]
    pub expires_at: Option<Timestamp>,
    pub plan: Plan,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePayment {
    pub plan_tier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub checkout_url: String,
}

// ============================================================================
// AI + GENERIC ACKNOWLEDGEMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMessageRequest {
    pub lead_info: String,
    pub tone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMessage {
    pub message: String,
}

/// Plain `{ "message": ... }` acknowledgement, optionally with a warning text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lead_decodes_backend_shape() {
        let lead: Lead = serde_json::from_value(json!({
            "id": 7,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "job_title": "CTO",
            "company": "Analytical",
            "profile_url": "https://linkedin.com/in/ada",
            "status": "replied",
            "message_text": null,
            "email": "ada@analytical.io",
            "email_confidence": 92,
            "campaign_id": null
        }))
        .expect("lead");
        assert_eq!(lead.status, LeadStatus::Replied);
        assert!(lead.is_enriched());
        assert_eq!(lead.campaign_id, None);
        assert_eq!(lead.full_name(), "Ada Lovelace");
    }

    #[test]
    fn lead_missing_required_field_is_rejected() {
        let result = serde_json::from_value::<Lead>(json!({
            "id": 7,
            "first_name": "Ada",
            "status": "pending"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn campaign_accepts_naive_timestamps() {
        let campaign: EmailCampaign = serde_json::from_value(json!({
            "id": 3,
            "name": "Q3 push",
            "subject": "Hello",
            "body": "Hi {{first_name}}",
            "status": "draft",
            "scheduled_at": null,
            "created_at": "2025-06-01T08:30:00.120000"
        }))
        .expect("campaign");
        assert_eq!(campaign.status, CampaignStatus::Draft);
        assert!(campaign.scheduled_at.is_none());
    }

    #[test]
    fn request_bodies_use_wire_casing() {
        let body = serde_json::to_value(UploadLeads {
            campaign_id: 4,
            csv_data: "a,b".into(),
        })
        .unwrap();
        assert_eq!(body, json!({ "campaignId": 4, "csvData": "a,b" }));

        let body = serde_json::to_value(ScrapeLeadsRequest {
            keywords: "rust".into(),
            job_title: "CTO".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body["currentCompany"], json!(""));
        assert_eq!(body["job_title"], json!("CTO"));

        let body = serde_json::to_value(CreatePayment {
            plan_tier: "pro".into(),
        })
        .unwrap();
        assert_eq!(body, json!({ "plan_tier": "pro" }));
    }

    #[test]
    fn response_rate_handles_empty_stats() {
        assert_eq!(CampaignStats::default().response_rate(), 0.0);
        let stats = CampaignStats {
            sent: 5,
            accepted: 2,
            replied: 2,
            failed: 1,
        };
        assert_eq!(stats.total(), 10);
        assert!((stats.response_rate() - 20.0).abs() < f64::EPSILON);
    }
}
