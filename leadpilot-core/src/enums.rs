//! Status enumerations shared by the API schemas and the views.
//!
//! Lead and campaign statuses are open sets on the server side, so each
//! enum keeps an `Other` variant carrying the raw string instead of failing
//! the whole response decode on a status it has not seen before.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// LEAD STATUS
// ============================================================================

/// Outreach status of a single lead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LeadStatus {
    Pending,
    Contacted,
    Sent,
    Replied,
    Connected,
    Failed,
    Other(String),
}

impl LeadStatus {
    /// Statuses offered in the lead status filter and the status cycle.
    pub fn selectable() -> &'static [LeadStatus] {
        &[
            LeadStatus::Pending,
            LeadStatus::Contacted,
            LeadStatus::Replied,
            LeadStatus::Connected,
            LeadStatus::Failed,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            LeadStatus::Pending => "pending",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Sent => "sent",
            LeadStatus::Replied => "replied",
            LeadStatus::Connected => "connected",
            LeadStatus::Failed => "failed",
            LeadStatus::Other(raw) => raw.as_str(),
        }
    }

    /// Next status in the selectable cycle. Unknown statuses restart at pending.
    pub fn next(&self) -> LeadStatus {
        let all = Self::selectable();
        match all.iter().position(|s| s == self) {
            Some(idx) => all[(idx + 1) % all.len()].clone(),
            None => LeadStatus::Pending,
        }
    }
}

impl From<String> for LeadStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => LeadStatus::Pending,
            "contacted" => LeadStatus::Contacted,
            "sent" => LeadStatus::Sent,
            "replied" => LeadStatus::Replied,
            "connected" => LeadStatus::Connected,
            "failed" => LeadStatus::Failed,
            _ => LeadStatus::Other(value),
        }
    }
}

impl From<LeadStatus> for String {
    fn from(value: LeadStatus) -> Self {
        match value {
            LeadStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CAMPAIGN STATUS
// ============================================================================

/// Lifecycle status of an email campaign.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Completed,
    Other(String),
}

impl CampaignStatus {
    pub fn selectable() -> &'static [CampaignStatus] {
        &[
            CampaignStatus::Draft,
            CampaignStatus::Active,
            CampaignStatus::Paused,
            CampaignStatus::Completed,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
            CampaignStatus::Other(raw) => raw.as_str(),
        }
    }

    /// Active campaigns pause; everything else activates.
    pub fn toggled(&self) -> CampaignStatus {
        match self {
            CampaignStatus::Active => CampaignStatus::Paused,
            _ => CampaignStatus::Active,
        }
    }
}

impl From<String> for CampaignStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "draft" => CampaignStatus::Draft,
            "active" => CampaignStatus::Active,
            "paused" => CampaignStatus::Paused,
            "completed" => CampaignStatus::Completed,
            _ => CampaignStatus::Other(value),
        }
    }
}

impl From<CampaignStatus> for String {
    fn from(value: CampaignStatus) -> Self {
        match value {
            CampaignStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// USAGE WARNING
// ============================================================================

/// Warning attached by the server to write responses that count against the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageWarning {
    ApproachingLimit,
    LimitReached,
    #[serde(other)]
    Unknown,
}

/// Plan tiers offered on the pricing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
    Enterprise,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
            PlanTier::Enterprise => "enterprise",
        }
    }

    /// Match a plan by its display name ("Pro", "enterprise", ...).
    pub fn from_name(name: &str) -> Option<PlanTier> {
        match name.trim().to_ascii_lowercase().as_str() {
            "free" => Some(PlanTier::Free),
            "pro" => Some(PlanTier::Pro),
            "enterprise" => Some(PlanTier::Enterprise),
            _ => None,
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
