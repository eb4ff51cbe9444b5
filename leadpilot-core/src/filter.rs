//! Client-side filters for lead, campaign and activity lists.
//!
//! The API returns whole collections; narrowing them down for display is
//! done locally and never touches the cache.

use crate::enums::{CampaignStatus, LeadStatus};
use crate::time::Timestamp;
use crate::types::{ActivityItem, EmailCampaign, Lead};
use serde::{Deserialize, Serialize};

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Enrichment filter on the lead table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentFilter {
    #[default]
    All,
    Enriched,
    NotEnriched,
}

impl EnrichmentFilter {
    pub fn next(self) -> Self {
        match self {
            EnrichmentFilter::All => EnrichmentFilter::Enriched,
            EnrichmentFilter::Enriched => EnrichmentFilter::NotEnriched,
            EnrichmentFilter::NotEnriched => EnrichmentFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EnrichmentFilter::All => "All",
            EnrichmentFilter::Enriched => "Enriched",
            EnrichmentFilter::NotEnriched => "Not enriched",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LeadFilter {
    pub search: String,
    /// `None` means every status.
    pub status: Option<LeadStatus>,
    pub enrichment: EnrichmentFilter,
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || contains_ci(&lead.first_name, &needle)
            || contains_ci(&lead.last_name, &needle)
            || contains_ci(&lead.company, &needle)
            || contains_ci(&lead.job_title, &needle);
        let matches_status = self.status.as_ref().map_or(true, |status| &lead.status == status);
        let matches_enrichment = match self.enrichment {
            EnrichmentFilter::All => true,
            EnrichmentFilter::Enriched => lead.is_enriched(),
            EnrichmentFilter::NotEnriched => !lead.is_enriched(),
        };
        matches_search && matches_status && matches_enrichment
    }

    pub fn apply<'a>(&self, leads: &'a [Lead]) -> Vec<&'a Lead> {
        leads.iter().filter(|lead| self.matches(lead)).collect()
    }

    /// Step the status filter through all, then each selectable status.
    pub fn cycle_status(&mut self) {
        let all = LeadStatus::selectable();
        self.status = match &self.status {
            None => all.first().cloned(),
            Some(current) => match all.iter().position(|s| s == current) {
                Some(idx) if idx + 1 < all.len() => Some(all[idx + 1].clone()),
                _ => None,
            },
        };
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CampaignFilter {
    pub search: String,
    pub status: Option<CampaignStatus>,
}

impl CampaignFilter {
    pub fn matches(&self, campaign: &EmailCampaign) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || contains_ci(&campaign.name, &needle)
            || contains_ci(&campaign.subject, &needle);
        let matches_status = self
            .status
            .as_ref()
            .map_or(true, |status| &campaign.status == status);
        matches_search && matches_status
    }

    pub fn apply<'a>(&self, campaigns: &'a [EmailCampaign]) -> Vec<&'a EmailCampaign> {
        campaigns.iter().filter(|c| self.matches(c)).collect()
    }

    pub fn cycle_status(&mut self) {
        let all = CampaignStatus::selectable();
        self.status = match &self.status {
            None => all.first().cloned(),
            Some(current) => match all.iter().position(|s| s == current) {
                Some(idx) if idx + 1 < all.len() => Some(all[idx + 1].clone()),
                _ => None,
            },
        };
    }
}

/// Activity filter chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityKind {
    #[default]
    All,
    Message,
    Upload,
    Campaign,
}

impl ActivityKind {
    pub fn all() -> &'static [ActivityKind] {
        &[
            ActivityKind::All,
            ActivityKind::Message,
            ActivityKind::Upload,
            ActivityKind::Campaign,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityKind::All => "All Activity",
            ActivityKind::Message => "Messages",
            ActivityKind::Upload => "Uploads",
            ActivityKind::Campaign => "Campaigns",
        }
    }

    fn needle(self) -> Option<&'static str> {
        match self {
            ActivityKind::All => None,
            ActivityKind::Message => Some("message"),
            ActivityKind::Upload => Some("upload"),
            ActivityKind::Campaign => Some("campaign"),
        }
    }

    pub fn next(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|k| *k == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActivityFilter {
    pub kind: ActivityKind,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

impl ActivityFilter {
    /// Bounds are inclusive on both ends.
    pub fn matches(&self, item: &ActivityItem) -> bool {
        let matches_kind = self
            .kind
            .needle()
            .map_or(true, |needle| contains_ci(&item.action, needle));
        let after_from = self.from.map_or(true, |from| item.timestamp >= from);
        let before_to = self.to.map_or(true, |to| item.timestamp <= to);
        matches_kind && after_from && before_to
    }

    pub fn apply<'a>(&self, items: &'a [ActivityItem]) -> Vec<&'a ActivityItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn lead(id: i64, first: &str, company: &str, status: LeadStatus, email: Option<&str>) -> Lead {
        Lead {
            id,
            first_name: first.to_string(),
            last_name: "Doe".to_string(),
            job_title: "Engineer".to_string(),
            company: company.to_string(),
            profile_url: format!("https://linkedin.com/in/{id}"),
            status,
            message_text: None,
            email: email.map(str::to_string),
            email_confidence: None,
            campaign_id: None,
        }
    }

    fn activity(action: &str, day: u32) -> ActivityItem {
        ActivityItem {
            id: day.to_string(),
            action: action.to_string(),
            lead: None,
            campaign: None,
            timestamp: Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap(),
            status: "success".to_string(),
            message: None,
        }
    }

    #[test]
    fn lead_search_is_case_insensitive_across_fields() {
        let leads = vec![
            lead(1, "Ada", "Analytical", LeadStatus::Pending, None),
            lead(2, "Grace", "Navy", LeadStatus::Replied, Some("g@navy.mil")),
        ];
        let filter = LeadFilter {
            search: "NAVY".into(),
            ..Default::default()
        };
        let ids: Vec<i64> = filter.apply(&leads).iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2]);

        let filter = LeadFilter {
            search: "engineer".into(),
            ..Default::default()
        };
        assert_eq!(filter.apply(&leads).len(), 2);
    }

    #[test]
    fn lead_status_and_enrichment_compose() {
        let leads = vec![
            lead(1, "Ada", "A", LeadStatus::Replied, None),
            lead(2, "Grace", "B", LeadStatus::Replied, Some("g@b.io")),
            lead(3, "Linus", "C", LeadStatus::Pending, Some("l@c.io")),
        ];
        let filter = LeadFilter {
            search: String::new(),
            status: Some(LeadStatus::Replied),
            enrichment: EnrichmentFilter::Enriched,
        };
        let ids: Vec<i64> = filter.apply(&leads).iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2]);

        let filter = LeadFilter {
            enrichment: EnrichmentFilter::NotEnriched,
            ..Default::default()
        };
        let ids: Vec<i64> = filter.apply(&leads).iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn empty_email_is_not_enriched() {
        let l = lead(1, "Ada", "A", LeadStatus::Pending, Some(""));
        assert!(!l.is_enriched());
    }

    #[test]
    fn status_filter_cycles_back_to_all() {
        let mut filter = LeadFilter::default();
        let mut seen = Vec::new();
        for _ in 0..=LeadStatus::selectable().len() {
            filter.cycle_status();
            seen.push(filter.status.clone());
        }
        assert_eq!(seen.first().cloned().flatten(), Some(LeadStatus::Pending));
        assert_eq!(seen.last().cloned().flatten(), None);
    }

    #[test]
    fn activity_kind_and_date_range() {
        let items = vec![
            activity("Message sent", 1),
            activity("Lead uploaded", 2),
            activity("Message replied", 3),
            activity("Campaign created", 4),
        ];
        let filter = ActivityFilter {
            kind: ActivityKind::Message,
            ..Default::default()
        };
        assert_eq!(filter.apply(&items).len(), 2);

        let filter = ActivityFilter {
            kind: ActivityKind::All,
            from: Some(Utc.with_ymd_and_hms(2025, 1, 2, 12, 0, 0).unwrap()),
            to: Some(Utc.with_ymd_and_hms(2025, 1, 3, 12, 0, 0).unwrap()),
        };
        let ids: Vec<&str> = filter.apply(&items).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn activity_kind_cycles() {
        assert_eq!(ActivityKind::All.next(), ActivityKind::Message);
        assert_eq!(ActivityKind::Campaign.next(), ActivityKind::All);
    }
}
