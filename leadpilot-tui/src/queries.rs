//! Read-side bindings: which endpoint backs which cache key.
//!
//! Keys start with the endpoint path, followed by the parameters that
//! change the response. Invalidating a bare path therefore covers every
//! parameter combination of that endpoint.

use crate::api_client::ApiClient;
use leadpilot_core::{
    ActivityItem, CampaignId, CampaignStats, ClientError, CurrentSubscription, EmailCampaign,
    EmailLog, Lead, PerformancePoint, Plan, Usage,
};
use leadpilot_query::{cache_key, loader, CacheKey, Loader, QueryCache};

pub const LEADS_PATH: &str = "/api/leads/list";
pub const CAMPAIGNS_PATH: &str = "/api/email-campaigns";
pub const PERFORMANCE_PATH: &str = "/api/email-campaigns/performance";
pub const STATS_PATH: &str = "/api/campaigns/stats";
pub const ACTIVITY_PATH: &str = "/api/activity";
pub const USAGE_PATH: &str = "/api/subscriptions/usage";
pub const PLANS_PATH: &str = "/api/subscriptions/plans";
pub const CURRENT_SUBSCRIPTION_PATH: &str = "/api/subscriptions/current";

/// Value stored in the application cache. One variant per read endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiData {
    Leads(Vec<Lead>),
    Campaigns(Vec<EmailCampaign>),
    CampaignLogs(Vec<EmailLog>),
    Performance(Vec<PerformancePoint>),
    Stats(CampaignStats),
    Activity(Vec<ActivityItem>),
    Usage(Usage),
    Plans(Vec<Plan>),
    CurrentSubscription(CurrentSubscription),
}

impl ApiData {
    pub fn leads(&self) -> Option<&[Lead]> {
        match self {
            ApiData::Leads(leads) => Some(leads),
            _ => None,
        }
    }

    pub fn campaigns(&self) -> Option<&[EmailCampaign]> {
        match self {
            ApiData::Campaigns(campaigns) => Some(campaigns),
            _ => None,
        }
    }

    pub fn campaign_logs(&self) -> Option<&[EmailLog]> {
        match self {
            ApiData::CampaignLogs(logs) => Some(logs),
            _ => None,
        }
    }

    pub fn performance(&self) -> Option<&[PerformancePoint]> {
        match self {
            ApiData::Performance(points) => Some(points),
            _ => None,
        }
    }

    pub fn stats(&self) -> Option<&CampaignStats> {
        match self {
            ApiData::Stats(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn activity(&self) -> Option<&[ActivityItem]> {
        match self {
            ApiData::Activity(items) => Some(items),
            _ => None,
        }
    }

    pub fn usage(&self) -> Option<&Usage> {
        match self {
            ApiData::Usage(usage) => Some(usage),
            _ => None,
        }
    }

    pub fn plans(&self) -> Option<&[Plan]> {
        match self {
            ApiData::Plans(plans) => Some(plans),
            _ => None,
        }
    }

    pub fn current_subscription(&self) -> Option<&CurrentSubscription> {
        match self {
            ApiData::CurrentSubscription(current) => Some(current),
            _ => None,
        }
    }
}

pub type AppCache = QueryCache<ApiData, ClientError>;

/// A read the views can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Leads { unassigned: bool },
    Campaigns,
    CampaignLogs(CampaignId),
    CampaignPerformance,
    CampaignStats,
    Activity,
    Usage,
    Plans,
    CurrentSubscription,
}

impl QueryKind {
    pub fn key(&self) -> CacheKey {
        match *self {
            QueryKind::Leads { unassigned } => cache_key![LEADS_PATH, unassigned],
            QueryKind::Campaigns => cache_key![CAMPAIGNS_PATH],
            QueryKind::CampaignLogs(id) => cache_key![CAMPAIGNS_PATH, id, "logs"],
            QueryKind::CampaignPerformance => cache_key![PERFORMANCE_PATH],
            QueryKind::CampaignStats => cache_key![STATS_PATH],
            QueryKind::Activity => cache_key![ACTIVITY_PATH],
            QueryKind::Usage => cache_key![USAGE_PATH],
            QueryKind::Plans => cache_key![PLANS_PATH],
            QueryKind::CurrentSubscription => cache_key![CURRENT_SUBSCRIPTION_PATH],
        }
    }

    /// Loader that performs this read against `api`.
    pub fn loader(&self, api: &ApiClient) -> Loader<ApiData, ClientError> {
        let api = api.clone();
        match *self {
            QueryKind::Leads { unassigned } => loader(move || {
                let api = api.clone();
                async move { api.list_leads(unassigned).await.map(ApiData::Leads) }
            }),
            QueryKind::Campaigns => loader(move || {
                let api = api.clone();
                async move { api.list_campaigns().await.map(ApiData::Campaigns) }
            }),
            QueryKind::CampaignLogs(id) => loader(move || {
                let api = api.clone();
                async move { api.campaign_logs(id).await.map(ApiData::CampaignLogs) }
            }),
            QueryKind::CampaignPerformance => loader(move || {
                let api = api.clone();
                async move { api.campaign_performance().await.map(ApiData::Performance) }
            }),
            QueryKind::CampaignStats => loader(move || {
                let api = api.clone();
                async move { api.campaign_stats().await.map(ApiData::Stats) }
            }),
            QueryKind::Activity => loader(move || {
                let api = api.clone();
                async move { api.activity().await.map(ApiData::Activity) }
            }),
            QueryKind::Usage => loader(move || {
                let api = api.clone();
                async move { api.usage().await.map(ApiData::Usage) }
            }),
            QueryKind::Plans => loader(move || {
                let api = api.clone();
                async move { api.plans().await.map(ApiData::Plans) }
            }),
            QueryKind::CurrentSubscription => loader(move || {
                let api = api.clone();
                async move {
                    api.current_subscription()
                        .await
                        .map(ApiData::CurrentSubscription)
                }
            }),
        }
    }
}

// ============================================================================
// INVALIDATION PREFIXES
// ============================================================================

/// Every lead list, assigned or not.
pub fn leads_prefix() -> CacheKey {
    cache_key![LEADS_PATH]
}

/// The campaign list and every campaign's logs.
pub fn campaigns_prefix() -> CacheKey {
    cache_key![CAMPAIGNS_PATH]
}

pub fn campaign_logs_key(id: CampaignId) -> CacheKey {
    QueryKind::CampaignLogs(id).key()
}

/// One prefix per read endpoint; invalidating these refreshes everything.
pub fn all_prefixes() -> Vec<CacheKey> {
    vec![
        leads_prefix(),
        campaigns_prefix(),
        QueryKind::CampaignPerformance.key(),
        QueryKind::CampaignStats.key(),
        QueryKind::Activity.key(),
        QueryKind::Usage.key(),
        QueryKind::Plans.key(),
        QueryKind::CurrentSubscription.key(),
    ]
}
