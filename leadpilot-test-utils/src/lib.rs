//! LeadPilot Test Utilities
//!
//! Shared test infrastructure for the LeadPilot workspace:
//! - Proptest generators for API schemas and cache keys
//! - Scriptable loaders for exercising the query cache
//! - Fixtures mirroring real backend payloads

pub use leadpilot_core::{
    ActivityItem, CampaignStats, CampaignStatus, ClientError, CurrentSubscription, EmailCampaign,
    EmailLog, Lead, LeadStatus, Plan, Timestamp, Usage,
};
pub use leadpilot_query::{loader, CacheKey, KeyPart, Loader};

use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

// ============================================================================
// MOCK LOADERS
// ============================================================================

/// Loader that returns a fixed value and counts how often it was called.
#[derive(Debug, Clone)]
pub struct CountingLoader<V> {
    value: V,
    calls: Arc<AtomicUsize>,
}

impl<V> CountingLoader<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(value: V) -> Self {
        Self {
            value,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn loader<E: Send + 'static>(&self) -> Loader<V, E> {
        let value = self.value.clone();
        let calls = Arc::clone(&self.calls);
        loader(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            let value = value.clone();
            async move { Ok(value) }
        })
    }
}

/// Loader whose result is decided by the test after the load has started.
///
/// Each call to [`GatedLoader::loader`] creates a fresh gate; resolve it
/// through the returned sender. Calling the loader twice reports an error.
pub struct GatedLoader;

impl GatedLoader {
    pub fn loader<V, E>(error_on_reuse: E) -> (oneshot::Sender<Result<V, E>>, Loader<V, E>)
    where
        V: Send + 'static,
        E: Clone + Send + Sync + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let gate = Arc::new(Mutex::new(Some(rx)));
        let loader = loader(move || {
            let rx = gate.lock().ok().and_then(|mut slot| slot.take());
            let fallback = error_on_reuse.clone();
            async move {
                match rx {
                    Some(rx) => rx.await.unwrap_or(Err(fallback)),
                    None => Err(fallback),
                }
            }
        });
        (tx, loader)
    }
}

// ============================================================================
// GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for LeadPilot types.

    use super::*;
    use proptest::prelude::*;

    /// Timestamps between 2020 and 2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    pub fn arb_lead_status() -> impl Strategy<Value = LeadStatus> {
        prop_oneof![
            Just(LeadStatus::Pending),
            Just(LeadStatus::Contacted),
            Just(LeadStatus::Sent),
            Just(LeadStatus::Replied),
            Just(LeadStatus::Connected),
            Just(LeadStatus::Failed),
            "[a-z]{3,10}".prop_map(LeadStatus::from),
        ]
    }

    pub fn arb_campaign_status() -> impl Strategy<Value = CampaignStatus> {
        prop_oneof![
            Just(CampaignStatus::Draft),
            Just(CampaignStatus::Active),
            Just(CampaignStatus::Paused),
            Just(CampaignStatus::Completed),
        ]
    }

    pub fn arb_lead() -> impl Strategy<Value = Lead> {
        (
            1i64..100_000,
            "[A-Z][a-z]{2,8}",
            "[A-Z][a-z]{2,10}",
            "[A-Za-z ]{2,16}",
            "[A-Za-z]{2,12}",
            arb_lead_status(),
            proptest::option::of("[a-z]{3,8}@[a-z]{3,8}\\.io"),
            proptest::option::of(1i64..100),
        )
            .prop_map(
                |(id, first_name, last_name, job_title, company, status, email, campaign_id)| Lead {
                    id,
                    profile_url: format!("https://linkedin.com/in/{}-{}", first_name.to_lowercase(), id),
                    first_name,
                    last_name,
                    job_title,
                    company,
                    status,
                    message_text: None,
                    email_confidence: email.as_ref().map(|_| 80),
                    email,
                    campaign_id,
                },
            )
    }

    pub fn arb_campaign() -> impl Strategy<Value = EmailCampaign> {
        (1i64..10_000, "[A-Za-z ]{3,20}", "[A-Za-z ]{3,30}", arb_campaign_status(), arb_timestamp())
            .prop_map(|(id, name, subject, status, created_at)| EmailCampaign {
                id,
                name,
                subject,
                body: "Hi {{first_name}}".to_string(),
                status,
                scheduled_at: None,
                created_at,
            })
    }

    pub fn arb_key_part() -> impl Strategy<Value = KeyPart> {
        prop_oneof![
            any::<bool>().prop_map(KeyPart::Bool),
            (0i64..1_000).prop_map(KeyPart::Int),
            "/api/[a-z-]{1,12}".prop_map(KeyPart::Str),
        ]
    }

    pub fn arb_cache_key() -> impl Strategy<Value = CacheKey> {
        proptest::collection::vec(arb_key_part(), 1..4).prop_map(CacheKey::from_parts)
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built payloads shaped like real backend responses.

    use super::*;

    pub fn timestamp(day: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 1, day.clamp(1, 28), 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    pub fn lead(id: i64, first_name: &str, status: LeadStatus) -> Lead {
        Lead {
            id,
            first_name: first_name.to_string(),
            last_name: "Doe".to_string(),
            job_title: "Head of Growth".to_string(),
            company: "Acme".to_string(),
            profile_url: format!("https://linkedin.com/in/{id}"),
            status,
            message_text: None,
            email: None,
            email_confidence: None,
            campaign_id: None,
        }
    }

    pub fn enriched_lead(id: i64, first_name: &str) -> Lead {
        Lead {
            email: Some(format!("{}@acme.io", first_name.to_lowercase())),
            email_confidence: Some(91),
            ..lead(id, first_name, LeadStatus::Pending)
        }
    }

    pub fn campaign(id: i64, name: &str, status: CampaignStatus) -> EmailCampaign {
        EmailCampaign {
            id,
            name: name.to_string(),
            subject: format!("{name} intro"),
            body: "Hi {{first_name}}, quick question.".to_string(),
            status,
            scheduled_at: None,
            created_at: timestamp(id as u32),
        }
    }

    pub fn activity(id: &str, action: &str, day: u32) -> ActivityItem {
        ActivityItem {
            id: id.to_string(),
            action: action.to_string(),
            lead: Some("Ada Doe".to_string()),
            campaign: None,
            timestamp: timestamp(day),
            status: "success".to_string(),
            message: None,
        }
    }

    pub fn usage(current_usage: u64, limit: u64) -> Usage {
        Usage {
            current_usage,
            limit,
            remaining: None,
            tier: "free".to_string(),
        }
    }

    pub fn plan(name: &str, price: f64, leads_limit: u64) -> Plan {
        Plan {
            name: name.to_string(),
            price,
            currency: "usd".to_string(),
            leads_limit,
            description: format!("{name} plan"),
        }
    }

    pub fn stats(sent: u64, accepted: u64, replied: u64, failed: u64) -> CampaignStats {
        CampaignStats {
            sent,
            accepted,
            replied,
            failed,
        }
    }

    /// JSON body of `GET /api/leads/list`.
    pub fn lead_list_json(leads: &[Lead]) -> serde_json::Value {
        serde_json::json!({ "leads": leads })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[tokio::test]
    async fn counting_loader_counts() {
        let counter = CountingLoader::new(3u32);
        let load: Loader<u32, String> = counter.loader();
        assert_eq!(load().await, Ok(3));
        assert_eq!(load().await, Ok(3));
        assert_eq!(counter.calls(), 2);
    }

    #[tokio::test]
    async fn gated_loader_resolves_once() {
        let (tx, load) = GatedLoader::loader::<u32, String>("reused".to_string());
        let first = load();
        tx.send(Ok(7)).ok();
        assert_eq!(first.await, Ok(7));
        assert_eq!(load().await, Err("reused".to_string()));
    }

    #[test]
    fn lead_list_fixture_decodes() {
        let leads = vec![fixtures::lead(1, "Ada", LeadStatus::Pending)];
        let decoded: leadpilot_core::LeadListResponse =
            serde_json::from_value(fixtures::lead_list_json(&leads)).expect("lead list");
        assert_eq!(decoded.leads, leads);
    }

    proptest! {
        #[test]
        fn generated_leads_round_trip_through_json(lead in generators::arb_lead()) {
            let json = serde_json::to_value(&lead).expect("serialize");
            let back: Lead = serde_json::from_value(json).expect("deserialize");
            prop_assert_eq!(back, lead);
        }
    }
}
