//! LeadPilot Core - API schemas and client-side rules
//!
//! Data types for every endpoint of the LeadPilot REST API, the client error
//! taxonomy, and the small pieces of display logic (filters, usage meter,
//! validation) shared by the views. No I/O happens in this crate.

pub mod activity;
pub mod enums;
pub mod error;
pub mod filter;
pub mod time;
pub mod types;
pub mod usage;
pub mod validation;

pub use activity::{activity_csv, ActivitySummary, ACTIVITY_CSV_HEADER};
pub use enums::{CampaignStatus, LeadStatus, PlanTier, UsageWarning};
pub use error::{ClientError, ClientResult, ValidationError};
pub use filter::{ActivityFilter, ActivityKind, CampaignFilter, EnrichmentFilter, LeadFilter};
pub use time::{parse_timestamp, Timestamp};
pub use types::*;
pub use usage::{UsageLevel, WARNING_RATIO};
pub use validation::Validate;
