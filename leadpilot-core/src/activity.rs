//! Activity analytics: summary counters and CSV rendering for the activity
//! feed. Both operate on whatever slice the activity filter produced.

use crate::types::ActivityItem;

/// Header row of the analytics export.
pub const ACTIVITY_CSV_HEADER: &str = "Action,Status,Lead,Campaign,Timestamp";

fn succeeded(item: &ActivityItem) -> bool {
    item.status.eq_ignore_ascii_case("success")
}

fn action_has(item: &ActivityItem, needle: &str) -> bool {
    item.action.to_lowercase().contains(needle)
}

/// Summary cards shown above the activity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivitySummary {
    /// Successful enrichment actions.
    pub enrichments: u64,
    /// Successful email actions.
    pub emails_sent: u64,
    /// Every email action regardless of outcome.
    pub email_attempts: u64,
    /// Successful reply actions.
    pub replies: u64,
}

impl ActivitySummary {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a ActivityItem>) -> Self {
        let mut summary = Self::default();
        for item in items {
            let ok = succeeded(item);
            if action_has(item, "enrich") && ok {
                summary.enrichments += 1;
            }
            if action_has(item, "email") {
                summary.email_attempts += 1;
                if ok {
                    summary.emails_sent += 1;
                }
            }
            if action_has(item, "reply") && ok {
                summary.replies += 1;
            }
        }
        summary
    }

    /// Sent share of email attempts as a rounded percentage, 0 without attempts.
    pub fn delivery_rate(&self) -> u64 {
        if self.email_attempts == 0 {
            return 0;
        }
        (self.emails_sent as f64 * 100.0 / self.email_attempts as f64).round() as u64
    }
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// Render activity rows as CSV, header first. Missing lead or campaign
/// names become empty fields.
pub fn activity_csv<'a>(items: impl IntoIterator<Item = &'a ActivityItem>) -> String {
    let mut out = String::from(ACTIVITY_CSV_HEADER);
    out.push('\n');
    for item in items {
        let row = [
            csv_field(&item.action),
            csv_field(&item.status),
            csv_field(item.lead.as_deref().unwrap_or_default()),
            csv_field(item.campaign.as_deref().unwrap_or_default()),
            item.timestamp.to_rfc3339(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(action: &str, status: &str) -> ActivityItem {
        ActivityItem {
            id: action.to_string(),
            action: action.to_string(),
            lead: None,
            campaign: None,
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap(),
            status: status.to_string(),
            message: None,
        }
    }

    #[test]
    fn summary_counts_successful_actions() {
        let items = vec![
            item("Lead enriched", "success"),
            item("Lead enriched", "failed"),
            item("Email sent", "success"),
            item("Email sent", "success"),
            item("Email bounced", "failed"),
            item("Reply received", "success"),
            item("Lead uploaded", "success"),
        ];
        let summary = ActivitySummary::from_items(&items);
        assert_eq!(
            summary,
            ActivitySummary {
                enrichments: 1,
                emails_sent: 2,
                email_attempts: 3,
                replies: 1,
            }
        );
        assert_eq!(summary.delivery_rate(), 67);
    }

    #[test]
    fn delivery_rate_without_emails_is_zero() {
        let summary = ActivitySummary::from_items(&[item("Lead uploaded", "success")]);
        assert_eq!(summary.email_attempts, 0);
        assert_eq!(summary.delivery_rate(), 0);
    }

    #[test]
    fn csv_has_header_and_blank_optional_fields() {
        let mut row = item("Email sent", "success");
        row.lead = Some("Ada Lovelace".to_string());
        let csv = activity_csv(&[row, item("Lead uploaded", "success")]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], ACTIVITY_CSV_HEADER);
        assert_eq!(
            lines[1],
            "Email sent,success,Ada Lovelace,,2025-01-01T09:00:00+00:00"
        );
        assert!(lines[2].starts_with("Lead uploaded,success,,,"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn csv_quotes_fields_with_separators() {
        let mut row = item("Campaign \"Q1\" sent", "success");
        row.campaign = Some("Launch, part 2".to_string());
        let csv = activity_csv(&[row]);
        assert!(csv.contains("\"Campaign \"\"Q1\"\" sent\""));
        assert!(csv.contains(",\"Launch, part 2\","));
    }

    #[test]
    fn empty_feed_exports_only_the_header() {
        assert_eq!(activity_csv(std::iter::empty()), format!("{ACTIVITY_CSV_HEADER}\n"));
    }
}
