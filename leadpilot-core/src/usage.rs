//! Plan usage meter.

use crate::types::Usage;

/// Share of the plan limit at which the usage banner starts warning.
pub const WARNING_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLevel {
    Normal,
    Approaching,
    Reached,
}

impl Usage {
    /// Used share of the plan limit in `0.0..=1.0`. A zero limit counts as full.
    pub fn ratio(&self) -> f64 {
        if self.limit == 0 {
            return 1.0;
        }
        (self.current_usage as f64 / self.limit as f64).clamp(0.0, 1.0)
    }

    pub fn level(&self) -> UsageLevel {
        if self.current_usage >= self.limit {
            UsageLevel::Reached
        } else if self.current_usage as f64 >= self.limit as f64 * WARNING_RATIO {
            UsageLevel::Approaching
        } else {
            UsageLevel::Normal
        }
    }

    /// Remaining allowance, computed when the server left it out.
    pub fn remaining(&self) -> u64 {
        self.remaining
            .unwrap_or_else(|| self.limit.saturating_sub(self.current_usage))
    }

    pub fn summary(&self) -> String {
        format!(
            "{}/{} leads used on your {} plan",
            self.current_usage, self.limit, self.tier
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn usage(current: u64, limit: u64) -> Usage {
        Usage {
            current_usage: current,
            limit,
            remaining: None,
            tier: "free".to_string(),
        }
    }

    #[test]
    fn thresholds() {
        assert_eq!(usage(7, 10).level(), UsageLevel::Normal);
        assert_eq!(usage(8, 10).level(), UsageLevel::Approaching);
        assert_eq!(usage(10, 10).level(), UsageLevel::Reached);
        assert_eq!(usage(12, 10).level(), UsageLevel::Reached);
        assert_eq!(usage(0, 0).level(), UsageLevel::Reached);
    }

    #[test]
    fn remaining_prefers_server_value() {
        let mut u = usage(3, 10);
        assert_eq!(u.remaining(), 7);
        u.remaining = Some(5);
        assert_eq!(u.remaining(), 5);
        assert_eq!(usage(12, 10).remaining(), 0);
    }

    proptest! {
        #[test]
        fn ratio_stays_in_unit_interval(current in 0u64..10_000, limit in 0u64..10_000) {
            let r = usage(current, limit).ratio();
            prop_assert!((0.0..=1.0).contains(&r));
        }

        #[test]
        fn reached_iff_at_or_over_limit(current in 0u64..2_000, limit in 1u64..1_000) {
            let reached = usage(current, limit).level() == UsageLevel::Reached;
            prop_assert_eq!(reached, current >= limit);
        }
    }
}
