//! Navigation and view switching utilities.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    Dashboard,
    Leads,
    Campaigns,
    Activity,
    Pricing,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Leads => "Leads",
            View::Campaigns => "Campaigns",
            View::Activity => "Activity",
            View::Pricing => "Pricing",
        }
    }

    pub fn all() -> &'static [View] {
        &[
            View::Dashboard,
            View::Leads,
            View::Campaigns,
            View::Activity,
            View::Pricing,
        ]
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<View> {
        Self::all().get(index).copied()
    }

    pub fn next(&self) -> View {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn previous(&self) -> View {
        let all = Self::all();
        let idx = self.index();
        let prev = if idx == 0 { all.len() - 1 } else { idx - 1 };
        all[prev]
    }
}

impl Default for View {
    fn default() -> Self {
        View::Dashboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_and_previous_wrap() {
        assert_eq!(View::Pricing.next(), View::Dashboard);
        assert_eq!(View::Dashboard.previous(), View::Pricing);
        for view in View::all() {
            assert_eq!(view.next().previous(), *view);
        }
    }

    #[test]
    fn index_round_trips() {
        for (idx, view) in View::all().iter().enumerate() {
            assert_eq!(view.index(), idx);
            assert_eq!(View::from_index(idx), Some(*view));
        }
        assert_eq!(View::from_index(5), None);
    }
}
