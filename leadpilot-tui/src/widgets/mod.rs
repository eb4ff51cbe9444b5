//! Reusable widget components.

pub mod detail;
pub mod filter;
pub mod progress;
pub mod status;

pub use detail::DetailPanel;
pub use filter::{FilterBar, FilterOption};
pub use progress::UsageMeter;
pub use status::StatCard;
