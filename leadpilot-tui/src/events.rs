//! Event types for the TUI event loop.

use crate::mutations::MutationOutcome;
use crossterm::event::KeyEvent;
use leadpilot_core::ClientError;
use leadpilot_query::CacheKey;

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Input(KeyEvent),
    Tick,
    UsagePoll,
    Resize { width: u16, height: u16 },
    /// A subscribed cache entry changed. `error` is set when the entry
    /// transitioned into the error state.
    QueryUpdated {
        key: CacheKey,
        error: Option<ClientError>,
    },
    MutationFinished {
        label: &'static str,
        result: Result<MutationOutcome, ClientError>,
    },
}
