//! Data-fetching view models for the two dashboard panels.
//!
//! Each panel owns its state, its fetch tasks and its notification channel.
//! Panels never talk to each other; a shell mounts them, subscribes to their
//! events and re-renders when one arrives.

pub mod messages;
pub mod stats;

use serde::Serialize;

pub use messages::MessagePanel;
pub use stats::StatsPanel;

/// Capacity of each panel's notification channel.
const EVENT_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    Stats,
    Messages,
}

/// Change notification published by a panel after a fetch settles.
///
/// Stale or cancelled fetches publish nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PanelEvent {
    StatsLoaded,
    MessagesLoaded {
        page_index: usize,
        page_size: usize,
        count: usize,
    },
    /// The fetch failed and was logged; the panel kept its previous state.
    FetchFailed { panel: PanelKind },
}

impl PanelEvent {
    pub fn panel(&self) -> PanelKind {
        match self {
            Self::StatsLoaded => PanelKind::Stats,
            Self::MessagesLoaded { .. } => PanelKind::Messages,
            Self::FetchFailed { panel } => *panel,
        }
    }
}
