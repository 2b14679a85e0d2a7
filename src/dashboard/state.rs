use std::sync::Arc;

use crate::panels::{MessagePanel, StatsPanel};
use crate::pagination::PageSize;

/// Shared handles for the web handlers. The panels are the same instances
/// the terminal shell drives, so both renditions show one pagination state.
pub struct DashboardState {
    pub stats: Arc<StatsPanel>,
    pub messages: Arc<MessagePanel>,
    pub backend_url: String,
    pub page_sizes: [PageSize; 3],
}

impl DashboardState {
    pub fn new(stats: Arc<StatsPanel>, messages: Arc<MessagePanel>, backend_url: &str) -> Self {
        Self {
            stats,
            messages,
            backend_url: backend_url.to_string(),
            page_sizes: PageSize::ALL,
        }
    }
}
