use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::{PanelEvent, PanelKind, EVENT_CHANNEL_CAPACITY};
use crate::api::{AdminApi, StatsSnapshot};
use crate::view::StatsView;

#[derive(Default)]
struct StatsState {
    snapshot: Option<StatsSnapshot>,
    mounted: bool,
    /// Set by the first mount; the snapshot is never fetched again.
    fetch_issued: bool,
}

/// Aggregate statistics block: one fetch on mount, then static.
pub struct StatsPanel {
    api: Arc<dyn AdminApi>,
    state: Arc<RwLock<StatsState>>,
    lifetime: CancellationToken,
    events: broadcast::Sender<PanelEvent>,
}

impl StatsPanel {
    pub fn new(api: Arc<dyn AdminApi>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            api,
            state: Arc::new(RwLock::new(StatsState::default())),
            lifetime: CancellationToken::new(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.events.subscribe()
    }

    /// Issue the single snapshot request. Later calls do nothing, and so does
    /// a call after `unmount`.
    pub async fn mount(&self) {
        let mut state = self.state.write().await;
        if state.fetch_issued || self.lifetime.is_cancelled() {
            debug!("stats panel already mounted; ignoring mount");
            return;
        }
        state.mounted = true;
        state.fetch_issued = true;
        drop(state);

        let api = Arc::clone(&self.api);
        let shared = Arc::clone(&self.state);
        let token = self.lifetime.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            debug!("requesting stats snapshot");
            let result = tokio::select! {
                _ = token.cancelled() => {
                    debug!("stats fetch cancelled by unmount");
                    return;
                }
                result = api.fetch_stats() => result,
            };

            let mut state = shared.write().await;
            if !state.mounted {
                debug!("stats panel unmounted; dropping response");
                return;
            }
            match result {
                Ok(snapshot) => {
                    info!(
                        total_users = snapshot.total_users,
                        total_messages = snapshot.total_messages,
                        "stats snapshot loaded"
                    );
                    state.snapshot = Some(snapshot);
                    let _ = events.send(PanelEvent::StatsLoaded);
                }
                Err(e) => {
                    // No retry: the placeholder stays up.
                    error!("Error fetching stats: {:#}", e);
                    let _ = events.send(PanelEvent::FetchFailed {
                        panel: PanelKind::Stats,
                    });
                }
            }
        });
    }

    /// Tear down: cancel the pending fetch and refuse any later update.
    pub async fn unmount(&self) {
        self.lifetime.cancel();
        let mut state = self.state.write().await;
        state.mounted = false;
        state.snapshot = None;
    }

    pub async fn view(&self) -> StatsView {
        let state = self.state.read().await;
        StatsView::from_snapshot(state.snapshot.as_ref())
    }
}
