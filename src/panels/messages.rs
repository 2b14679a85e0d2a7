use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::{PanelEvent, PanelKind, EVENT_CHANNEL_CAPACITY};
use crate::api::{AdminApi, MessageRecord};
use crate::pagination::{PageSize, PaginationState};
use crate::view::{MessageRow, MessagesView};

struct MessagesState {
    pagination: PaginationState,
    records: Vec<MessageRecord>,
    displayed: Option<PaginationState>,
    /// Bumped for every issued request; only a response carrying the current
    /// value may touch `records`.
    generation: u64,
    in_flight: Option<CancellationToken>,
    mounted: bool,
}

impl MessagesState {
    fn new(pagination: PaginationState) -> Self {
        Self {
            pagination,
            records: Vec::new(),
            displayed: None,
            generation: 0,
            in_flight: None,
            mounted: false,
        }
    }
}

/// Paginated message log.
///
/// A request for `page_size` records at `page_index * page_size` goes out on
/// mount and whenever the pagination pair changes. The newest request always
/// wins: older ones are cancelled, and a response whose generation is no
/// longer current is dropped at apply time.
pub struct MessagePanel {
    api: Arc<dyn AdminApi>,
    state: Arc<RwLock<MessagesState>>,
    lifetime: CancellationToken,
    events: broadcast::Sender<PanelEvent>,
}

impl MessagePanel {
    pub fn new(api: Arc<dyn AdminApi>, page_size: PageSize) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            api,
            state: Arc::new(RwLock::new(MessagesState::new(PaginationState::new(
                page_size,
            )))),
            lifetime: CancellationToken::new(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.events.subscribe()
    }

    /// Start the fetch lifecycle with the current pagination. No-op when
    /// already mounted or after `unmount`.
    pub async fn mount(&self) {
        let mut state = self.state.write().await;
        if state.mounted || self.lifetime.is_cancelled() {
            debug!("message panel already mounted or torn down; ignoring mount");
            return;
        }
        state.mounted = true;
        self.issue(&mut state);
    }

    /// Fails without touching state when the index is out of range.
    pub async fn set_page(&self, page_index: usize) -> Result<()> {
        let mut state = self.state.write().await;
        let next = state.pagination.with_page(page_index)?;
        self.transition(&mut state, next);
        Ok(())
    }

    /// Change the page size and go back to the first page.
    pub async fn set_page_size(&self, page_size: PageSize) {
        let mut state = self.state.write().await;
        let next = state.pagination.with_page_size(page_size);
        self.transition(&mut state, next);
    }

    /// With no total count there is no known last page; only the index bound
    /// stops it.
    pub async fn next_page(&self) -> Result<()> {
        let mut state = self.state.write().await;
        let next = state
            .pagination
            .with_page(state.pagination.page_index.saturating_add(1))?;
        self.transition(&mut state, next);
        Ok(())
    }

    /// Stays put on the first page.
    pub async fn previous_page(&self) {
        let mut state = self.state.write().await;
        let next = PaginationState {
            page_index: state.pagination.page_index.saturating_sub(1),
            ..state.pagination
        };
        self.transition(&mut state, next);
    }

    pub async fn pagination(&self) -> PaginationState {
        self.state.read().await.pagination
    }

    /// Cancel the in-flight request and refuse any later update.
    pub async fn unmount(&self) {
        self.lifetime.cancel();
        let mut state = self.state.write().await;
        state.mounted = false;
        state.in_flight = None;
        state.records.clear();
        state.displayed = None;
    }

    pub async fn view(&self) -> MessagesView {
        let state = self.state.read().await;
        MessagesView {
            rows: state.records.iter().map(MessageRow::from).collect(),
            pagination: state.pagination,
            displayed: state.displayed,
            loading: state.in_flight.is_some(),
        }
    }

    /// Fetch only when the pair actually changed.
    fn transition(&self, state: &mut MessagesState, next: PaginationState) {
        if state.pagination == next {
            debug!(?next, "pagination unchanged; no request");
            return;
        }
        state.pagination = next;
        if state.mounted {
            self.issue(state);
        }
    }

    fn issue(&self, state: &mut MessagesState) {
        state.generation += 1;
        let generation = state.generation;
        let params = state.pagination;

        if let Some(previous) = state.in_flight.take() {
            previous.cancel();
        }
        let token = self.lifetime.child_token();
        state.in_flight = Some(token.clone());

        let api = Arc::clone(&self.api);
        let shared = Arc::clone(&self.state);
        let events = self.events.clone();
        let query = params.query();
        debug!(generation, limit = query.limit, offset = query.offset, "requesting messages");

        tokio::spawn(async move {
            // A response that is already here is taken and left to the
            // generation check below.
            let result = tokio::select! {
                biased;
                result = api.fetch_messages(query) => result,
                _ = token.cancelled() => {
                    debug!(generation, "messages fetch cancelled");
                    return;
                }
            };

            let mut state = shared.write().await;
            if !state.mounted || state.generation != generation {
                debug!(
                    generation,
                    current = state.generation,
                    "discarding stale messages response"
                );
                return;
            }
            state.in_flight = None;

            match result {
                Ok(records) => {
                    let count = records.len();
                    info!(
                        page_index = params.page_index,
                        page_size = params.page_size.get(),
                        count,
                        "messages page loaded"
                    );
                    state.records = records;
                    state.displayed = Some(params);
                    let _ = events.send(PanelEvent::MessagesLoaded {
                        page_index: params.page_index,
                        page_size: params.page_size.get(),
                        count,
                    });
                }
                Err(e) => {
                    // Keep the last good page on screen.
                    error!("Error fetching messages: {:#}", e);
                    let _ = events.send(PanelEvent::FetchFailed {
                        panel: PanelKind::Messages,
                    });
                }
            }
        });
    }
}
