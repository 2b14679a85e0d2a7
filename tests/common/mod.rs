#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bot_admin_dashboard::api::parse_timestamp;
use bot_admin_dashboard::{AdminApi, MessageRecord, PageQuery, PanelEvent, StatsSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};

/// A stats request held open until the test answers it.
pub struct PendingStats {
    pub respond: oneshot::Sender<Result<StatsSnapshot>>,
}

/// A messages request held open until the test answers it.
pub struct PendingMessages {
    pub query: PageQuery,
    pub respond: oneshot::Sender<Result<Vec<MessageRecord>>>,
}

impl PendingMessages {
    /// Answer the request. Returns `false` if the panel already gave up on it.
    pub fn reply(self, result: Result<Vec<MessageRecord>>) -> bool {
        self.respond.send(result).is_ok()
    }
}

/// `AdminApi` double: every call is handed to the test through a channel and
/// resolves only when the test replies, in whatever order it chooses.
pub struct ScriptedApi {
    stats_tx: mpsc::UnboundedSender<PendingStats>,
    messages_tx: mpsc::UnboundedSender<PendingMessages>,
}

pub struct Script {
    pub stats: mpsc::UnboundedReceiver<PendingStats>,
    pub messages: mpsc::UnboundedReceiver<PendingMessages>,
}

impl ScriptedApi {
    pub fn new() -> (Arc<Self>, Script) {
        let (stats_tx, stats) = mpsc::unbounded_channel();
        let (messages_tx, messages) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                stats_tx,
                messages_tx,
            }),
            Script { stats, messages },
        )
    }
}

#[async_trait]
impl AdminApi for ScriptedApi {
    async fn fetch_stats(&self) -> Result<StatsSnapshot> {
        let (respond, rx) = oneshot::channel();
        self.stats_tx
            .send(PendingStats { respond })
            .map_err(|_| anyhow!("script dropped"))?;
        rx.await.map_err(|_| anyhow!("stats reply dropped"))?
    }

    async fn fetch_messages(&self, query: PageQuery) -> Result<Vec<MessageRecord>> {
        let (respond, rx) = oneshot::channel();
        self.messages_tx
            .send(PendingMessages { query, respond })
            .map_err(|_| anyhow!("script dropped"))?;
        rx.await.map_err(|_| anyhow!("messages reply dropped"))?
    }
}

impl Script {
    pub async fn next_messages(&mut self) -> PendingMessages {
        tokio::time::timeout(Duration::from_secs(2), self.messages.recv())
            .await
            .expect("no messages request issued")
            .expect("api dropped")
    }

    pub async fn next_stats(&mut self) -> PendingStats {
        tokio::time::timeout(Duration::from_secs(2), self.stats.recv())
            .await
            .expect("no stats request issued")
            .expect("api dropped")
    }

    /// Let spawned tasks run, then check nothing else was requested.
    pub async fn assert_no_more_messages(&mut self) {
        settle().await;
        assert!(
            self.messages.try_recv().is_err(),
            "unexpected extra messages request"
        );
    }
}

pub fn record(id: i64, is_funny: bool) -> MessageRecord {
    MessageRecord {
        id,
        content: format!("message {id}"),
        response: format!("reply {id}"),
        is_funny,
        created_at: parse_timestamp("2024-06-01T12:00:00Z").unwrap(),
        user_full_name: format!("User {id}"),
    }
}

pub fn records(ids: std::ops::Range<i64>) -> Vec<MessageRecord> {
    ids.map(|id| record(id, id % 2 == 0)).collect()
}

pub async fn next_event(rx: &mut broadcast::Receiver<PanelEvent>) -> PanelEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for panel event")
        .expect("panel event channel closed")
}

/// Give spawned fetch tasks a chance to finish.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
