// Ordering, failure and teardown behavior of the panel view models,
// driven by a scripted backend that answers requests on demand.

mod common;

use anyhow::anyhow;
use bot_admin_dashboard::view::{Badge, StatsView};
use bot_admin_dashboard::{
    MessagePanel, PageEnd, PageQuery, PageSize, PaginationState, PanelEvent, PanelKind, StatsPanel,
    StatsSnapshot,
};
use common::{next_event, record, records, settle, ScriptedApi};
use tokio::sync::broadcast::error::TryRecvError;

fn snapshot() -> StatsSnapshot {
    StatsSnapshot {
        total_users: 5,
        active_users_today: 2,
        total_messages: 40,
        funny_messages: 12,
    }
}

// ── MessagePanel ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_mount_requests_first_page_with_defaults() {
    let (api, mut script) = ScriptedApi::new();
    let panel = MessagePanel::new(api, PageSize::Ten);
    let mut events = panel.subscribe();

    panel.mount().await;
    let pending = script.next_messages().await;
    assert_eq!(pending.query, PageQuery { limit: 10, offset: 0 });
    assert!(panel.view().await.loading);

    assert!(pending.reply(Ok(records(0..3))));
    assert_eq!(
        next_event(&mut events).await,
        PanelEvent::MessagesLoaded { page_index: 0, page_size: 10, count: 3 }
    );

    let view = panel.view().await;
    assert!(!view.loading);
    let ids: Vec<i64> = view.rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_requests_carry_offset_and_limit() {
    let (api, mut script) = ScriptedApi::new();
    let panel = MessagePanel::new(api, PageSize::Ten);
    let mut events = panel.subscribe();
    panel.mount().await;
    script.next_messages().await.reply(Ok(records(0..10)));
    next_event(&mut events).await;

    for size in PageSize::ALL {
        panel.set_page_size(size).await;
        if size != PageSize::Ten {
            let pending = script.next_messages().await;
            assert_eq!(pending.query, PageQuery { limit: size.get(), offset: 0 });
            pending.reply(Ok(Vec::new()));
            next_event(&mut events).await;
        }
        for index in [1usize, 4, 9] {
            panel.set_page(index).await.unwrap();
            let pending = script.next_messages().await;
            assert_eq!(
                pending.query,
                PageQuery { limit: size.get(), offset: index * size.get() }
            );
            pending.reply(Ok(Vec::new()));
            next_event(&mut events).await;
        }
    }
}

#[tokio::test]
async fn test_set_page_size_resets_page_index() {
    let (api, mut script) = ScriptedApi::new();
    let panel = MessagePanel::new(api, PageSize::Ten);
    panel.mount().await;
    script.next_messages().await.reply(Ok(records(0..10)));

    panel.set_page(2).await.unwrap();
    script.next_messages().await.reply(Ok(records(20..30)));
    assert_eq!(panel.pagination().await.page_index, 2);

    panel.set_page_size(PageSize::TwentyFive).await;
    let pagination = panel.pagination().await;
    assert_eq!(pagination.page_index, 0);
    assert_eq!(pagination.page_size, PageSize::TwentyFive);

    // Exactly one request, and it starts at zero rather than 2 * 25
    let pending = script.next_messages().await;
    assert_eq!(pending.query, PageQuery { limit: 25, offset: 0 });
    pending.reply(Ok(records(0..25)));
    script.assert_no_more_messages().await;
}

#[tokio::test]
async fn test_unchanged_pagination_issues_no_request() {
    let (api, mut script) = ScriptedApi::new();
    let panel = MessagePanel::new(api, PageSize::Ten);
    panel.mount().await;
    script.next_messages().await.reply(Ok(records(0..10)));

    panel.set_page(0).await.unwrap();
    panel.previous_page().await;
    panel.mount().await;
    script.assert_no_more_messages().await;
}

#[tokio::test]
async fn test_newest_request_wins_when_responses_arrive_out_of_order() {
    let (api, mut script) = ScriptedApi::new();
    let panel = MessagePanel::new(api, PageSize::Ten);
    let mut events = panel.subscribe();
    panel.mount().await;
    script.next_messages().await.reply(Ok(records(0..10)));
    next_event(&mut events).await;

    // Request A, then request B before A resolves
    panel.set_page(1).await.unwrap();
    let request_a = script.next_messages().await;
    panel.set_page(2).await.unwrap();
    let request_b = script.next_messages().await;
    assert_eq!(request_a.query.offset, 10);
    assert_eq!(request_b.query.offset, 20);

    // B resolves first
    assert!(request_b.reply(Ok(records(20..30))));
    assert_eq!(
        next_event(&mut events).await,
        PanelEvent::MessagesLoaded { page_index: 2, page_size: 10, count: 10 }
    );

    // A arrives late; the panel may have stopped listening already
    let _ = request_a.reply(Ok(records(10..20)));
    settle().await;

    let view = panel.view().await;
    assert_eq!(view.rows.first().map(|r| r.id), Some(20));
    assert_eq!(view.displayed.map(|d| d.page_index), Some(2));
    assert_eq!(view.pagination.page_index, 2);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_stale_response_ignored_while_newest_still_pending() {
    let (api, mut script) = ScriptedApi::new();
    let panel = MessagePanel::new(api, PageSize::Ten);
    let mut events = panel.subscribe();
    panel.mount().await;
    let first = script.next_messages().await;

    panel.set_page_size(PageSize::Hundred).await;
    let second = script.next_messages().await;

    // The superseded first page shows up while the second is outstanding
    let _ = first.reply(Ok(records(0..10)));
    settle().await;
    let view = panel.view().await;
    assert!(view.rows.is_empty());
    assert!(view.loading);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    second.reply(Ok(records(0..100)));
    next_event(&mut events).await;
    assert_eq!(panel.view().await.rows.len(), 100);
}

#[tokio::test]
async fn test_response_received_before_newer_request_is_not_applied() {
    let (api, mut script) = ScriptedApi::new();
    let panel = MessagePanel::new(api, PageSize::Ten);
    let mut events = panel.subscribe();
    panel.mount().await;
    script.next_messages().await.reply(Ok(records(0..10)));
    next_event(&mut events).await;

    panel.set_page(1).await.unwrap();
    let request_a = script.next_messages().await;

    // A's reply is already delivered when B supersedes it, so the fetch task
    // gets a result rather than a cancellation.
    assert!(request_a.reply(Ok(records(10..20))));
    panel.set_page(2).await.unwrap();
    let request_b = script.next_messages().await;
    assert_eq!(request_b.query.offset, 20);
    settle().await;

    let view = panel.view().await;
    assert_eq!(view.rows.first().map(|r| r.id), Some(0));
    assert_eq!(view.displayed.map(|d| d.page_index), Some(0));
    assert!(view.loading);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    assert!(request_b.reply(Ok(records(20..30))));
    assert_eq!(
        next_event(&mut events).await,
        PanelEvent::MessagesLoaded { page_index: 2, page_size: 10, count: 10 }
    );
    assert_eq!(panel.view().await.rows.first().map(|r| r.id), Some(20));
}

#[tokio::test]
async fn test_out_of_range_page_is_rejected() {
    let (api, mut script) = ScriptedApi::new();
    let panel = MessagePanel::new(api, PageSize::Hundred);
    let mut events = panel.subscribe();
    panel.mount().await;
    script.next_messages().await.reply(Ok(records(0..100)));
    next_event(&mut events).await;

    assert!(panel.set_page(usize::MAX - 1).await.is_err());
    assert!(panel
        .set_page(PaginationState::MAX_PAGE_INDEX + 1)
        .await
        .is_err());
    assert_eq!(panel.pagination().await.page_index, 0);
    script.assert_no_more_messages().await;

    // The last allowed page still works, and stepping past it does not
    panel.set_page(PaginationState::MAX_PAGE_INDEX).await.unwrap();
    let pending = script.next_messages().await;
    assert_eq!(
        pending.query,
        PageQuery { limit: 100, offset: PaginationState::MAX_PAGE_INDEX * 100 }
    );
    assert!(pending.reply(Ok(Vec::new())));
    next_event(&mut events).await;

    assert!(panel.next_page().await.is_err());
    assert_eq!(
        panel.pagination().await.page_index,
        PaginationState::MAX_PAGE_INDEX
    );
    script.assert_no_more_messages().await;
    assert_eq!(panel.view().await.range_label(), "no records past 1000000000");
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_page() {
    let (api, mut script) = ScriptedApi::new();
    let panel = MessagePanel::new(api, PageSize::Ten);
    let mut events = panel.subscribe();
    panel.mount().await;
    script.next_messages().await.reply(Ok(records(0..3)));
    next_event(&mut events).await;

    panel.next_page().await.unwrap();
    script
        .next_messages()
        .await
        .reply(Err(anyhow!("connection refused")));
    assert_eq!(
        next_event(&mut events).await,
        PanelEvent::FetchFailed { panel: PanelKind::Messages }
    );

    let view = panel.view().await;
    let ids: Vec<i64> = view.rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(view.displayed.map(|d| d.page_index), Some(0));
    assert!(!view.loading);
}

#[tokio::test]
async fn test_short_and_empty_pages_are_not_errors() {
    let (api, mut script) = ScriptedApi::new();
    let panel = MessagePanel::new(api, PageSize::Ten);
    let mut events = panel.subscribe();
    panel.mount().await;
    script.next_messages().await.reply(Ok(records(0..10)));
    next_event(&mut events).await;
    assert_eq!(panel.view().await.page_end(), Some(PageEnd::MaybeMore));

    panel.next_page().await.unwrap();
    script.next_messages().await.reply(Ok(records(10..14)));
    next_event(&mut events).await;
    let view = panel.view().await;
    assert_eq!(view.page_end(), Some(PageEnd::LastPage));
    assert!(view.can_go_next());

    panel.next_page().await.unwrap();
    script.next_messages().await.reply(Ok(Vec::new()));
    assert_eq!(
        next_event(&mut events).await,
        PanelEvent::MessagesLoaded { page_index: 2, page_size: 10, count: 0 }
    );
    let view = panel.view().await;
    assert_eq!(view.page_end(), Some(PageEnd::PastEnd));
    assert!(view.rows.is_empty());
}

#[tokio::test]
async fn test_message_rows_render_badges_in_order() {
    let (api, mut script) = ScriptedApi::new();
    let panel = MessagePanel::new(api, PageSize::Ten);
    let mut events = panel.subscribe();
    panel.mount().await;
    script
        .next_messages()
        .await
        .reply(Ok(vec![record(9, true), record(4, false), record(7, true)]));
    next_event(&mut events).await;

    let rows = panel.view().await.rows;
    let badges: Vec<Badge> = rows.iter().map(|r| r.badge).collect();
    assert_eq!(badges, vec![Badge::Funny, Badge::Ordinary, Badge::Funny]);
    assert_eq!(rows[1].user, "User 4");
}

#[tokio::test]
async fn test_unmount_while_pending_drops_response() {
    let (api, mut script) = ScriptedApi::new();
    let panel = MessagePanel::new(api, PageSize::Ten);
    let mut events = panel.subscribe();
    panel.mount().await;
    let pending = script.next_messages().await;

    panel.unmount().await;
    let _ = pending.reply(Ok(records(0..10)));
    settle().await;

    assert!(panel.view().await.rows.is_empty());
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    // Torn down for good: no new requests either
    panel.set_page(3).await.unwrap();
    panel.mount().await;
    script.assert_no_more_messages().await;
}

#[tokio::test]
async fn test_pagination_before_mount_only_sets_state() {
    let (api, mut script) = ScriptedApi::new();
    let panel = MessagePanel::new(api, PageSize::TwentyFive);
    panel.set_page(3).await.unwrap();
    script.assert_no_more_messages().await;

    panel.mount().await;
    let pending = script.next_messages().await;
    assert_eq!(pending.query, PageQuery { limit: 25, offset: 75 });
}

// ── StatsPanel ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_stats_loads_once() {
    let (api, mut script) = ScriptedApi::new();
    let panel = StatsPanel::new(api);
    let mut events = panel.subscribe();

    assert_eq!(panel.view().await, StatsView::Loading);
    panel.mount().await;
    assert_eq!(panel.view().await, StatsView::Loading);

    let _ = script.next_stats().await.respond.send(Ok(snapshot()));
    assert_eq!(next_event(&mut events).await, PanelEvent::StatsLoaded);

    let StatsView::Ready(counters) = panel.view().await else {
        panic!("expected counters");
    };
    let values: Vec<u64> = counters.iter().map(|c| c.value).collect();
    assert_eq!(values, vec![5, 2, 40, 12]);

    // No re-fetch trigger exists
    panel.mount().await;
    settle().await;
    assert!(script.stats.try_recv().is_err());
}

#[tokio::test]
async fn test_stats_failure_keeps_placeholder() {
    let (api, mut script) = ScriptedApi::new();
    let panel = StatsPanel::new(api);
    let mut events = panel.subscribe();
    panel.mount().await;

    let _ = script
        .next_stats()
        .await
        .respond
        .send(Err(anyhow!("500 Internal Server Error")));
    assert_eq!(
        next_event(&mut events).await,
        PanelEvent::FetchFailed { panel: PanelKind::Stats }
    );
    assert_eq!(panel.view().await, StatsView::Loading);

    // No retry
    settle().await;
    assert!(script.stats.try_recv().is_err());
}

#[tokio::test]
async fn test_stats_unmount_while_pending() {
    let (api, mut script) = ScriptedApi::new();
    let panel = StatsPanel::new(api);
    let mut events = panel.subscribe();
    panel.mount().await;
    let pending = script.next_stats().await;

    panel.unmount().await;
    let _ = pending.respond.send(Ok(snapshot()));
    settle().await;

    assert_eq!(panel.view().await, StatsView::Loading);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}
