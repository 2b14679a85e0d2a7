//! Presentation-ready snapshots of panel state, shared by the terminal and web shells.

use chrono::Local;
use serde::Serialize;

use crate::api::{MessageRecord, StatsSnapshot};
use crate::pagination::{range_label, PageEnd, PaginationState};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One labeled number in the stats block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Counter {
    pub label: &'static str,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsView {
    /// Nothing received yet. A failed fetch also stays here.
    Loading,
    Ready(Vec<Counter>),
}

impl StatsView {
    pub fn from_snapshot(snapshot: Option<&StatsSnapshot>) -> Self {
        match snapshot {
            None => Self::Loading,
            Some(s) => Self::Ready(vec![
                Counter { label: "Total users", value: s.total_users },
                Counter { label: "Active today", value: s.active_users_today },
                Counter { label: "Total messages", value: s.total_messages },
                Counter { label: "Funny messages", value: s.funny_messages },
            ]),
        }
    }
}

/// Two-state classification badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Funny,
    Ordinary,
}

impl Badge {
    pub fn from_flag(is_funny: bool) -> Self {
        if is_funny {
            Self::Funny
        } else {
            Self::Ordinary
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Funny => "funny",
            Self::Ordinary => "ordinary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRow {
    pub id: i64,
    pub user: String,
    pub content: String,
    pub response: String,
    pub badge: Badge,
    /// `created_at` in the local timezone.
    pub created_at: String,
}

impl From<&MessageRecord> for MessageRow {
    fn from(record: &MessageRecord) -> Self {
        Self {
            id: record.id,
            user: record.user_full_name.clone(),
            content: record.content.clone(),
            response: record.response.clone(),
            badge: Badge::from_flag(record.is_funny),
            created_at: record
                .created_at
                .with_timezone(&Local)
                .format(TIMESTAMP_FORMAT)
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagesView {
    pub rows: Vec<MessageRow>,
    /// Parameters the controls show (what was last asked for).
    pub pagination: PaginationState,
    /// Parameters of the page the rows came from, once any page arrived.
    pub displayed: Option<PaginationState>,
    /// A request for `pagination` is in flight.
    pub loading: bool,
}

impl MessagesView {
    pub fn page_end(&self) -> Option<PageEnd> {
        self.displayed
            .map(|shown| PageEnd::classify(self.rows.len(), shown.page_size))
    }

    /// "Next" is never disabled: the total is unknown.
    pub fn can_go_next(&self) -> bool {
        true
    }

    pub fn can_go_previous(&self) -> bool {
        self.pagination.page_index > 0
    }

    /// 1-based page number for display.
    pub fn page_number(&self) -> usize {
        self.pagination.page_index + 1
    }

    pub fn range_label(&self) -> String {
        match self.displayed {
            Some(shown) => range_label(shown, self.rows.len()),
            None => "loading…".to_string(),
        }
    }
}
